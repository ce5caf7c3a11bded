// Vikey Output Layer - Injection Gate
// Binary semaphore: at most one injection in flight process-wide

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct InjectionGate {
    busy: Mutex<bool>,
    freed: Condvar,
}

/// Holds the gate; dropping it frees the gate and wakes every waiter
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a InjectionGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        *self.gate.busy.lock() = false;
        self.gate.freed.notify_all();
    }
}

impl InjectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the gate is free, then take it
    pub fn acquire(&self) -> GateGuard<'_> {
        let mut busy = self.busy.lock();
        while *busy {
            self.freed.wait(&mut busy);
        }
        *busy = true;
        GateGuard { gate: self }
    }

    /// Block until no injection is in flight. Returns false if `timeout`
    /// elapsed first.
    pub fn wait_until_free(&self, timeout: Option<Duration>) -> bool {
        let mut busy = self.busy.lock();
        match timeout {
            None => {
                while *busy {
                    self.freed.wait(&mut busy);
                }
                true
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while *busy {
                    if self.freed.wait_until(&mut busy, deadline).timed_out() {
                        return !*busy;
                    }
                }
                true
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_guard_releases_on_drop() {
        let gate = InjectionGate::new();
        {
            let _guard = gate.acquire();
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
        assert!(gate.wait_until_free(None));
    }

    #[test]
    fn test_wait_times_out_while_held() {
        let gate = InjectionGate::new();
        let _guard = gate.acquire();
        assert!(!gate.wait_until_free(Some(Duration::from_millis(20))));
    }

    #[test]
    fn test_waiter_wakes_when_freed() {
        let gate = Arc::new(InjectionGate::new());
        let holder = gate.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        let handle = thread::spawn(move || {
            let _guard = holder.acquire();
            tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(30));
        });

        rx.recv().unwrap();
        assert!(gate.is_busy());
        assert!(gate.wait_until_free(Some(Duration::from_secs(5))));
        assert!(!gate.is_busy());
        handle.join().unwrap();
    }
}
