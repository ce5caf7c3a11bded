// Vikey Output Layer - Character Injector
// Writes engine edits into the focused control as synthetic events

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::accessibility::{splice, AccessibilityProbe};
use super::event::{EventPoster, PostChannel, SyntheticEvent};
use super::gate::InjectionGate;
use crate::modifier::{Modifier, Modifiers};
use crate::session::SessionContext;
use crate::trace::{EventSink, TraceEvent};
use crate::transform::EngineResult;
use crate::window::{InjectionMethod, InjectionStrategy, TextSendingMethod};
use crate::Key;

/// Largest Unicode payload of one key event, in UTF-16 units
pub const MAX_CHUNK_UNITS: usize = 20;

const AX_ATTEMPTS: usize = 3;
const DEFAULT_SETTLE: Duration = Duration::from_millis(2);

/// One edit to apply at the caret
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InjectionEdit {
    /// Code units to erase, one Delete each
    pub backspace_count: usize,
    pub text: String,
}

impl InjectionEdit {
    pub fn new(backspace_count: usize, text: &str) -> Self {
        Self {
            backspace_count,
            text: text.to_string(),
        }
    }

    /// Edit for a consumed engine result, None for a pass
    pub fn from_result(result: &EngineResult) -> Option<Self> {
        if !result.should_consume {
            return None;
        }
        Some(Self::new(result.backspace_count, &result.new_characters))
    }
}

/// Text between control characters, or a key standing in for one
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Key(Key),
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let key = match c {
            '\n' | '\r' => Key::RETURN,
            '\t' => Key::TAB,
            _ => continue,
        };
        if start < i {
            out.push(Segment::Text(&text[start..i]));
        }
        out.push(Segment::Key(key));
        start = i + c.len_utf8();
    }
    if start < text.len() {
        out.push(Segment::Text(&text[start..]));
    }
    out
}

/// Split into pieces of at most `max_units` UTF-16 units without
/// breaking a surrogate pair
pub fn chunk_utf16(text: &str, max_units: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut units = 0;
    for (i, c) in text.char_indices() {
        let len = c.len_utf16();
        if units + len > max_units && units > 0 {
            chunks.push(&text[start..i]);
            start = i;
            units = 0;
        }
        units += len;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

fn pause(us: u64) {
    if us > 0 {
        thread::sleep(Duration::from_micros(us));
    }
}

pub struct CharacterInjector {
    poster: Arc<dyn EventPoster>,
    probe: Arc<dyn AccessibilityProbe>,
    gate: Arc<InjectionGate>,
    settle: Duration,
    sink: Arc<dyn EventSink>,
}

impl CharacterInjector {
    pub fn new(
        poster: Arc<dyn EventPoster>,
        probe: Arc<dyn AccessibilityProbe>,
        gate: Arc<InjectionGate>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            poster,
            probe,
            gate,
            settle: DEFAULT_SETTLE,
            sink,
        }
    }

    /// Pause after the last event before the gate opens again
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn gate(&self) -> &Arc<InjectionGate> {
        &self.gate
    }

    /// Apply `edit` with `strategy`. Blocks while another injection is in
    /// flight. Returns the method that finally carried the edit.
    pub fn inject(
        &self,
        edit: &InjectionEdit,
        strategy: &InjectionStrategy,
        session: &SessionContext,
    ) -> InjectionMethod {
        if strategy.method == InjectionMethod::Passthrough {
            return InjectionMethod::Passthrough;
        }

        let _guard = self.gate.acquire();
        let started = Instant::now();
        self.sink.emit(TraceEvent::InjectionStarted {
            method: strategy.method,
            backspace_count: edit.backspace_count,
            text: edit.text.clone(),
        });

        let used = match strategy.method {
            InjectionMethod::Fast => {
                self.send_keys(edit, strategy, PostChannel::Proxy);
                InjectionMethod::Fast
            }
            InjectionMethod::Slow => {
                self.send_keys(edit, strategy, PostChannel::Session);
                InjectionMethod::Slow
            }
            InjectionMethod::Selection => {
                self.send_selection(edit, strategy);
                InjectionMethod::Selection
            }
            InjectionMethod::Autocomplete => {
                self.send_autocomplete(edit, strategy, session);
                InjectionMethod::Autocomplete
            }
            InjectionMethod::AxDirect => {
                if self.send_ax(edit, strategy) {
                    InjectionMethod::AxDirect
                } else {
                    self.sink.emit(TraceEvent::Fallback {
                        from: InjectionMethod::AxDirect,
                        to: InjectionMethod::Selection,
                    });
                    self.send_selection(edit, strategy);
                    InjectionMethod::Selection
                }
            }
            InjectionMethod::Passthrough => InjectionMethod::Passthrough,
        };

        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        self.sink.emit(TraceEvent::InjectionFinished {
            method: used,
            elapsed: started.elapsed(),
        });
        used
    }

    fn post(&self, event: &SyntheticEvent, channel: PostChannel) {
        if let Err(e) = self.poster.post(event, channel) {
            self.sink.emit(TraceEvent::PostFailed(e.to_string()));
        }
    }

    fn tap(&self, key: Key, modifiers: Modifiers, channel: PostChannel) {
        for event in SyntheticEvent::tap(key, modifiers) {
            self.post(&event, channel);
        }
    }

    fn send_deletes(&self, count: usize, strategy: &InjectionStrategy, channel: PostChannel) {
        for _ in 0..count {
            self.tap(Key::DELETE, Modifiers::empty(), channel);
            pause(strategy.delays.backspace_us);
        }
        if count > 0 {
            pause(strategy.delays.post_backspace_us);
        }
    }

    fn send_text(&self, text: &str, strategy: &InjectionStrategy, channel: PostChannel) {
        for segment in segments(text) {
            match segment {
                Segment::Key(key) => {
                    self.tap(key, Modifiers::empty(), channel);
                    pause(strategy.delays.text_us);
                }
                Segment::Text(text) => {
                    let pieces: Vec<&str> = match strategy.text_sending {
                        TextSendingMethod::Chunked => chunk_utf16(text, MAX_CHUNK_UNITS),
                        TextSendingMethod::OneByOne => chunk_utf16(text, 1),
                    };
                    for piece in pieces {
                        self.post(&SyntheticEvent::text(piece), channel);
                        pause(strategy.delays.text_us);
                    }
                }
            }
        }
    }

    fn send_keys(&self, edit: &InjectionEdit, strategy: &InjectionStrategy, channel: PostChannel) {
        self.send_deletes(edit.backspace_count, strategy, channel);
        self.send_text(&edit.text, strategy, channel);
    }

    fn send_selection(&self, edit: &InjectionEdit, strategy: &InjectionStrategy) {
        let shift = Modifiers::empty().with(Modifier::Shift);
        let count = edit.backspace_count;
        for _ in 0..count {
            self.tap(Key::LEFT, shift, PostChannel::Proxy);
            pause(strategy.delays.backspace_us);
        }
        if count > 0 {
            pause(strategy.delays.post_backspace_us);
            if edit.text.is_empty() {
                self.tap(Key::DELETE, Modifiers::empty(), PostChannel::Proxy);
                return;
            }
        }
        self.send_text(&edit.text, strategy, PostChannel::Proxy);
    }

    fn send_autocomplete(
        &self,
        edit: &InjectionEdit,
        strategy: &InjectionStrategy,
        session: &SessionContext,
    ) {
        let text_follows = self.probe.has_text_after_cursor() == Some(true);
        if !session.typing_mid_sentence && !text_follows {
            self.tap(Key::FORWARD_DELETE, Modifiers::empty(), PostChannel::Proxy);
            pause(strategy.delays.backspace_us);
        }
        self.send_keys(edit, strategy, PostChannel::Proxy);
    }

    fn send_ax(&self, edit: &InjectionEdit, strategy: &InjectionStrategy) -> bool {
        for attempt in 1..=AX_ATTEMPTS {
            let edited = self
                .probe
                .focused_text()
                .and_then(|current| splice(&current, edit.backspace_count, &edit.text));
            if let Some(edited) = edited {
                if self.probe.set_focused_text(&edited) {
                    return true;
                }
            }
            log::debug!("Accessibility edit attempt {} failed", attempt);
            if attempt < AX_ATTEMPTS {
                pause(strategy.delays.text_us);
            }
        }
        false
    }
}
