// Vikey CLI
// Vietnamese typing for macOS through a Quartz event tap

#![cfg_attr(not(target_os = "macos"), allow(dead_code, unused_imports))]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use vikey_core::event::PipelineControl;
use vikey_core::settings::{CodeTable, InputMethod};
use vikey_core::transform::{SpellDictionary, WordList};
use vikey_core::{AppCommand, Config};

/// Vietnamese input method
#[derive(Parser, Debug)]
#[command(name = "vikey")]
#[command(version)]
#[command(about = "Vietnamese input method for macOS", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Input method, overriding the config file
    #[arg(short, long, value_name = "METHOD")]
    method: Option<InputMethod>,

    /// Output code table, overriding the config file
    #[arg(long, value_name = "TABLE")]
    code_table: Option<CodeTable>,
}

impl Args {
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::default_path)
    }

    /// Load the config file, or defaults when there is none
    fn load_config(&self) -> Result<Config> {
        let mut config = match self.config_path() {
            Some(path) if path.exists() => Config::from_toml_path(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            Some(path) if self.config.is_some() => {
                anyhow::bail!("Config file {} not found", path.display())
            }
            _ => {
                log::info!("No config file, using defaults");
                Config::default()
            }
        };
        if let Some(method) = self.method {
            config.engine.input_method = method;
        }
        if let Some(code_table) = self.code_table {
            config.engine.code_table = code_table;
        }
        Ok(config)
    }
}

fn load_dictionary(path: Option<&Path>) -> Result<Option<Arc<dyn SpellDictionary>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let words = WordList::load(path)
        .with_context(|| format!("Failed to load dictionary {}", path.display()))?;
    log::info!("Loaded {} dictionary words from {}", words.len(), path.display());
    Ok(Some(Arc::new(words)))
}

/// Everything a reloaded config changes on the hook thread. The mode is
/// only sent when the configured value itself changed, so a hotkey toggle
/// survives the reload.
fn control_messages(config: &Config, previous: &Config) -> Result<Vec<PipelineControl>> {
    use vikey_core::input::AppFilter;

    let mut messages = vec![
        PipelineControl::SetSettings(config.engine),
        PipelineControl::SetMacros(config.macros.clone()),
        PipelineControl::SetDictionary(load_dictionary(config.dictionary.as_deref())?),
        PipelineControl::SetHotkeys(config.hotkeys),
        PipelineControl::SetFilter(AppFilter::new(config.excluded_apps.clone())),
    ];
    if config.vietnamese != previous.vietnamese {
        messages.push(PipelineControl::SetVietnamese(config.vietnamese));
    }
    Ok(messages)
}

/// Stop on SIGINT/SIGTERM; re-read the config on SIGHUP
fn spawn_signal_thread(
    args: &Args,
    loaded: Config,
    running: Arc<AtomicBool>,
    control: Sender<PipelineControl>,
) {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let reload_args = Args {
        config: args.config.clone(),
        verbose: args.verbose,
        check_config: false,
        method: args.method,
        code_table: args.code_table,
    };
    std::thread::spawn(move || {
        let mut current = loaded;
        let mut signals = match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            Ok(signals) => signals,
            Err(e) => {
                log::warn!("Could not install signal handlers: {}", e);
                return;
            }
        };
        for signal in &mut signals {
            match signal {
                SIGHUP => {
                    let reloaded = reload_args.load_config().and_then(|config| {
                        let messages = control_messages(&config, &current)?;
                        Ok((config, messages))
                    });
                    match reloaded {
                        Ok((config, messages)) => {
                            log::info!("Reloading configuration");
                            for message in messages {
                                if control.send(message).is_err() {
                                    return;
                                }
                            }
                            current = config;
                        }
                        Err(e) => log::error!("Reload failed, keeping current config: {:#}", e),
                    }
                }
                _ => {
                    log::info!("Received signal, shutting down");
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    });
}

/// Requests from the hook thread. There is no toolbar window here, so
/// they are only logged.
fn spawn_command_thread(commands: Receiver<AppCommand>) {
    std::thread::spawn(move || {
        for command in commands {
            match command {
                AppCommand::VietnameseChanged(on) => {
                    log::info!("Vietnamese mode {}", if on { "on" } else { "off" })
                }
                AppCommand::ShowToolbar => log::info!("Toolbar requested"),
                AppCommand::ShowConvertTool => log::info!("Convert tool requested"),
            }
        }
    });
}

#[cfg(target_os = "macos")]
fn run(args: &Args, config: Config) -> Result<()> {
    use std::sync::atomic::AtomicPtr;

    use vikey_core::input::AppFilter;
    use vikey_core::output::{CharacterInjector, InjectionGate};
    use vikey_core::platform::macos::{
        is_trusted, run_event_tap, AxFocusProvider, AxProbe, CgEventPoster,
    };
    use vikey_core::trace::LogSink;
    use vikey_core::transform::TransliterationEngine;
    use vikey_core::window::{RuleClassifier, StrategyDetector};
    use vikey_core::EventInterceptionPipeline;

    if !is_trusted() {
        anyhow::bail!(
            "Accessibility permission is required. Grant it in System Settings > \
             Privacy & Security > Accessibility, then restart vikey."
        );
    }

    let sink = Arc::new(LogSink);
    let proxy = Arc::new(AtomicPtr::new(std::ptr::null_mut()));
    let injector = CharacterInjector::new(
        Arc::new(CgEventPoster::new(proxy.clone())),
        Arc::new(AxProbe),
        Arc::new(InjectionGate::new()),
        sink.clone(),
    )
    .with_settle(config.settle);

    let classifier = RuleClassifier::new(config.rules.clone(), config.default_strategy);
    let selector = StrategyDetector::new(Box::new(classifier));

    let mut engine = TransliterationEngine::new(config.engine);
    engine.set_macros(config.macros.clone());
    engine.set_dictionary(load_dictionary(config.dictionary.as_deref())?);

    let running = Arc::new(AtomicBool::new(true));
    let (command_tx, command_rx) = mpsc::channel();
    let (control_tx, control_rx) = mpsc::channel();
    spawn_signal_thread(args, config.clone(), running.clone(), control_tx);
    spawn_command_thread(command_rx);

    let pipeline = EventInterceptionPipeline::new(
        engine,
        Arc::new(injector),
        Arc::new(selector),
        Arc::new(AxFocusProvider::new()),
        sink,
    )
    .with_filter(AppFilter::new(config.excluded_apps.clone()))
    .with_hotkeys(config.hotkeys)
    .with_gate_timeout(config.gate_timeout)
    .with_vietnamese(config.vietnamese)
    .with_commands(command_tx)
    .with_control(control_rx);

    log::info!(
        "Vietnamese {} ({}, {})",
        if config.vietnamese { "on" } else { "off" },
        config.engine.input_method,
        config.engine.code_table
    );
    run_event_tap(pipeline, proxy, running)?;
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn run(_args: &Args, _config: Config) -> Result<()> {
    eprintln!("Error: vikey hooks the keyboard through Quartz event taps and only runs on macOS.");
    std::process::exit(1);
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = args.load_config()?;

    if args.check_config {
        load_dictionary(config.dictionary.as_deref())?;
        println!("Configuration is valid");
        return Ok(());
    }

    run(&args, config)
}
