mod headless;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use emu_controls::settings::{SettingsStoreExt, EMULATOR_SETTINGS_KEY};
use emu_controls::{
    settings, ControlPanel, EmulatorSettings, JsonFileStore, MemoryStore, PanelAction,
    SettingsStore, Viewport,
};
use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_core::types::CanvasHandle;
use headless::{HeadlessEmulator, LoggingFade};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewportArg {
    Desktop,
    Phone,
    MobileLandscape,
}

impl From<ViewportArg> for Viewport {
    fn from(arg: ViewportArg) -> Self {
        match arg {
            ViewportArg::Desktop => Viewport::desktop(),
            ViewportArg::Phone => Viewport::phone(),
            ViewportArg::MobileLandscape => Viewport::mobile_landscape(),
        }
    }
}

/// Replay a JSON script of control panel actions against a headless emulator
#[derive(Parser)]
#[command(name = "hemu-panel")]
struct Args {
    /// JSON array of actions, e.g. [{"action": "quit"}]
    script: PathBuf,

    /// Persist settings to a JSON file instead of keeping them in memory.
    /// Without a path, `controls.json` next to the executable is used.
    #[arg(long, num_args = 0..=1)]
    store: Option<Option<PathBuf>>,

    /// Do not start a session before the script runs
    #[arg(long, default_value_t = false)]
    not_running: bool,

    /// Enable auto-mute while rewinding
    #[arg(long, default_value_t = false)]
    mute_on_rewind: bool,

    /// Enable auto-mute while fast-forwarding
    #[arg(long, default_value_t = false)]
    mute_on_fast_forward: bool,

    #[arg(long, value_enum, default_value_t = ViewportArg::Desktop)]
    viewport: ViewportArg,

    /// Classify the viewport from its size, e.g. 844x390
    #[arg(long, value_parser = parse_viewport_size, conflicts_with = "viewport")]
    viewport_size: Option<(f64, f64)>,

    /// Only print the final panel state
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Global log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: LogLevel,

    #[arg(long)]
    log_session: Option<LogLevel>,

    #[arg(long)]
    log_audio: Option<LogLevel>,

    #[arg(long)]
    log_layout: Option<LogLevel>,

    #[arg(long)]
    log_settings: Option<LogLevel>,

    #[arg(long)]
    log_input: Option<LogLevel>,
}

fn parse_viewport_size(s: &str) -> Result<(f64, f64), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {}", s))?;
    let width: f64 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width: {}", width))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height: {}", height))?;
    Ok((width, height))
}

impl Args {
    fn viewport(&self) -> Viewport {
        match self.viewport_size {
            Some((width, height)) => Viewport::classify(width, height),
            None => self.viewport.into(),
        }
    }

    fn configure_logging(&self) {
        let config = LogConfig::global();
        config.set_global_level(self.log_level);
        let overrides = [
            (LogCategory::Session, self.log_session),
            (LogCategory::Audio, self.log_audio),
            (LogCategory::Layout, self.log_layout),
            (LogCategory::Settings, self.log_settings),
            (LogCategory::Input, self.log_input),
        ];
        for (category, level) in overrides {
            if let Some(level) = level {
                config.set_level(category, level);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    args.configure_logging();

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let actions: Vec<PanelAction> = serde_json::from_str(&script)
        .with_context(|| format!("parsing {}", args.script.display()))?;

    let mut store: Box<dyn SettingsStore> = match &args.store {
        Some(path) => {
            let path = path.clone().unwrap_or_else(JsonFileStore::default_path);
            let store = JsonFileStore::open(path);
            log::info!("settings stored at {}", store.path().display());
            Box::new(store)
        }
        None => Box::new(MemoryStore::new()),
    };
    if args.mute_on_rewind || args.mute_on_fast_forward {
        let mut prefs: EmulatorSettings = settings::emulator_settings(store.as_ref());
        prefs.mute_on_rewind |= args.mute_on_rewind;
        prefs.mute_on_fast_forward |= args.mute_on_fast_forward;
        store.set(EMULATOR_SETTINGS_KEY, &prefs);
    }

    let mut panel = ControlPanel::new(Some(HeadlessEmulator::new()), store, LoggingFade::default())
        .with_canvas(CanvasHandle("screen".to_string()))
        .with_viewport(args.viewport());
    if !args.not_running {
        panel.start_session();
    }

    for action in actions {
        log::debug!("{:?}", action);
        panel.dispatch(action);
    }

    let view = serde_json::to_value(panel.view())?;
    let output = if args.quiet {
        view
    } else {
        let (calls, files) = match panel.emulator() {
            Some(emulator) => (
                serde_json::to_value(emulator.calls())?,
                emulator.files().collect::<Vec<_>>(),
            ),
            None => (json!([]), Vec::new()),
        };
        json!({
            "calls": calls,
            "files": files,
            "fade": {
                "started": panel.fade().started,
                "cancelled": panel.fade().cancelled,
            },
            "panel": view,
        })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
