use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use padmapper::capture::CaptureHandle;
use padmapper::input::collector::GamepadCollector;
use padmapper::input::{ComboId, LogicalButton};
use padmapper::profile::{AppId, ProfileStorage, ProfileStore, TomlDirStorage, DEFAULT_APP_ID};
use padmapper::{RemapScreen, RemapSettings};
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "padmapper")]
#[command(about = "Remap controller buttons and shortcut combos per application")]
struct Cli {
    /// Settings file (default: ~/.config/padmapper/settings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application profile to edit; 0 is the default profile
    #[arg(short, long, default_value_t = DEFAULT_APP_ID)]
    app: AppId,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the mapping and combo tables
    Show,
    /// Capture the button that `button` should send
    Bind { button: LogicalButton },
    /// Capture a new chord for a combo
    Combo { combo: ComboId },
    /// Restore defaults (factory for app 0, the default profile otherwise)
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(&cli.log_level)?;

    let settings_path = cli.config.unwrap_or_else(RemapSettings::default_path);
    info!("Loading settings from {:?}", settings_path);
    let settings = RemapSettings::load(&settings_path)?;

    let storage = TomlDirStorage::new(settings.profile_dir());
    info!("Profiles in {:?}", storage.dir());
    let mut store = ProfileStore::new(storage);
    let mut screen = RemapScreen::new(&mut store, cli.app, &settings);

    match cli.command {
        Command::Show => {}
        Command::Bind { button } => {
            let handle = screen.assign_button(button);
            run_capture(&mut screen, handle, &settings).await?;
        }
        Command::Combo { combo } => {
            let handle = screen.assign_combo(combo);
            run_capture(&mut screen, handle, &settings).await?;
        }
        Command::Reset => screen.reset()?,
    }

    print_tables(&screen);
    if screen.close()? {
        println!("Saved.");
    }
    Ok(())
}

fn setup(log_level: &str) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let level = log_level
        .parse::<Level>()
        .map_err(|e| eyre!("Invalid log level {:?}: {}", log_level, e))?;
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
    Ok(())
}

/// Polls the gamepad once per tick until the capture is accepted or Ctrl-C
/// aborts it. Returns whether the capture was accepted.
async fn run_capture<S: ProfileStorage>(
    screen: &mut RemapScreen<'_, S>,
    handle: CaptureHandle,
    settings: &RemapSettings,
) -> Result<bool> {
    let mut collector = GamepadCollector::create()
        .map_err(|e| eyre!("Gamepad input unavailable: {}", e))?
        .initialize();

    let mut ticker = tokio::time::interval(settings.tick_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown = screen.overlay_lines();
    print_overlay(shown.as_deref());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = collector.poll() {
                    let routed = screen.handle_raw_event(&event);
                    debug!("{:?} -> {:?}", event, routed);
                }

                if screen.active_capture() != Some(handle) {
                    info!("Capture finished after {} gamepad events", collector.events_seen());
                    return Ok(true);
                }

                let overlay = screen.overlay_lines();
                if overlay != shown {
                    print_overlay(overlay.as_deref());
                    shown = overlay;
                }
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Ctrl-C handler failed: {}", e);
                }
                println!("Capture aborted.");
                screen.abort_capture();
                return Ok(false);
            }
        }
    }
}

fn print_overlay(lines: Option<&[String]>) {
    let Some(lines) = lines else {
        return;
    };
    println!();
    for line in lines {
        println!("  {}", line);
    }
}

fn print_tables<S: ProfileStorage>(screen: &RemapScreen<'_, S>) {
    println!();
    println!("Profile for app {}", screen.app_id());
    for group in screen.button_rows() {
        let row: Vec<String> = group
            .iter()
            .map(|(button, mapped)| format!("{:>5} -> {:<5}", button.label(true), mapped))
            .collect();
        println!("  {}", row.join("   "));
    }

    println!();
    for (combo, chord) in screen.combo_rows() {
        let chord = if chord.is_empty() { "(unset)".to_string() } else { chord };
        println!("  {:<14} {}", combo.label(), chord);
    }
}
