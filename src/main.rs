use anyhow::{Context, Result};
use clap::Parser;
use mediapicker::{
    EventFilter, ImageSource, LoggingView, MediaItem, MockCameraController, MockPhotoLibrary,
    MockRouter, ModuleSeed, OrientationTracker, PickerAssembly, PickerConfig, PickerHandle,
    UserIntent,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "mediapicker")]
#[command(about = "Interactive media picker session against a simulated camera")]
#[command(version)]
#[command(long_about = "Runs the media picker presenter against an in-memory camera and \
photo library. Capture, pick, crop, reorder and remove photos from the keyboard, then \
print the final ordered items as JSON.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mediapicker.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting a session")]
    validate_config: bool,

    /// Print effective configuration and exit
    #[arg(long, help = "Print the effective configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - assemble the module, then tear it down
    #[arg(long, help = "Assemble the picker and report its initial state without a session")]
    dry_run: bool,

    /// Run a fixed, non-interactive session
    #[arg(long, help = "Capture, pick from the library and crop without keyboard input")]
    scripted: bool,

    /// Start with camera access denied
    #[arg(long, help = "Simulate a camera whose access was denied")]
    deny_camera: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", help = "Write logs to a file (keeps the terminal clean)")]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args)?;

    let config = match PickerConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.print_config {
        println!("# Media picker configuration");
        println!("{}", config.to_toml_string()?);
        return Ok(());
    }

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let tracker = OrientationTracker::default();
    let camera = MockCameraController::new(tracker.clone())
        .with_access(!args.deny_camera)
        .with_latency(Duration::from_millis(30));
    let router = MockRouter::new();
    let library = MockPhotoLibrary::new().with_latest(ImageSource::new("library://photo/latest"));

    let module = PickerAssembly::module(
        config,
        ModuleSeed::default(),
        Arc::new(camera),
        Arc::new(router),
        Arc::new(library),
        Arc::new(LoggingView),
        |handle| spawn_event_log(handle),
    )
    .context("Failed to assemble media picker")?;
    let handle = module.handle().clone();

    if args.dry_run {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = handle.snapshot().await?;
        println!("✓ Dry run completed - picker started in {}", snapshot.mode);
        println!("{}", serde_json::to_string_pretty(&snapshot.camera)?);
        module.shutdown().await?;
        return Ok(());
    }

    let items = if args.scripted || !cfg!(feature = "keyboard") {
        run_scripted(&handle).await?
    } else {
        run_interactive(&handle, tracker).await?
    };

    module.join().await?;

    match items {
        Some(items) => {
            info!("Session finished with {} item(s)", items.len());
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        None => {
            info!("Session cancelled");
            println!("[]");
        }
    }

    Ok(())
}

/// Mirror module events into the log
fn spawn_event_log(handle: &PickerHandle) {
    let mut receiver = handle.subscribe_filtered(EventFilter::All, "event-log");
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            info!("Picker event: {}", event.description());
        }
    });
}

async fn run_scripted(handle: &PickerHandle) -> Result<Option<Vec<MediaItem>>> {
    let pause = Duration::from_millis(100);
    let steps = [
        UserIntent::ShutterTapped,
        UserIntent::CameraThumbnailTapped,
        UserIntent::LibraryTapped,
        UserIntent::CropTapped,
        UserIntent::ItemDragged { from: 0, to: 1 },
    ];

    tokio::time::sleep(pause).await;
    for step in steps {
        info!("Scripted step: {:?}", step);
        handle.send_intent(step).await?;
        tokio::time::sleep(pause).await;
    }

    Ok(Some(handle.finish().await?))
}

#[cfg(feature = "keyboard")]
async fn run_interactive(
    handle: &PickerHandle,
    tracker: OrientationTracker,
) -> Result<Option<Vec<MediaItem>>> {
    use mediapicker::keyboard_input::{KeyboardInputHandler, SessionOutcome};

    let keyboard = KeyboardInputHandler::new(handle.clone(), tracker);
    let session = keyboard.start();

    let outcome = tokio::select! {
        outcome = session => outcome.context("Keyboard session task failed")??,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted - cancelling session");
            keyboard.stop().await?;
            handle.cancel().await?;
            SessionOutcome::Cancelled
        }
    };

    Ok(match outcome {
        SessionOutcome::Finished(items) => Some(items),
        SessionOutcome::Cancelled => None,
    })
}

#[cfg(not(feature = "keyboard"))]
async fn run_interactive(
    handle: &PickerHandle,
    _tracker: OrientationTracker,
) -> Result<Option<Vec<MediaItem>>> {
    run_scripted(handle).await
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mediapicker={}", log_level)));

    let (writer, guard) = match &args.log_file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_writer(writer).with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}
