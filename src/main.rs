use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use screenask::{
    app::{
        AskError, AskJobManager, AskJobState, AskJobUpdate, AskOutcome, AskPipeline, AskRequest,
        JobError,
    },
    domain::{AppConfig, CaptureRegion, ConfigError, LlmError},
    infra::{
        capture::{ImageFileCapturer, RegionCapturer, screen_capturer},
        config::load_app_config,
        llm::create_provider,
        ocr::TesseractEngine,
    },
    telemetry,
};
use thiserror::Error;
use tracing::{debug, error};

const JOB_UPDATE_POLL_INTERVAL_MS: u64 = 50;
const RESULT_SEPARATOR: &str = "==================================================";

#[derive(Debug, Parser)]
#[command(name = "screenask", version, about = "Read a screen region and ask an AI about it")]
struct Cli {
    /// Enable debug logging for this crate.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture, recognize and ask once.
    Ask(AskArgs),
    /// Ask again each time Enter is pressed; `q` quits.
    Watch(SourceArgs),
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[derive(Debug, Args)]
struct AskArgs {
    /// Ask about this text instead of capturing the screen.
    #[arg(long, conflicts_with_all = ["image", "region"])]
    text: Option<String>,

    #[command(flatten)]
    source: SourceArgs,

    /// Print the recognized text before the reply.
    #[arg(long)]
    show_ocr: bool,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Read pixels from an image file instead of the screen.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Capture region as x1,y1,x2,y2 in source coordinates. May be negative.
    #[arg(long, allow_hyphen_values = true)]
    region: Option<CaptureRegion>,

    /// Ask for a short answer without explanation.
    #[arg(long)]
    brief: bool,

    /// Provider id or alias (ollama, qianwen/qw, openai/oa, deepseek/ds).
    #[arg(long)]
    provider: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] LlmError),
    #[error(transparent)]
    Ask(#[from] AskError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("could not render configuration: {0}")]
    Render(#[from] serde_json::Error),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let config = load_app_config();
    let debug_enabled = config.as_ref().is_ok_and(|config| config.debug);
    telemetry::init(cli.verbose || debug_enabled);
    if let Ok(config) = &config {
        debug!(
            ai_provider = %config.ai_provider,
            timeout_secs = config.llm_timeout_secs,
            debug = config.debug,
            "loaded configuration"
        );
    }

    let result = config
        .map_err(CliError::from)
        .and_then(|config| run(cli.command, config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "screenask failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, mut config: AppConfig) -> Result<(), CliError> {
    match command {
        Command::Ask(args) => {
            apply_provider_override(&mut config, args.source.provider.as_deref());
            let pipeline = build_pipeline(&config, args.source.image.clone())?;
            let show_ocr = args.show_ocr || config.debug;

            if let Some(text) = args.text.as_deref() {
                let reply = pipeline.ask_text(text, pipeline.system_prompt_for(args.source.brief));
                print_reply(&reply);
                return Ok(());
            }

            let request = AskRequest {
                region: args.source.region.or(config.default_region),
                brief: args.source.brief,
            };
            let outcome = pipeline.run(&request)?;
            print_outcome(&outcome, show_ocr);
            Ok(())
        }
        Command::Watch(args) => {
            apply_provider_override(&mut config, args.provider.as_deref());
            let pipeline = build_pipeline(&config, args.image.clone())?;
            let request = AskRequest {
                region: args.region.or(config.default_region),
                brief: args.brief,
            };
            watch(pipeline, request, config.debug)
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn apply_provider_override(config: &mut AppConfig, provider: Option<&str>) {
    if let Some(provider) = provider {
        config.ai_provider = provider.trim().to_string();
    }
}

fn build_pipeline(config: &AppConfig, image: Option<PathBuf>) -> Result<AskPipeline, CliError> {
    let capturer: Arc<dyn RegionCapturer> = match image {
        Some(path) => Arc::new(ImageFileCapturer::new(path)),
        None => screen_capturer(),
    };
    let recognizer = Arc::new(TesseractEngine::new(config.ocr.clone()));
    let provider = create_provider(config)?;
    debug!(provider = provider.provider_id(), "pipeline ready");

    Ok(AskPipeline::new(capturer, recognizer, provider)
        .with_brief_system_prompt(config.brief_system_prompt.clone()))
}

fn watch(pipeline: AskPipeline, request: AskRequest, show_ocr: bool) -> Result<(), CliError> {
    let manager = Arc::new(AskJobManager::new(pipeline));
    let stop = Arc::new(AtomicBool::new(false));

    let poller = {
        let manager = Arc::clone(&manager);
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("screenask-update-poller".to_string())
            .spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    for update in manager.drain_updates() {
                        print_update(&update, show_ocr);
                    }
                    thread::sleep(Duration::from_millis(JOB_UPDATE_POLL_INTERVAL_MS));
                }
            })?
    };

    println!("Press Enter to ask, or type q and Enter to quit.");
    let result = read_triggers(&manager, request);

    while manager.state() == AskJobState::Running {
        thread::sleep(Duration::from_millis(JOB_UPDATE_POLL_INTERVAL_MS));
    }
    stop.store(true, Ordering::SeqCst);
    let _ = poller.join();
    for update in manager.drain_updates() {
        print_update(&update, show_ocr);
    }
    result
}

fn read_triggers(manager: &AskJobManager, request: AskRequest) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if line?.trim().eq_ignore_ascii_case("q") {
            break;
        }
        match manager.submit(request) {
            Ok(job_id) => debug!(job_id, "ask triggered"),
            Err(JobError::Busy { .. }) => println!("Still working on the previous ask; ignored."),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn print_update(update: &AskJobUpdate, show_ocr: bool) {
    match update.state {
        AskJobState::Running => println!("Working..."),
        AskJobState::Succeeded => {
            if let Some(outcome) = &update.outcome {
                print_outcome(outcome, show_ocr);
            }
        }
        AskJobState::Failed => {
            if let Some(err) = &update.error {
                println!("Processing error: {err}");
            }
        }
        AskJobState::Idle => {}
    }
}

fn print_outcome(outcome: &AskOutcome, show_ocr: bool) {
    match outcome {
        AskOutcome::NoText => println!("OCR recognized no text."),
        AskOutcome::Answered {
            recognized_text,
            reply,
        } => {
            if show_ocr {
                println!("Recognized text: {recognized_text}\n");
            }
            print_reply(reply);
        }
    }
}

fn print_reply(reply: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "AI reply:\n{reply}\n{RESULT_SEPARATOR}");
    let _ = stdout.flush();
}
