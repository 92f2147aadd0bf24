use generai_core::{
    config::{parse_timeout, DEFAULT_MODEL},
    init, AppError, Config, Format, Generai, GenerationRequest, Length, Tone, UiState,
};
use anyhow::{bail, Context, Result};
use arboard::Clipboard;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::io::Write;
use std::time::Duration;
use termimad::crossterm::style::Color;
use termimad::MadSkin;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate text with Gemini from a topic, tone, format and length", long_about = None)]
struct Args {
    /// Topic to write about
    topic: Vec<String>,

    /// Writing style: professional, casual, funny, informative
    #[arg(short, long, default_value_t = Tone::default())]
    tone: Tone,

    /// Output shape: paragraph, email, ideas, blog-post
    #[arg(short, long, default_value_t = Format::default())]
    format: Format,

    /// Output size: short, medium, long
    #[arg(short, long, default_value_t = Length::default())]
    length: Length,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Give up after this many seconds
    #[arg(long, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Copy the result to clipboard automatically
    #[arg(short, long, default_value_t = false)]
    copy: bool,

    /// Print the prompt that would be sent and exit
    #[arg(long)]
    print_prompt: bool,

    /// Open the desktop window instead of printing to the terminal
    #[arg(long)]
    gui: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Setup
    init();
    let args = Args::parse();
    init_logging(args.verbose);

    if args.gui {
        // The window may supply the API key itself, so a missing one is fine here
        let mut config = match Config::load() {
            Ok(config) => config,
            Err(AppError::MissingEnvVar(var)) => {
                debug!("{} not set, starting without an API key", var);
                Config::new("", DEFAULT_MODEL)
            }
            Err(e) => return Err(e).context("Failed to load configuration"),
        };
        apply_overrides(&mut config, &args);
        Generai::with_config(config)
            .run_interactive()
            .context("Failed to run the desktop window")?;
        return Ok(());
    }

    let request = read_request(&args)?;

    if args.print_prompt {
        println!("{}", request.prompt());
        return Ok(());
    }

    // Load config and override model if specified via CLI
    let mut app = Generai::new().context("Failed to load configuration")?;
    apply_overrides(app.config_mut(), &args);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let output = runtime.block_on(generate(&app, &request))?;

    // Render Markdown
    print_markdown(&output);

    // Copy to clipboard if requested
    if args.copy {
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(output.clone()) {
                    eprintln!("Warning: Failed to copy to clipboard: {}", e);
                } else {
                    println!("(Copied to clipboard)");
                }
            }
            Err(e) => eprintln!("Warning: Could not access clipboard: {}", e),
        }
    }

    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` wins unless `--verbose` is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(m) = &args.model {
        config.model_name = m.clone();
    }
    if args.timeout.is_some() {
        config.timeout = args.timeout;
    }
}

/// Builds the request from arguments, asking for a topic when none was given.
fn read_request(args: &Args) -> Result<GenerationRequest> {
    let mut topic = args.topic.join(" ");
    if topic.trim().is_empty() {
        print!("Enter topic: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        topic = input.trim().to_string();
    }

    let request = GenerationRequest::new(topic, args.tone, args.format, args.length);
    request.validate()?;
    Ok(request)
}

/// Runs one request through the controller and waits for it to settle.
async fn generate(app: &Generai, request: &GenerationRequest) -> Result<String> {
    let controller = app.controller().context("Failed to create Gemini client")?;
    let mut states = controller.subscribe();

    println!(); // Spacer
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Generating with {}...", app.config().model_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let ticket = controller.request(request);
    debug!(request_id = ticket.id(), "request dispatched");

    let settled = states
        .wait_for(UiState::is_terminal)
        .await
        .map(|state| state.clone());

    spinner.finish_and_clear();

    match settled.context("Generation stopped before finishing")? {
        UiState::Success { output_text } => Ok(output_text),
        UiState::Error { error_message } => {
            warn!("generation failed");
            bail!("Gemini API Error: {}", error_message)
        }
        UiState::Initial | UiState::Loading => bail!("Generation did not finish"),
    }
}

/// Helper to print markdown
fn print_markdown(text: &str) {
    let mut skin = MadSkin::default();
    skin.bold.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::Magenta);
    skin.code_block.set_bg(Color::Rgb { r: 40, g: 40, b: 40 });

    skin.print_text(text);
}
