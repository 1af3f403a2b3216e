use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chatpad_core::{Config, RequestParameters};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, Variant};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chatpad")]
#[command(author, version, about = "Terminal chat front-end for OpenAI-compatible completion APIs")]
struct Cli {
    /// Turn pipeline to use
    #[arg(long, value_enum, default_value = "direct")]
    variant: Variant,

    /// Model identifier sent with every request
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the completion API
    #[arg(long)]
    base_url: Option<String>,

    /// CSV of extra presets (label,instruction) downloaded at startup
    #[arg(long)]
    presets_url: Option<String>,

    /// Skip the preset download
    #[arg(long)]
    no_remote_presets: bool,

    /// Log file (defaults to chatpad.log in the cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<PathBuf>) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let path = match log_file {
        Some(path) => path,
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("chatpad")
            .join("chatpad.log"),
    };
    let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "chatpad.log".into());
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chatpad_tui=info,chatpad_core=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Remember the slider values for the next run. Only `params` is written so
/// CLI overrides never end up in the file.
fn save_params(params: RequestParameters) {
    let result = Config::load().and_then(|mut config| {
        config.params = params;
        config.save()
    });
    if let Err(e) = result {
        warn!("Could not save parameters: {}", e);
    }
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file)?;

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Falling back to default config: {}", e);
        Config::new()
    });
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(url) = cli.presets_url {
        config.presets_url = Some(url);
    }
    if cli.no_remote_presets {
        config.presets_url = None;
    }

    let credential = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    info!(
        model = %config.model,
        variant = cli.variant.display_name(),
        key_from_env = credential.is_some(),
        "Starting chatpad"
    );

    let presets_url = config.presets_url.clone();
    let mut app = App::new(config, cli.variant, credential);
    if let Some(url) = presets_url {
        app.spawn_preset_download(url);
    }

    let mut terminal = tui::init()?;
    tui::install_panic_hook();
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    save_params(app.params);
    result
}
