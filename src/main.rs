use anyhow::{Context, Result};
use clap::Parser;
use gpt_chat::app::App;
use gpt_chat::config::Config;
use gpt_chat::models::{AudioClip, CommandOutput, OutboundMessage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gpt-chat")]
#[command(about = "Chat with GPT, optionally about one embedded image")]
struct CliArgs {
    /// Command text. May contain one `<img src="..."/>` tag.
    #[arg(value_name = "MESSAGE")]
    message: Vec<String>,

    /// Write synthesized voice replies to this path instead of discarding them.
    #[arg(long, value_name = "PATH")]
    audio_out: Option<PathBuf>,

    /// Read one command per line from stdin.
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpt_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let app = Arc::new(App::from_config(config));

    if args.interactive {
        info!("Reading commands from stdin");
        run_interactive(app, args.audio_out).await
    } else {
        let output = app.handle(&args.message.join(" ")).await;
        emit(&output, args.audio_out.as_deref(), None).await
    }
}

/// Each line is handled on its own task so a slow download never blocks the
/// next command. Audio files are numbered by line so replies never share a file.
async fn run_interactive(app: Arc<App>, audio_out: Option<PathBuf>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = tokio::task::JoinSet::new();

    let mut line_no = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        line_no += 1;
        let app = Arc::clone(&app);
        let audio_out = audio_out.clone();
        tasks.spawn(async move {
            let output = app.handle(&line).await;
            if let Err(e) = emit(&output, audio_out.as_deref(), Some(line_no)).await {
                error!("Failed to emit reply: {:#}", e);
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("Command task panicked: {}", e);
        }
    }
    Ok(())
}

async fn emit(
    output: &CommandOutput,
    audio_out: Option<&Path>,
    command: Option<usize>,
) -> Result<()> {
    for message in &output.messages {
        match message {
            OutboundMessage::Text(text) => println!("{}", text),
            OutboundMessage::Audio(clip) => match audio_out {
                Some(path) => {
                    let path = audio_path(path, clip, command);
                    tokio::fs::write(&path, &clip.data)
                        .await
                        .with_context(|| format!("Failed to write audio to {}", path.display()))?;
                    info!("Saved voice reply to {}", path.display());
                }
                None => println!("{}", describe_audio(clip)),
            },
        }
    }
    Ok(())
}

/// Use the clip's extension when the given path has none, and suffix the
/// command number when there is one.
fn audio_path(path: &Path, clip: &AudioClip, command: Option<usize>) -> PathBuf {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| clip.extension().to_string());

    let path = match command {
        Some(n) => {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "reply".to_string());
            path.with_file_name(format!("{}-{}", stem, n))
        }
        None => path.to_path_buf(),
    };
    path.with_extension(extension)
}

fn describe_audio(clip: &AudioClip) -> String {
    format!("[voice reply: {} bytes of {}]", clip.data.len(), clip.mime_type)
}
