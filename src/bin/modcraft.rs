use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use modcraft_lib::api::HttpModService;
use modcraft_lib::config::{self, Endpoints};
use modcraft_lib::events::{EventSink, PipelineEvent};
use modcraft_lib::models::Role;
use modcraft_lib::{Outcome, Session};

#[derive(Parser)]
#[command(name = "modcraft", version, about = "Generate Minecraft mods from a description")]
struct Cli {
    /// Config file (defaults to ~/.modcraft/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve all four endpoints from this base URL instead of the configured ones
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Describe a mod and run it through textures, code and compile
    Generate {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
        /// Save the jar when the mod is ready
        #[arg(long)]
        download: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the mods known to the listing service
    List,
    /// Save a ready mod from the listing by its id
    Download {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

/// Echoes pipeline progress to the terminal.
struct Printer;

impl EventSink for Printer {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::TurnAppended(turn) if turn.role == Role::Assistant => {
                println!("\n{}", turn.content);
            }
            PipelineEvent::StatusChanged { id, status, .. } => {
                eprintln!("  [{id}] {status}");
            }
            PipelineEvent::Notify { title, description, .. } => {
                println!("{title} {description}");
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    modcraft_lib::init_tracing();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(base) = &cli.base_url {
        settings.endpoints = Endpoints::with_base(base);
    }

    if let Command::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let service = HttpModService::new(&settings).context("building HTTP client")?;
    let session = Session::new(settings, Arc::new(service)).context("building HTTP client")?;

    match cli.command {
        Command::Generate {
            prompt,
            download,
            out,
        } => {
            let prompt = prompt.join(" ");
            match session.submit(&prompt, &Printer).await? {
                Outcome::Ready(handle) => {
                    if download {
                        let dir = out.unwrap_or_else(|| session.config().resolve_download_dir());
                        if let Some(saved) = session.download(handle, &dir, &Printer).await? {
                            println!("Saved {}", saved.path.display());
                        }
                    }
                }
                Outcome::Pending(handle) => {
                    println!("Job {handle} is still compiling.");
                }
                Outcome::Failed(_, failure) => {
                    bail!("generation failed ({:?}): {}", failure.kind, failure.message);
                }
            }
        }
        Command::List => {
            session.refresh().await.context("loading mod history")?;
            for job in session.jobs() {
                println!(
                    "{:<40} {:<20} {:<10} {:<8} {}",
                    job.id,
                    job.status,
                    job.version,
                    job.minecraft_version,
                    job.name
                );
            }
        }
        Command::Download { id, out } => {
            session.refresh().await.context("loading mod history")?;
            let job = session
                .jobs()
                .into_iter()
                .find(|j| j.id == id)
                .with_context(|| format!("no mod with id {id}"))?;
            let dir = out.unwrap_or_else(|| session.config().resolve_download_dir());
            match session.download(job.handle, &dir, &Printer).await? {
                Some(saved) => println!("Saved {}", saved.path.display()),
                None => bail!("mod {id} is {} and has nothing to download", job.status),
            }
        }
        Command::Config => {}
    }

    Ok(())
}
