use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use leksiko_config::Config;
use leksiko_config::log::LogConfig;
use leksiko_core::{Direction, HttpSnapshotSource, MoveOffset, QueueType, Session};
use leksiko_storage::Platform;
use tracing_subscriber::EnvFilter;

mod profile;
mod render;

#[derive(Parser)]
#[command(name = "leksiko", about = "Browse a Greek dictionary one entry at a time", version)]
struct Cli {
    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Browse(BrowseCommand),

    /// Download a fresh dictionary and reset every queue
    Refresh,

    /// Write the current settings as the saved profile
    InitProfile,
}

/// Commands that work on a ready session
#[derive(Subcommand)]
enum BrowseCommand {
    /// Show the front of a category (default: the selected one)
    Show { category: Option<QueueType> },

    /// Send the front to the back and show the next entry
    Next { category: Option<QueueType> },

    /// Bring the last entry back to the front
    Prev { category: Option<QueueType> },

    /// Rotate a category by a signed amount
    Rotate {
        #[arg(allow_negative_numbers = true)]
        n: i64,
        #[arg(long)]
        category: Option<QueueType>,
    },

    /// Show which entry a rotation would land on, without rotating
    Preview {
        #[arg(allow_negative_numbers = true)]
        n: i64,
        #[arg(long)]
        category: Option<QueueType>,
    },

    /// Rotate by a percentage of the queue length
    Slide {
        percent: f64,
        /// Walk backwards instead of forwards
        #[arg(long)]
        backward: bool,
        /// Only print the landing entry
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        category: Option<QueueType>,
    },

    /// Push the front back by 10, 100, 1000, to the end, or pop it
    Move {
        offset: MoveOffset,
        #[arg(long)]
        category: Option<QueueType>,
    },

    /// Select the category to browse; "none" clears the selection
    Select { category: String },

    /// Front and length of every category
    Status,
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (config, profile_path) = profile::resolve_config().context("Failed to load profile")?;
    init_tracing(&config.log);
    if let Some(path) = &profile_path {
        tracing::info!("Using profile {}", path.display());
    }

    let command = cli
        .command
        .unwrap_or(Command::Browse(BrowseCommand::Show { category: None }));

    match command {
        Command::InitProfile => {
            let data_dir = config
                .storage
                .data_dir
                .clone()
                .context("No data directory available for the profile")?;
            let path = profile::init_profile(&data_dir, &config)?;
            println!("{}", path.display());
        }
        Command::Refresh => {
            // force_refresh brings the session up on its own
            let mut session = open_session(&config);
            session
                .force_refresh()
                .await
                .context("Failed to refresh dictionary")?;
            render::status(&session, cli.json)?;
        }
        Command::Browse(command) => {
            let mut session = open_session(&config);
            session
                .ensure_ready()
                .await
                .context("Failed to load dictionary")?;
            run(&mut session, command, cli.json).await?;
        }
    }

    Ok(())
}

fn open_session(config: &Config) -> Session {
    let platform = Arc::new(Platform::from_config(&config.storage));
    let source = Arc::new(HttpSnapshotSource::new(config.network.snapshot_url.clone()));
    Session::new(platform, source, config)
}

fn pick(session: &Session, category: Option<QueueType>) -> anyhow::Result<QueueType> {
    category
        .or_else(|| session.queues().current_category())
        .context("No category selected, pass one or run `leksiko select <category>`")
}

async fn run(session: &mut Session, command: BrowseCommand, json: bool) -> anyhow::Result<()> {
    match command {
        BrowseCommand::Show { category } => {
            let category = pick(session, category)?;
            render::front(session, category, json)?;
        }
        BrowseCommand::Next { category } => {
            let category = pick(session, category)?;
            session.queues_mut().front_to_back(category).await?;
            render::front(session, category, json)?;
        }
        BrowseCommand::Prev { category } => {
            let category = pick(session, category)?;
            session.queues_mut().back_to_front(category).await?;
            render::front(session, category, json)?;
        }
        BrowseCommand::Rotate { n, category } => {
            let category = pick(session, category)?;
            session.queues_mut().rotate(category, n).await?;
            render::front(session, category, json)?;
        }
        BrowseCommand::Preview { n, category } => {
            let category = pick(session, category)?;
            let front = session.queues().calculate_front_after_rotation(category, n);
            render::index(session, category, front, json)?;
        }
        BrowseCommand::Slide {
            percent,
            backward,
            dry_run,
            category,
        } => {
            let category = pick(session, category)?;
            let direction = if backward {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let n = session
                .queues()
                .rotation_for_fraction(category, direction, percent);

            if dry_run {
                let front = session.queues().calculate_front_after_rotation(category, n);
                render::index(session, category, front, json)?;
            } else {
                session.queues_mut().rotate(category, n).await?;
                render::front(session, category, json)?;
            }
        }
        BrowseCommand::Move { offset, category } => {
            let category = pick(session, category)?;
            session
                .queues_mut()
                .move_front_by_offset(category, offset)
                .await?;
            render::front(session, category, json)?;
        }
        BrowseCommand::Select { category } => {
            let category = match category.as_str() {
                "none" => None,
                tag => Some(tag.parse::<QueueType>().map_err(anyhow::Error::msg)?),
            };
            session.queues_mut().set_current_category(category).await?;
            println!("{}", category.map_or("none", |c| c.as_str()));
        }
        BrowseCommand::Status => render::status(session, json)?,
    }

    Ok(())
}
