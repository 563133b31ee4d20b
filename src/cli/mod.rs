//! Command-line interface for nudge
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::engine::ReminderEngine;
use crate::error::Result;
use crate::feed::{FeedDestination, FeedSink};
use crate::output::OutputOptions;
use crate::storage::EventStorage;

mod add;
mod done;
mod edit;
mod list;
mod remove;
mod watch;

/// nudge - personal event reminders
///
/// Keeps a small store of dated events and alerts when one comes due:
/// a polling scheduler, desktop/sound side-channels, and a store shared
/// safely between concurrent instances.
#[derive(Parser, Debug)]
#[command(name = "nudge")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the event store file (defaults to the user data dir)
    #[arg(long, global = true, env = "NUDGE_STORE")]
    pub store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit structured feed records to a file, or `-` for stdout
    #[arg(long, global = true)]
    pub events: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new event
    Add {
        /// Event title
        title: String,

        /// Calendar date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Wall-clock time, HH:MM
        #[arg(long)]
        time: String,

        /// Optional free-text description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// List events, soonest first
    List {
        /// Include completed events
        #[arg(long)]
        all: bool,
    },

    /// Edit an event's fields
    Edit {
        /// Event id
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Calendar date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// Wall-clock time, HH:MM
        #[arg(long)]
        time: Option<String>,
    },

    /// Remove an event
    Remove {
        /// Event id
        id: i64,
    },

    /// Toggle an event's completion
    Done {
        /// Event id
        id: i64,
    },

    /// Run the reminder engine until interrupted
    Watch {
        /// Stop after this many seconds (runs forever when omitted)
        #[arg(long)]
        duration: Option<u64>,
    },
}

/// Shared state handed to every command.
pub(crate) struct CommandContext {
    pub engine: ReminderEngine,
    pub options: OutputOptions,
    pub feed: Option<FeedSink>,
}

impl Cli {
    fn context(&self) -> Result<CommandContext> {
        let config = Config::resolve(self.config.as_deref())?;

        let engine = match &self.store {
            Some(path) => {
                let storage = EventStorage::new(path.clone())
                    .with_retention_days(config.retention.days);
                ReminderEngine::with_storage(storage, &config)
            }
            None => ReminderEngine::open(&config)?,
        };

        let feed = match FeedDestination::parse(self.events.as_deref()) {
            Some(destination) => Some(destination.open()?),
            None => None,
        };

        Ok(CommandContext {
            engine,
            options: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
            feed,
        })
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let mut context = self.context()?;
        match self.command {
            Commands::Add {
                title,
                date,
                time,
                description,
            } => add::run(&mut context, title, description, date, time),
            Commands::List { all } => list::run(&context, all),
            Commands::Edit {
                id,
                title,
                description,
                date,
                time,
            } => edit::run(
                &mut context,
                id,
                crate::event::EventPatch {
                    title,
                    description,
                    date,
                    time,
                },
            ),
            Commands::Remove { id } => remove::run(&mut context, id),
            Commands::Done { id } => done::run(&mut context, id),
            Commands::Watch { duration } => watch::run(context, duration),
        }
    }
}
