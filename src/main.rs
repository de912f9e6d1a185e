// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Campus navigation core: rooms, bookmarks and tag detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List rooms in the building
    Rooms {
        /// Limit the listing to one floor
        #[arg(short, long)]
        floor: Option<i32>,

        /// Filter rooms by id, name or nickname
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Detect fiducial tags in an image and print the detection records
    Detect {
        /// Path of the image to analyze
        image: PathBuf,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Detect tags in an image and resolve them to rooms
    Locate {
        /// Path of the image to analyze
        image: PathBuf,
    },

    /// Manage bookmarked rooms
    Bookmark {
        #[command(subcommand)]
        action: ListCommand,
    },

    /// Manage favorite rooms
    Favorite {
        #[command(subcommand)]
        action: ListCommand,
    },

    /// Show or change the UI locale
    Locale {
        /// Locale tag to switch to (e.g. en, uk)
        set: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    /// Add a room
    Add { room_id: String },
    /// Remove a room
    Remove { room_id: String },
    /// List stored rooms
    List,
}

impl From<ListCommand> for cli::ListAction {
    fn from(command: ListCommand) -> Self {
        match command {
            ListCommand::Add { room_id } => cli::ListAction::Add(room_id),
            ListCommand::Remove { room_id } => cli::ListAction::Remove(room_id),
            ListCommand::List => cli::ListAction::List,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=wayfinder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rooms { floor, search } => cli::list_rooms(floor, search),
        Commands::Detect { image, pretty } => cli::detect_image(image, pretty),
        Commands::Locate { image } => cli::locate(image),
        Commands::Bookmark { action } => cli::bookmark(action.into()),
        Commands::Favorite { action } => cli::favorite(action.into()),
        Commands::Locale { set } => cli::locale(set),
    }
}
