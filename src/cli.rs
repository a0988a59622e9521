//! CLI definitions for Focus Partner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Focus Partner CLI.
#[derive(Parser)]
#[command(name = "focuspartner")]
#[command(about = "Goal-aware browsing companion")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Chat with a surface in a simulated browser (default)
    Chat {
        /// Surface to type into
        #[arg(long, value_enum, default_value_t = SurfaceChoice::Popup)]
        surface: SurfaceChoice,

        /// URL of the page opened in the first tab
        #[arg(long, default_value = "https://example.com")]
        url: String,

        /// Visible text of that page
        #[arg(long)]
        page_text: Option<String>,
    },

    /// Run one relevance check through agent, relay and hub
    Check {
        /// The user's goal
        #[arg(long)]
        goal: String,

        /// Page text to judge
        #[arg(long)]
        text: String,
    },

    /// Run one completion through the hub
    Complete {
        #[arg(long)]
        prompt: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SurfaceChoice {
    Popup,
    Overlay,
}
