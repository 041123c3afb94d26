use blacksheep_types::Snowflake;
use clap::{Parser, Subcommand};

/// Command line interface
#[derive(Debug, Parser)]
#[command(name = "blacksheep", version, about = "Scrape transcripts and media from a chat server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save channel transcripts, media, or both
    Scrape {
        /// Server to scrape
        #[arg(long)]
        server: Snowflake,

        /// Only this channel (default: every text channel)
        #[arg(long)]
        channel: Option<Snowflake>,

        /// Save media only
        #[arg(long)]
        media: bool,

        /// Save text transcripts only
        #[arg(long)]
        logs: bool,
    },

    /// List the channels of a server
    Channels {
        #[arg(long)]
        server: Snowflake,
    },

    /// Show a server's details and roles
    Guild {
        #[arg(long)]
        server: Snowflake,
    },
}
