//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for imgchat
#[derive(Parser, Debug)]
#[command(name = "imgchat")]
#[command(author, version, about = "Hold a persistent conversation with an AI model about an image")]
#[command(long_about = r#"
imgchat keeps one conversation per (user, image URL). Each question is sent
to a multimodal model together with the image and the earlier turns of that
conversation, and the exchange is stored locally.

Configuration files are merged in this order (later wins):
1. ~/.config/imgchat/config.toml   Global config
2. ./imgchat.toml                  Project-level config
3. --config <path>                 Explicit config file
4. IMGCHAT_* environment variables (e.g. IMGCHAT_PROVIDER__MODEL)

Example:
  imgchat ask https://example.com/dog.jpg "What breed is this?"
  imgchat show https://example.com/dog.jpg
  imgchat clear --all
"#)]
pub struct Cli {
    /// Identity to act as (defaults to config identity.user, then $USER)
    #[arg(short, long, global = true, env = "IMGCHAT_USER", value_name = "ID")]
    pub user: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a question about an image
    Ask {
        /// Image URL the conversation is about
        url: String,
        /// The question
        prompt: String,
    },

    /// Show one conversation, or list conversations with activity
    Show {
        /// Image URL; omit to list all conversations
        #[arg(value_parser = non_blank)]
        url: Option<String>,
    },

    /// Clear one conversation's history, or delete every conversation
    Clear {
        /// Image URL whose history is cleared
        #[arg(required_unless_present = "all", conflicts_with = "all", value_parser = non_blank)]
        url: Option<String>,
        /// Delete every conversation of this user
        #[arg(long)]
        all: bool,
    },

    /// List models offered by the configured provider
    Models,

    /// Show configuration sources and the effective configuration
    Config,
}

/// Rejects blank URLs. The controller reads a blank subject as "no subject",
/// and `clear` without a subject is only reachable through `--all`.
fn non_blank(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("image URL must not be blank".to_string())
    } else {
        Ok(value.to_string())
    }
}
