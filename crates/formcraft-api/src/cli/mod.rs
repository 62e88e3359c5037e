//! CLI command definitions and dispatch for the `formcraft` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! noun (`formcraft user add`, `formcraft form list`).

pub mod form;
pub mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Build forms from plain-language prompts and collect responses.
#[derive(Parser)]
#[command(name = "formcraft", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to the configured port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage form owners and their API keys.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Inspect, generate and export forms.
    Form {
        #[command(subcommand)]
        action: FormCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create or update a user and issue a new API key.
    Add {
        /// Subject id from the identity provider.
        #[arg(long)]
        external_id: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,

        /// Label stored with the key.
        #[arg(long, default_value = "cli")]
        key_name: String,
    },

    /// List all users.
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
pub enum FormCommand {
    /// List the forms of an owner.
    #[command(alias = "ls")]
    List {
        /// Owner's external id.
        #[arg(long)]
        owner: String,
    },

    /// Generate a form draft from a prompt (not saved).
    Generate {
        /// Plain-language description of the form.
        prompt: String,

        /// Use the keyword heuristic even when a model is configured.
        #[arg(long)]
        heuristic: bool,
    },

    /// Export a form's responses as CSV.
    Export {
        /// Form ID.
        form_id: String,

        /// Owner's external id.
        #[arg(long)]
        owner: String,

        /// Output file (defaults to the generated file name; `-` for stdout).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
