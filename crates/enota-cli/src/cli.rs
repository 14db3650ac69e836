use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "enota", version, about = "Keep notes from the terminal with an E-nota server")]
pub struct Args {
    /// API base URL (overrides ENOTA_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued tokens
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the API URL and whether a token is stored
    Status,
    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
    /// Show the signed-in user's profile
    Profile,
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List all notes
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note with its details
    Show { id: i64 },
    /// Create a note
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        content: String,
    },
    /// Change a note's title and/or content
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete { id: i64 },
    /// Write a note to a text file
    Export {
        id: i64,
        /// Output path (defaults to the note title with a .txt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
