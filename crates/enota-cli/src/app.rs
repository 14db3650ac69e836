//! Command handlers for the enota CLI.
//!
//! `App` owns the loaded configuration and the `NotesApi` built from it, and
//! maps each subcommand onto API calls and terminal output.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{debug, warn};

use enota_core::models::{Note, NoteDraft};
use enota_core::{AuthClient, Config, NotesApi};

use crate::cli::{Commands, NotesCommand};
use crate::format::{first_line, format_optional, truncate_string};

/// Column widths for `notes list`
const TITLE_WIDTH: usize = 28;
const PREVIEW_WIDTH: usize = 40;

/// Both fields must be filled before anything goes over the network
fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        bail!("Username and password required");
    }
    Ok(())
}

pub struct App {
    config: Config,
    base_url: String,
    api: NotesApi,
}

impl App {
    pub fn new(api_url: Option<&str>) -> Result<Self> {
        let config = Config::load()?;
        let base_url = config.api_base_url(api_url);
        let store = config.token_store()?;
        let client = AuthClient::with_timeout(&base_url, store, config.request_timeout())
            .context("Failed to create HTTP client")?;
        debug!(base_url = %base_url, backend = ?config.token_backend, "Client ready");

        Ok(Self {
            config,
            base_url,
            api: NotesApi::new(client),
        })
    }

    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { username } => self.login(username).await,
            Commands::Signup { username } => self.signup(username).await,
            Commands::Logout => self.logout(),
            Commands::Status => self.status(),
            Commands::Notes { command } => self.notes(command).await,
            Commands::Profile => self.profile().await,
        }
    }

    // ===== Account =====

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => Self::prompt_username(self.config.last_username.as_deref())?,
        };
        let password = Self::prompt_password()?;
        require_credentials(&username, &password)?;

        self.api.login(&username, &password).await?;

        self.config.last_username = Some(username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Logged in as {}.", username);
        Ok(())
    }

    async fn signup(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => Self::prompt_username(None)?,
        };
        let password = Self::prompt_password()?;
        require_credentials(&username, &password)?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        self.api.register(&username, &password).await?;
        println!("Signup successful! Run `enota login -u {}` to log in.", username);
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        self.api.logout()?;
        println!("Logged out.");
        Ok(())
    }

    fn status(&self) -> Result<()> {
        println!("API:     {}", self.base_url);
        println!("Tokens:  {:?}", self.config.token_backend);
        let state = if self.api.is_logged_in()? {
            "logged in"
        } else {
            "logged out"
        };
        println!("Session: {}", state);
        if let Some(ref user) = self.config.last_username {
            println!("User:    {}", user);
        }
        Ok(())
    }

    fn prompt_username(default: Option<&str>) -> Result<String> {
        match default {
            Some(last) => print!("Username [{}]: ", last),
            None => print!("Username: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        Ok(match default {
            Some(last) if input.is_empty() => last.to_string(),
            _ => input.to_string(),
        })
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        Ok(password)
    }

    // ===== Notes =====

    async fn notes(&self, command: NotesCommand) -> Result<()> {
        match command {
            NotesCommand::List { json } => {
                let notes = self.api.list_notes().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&notes)?);
                } else {
                    Self::print_note_list(&notes);
                }
            }
            NotesCommand::Show { id } => {
                let note = self.api.get_note(id).await?;
                Self::print_note(&note);
            }
            NotesCommand::Add { title, content } => {
                let note = self.api.create_note(&NoteDraft::new(title, content)).await?;
                println!("Created note {}.", note.id);
            }
            NotesCommand::Edit { id, title, content } => {
                if title.is_none() && content.is_none() {
                    bail!("Nothing to change: pass --title and/or --content");
                }
                let mut draft = self.api.get_note(id).await?.to_draft();
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(content) = content {
                    draft.content = content;
                }
                let note = self.api.update_note(id, &draft).await?;
                println!("Updated note {}.", note.id);
            }
            NotesCommand::Delete { id } => {
                self.api.delete_note(id).await?;
                println!("Deleted note {}.", id);
            }
            NotesCommand::Export { id, output } => {
                let note = self.api.get_note(id).await?;
                let path = output.unwrap_or_else(|| note.export_file_name().into());
                std::fs::write(&path, note.export_text())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Exported note {} to {}.", id, path.display());
            }
        }
        Ok(())
    }

    fn print_note_list(notes: &[Note]) {
        if notes.is_empty() {
            println!("No notes yet. Add one with `enota notes add --title <TITLE>`.");
            return;
        }

        let now = Utc::now();
        for note in notes {
            let stamp = note.updated_at.as_deref().or(note.created_at.as_deref());
            println!(
                "{:>5}  {:<title_w$}  {:<preview_w$}  {}",
                note.id,
                truncate_string(&note.title, TITLE_WIDTH),
                truncate_string(first_line(&note.content), PREVIEW_WIDTH),
                Note::relative_time(stamp, now),
                title_w = TITLE_WIDTH,
                preview_w = PREVIEW_WIDTH,
            );
        }
    }

    fn print_note(note: &Note) {
        println!("#{} {}", note.id, note.title);
        if note.created_at.is_some() {
            println!("Created: {}", Note::format_timestamp(note.created_at.as_deref()));
        }
        if note.updated_at.is_some() {
            println!("Updated: {}", Note::relative_time(note.updated_at.as_deref(), Utc::now()));
        }
        println!();
        println!("{}", note.content);
        println!();
        println!(
            "{} characters · {} words · {} lines",
            note.char_count(),
            note.word_count(),
            note.line_count()
        );
    }

    // ===== Profile =====

    async fn profile(&self) -> Result<()> {
        let profile = self.api.profile().await?;

        println!("[{}] {}", profile.initials(), profile.username);
        println!("Notes:   {}", profile.note_count_label());
        println!("Email:   {}", format_optional(&profile.email, "-"));
        println!(
            "Joined:  {}",
            profile
                .joined_date
                .as_deref()
                .map(|d| Note::format_timestamp(Some(d)))
                .unwrap_or_else(|| "-".to_string())
        );

        let remaining = profile.notes_to_milestone();
        if remaining > 0 {
            println!(
                "Progress: {}% ({} more notes to reach your first milestone!)",
                profile.milestone_progress(),
                remaining
            );
        } else {
            println!("Progress: 100% (first milestone reached)");
        }
        Ok(())
    }
}
