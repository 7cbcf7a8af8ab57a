//! Note management command.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::commands::{Command, FAILURE, SUCCESS};
use crate::models::{Note, Record};
use crate::storage::Storage;
use crate::ui::input::int_input;
use crate::ui::Ui;

/// Implements the `note` command set.
pub struct NoteCommand {
    ui: Arc<dyn Ui>,
    user_id: String,
    storage: Arc<dyn Storage>,
}

impl NoteCommand {
    /// Creates a `note` command bound to one user and storage handle.
    pub fn new(ui: Arc<dyn Ui>, user_id: String, storage: Arc<dyn Storage>) -> Self {
        Self { ui, user_id, storage }
    }

    async fn run_new(&self) -> i32 {
        let Ok(text) = self.ui.ask("What would you like to make note of?:").await else {
            return FAILURE;
        };

        let now = Utc::now();
        let note = Note {
            id: self.storage.new_id(),
            owner_id: self.user_id.clone(),
            text,
            created_at: Some(now),
            updated_at: Some(now),
        };

        if self.storage.save(Record::Note(note)).await.is_err() {
            self.ui.error("Failed to save note");
            return FAILURE;
        }

        self.ui.output("Noted");
        SUCCESS
    }

    async fn run_list(&self) -> i32 {
        let notes = match self.storage.notes(&self.user_id).await {
            Ok(notes) => notes,
            Err(e) => {
                self.ui.error(&format!("Error executing query: {e}"));
                return FAILURE;
            }
        };

        self.ui.output("Here are your notes");
        for (i, note) in notes.iter().enumerate() {
            self.ui.output(&format!("-----------{i}-------------"));
            self.ui.output(&note.text);
        }

        let Ok(action) = self
            .ui
            .ask("Would you like to [D]elete or [E]dit any? (enter to continue)")
            .await
        else {
            return FAILURE;
        };
        if action != "D" && action != "E" {
            return SUCCESS;
        }

        let Ok(index) = int_input(self.ui.as_ref(), "Which one?").await else {
            return FAILURE;
        };
        if index < 0 || index as usize >= notes.len() {
            self.ui.warn(&format!("{index} is not a valid index"));
            return FAILURE;
        }
        let mut note = notes[index as usize].clone();

        match action.as_str() {
            "D" => {
                if self.storage.delete(&Record::Note(note)).await.is_err() {
                    self.ui.error("Error deleting the note");
                    return FAILURE;
                }
            }
            "E" => {
                self.ui.output(&format!("Current text is: {}", note.text));
                let Ok(text) = self.ui.ask("What would you like instead?:").await else {
                    return FAILURE;
                };

                note.text = text;
                note.updated_at = Some(Utc::now());
                if let Err(e) = self.storage.save(Record::Note(note)).await {
                    self.ui.error(&format!("Error saving record: {e}"));
                    return FAILURE;
                }
            }
            _ => unreachable!("action was checked above"),
        }

        SUCCESS
    }
}

#[async_trait]
impl Command for NoteCommand {
    fn synopsis(&self) -> &'static str {
        "Utilities for managing tend notes"
    }

    fn help(&self) -> String {
        let help_text = "
Usage:
	tend note <subcommand>

Subcommands:
	list	list your notes, then optionally delete or edit one
	new	make a note
";
        help_text.trim().to_string()
    }

    async fn run(&mut self, args: &[String]) -> i32 {
        let Some(subcommand) = args.first() else {
            self.ui.output(&self.help());
            return SUCCESS;
        };

        if self.user_id.is_empty() {
            self.ui.error("No user id listed");
            return FAILURE;
        }

        match subcommand.as_str() {
            "new" => self.run_new().await,
            "list" => self.run_list().await,
            _ => {
                self.ui.output(&self.help());
                SUCCESS
            }
        }
    }
}
