//! Tag management command.

use std::sync::Arc;

use async_trait::async_trait;

use crate::commands::{Command, FAILURE, SUCCESS};
use crate::models::{Record, Tag};
use crate::storage::Storage;
use crate::ui::input::{int_input, string_input, yes_no};
use crate::ui::Ui;

/// Implements the `tag` command set.
pub struct TagCommand {
    ui: Arc<dyn Ui>,
    user_id: String,
    storage: Arc<dyn Storage>,

    /// The user's tags, loaded once per invocation, sorted by name.
    tags: Vec<Tag>,
}

impl TagCommand {
    /// Creates a `tag` command bound to one user and storage handle.
    pub fn new(ui: Arc<dyn Ui>, user_id: String, storage: Arc<dyn Storage>) -> Self {
        Self { ui, user_id, storage, tags: Vec::new() }
    }

    fn errorf(&self, msg: &str) {
        self.ui.error(&format!("[tend tag] Error: {msg}"));
    }

    async fn init(&mut self) -> i32 {
        if self.user_id.is_empty() {
            self.errorf("initialization: no user id");
            return FAILURE;
        }

        match self.storage.tags(&self.user_id).await {
            Ok(tags) => self.tags = tags,
            Err(e) => {
                self.errorf(&format!("data retrieval: querying tags: {e}"));
                return FAILURE;
            }
        }

        SUCCESS
    }

    fn print_tag_list(&self) {
        for (i, tag) in self.tags.iter().enumerate() {
            self.ui.output(&format!("{i}) {}", tag.name));
        }
    }

    /// Prompts the user to select one of their tags by number.
    async fn prompt_select_tag(&self) -> Option<usize> {
        if self.tags.is_empty() {
            self.ui.warn("You do not have any tags");
            return None;
        }

        self.print_tag_list();

        let index = match int_input(self.ui.as_ref(), "Which number?").await {
            Ok(index) => index,
            Err(e) => {
                self.errorf(&format!("input error: {e}"));
                return None;
            }
        };

        if index < 0 || index as usize >= self.tags.len() {
            self.ui.warn(&format!(
                "{index} is not a valid index. Need a # in (0,...,{})",
                self.tags.len() - 1
            ));
            return None;
        }

        Some(index as usize)
    }

    async fn run_delete(&mut self) -> i32 {
        let Some(index) = self.prompt_select_tag().await else {
            return FAILURE;
        };
        let tag = self.tags[index].clone();

        match yes_no(self.ui.as_ref(), "Are you sure?").await {
            Ok(false) => {
                self.ui.info("Cancelled");
                return SUCCESS;
            }
            Err(e) => {
                self.errorf(&format!("Input Error: {e}"));
                return FAILURE;
            }
            Ok(true) => {}
        }

        if let Err(e) = self.storage.delete(&Record::Tag(tag.clone())).await {
            self.errorf(&format!("(subcommand delete) Error: {e}"));
            return FAILURE;
        }

        self.tags.remove(index);
        self.ui.info(&format!("Deleted '{}'", tag.name));
        SUCCESS
    }

    async fn run_edit(&mut self) -> i32 {
        let Some(index) = self.prompt_select_tag().await else {
            return FAILURE;
        };
        let mut tag = self.tags[index].clone();

        match serde_json::to_string_pretty(&tag) {
            Ok(dump) => self.ui.output(&dump),
            Err(_) => return FAILURE,
        }

        let attribute = match string_input(self.ui.as_ref(), "Which attribute?").await {
            Ok(attribute) => attribute,
            Err(_) => return FAILURE,
        };

        match attribute.as_str() {
            "name" => match string_input(self.ui.as_ref(), "Name").await {
                Ok(name) => tag.name = name,
                Err(e) => {
                    self.errorf(&format!("(subcommand edit) Input Error {e}"));
                    return FAILURE;
                }
            },
            _ => {
                self.ui.warn("That attribute is not recognized/supported");
                return SUCCESS;
            }
        }

        if let Err(e) = self.storage.save(Record::Tag(tag.clone())).await {
            self.errorf(&format!("(subcommand edit) Error: {e}"));
            return FAILURE;
        }

        self.tags[index] = tag;
        self.ui.output("Tag updated");
        SUCCESS
    }

    fn run_list(&self) -> i32 {
        if self.tags.is_empty() {
            self.ui.output("You don't have any tags");
        } else {
            self.print_tag_list();
        }
        SUCCESS
    }

    async fn run_new(&mut self) -> i32 {
        let mut tag = Tag {
            id: self.storage.new_id(),
            owner_id: self.user_id.clone(),
            name: String::new(),
        };

        match string_input(self.ui.as_ref(), "Name").await {
            Ok(name) => tag.name = name,
            Err(e) => {
                self.errorf(&format!("Input Error: {e}"));
                return FAILURE;
            }
        }

        if let Err(e) = self.storage.save(Record::Tag(tag.clone())).await {
            self.errorf(&format!("Error saving tag: {e}"));
            return FAILURE;
        }

        self.tags.push(tag);
        SUCCESS
    }
}

#[async_trait]
impl Command for TagCommand {
    fn synopsis(&self) -> &'static str {
        "Utilities for managing tend tags"
    }

    fn help(&self) -> String {
        let help_text = "
Usage:
	tend tag <subcommand>

Subcommands:
	delete	delete a tag
	edit	edit a tag
	list	list all your tags
	new	create a new tag
";
        help_text.trim().to_string()
    }

    async fn run(&mut self, args: &[String]) -> i32 {
        // short circuit to avoid loading tags
        let Some(subcommand) = args.first() else {
            self.ui.output(&self.help());
            return SUCCESS;
        };

        let status = self.init().await;
        if status != SUCCESS {
            return status;
        }

        match subcommand.as_str() {
            "delete" => self.run_delete().await,
            "edit" => self.run_edit().await,
            "list" => self.run_list(),
            "new" => self.run_new().await,
            _ => {
                self.ui.output(&self.help());
                SUCCESS
            }
        }
    }
}
