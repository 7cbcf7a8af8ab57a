//! The command interpreter and its domain commands.
//!
//! A [`CommandSet`] is the production [`Interpreter`]: it maps the first
//! token of an argument vector to a command, constructs that command fresh
//! for the invocation, and runs it to an integer exit status. Commands get
//! everything they need at construction time (a [`Ui`], the user identity,
//! a storage handle) and perform all user interaction through the `Ui`
//! capability set, so the same commands serve the terminal and channel
//! front ends alike.

mod note;
mod stream;
mod tag;
mod todo;

pub use note::NoteCommand;
pub use stream::StreamCommand;
pub use tag::TagCommand;
pub use todo::TodoCommand;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::User;
use crate::storage::Storage;
use crate::ui::Ui;

/// Exit status for a successful command.
pub const SUCCESS: i32 = 0;
/// Exit status for a failed command.
pub const FAILURE: i32 = 1;

/// A single invocable command.
#[async_trait]
pub trait Command: Send {
    /// One-line summary, at most 50 characters.
    fn synopsis(&self) -> &'static str;

    /// Long-form help text including usage.
    fn help(&self) -> String;

    /// Runs the command with the given (already tokenized) arguments.
    ///
    /// Returns an exit status; zero indicates success. All user interaction
    /// happens through the `Ui` the command was constructed with.
    async fn run(&mut self, args: &[String]) -> i32;
}

/// Dispatches argument vectors on behalf of a session.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Dispatches one argument vector for the given user.
    async fn dispatch(
        &self,
        argv: &[String],
        ui: Arc<dyn Ui>,
        user: &User,
        storage: Arc<dyn Storage>,
    ) -> i32;
}

/// The built-in command registry.
pub struct CommandSet;

impl CommandSet {
    fn command(
        name: &str,
        ui: Arc<dyn Ui>,
        user: &User,
        storage: Arc<dyn Storage>,
    ) -> Option<Box<dyn Command>> {
        match name {
            "todo" => Some(Box::new(TodoCommand::new(ui, user.id.clone(), storage))),
            "note" => Some(Box::new(NoteCommand::new(ui, user.id.clone(), storage))),
            "tag" => Some(Box::new(TagCommand::new(ui, user.id.clone(), storage))),
            "stream" => Some(Box::new(StreamCommand::new(ui, user.id.clone(), storage))),
            _ => None,
        }
    }

    fn help() -> String {
        let help_text = "
Usage:
	tend <command> <args...>

Commands:
	note	Utilities for managing tend notes
	stream	Stream your events
	tag	Utilities for managing tend tags
	todo	Utilities for managing tend tasks
";
        help_text.trim().to_string()
    }
}

#[async_trait]
impl Interpreter for CommandSet {
    async fn dispatch(
        &self,
        argv: &[String],
        ui: Arc<dyn Ui>,
        user: &User,
        storage: Arc<dyn Storage>,
    ) -> i32 {
        let Some(name) = argv.first() else {
            ui.output(&Self::help());
            return SUCCESS;
        };

        match Self::command(name, Arc::clone(&ui), user, storage) {
            Some(mut command) => command.run(&argv[1..]).await,
            None => {
                // an unrecognized first token is help-worthy, never fatal
                ui.output(&Self::help());
                FAILURE
            }
        }
    }
}
