//! Task management command.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::commands::{Command, FAILURE, SUCCESS};
use crate::error::Result;
use crate::models::{Record, Tag, Task};
use crate::storage::Storage;
use crate::ui::input::{date_input, int_input, string_input, yes_no};
use crate::ui::Ui;

/// Implements the `todo` command set.
pub struct TodoCommand {
    ui: Arc<dyn Ui>,
    user_id: String,
    storage: Arc<dyn Storage>,

    /// The user's incomplete tasks, loaded once per invocation.
    ///
    /// While the command runs, and assuming the user only goes through the
    /// command prompt, this list is definitive.
    tasks: Vec<Task>,

    /// The user's tags by id, for rendering task badges.
    tags: HashMap<String, Tag>,
}

impl TodoCommand {
    /// Creates a `todo` command bound to one user and storage handle.
    pub fn new(ui: Arc<dyn Ui>, user_id: String, storage: Arc<dyn Storage>) -> Self {
        Self { ui, user_id, storage, tasks: Vec::new(), tags: HashMap::new() }
    }

    fn errorf(&self, msg: &str) {
        self.ui.error(&format!("[tend todo] Error: {msg}"));
    }

    /// Verifies the command is runnable and loads the working set: the
    /// user's incomplete tasks and all their tags.
    async fn init(&mut self) -> i32 {
        if self.user_id.is_empty() {
            self.errorf("initialization: no user id");
            return FAILURE;
        }

        match self.storage.tasks(&self.user_id).await {
            Ok(tasks) => {
                self.tasks = tasks.into_iter().filter(|t| !t.is_complete()).collect();
            }
            Err(e) => {
                self.errorf(&format!("data retrieval: querying tasks: {e}"));
                return FAILURE;
            }
        }

        match self.storage.tags(&self.user_id).await {
            Ok(tags) => {
                self.tags = tags.into_iter().map(|t| (t.id.clone(), t)).collect();
            }
            Err(e) => {
                self.errorf(&format!("data retrieval: querying tags: {e}"));
                return FAILURE;
            }
        }

        SUCCESS
    }

    /// Prints the numbered task list, with tag badges, deadline, and time
    /// spent. Indices are positions in the full working set even when a
    /// selector filters the display, so they stay valid for selection.
    fn print_task_list(&self, selector: &dyn Fn(&Task) -> bool) {
        let now = Utc::now();
        for (i, task) in self.tasks.iter().enumerate() {
            if !selector(task) {
                continue;
            }

            let mut tag_list = String::new();
            for id in &task.tag_ids {
                if let Some(tag) = self.tags.get(id) {
                    tag_list.push_str(&format!(" [{}]", tag.name));
                }
            }
            if tag_list.is_empty() {
                tag_list = " ".to_string();
            } else {
                tag_list.push_str(": ");
            }

            let deadline = task
                .deadline
                .map(|d| format!("({})", d.format("%a %b %-d %H:%M")))
                .unwrap_or_default();

            self.ui.output(&format!(
                "{i}){tag_list}{} {deadline}\n\tTime spent: {}",
                task.name,
                format_duration(task.time_spent(now)),
            ));
        }
    }

    /// Prompts the user to select one of their tasks, returning its index
    /// into the working set. `None` means there was nothing to select, the
    /// input failed, or the index was out of range; the prompt has already
    /// said so.
    async fn prompt_select_task(&self, selector: &(dyn Fn(&Task) -> bool + Sync)) -> Option<usize> {
        if self.tasks.is_empty() {
            self.ui.warn("You do not have any tasks");
            return None;
        }

        self.print_task_list(selector);

        let index = match int_input(self.ui.as_ref(), "Which number?").await {
            Ok(index) => index,
            Err(e) => {
                self.errorf(&format!("input error: {e}"));
                return None;
            }
        };

        if index < 0 || index as usize >= self.tasks.len() {
            self.ui.warn(&format!(
                "{index} is not a valid index. Need a # in (0,...,{})",
                self.tasks.len() - 1
            ));
            return None;
        }

        Some(index as usize)
    }

    /// Walks the user through creating a task: name, optional deadline,
    /// optional prerequisites (picked from current tasks or created on the
    /// spot, recursively). The created task is saved and appended to the
    /// working set.
    fn prompt_new_task<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Task>> + Send + 'a>> {
        Box::pin(async move {
            let ui = Arc::clone(&self.ui);
            let now = Utc::now();
            let mut task = Task {
                id: self.storage.new_id(),
                owner_id: self.user_id.clone(),
                created_at: Some(now),
                ..Task::default()
            };

            task.name = string_input(ui.as_ref(), "Name:").await?;

            if yes_no(ui.as_ref(), "Does it have a deadline?").await? {
                task.deadline = Some(date_input(ui.as_ref(), "Deadline:").await?);
            }

            if yes_no(ui.as_ref(), "Does it have any prerequisites?").await? {
                if !self.tasks.is_empty() {
                    self.print_task_list(&|_| true);
                    let mut more_current =
                        yes_no(ui.as_ref(), "Any dependencies that are current?").await?;
                    while more_current {
                        let index = int_input(ui.as_ref(), "Which number?").await?;
                        if index < 0 || index as usize >= self.tasks.len() {
                            ui.warn("That isn't a valid index");
                            continue;
                        }

                        let prereq = self.tasks[index as usize].clone();
                        task.include_prerequisite(&prereq);

                        more_current =
                            yes_no(ui.as_ref(), "Any more current prereqs?").await?;
                    }
                }

                let mut more_new =
                    yes_no(ui.as_ref(), "Any dependencies that are new tasks?").await?;
                while more_new {
                    let prereq = self.prompt_new_task().await?;
                    task.include_prerequisite(&prereq);
                    more_new = yes_no(ui.as_ref(), "Any more new prereqs?").await?;
                }
            }

            task.updated_at = Some(Utc::now());

            self.storage.save(Record::Task(task.clone())).await?;
            self.tasks.push(task.clone());
            ui.output("Task created");

            Ok(task)
        })
    }

    async fn run_complete(&mut self) -> i32 {
        let Some(index) = self.prompt_select_task(&|_| true).await else {
            return FAILURE;
        };

        let now = Utc::now();
        let mut task = self.tasks[index].clone();
        task.stop_and_complete(now);

        if let Err(e) = self.storage.save(Record::Task(task.clone())).await {
            self.errorf(&format!("(subcommand complete) Error: {e}"));
            return FAILURE;
        }

        // the task is complete, drop it from the working set
        self.tasks.remove(index);

        self.ui.info(&format!("Completed '{}'", task.name));
        self.ui
            .info(&format!("Worked for {} total", format_duration(task.time_spent(now))));

        SUCCESS
    }

    fn run_current(&self) -> i32 {
        let printed = std::cell::Cell::new(false);
        self.print_task_list(&|task| {
            let in_progress = task.in_progress();
            if in_progress {
                printed.set(true);
            }
            in_progress
        });

        if !printed.get() {
            self.ui.output("You have no tasks in progress");
        }

        SUCCESS
    }

    async fn run_delete(&mut self) -> i32 {
        let Some(index) = self.prompt_select_task(&|_| true).await else {
            return FAILURE;
        };

        let task = self.tasks[index].clone();
        if let Err(e) = self.storage.delete(&Record::Task(task.clone())).await {
            self.errorf(&format!("(subcommand delete) Error: {e}"));
            return FAILURE;
        }

        self.tasks.remove(index);
        self.ui.info(&format!("Deleted '{}'", task.name));

        SUCCESS
    }

    fn run_list(&self) -> i32 {
        self.ui.output("Todos:");
        self.print_task_list(&|_| true);
        SUCCESS
    }

    async fn run_new(&mut self) -> i32 {
        match self.prompt_new_task().await {
            Ok(_) => SUCCESS,
            Err(e) => {
                self.errorf(&format!("(subcommand new) Error: {e}"));
                FAILURE
            }
        }
    }

    async fn run_start(&mut self) -> i32 {
        let Some(index) = self.prompt_select_task(&|_| true).await else {
            return FAILURE;
        };

        let mut task = self.tasks[index].clone();
        if task.in_progress() {
            self.ui.warn("Task is already in progress");
            return SUCCESS;
        }

        task.start(Utc::now());
        if let Err(e) = self.storage.save(Record::Task(task.clone())).await {
            self.errorf(&format!("(subcommand start) Error: {e}"));
            return FAILURE;
        }

        self.ui.info(&format!("Started '{}'", task.name));
        self.tasks[index] = task;

        SUCCESS
    }

    async fn run_stop(&mut self) -> i32 {
        if !self.tasks.iter().any(Task::in_progress) {
            self.ui.output("No tasks in progress");
            return SUCCESS;
        }

        let Some(index) = self.prompt_select_task(&Task::in_progress).await else {
            return FAILURE;
        };

        let mut task = self.tasks[index].clone();
        if !task.in_progress() {
            self.ui.warn("Task is not in progress");
            return SUCCESS;
        }

        task.stop(Utc::now());
        if let Err(e) = self.storage.save(Record::Task(task.clone())).await {
            self.errorf(&format!("(subcommand stop) Error: {e}"));
            return FAILURE;
        }

        let stages = &task.stages;
        let last_stretch = stages[stages.len() - 1] - stages[stages.len() - 2];
        self.ui
            .info(&format!("You worked for {} that time", format_duration(last_stretch)));
        self.tasks[index] = task;

        SUCCESS
    }
}

#[async_trait]
impl Command for TodoCommand {
    fn synopsis(&self) -> &'static str {
        "Utilities for managing tend tasks"
    }

    fn help(&self) -> String {
        let help_text = "
Usage:
	tend todo <subcommand>

Subcommands:
	complete	complete a task
	current		list current tasks
	delete		delete a task
	list		list all your tasks
	new		create a new task
	start		start a task
	stop		stop a task
";
        help_text.trim().to_string()
    }

    async fn run(&mut self, args: &[String]) -> i32 {
        // short circuit to avoid loading the working set
        let Some(subcommand) = args.first() else {
            self.ui.output(&self.help());
            return SUCCESS;
        };

        let status = self.init().await;
        if status != SUCCESS {
            return status;
        }

        match subcommand.as_str() {
            "complete" => self.run_complete().await,
            "current" => self.run_current(),
            "delete" => self.run_delete().await,
            "list" => self.run_list(),
            "new" => self.run_new().await,
            "start" => self.run_start().await,
            "stop" => self.run_stop().await,
            _ => {
                self.ui.output(&self.help());
                SUCCESS
            }
        }
    }
}

/// Formats a duration the way the task listing shows it, e.g. `1h20m0s`.
fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
