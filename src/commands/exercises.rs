//! Exercise screen handlers
//!
//! `run_exercises` drives the interactive screen: a reader thread feeds
//! lines from rustyline into a select loop that also receives list updates,
//! notifications and delete confirmation requests. Adds and deletes run as
//! spawned tasks so the screen keeps rendering while they are in flight.
//!
//! `list_exercises`, `add_exercise` and `delete_exercise` mount the same
//! screen for a single operation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::{mpsc, oneshot};

use super::render;
use super::special_commands::{
    parse_confirmation, parse_special_command, print_help, resolve_target, SpecialCommand,
};
use crate::config::Config;
use crate::error::{LiftlogError, Result};
use crate::screen::{
    AddOutcome, AlwaysConfirm, DeleteConfirmation, DeleteOutcome, ExerciseScreen, Notification,
    Notifier,
};
use crate::store::create_store;

/// A pending delete confirmation, answered by the interactive loop
#[derive(Debug)]
pub struct ConfirmRequest {
    /// Display name of the exercise
    pub name: String,
    /// `true` for Delete, `false` for Cancel
    pub reply: oneshot::Sender<bool>,
}

/// Confirmation that hands the question to the interactive loop
///
/// A dropped loop or reply counts as Cancel.
#[derive(Debug, Clone)]
pub struct ChannelConfirmation {
    requests: mpsc::UnboundedSender<ConfirmRequest>,
}

impl ChannelConfirmation {
    /// Create a confirmation and the receiver the loop answers from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConfirmRequest>) {
        let (requests, rx) = mpsc::unbounded_channel();
        (Self { requests }, rx)
    }
}

#[async_trait]
impl DeleteConfirmation for ChannelConfirmation {
    async fn confirm_delete(&self, name: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmRequest {
            name: name.to_string(),
            reply,
        };
        if self.requests.send(request).is_err() {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

/// The delete prompt currently open in the interactive loop
///
/// At most one prompt is open. A newer request cancels the older one.
#[derive(Debug, Default)]
pub struct PendingConfirmation {
    request: Option<ConfirmRequest>,
}

impl PendingConfirmation {
    /// Open a prompt for `request`; returns the name of a replaced prompt
    pub fn open(&mut self, request: ConfirmRequest) -> Option<String> {
        let replaced = self.request.replace(request)?;
        let _ = replaced.reply.send(false);
        Some(replaced.name)
    }

    /// Answer the open prompt with `line`; returns `false` if none is open
    pub fn answer(&mut self, line: &str) -> bool {
        match self.request.take() {
            Some(request) => {
                let _ = request.reply.send(parse_confirmation(line));
                true
            }
            None => false,
        }
    }

    /// Cancel the open prompt, if any
    pub fn cancel(&mut self) {
        if let Some(request) = self.request.take() {
            let _ = request.reply.send(false);
        }
    }
}

/// Confirmation that prompts on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirmation;

#[async_trait]
impl DeleteConfirmation for PromptConfirmation {
    async fn confirm_delete(&self, name: &str) -> bool {
        render::print_delete_prompt(name);
        let answer = tokio::task::spawn_blocking(|| {
            let mut rl = DefaultEditor::new().ok()?;
            rl.readline("> ").ok()
        })
        .await
        .ok()
        .flatten();
        answer.as_deref().map(parse_confirmation).unwrap_or(false)
    }
}

/// Mount the screen for `config`
///
/// A blocked screen has its fatal notification printed and is reported as
/// `LiftlogError::ScreenBlocked`.
fn mount(config: &Config) -> Result<(ExerciseScreen, mpsc::UnboundedReceiver<Notification>)> {
    let store = create_store(&config.store, &config.firebase)?;
    let (notifier, mut notifications) = Notifier::channel();
    let screen = ExerciseScreen::mount(
        &config.firebase,
        store,
        config.store.collection.clone(),
        notifier,
    );

    if screen.is_blocked() {
        drain_notifications(&mut notifications);
        return Err(LiftlogError::ScreenBlocked.into());
    }
    Ok((screen, notifications))
}

fn drain_notifications(notifications: &mut mpsc::UnboundedReceiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        render::print_notification(&notification);
    }
}

/// Wait until the first snapshot has been applied
async fn wait_for_first_snapshot(
    screen: &ExerciseScreen,
    notifications: &mut mpsc::UnboundedReceiver<Notification>,
    timeout: Duration,
) -> Result<()> {
    let mut updates = screen.updates();
    let waited = tokio::time::timeout(timeout, async {
        let first: Result<()> = tokio::select! {
            changed = updates.changed() => match changed {
                Ok(()) => Ok(()),
                Err(_) => Err(LiftlogError::Subscription("subscription closed".to_string()).into()),
            },
            Some(notification) = notifications.recv() => {
                render::print_notification(&notification);
                Err(LiftlogError::Subscription(notification.message).into())
            }
            else => Err(LiftlogError::Subscription("subscription closed".to_string()).into()),
        };
        first
    })
    .await;

    match waited {
        Ok(result) => result,
        Err(_) => Err(LiftlogError::Subscription(format!(
            "no snapshot received within {}s",
            timeout.as_secs()
        ))
        .into()),
    }
}

fn snapshot_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.store.request_timeout_seconds)
}

/// Print the current list once
///
/// # Errors
///
/// Returns an error if the screen is blocked or no snapshot arrives in time
pub async fn list_exercises(config: &Config, json: bool) -> Result<()> {
    let (screen, mut notifications) = mount(config)?;
    wait_for_first_snapshot(&screen, &mut notifications, snapshot_timeout(config)).await?;

    if json {
        println!("{}", render::exercises_json(&screen.exercises())?);
    } else {
        render::print_view(&screen.view());
    }
    screen.unmount();
    Ok(())
}

/// Add one exercise
///
/// # Errors
///
/// Returns an error if the screen is blocked or the create fails
pub async fn add_exercise(config: &Config, name: &str) -> Result<()> {
    let (screen, mut notifications) = mount(config)?;
    let outcome = screen.submit(name).await;
    screen.unmount();
    drain_notifications(&mut notifications);

    match outcome? {
        AddOutcome::Created(id) => {
            tracing::debug!(exercise_id = %id, "Created");
            println!("{}", id.cyan());
        }
        AddOutcome::Skipped => println!("{}", "Nothing to add: name is empty".yellow()),
        AddOutcome::Busy => println!("{}", "Please wait, an add is in progress".yellow()),
    }
    Ok(())
}

/// Delete one exercise, asking for confirmation unless `yes`
///
/// # Errors
///
/// Returns an error if the screen is blocked, no snapshot arrives in time
/// or the delete fails
pub async fn delete_exercise(config: &Config, id: &str, yes: bool) -> Result<()> {
    let (screen, mut notifications) = mount(config)?;
    wait_for_first_snapshot(&screen, &mut notifications, snapshot_timeout(config)).await?;

    let outcome = if yes {
        screen.delete(id, &AlwaysConfirm).await
    } else {
        screen.delete(id, &PromptConfirmation).await
    };
    screen.unmount();
    drain_notifications(&mut notifications);

    if outcome? == DeleteOutcome::Cancelled {
        println!("{}", "Cancelled".yellow());
    }
    Ok(())
}

/// Read lines on a dedicated thread; `None` marks Ctrl-C / Ctrl-D
fn spawn_reader(lines: mpsc::UnboundedSender<Option<String>>) -> Result<()> {
    std::thread::Builder::new()
        .name("liftlog-input".to_string())
        .spawn(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => rl,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to open terminal");
                    let _ = lines.send(None);
                    return;
                }
            };
            loop {
                match rl.readline("> ") {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            let _ = rl.add_history_entry(line.as_str());
                        }
                        if lines.send(Some(line)).is_err() {
                            break;
                        }
                    }
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                        let _ = lines.send(None);
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read input");
                        let _ = lines.send(None);
                        break;
                    }
                }
            }
        })?;
    Ok(())
}

/// Run the interactive exercise screen until the user exits
///
/// # Errors
///
/// Returns an error if the screen is blocked or the terminal cannot be
/// opened
pub async fn run_exercises(config: Config) -> Result<()> {
    let (screen, mut notifications) = mount(&config)?;
    print_welcome(&config);

    let (line_tx, mut lines) = mpsc::unbounded_channel();
    spawn_reader(line_tx)?;

    let (confirmation, mut confirm_requests) = ChannelConfirmation::channel();
    let confirmation = Arc::new(confirmation);
    let mut pending_confirm = PendingConfirmation::default();
    let mut updates = screen.updates();

    render::print_view(&screen.view());

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(Some(line)) = line else {
                    break;
                };

                if pending_confirm.answer(&line) {
                    continue;
                }

                match parse_special_command(&line) {
                    Ok(SpecialCommand::Add(name)) => {
                        if screen.controls().busy {
                            eprintln!("{}", "Please wait, an add is in progress".yellow());
                            continue;
                        }
                        let gateway = screen.gateway()?;
                        tokio::spawn(async move {
                            if let Err(e) = gateway.submit(name).await {
                                tracing::debug!(error = %e, "Add finished with error");
                            }
                        });
                    }
                    Ok(SpecialCommand::Delete(target)) => {
                        let view = screen.view();
                        let ids = view.rows().iter().map(|r| r.exercise.id.as_str());
                        match resolve_target(&target, ids) {
                            Some(id) => {
                                let gateway = screen.gateway()?;
                                let confirmation = Arc::clone(&confirmation);
                                tokio::spawn(async move {
                                    if let Err(e) = gateway.delete(&id, confirmation.as_ref()).await {
                                        tracing::debug!(error = %e, "Delete finished with error");
                                    }
                                });
                            }
                            None => eprintln!("{}", format!("No exercise matches '{}'", target).red()),
                        }
                    }
                    Ok(SpecialCommand::List) => render::print_view(&screen.view()),
                    Ok(SpecialCommand::Help) => print_help(),
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::None) => {}
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Some(request) = confirm_requests.recv() => {
                let name = request.name.clone();
                if let Some(replaced) = pending_confirm.open(request) {
                    println!("{}", format!("Kept \"{}\": its delete prompt was replaced", replaced).yellow());
                }
                render::print_delete_prompt(&name);
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render::print_view(&screen.view());
            }
            Some(notification) = notifications.recv() => {
                render::print_notification(&notification);
            }
        }
    }

    pending_confirm.cancel();
    screen.unmount();
    println!("Goodbye!");
    Ok(())
}

fn print_welcome(config: &Config) {
    println!("\n{}", "LiftLog".bold());
    println!(
        "Collection: {} ({})",
        config.store.collection.cyan(),
        config.store.backend
    );
    println!("Type an exercise name to add it, '/help' for commands, 'exit' to quit");
}
