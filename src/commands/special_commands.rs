//! Special commands parser for the interactive exercise screens
//!
//! Plain text is typed into the add field and submitted. Commands are
//! prefixed with `/` and are case-insensitive; `exit` and `quit` also work
//! without the prefix.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// A line entered at the exercise prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Type the text into the add field and submit it
    Add(String),

    /// Delete by row number (as listed) or by exercise id
    Delete(String),

    /// Redraw the list
    List,

    /// Display help information
    Help,

    /// Leave the screen
    Exit,

    /// Blank line
    None,
}

/// Parse one line of input
///
/// # Errors
///
/// Returns `CommandError` for an unknown `/command` or a `/delete` without
/// a target
///
/// # Examples
///
/// ```
/// use liftlog::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("Bench press").unwrap(),
///     SpecialCommand::Add("Bench press".to_string())
/// );
/// assert_eq!(
///     parse_special_command("/delete 2").unwrap(),
///     SpecialCommand::Delete("2".to_string())
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(SpecialCommand::None);
    }

    let lower = trimmed.to_lowercase();
    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::Add(trimmed.to_string()));
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, arg)) => (command.to_lowercase(), arg.trim()),
        None => (lower, ""),
    };

    match command.as_str() {
        "/add" | "/a" => Ok(SpecialCommand::Add(arg.to_string())),
        "/delete" | "/del" | "/rm" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/delete".to_string(),
                    usage: "/delete <row number|id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Delete(arg.to_string()))
            }
        }
        "/list" | "/ls" => Ok(SpecialCommand::List),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Resolve a delete target against the listed ids
///
/// A number in `1..=ids.len()` selects that row; anything else must match
/// an id exactly.
pub fn resolve_target<'a, I>(target: &str, ids: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let ids: Vec<&str> = ids.into_iter().collect();
    if let Ok(row) = target.parse::<usize>() {
        if (1..=ids.len()).contains(&row) {
            return Some(ids[row - 1].to_string());
        }
    }
    ids.into_iter().find(|id| *id == target).map(str::to_string)
}

/// Parse the answer to a delete confirmation; only Delete confirms
pub fn parse_confirmation(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "delete" | "d" | "yes" | "y"
    )
}

/// Print help for the interactive screens
pub fn print_help() {
    println!(
        r#"
Exercise Screen Commands
========================

  <name>            - Add an exercise with this name
  /add <name>       - Same as typing the name
  /delete <n|id>    - Delete row n (as listed) or the exercise with this id
  /list             - Show the list again
  /help             - Show this help
  /exit             - Leave (also: exit, quit, Ctrl-D)

Deletes ask for confirmation: answer 'delete' to proceed, anything else
cancels.
"#
    );
}
