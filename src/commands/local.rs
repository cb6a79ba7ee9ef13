//! Interactive local-only exercise list

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::render;
use super::special_commands::{parse_special_command, print_help, resolve_target, SpecialCommand};
use crate::error::Result;
use crate::local::LocalExerciseList;

/// Apply one line of input to the list
///
/// Returns `false` when the user asked to leave.
pub fn handle_line(list: &mut LocalExerciseList, line: &str) -> bool {
    match parse_special_command(line) {
        Ok(SpecialCommand::Add(name)) => {
            list.set_input(name);
            if list.add().is_some() {
                print!("{}", render::format_local_view(&list.view()));
            }
        }
        Ok(SpecialCommand::Delete(target)) => {
            let ids = list.exercises().iter().map(|e| e.id.as_str());
            match resolve_target(&target, ids) {
                Some(id) => {
                    list.delete(&id);
                    print!("{}", render::format_local_view(&list.view()));
                }
                None => eprintln!("{}", format!("No exercise matches '{}'", target).red()),
            }
        }
        Ok(SpecialCommand::List) => print!("{}", render::format_local_view(&list.view())),
        Ok(SpecialCommand::Help) => print_help(),
        Ok(SpecialCommand::Exit) => return false,
        Ok(SpecialCommand::None) => {}
        Err(e) => eprintln!("{}", e.to_string().red()),
    }
    true
}

/// Run the local list until the user exits; nothing is persisted
///
/// # Errors
///
/// Returns an error if the terminal cannot be opened
pub fn run_local() -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut list = LocalExerciseList::new();

    println!("\n{}", "Exercises (local only)".bold());
    println!("Type an exercise name to add it, '/help' for commands, 'exit' to quit");
    print!("{}", render::format_local_view(&list.view()));

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if !handle_line(&mut list, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
