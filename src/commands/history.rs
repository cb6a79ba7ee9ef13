use crate::error::Result;
use crate::history::{project, sample_history};
use colored::Colorize;

use super::render;

/// Show the workout history
pub fn show_history() -> Result<()> {
    let history = sample_history();

    println!("\n{}", "Workout History".bold());
    print!("{}", render::format_history(&project(&history)));
    println!();

    Ok(())
}
