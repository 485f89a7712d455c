// Colored one-line status messages for command output

use colored::Colorize;

/// Print a success line prefixed with a check mark
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

pub fn warn(message: &str) {
    println!("{} {}", "⚠️ ".yellow(), message.yellow());
}

/// Print an error line to stderr
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}
