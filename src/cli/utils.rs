use anyhow::Result;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n=== {} ===\n", title);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("\x1b[32m✓ {}\x1b[0m", message);
}

/// Print an error message
pub fn print_error(message: &str) {
    println!("\x1b[31m✗ {}\x1b[0m", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("\x1b[33m! {}\x1b[0m", message);
}

/// Print an informational message
pub fn print_info(message: &str) {
    println!("  {}", message);
}

/// Read a line of input from the terminal
pub fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    // Trim whitespace and newlines
    Ok(input.trim().to_string())
}

/// Read a hidden line of input from the terminal (like a password)
pub fn read_password(prompt: &str) -> Result<String> {
    // For cross-platform password reading, we'd use a crate like 'rpassword'
    // But for simplicity in this example, we'll just use a regular read_line

    // In a real implementation, replace this with:
    // let password = rpassword::read_password_from_tty(Some(prompt))?;

    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    // Trim whitespace and newlines
    Ok(input.trim().to_string())
}

/// Ask a yes/no confirmation question, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    let answer = read_line(&format!("{} [y/N]: ", prompt))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

/// Display a message with a spinning indicator for ongoing operations.
///
/// The wait is a fixed, non-cancellable stand-in for network latency; there
/// is no real request behind it.
pub fn display_spinner(message: &str, duration: Duration) -> Result<()> {
    let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
    let mut stdout = io::stdout();

    for i in 0..((duration.as_millis() / 100) as usize) {
        let spinner_char = spinner_chars[i % spinner_chars.len()];
        print!("\r{} {} ", spinner_char, message);
        stdout.flush()?;
        thread::sleep(Duration::from_millis(100));
    }

    print!("\r{}\r", " ".repeat(message.chars().count() + 4));
    stdout.flush()?;
    Ok(())
}
