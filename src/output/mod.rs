//! Styled terminal output for tfexport
//!
//! Diagnostics go to stderr so that generated Terraform and state documents
//! can be piped from stdout untouched. Only the table helpers, used by
//! `tfexport list`, print to stdout.

use owo_colors::OwoColorize;

/// Print a success message with a green checkmark
pub fn success(message: &str) {
    // Pastel mint green: RGB(152, 225, 152)
    eprintln!(
        "{} {}",
        "✓".truecolor(152, 225, 152).bold(),
        message.bright_white()
    );
}

/// Print an error message with a red X
pub fn error(message: &str) {
    // Pastel coral/salmon: RGB(255, 160, 160)
    eprintln!(
        "{} {}",
        "✗".truecolor(255, 160, 160).bold(),
        message.bright_white()
    );
}

/// Print a warning message with a yellow warning symbol
pub fn warning(message: &str) {
    // Pastel cream/yellow: RGB(255, 230, 160)
    eprintln!(
        "{} {}",
        "⚠".truecolor(255, 230, 160).bold(),
        message.bright_white()
    );
}

/// Print an info message with a blue info symbol
pub fn info(message: &str) {
    // Pastel sky blue: RGB(160, 200, 255)
    eprintln!(
        "{} {}",
        "ℹ".truecolor(160, 200, 255).bold(),
        message.bright_white()
    );
}

/// Print a section header with a separator line
pub fn section(title: &str) {
    // Pastel lavender: RGB(181, 174, 254)
    eprintln!("\n{}", title.truecolor(181, 174, 254).bold());
    eprintln!("{}", "─".repeat(50).truecolor(160, 160, 160));
}

/// Print a key-value pair with styled key and value
pub fn key_value(key: &str, value: &str) {
    eprintln!(
        "  {} {}",
        format!("{}:", key).truecolor(160, 160, 160),
        value.bright_white()
    );
}

/// Print a dimmed/muted message
pub fn dimmed(message: &str) {
    eprintln!("{}", message.truecolor(160, 160, 160));
}

/// Print a table header
pub fn table_header(columns: &[&str]) {
    // Softer pastel teal: RGB(120, 180, 195)
    let header = columns
        .iter()
        .map(|c| c.truecolor(120, 180, 195).bold().to_string())
        .collect::<Vec<_>>()
        .join(" │ ");
    println!("  {}", header);
    println!("  {}", "─".repeat(70).truecolor(160, 160, 160));
}

/// Print a table row
pub fn table_row(values: &[&str]) {
    let row = values
        .iter()
        .map(|v| v.bright_white().to_string())
        .collect::<Vec<_>>()
        .join(" │ ");
    println!("  {}", row);
}
