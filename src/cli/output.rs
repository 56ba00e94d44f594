//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print labelled value, label padded to a fixed width
pub fn field(label: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!("  {:<22} {}", format!("{}:", label).dimmed(), value);
}

/// Print highlighted labelled value (bold green value)
pub fn total(label: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!(
        "  {:<22} {}",
        format!("{}:", label).dimmed(),
        value.to_string().green().bold()
    );
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Format a number with thousands separators and at most two decimals.
///
/// `1200.0` → `1,200`, `45.5` → `45.50`
pub fn amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, frac)
    }
}

/// Format a currency amount: `240.0` → `$240`
pub fn money(value: f64) -> String {
    let formatted = amount(value);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", formatted),
    }
}

/// Format business volume: `1200.0` → `1,200 BV`
pub fn bv(value: f64) -> String {
    format!("{} BV", amount(value))
}
