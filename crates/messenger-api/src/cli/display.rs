//! Shared terminal formatting helpers: spinners, badges, message lines.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use messenger_types::contact::Contact;
use messenger_types::message::{Message, MessageSender};

/// Start a steady-ticking spinner with `message`.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// "AI" or "Human" badge for lists.
pub fn type_badge(contact: &Contact) -> String {
    if contact.is_ai() {
        format!("{}", style("✦ AI").magenta())
    } else {
        format!("{}", style("● Human").green())
    }
}

/// Shorten `text` to at most `max` characters, adding "..." when cut.
pub fn preview(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

pub fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// Print one transcript line: sender, local time, text.
pub fn print_message(message: &Message, contact_name: &str) {
    let label = match message.sender {
        MessageSender::User => format!("{}", style("You").green().bold()),
        MessageSender::Contact => format!("{}", style(contact_name).cyan().bold()),
    };
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    println!("  {} {} {}", style(time).dim(), label, message.text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("line one\nline two", 40), "line one line two");
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let text = "héllo wörld, this is long";
        let cut = preview(text, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_format_relative_time() {
        let now = chrono::Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::minutes(5))),
            "5m ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::hours(3))),
            "3h ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::days(2))),
            "2d ago"
        );
    }
}
