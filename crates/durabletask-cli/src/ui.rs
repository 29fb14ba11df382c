//! Terminal output primitives for the generator CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Color palette
pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const AMBER: Color = Color::Color256(214);
    pub const VIOLET: Color = Color::Color256(135);
    pub const GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const WARNING: &str = "\u{25B2}"; // ▲
    pub const DOT: &str = "\u{00B7}"; // ·
    pub const ARROW: &str = "\u{2500}\u{25B8}"; // ─▸
}

/// Width of the box interior.
const BOX_WIDTH: usize = 55;

/// Create a clickable file link (OSC 8 hyperlink). `line` is 1-based.
pub fn file_link(path: &str, line: usize) -> String {
    let abs_path = std::fs::canonicalize(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string());
    let uri = format!("file://{}#{}", abs_path, line);
    let display = format!("{}:{}", path, line);
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", uri, display)
}

/// Print compact version header
pub fn print_compact_header(version: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style("durabletask-gen").fg(colors::CYAN).bold(),
        style(version).dim()
    );
    println!();
}

pub fn success(msg: &str) {
    println!("  {} {}", style(symbols::TARGET_FILLED).fg(colors::GREEN), msg);
}

pub fn error(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

pub fn warning(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::WARNING).fg(colors::AMBER),
        style(msg).fg(colors::AMBER)
    );
}

pub fn info(msg: &str) {
    println!("  {} {}", style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN), msg);
}

/// Print a dim/secondary message
pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}") // ◎◉◎◉
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print a box header
pub fn box_header(title: &str) {
    let title_padded = format!(" {} ", title);
    let dashes = BOX_WIDTH.saturating_sub(title_padded.chars().count() + 4);

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(colors::CYAN), // ╭─
        style(title_padded).fg(colors::CYAN).bold(),
        style("\u{2500}".repeat(dashes)).fg(colors::CYAN),
        style("\u{256E}").fg(colors::CYAN) // ╮
    );
}

/// Print a box line. Content is padded by its visible width.
pub fn box_line(content: &str) {
    let padding = (BOX_WIDTH - 2).saturating_sub(console::measure_text_width(content));
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::CYAN), // │
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::CYAN)
    );
}

/// Print a box footer
pub fn box_footer() {
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::CYAN), // ╰
        style("\u{2500}".repeat(BOX_WIDTH - 2)).fg(colors::CYAN),
        style("\u{256F}").fg(colors::CYAN) // ╯
    );
}

/// One discovered task: `▸ Name  kind  signature`.
pub fn task_line(kind: &str, name: &str, signature: &str) {
    box_line(&format!(
        "{} {:<18} {:<13} {}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(name).bold(),
        style(kind).fg(colors::VIOLET),
        style(signature).dim()
    ));
}

/// `3 orchestrators · 2 activities · 1 function`
pub fn counts_line(orchestrators: usize, activities: usize, functions: usize) {
    println!(
        "    {} {} {} {} {}",
        plural(orchestrators, "orchestrator", "orchestrators"),
        symbols::DOT,
        plural(activities, "activity", "activities"),
        symbols::DOT,
        plural(functions, "function", "functions")
    );
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

pub fn timing(label: &str, duration_ms: u128) {
    println!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}

/// Print the header above a list of warnings.
pub fn warnings_header(count: usize) {
    println!();
    println!(
        "  {} {}",
        style(symbols::WARNING).fg(colors::AMBER).bold(),
        style(plural(count, "warning", "warnings")).fg(colors::AMBER).bold()
    );
}

pub fn looking_good() {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::GREEN),
        style("Looking good.").bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_link_format() {
        let link = file_link("Orders.cs", 42);
        assert!(link.contains("Orders.cs:42"));
        assert!(link.contains("\x1b]8;;"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "activity", "activities"), "1 activity");
        assert_eq!(plural(0, "activity", "activities"), "0 activities");
    }
}
