//! Terminal markdown rendering for AI replies.
//!
//! Replies arrive whole, so each one is split into prose and fenced code
//! segments once: prose goes through `termimad`, code through `syntect`.

use crossterm::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

const CODE_THEME: &str = "base16-ocean.dark";

/// A run of reply text between code fences.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Prose(Vec<&'a str>),
    Code { lang: &'a str, lines: Vec<&'a str> },
}

/// Split markdown on ``` fences. An unclosed fence runs to the end.
fn split_fences(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut current = Segment::Prose(Vec::new());

    for line in markdown.lines() {
        let fence = line.trim_start().strip_prefix("```");
        current = match (current, fence) {
            (Segment::Prose(lines), Some(lang)) => {
                if !lines.is_empty() {
                    segments.push(Segment::Prose(lines));
                }
                Segment::Code {
                    lang: lang.trim(),
                    lines: Vec::new(),
                }
            }
            (code @ Segment::Code { .. }, Some(_)) => {
                segments.push(code);
                Segment::Prose(Vec::new())
            }
            (Segment::Prose(mut lines), None) => {
                lines.push(line);
                Segment::Prose(lines)
            }
            (Segment::Code { lang, mut lines }, None) => {
                lines.push(line);
                Segment::Code { lang, lines }
            }
        };
    }

    match current {
        Segment::Prose(lines) if lines.is_empty() => {}
        Segment::Code { lines, .. } if lines.is_empty() => {}
        rest => segments.push(rest),
    }
    segments
}

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
}

impl ChatRenderer {
    /// `accent` tints bold text and the top two header levels.
    pub fn new(accent: Option<Color>) -> Self {
        let mut skin = MadSkin::default_dark();
        if let Some(color) = accent {
            let color = to_termimad(color);
            skin.bold.set_fg(color);
            skin.headers[0].set_fg(color);
            skin.headers[1].set_fg(color);
        }
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        let mut themes = ThemeSet::load_defaults();
        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: themes.themes.remove(CODE_THEME),
        }
    }

    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        for segment in split_fences(markdown) {
            match segment {
                Segment::Prose(lines) => {
                    output.push_str(&self.skin.term_text(&lines.join("\n")).to_string());
                }
                Segment::Code { lang, lines } => {
                    output.push_str(&self.highlight_code(lang, &lines));
                }
            }
        }
        output
    }

    /// Print the footer after an AI reply: "| {tokens} tokens · {time}s · {model}".
    pub fn print_stats_footer(&self, tokens: u32, response_ms: u64, model: &str) {
        let dot = console::style("\u{00b7}").dim();
        println!(
            "  {} {} {dot} {} {dot} {}",
            console::style("|").dim(),
            console::style(format!("{tokens} tokens")).dim(),
            console::style(format!("{:.1}s", response_ms as f64 / 1000.0)).dim(),
            console::style(model).dim(),
        );
    }

    fn highlight_code(&self, lang: &str, lines: &[&str]) -> String {
        let mut output = format!("  {}\n", console::style(format!("--- {lang} ---")).dim());

        let Some(theme) = &self.theme else {
            for line in lines {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in lines {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            output.push_str(&format!(
                "  {}\x1b[0m\n",
                as_24_bit_terminal_escaped(&ranges, false)
            ));
        }
        output
    }
}

fn to_termimad(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as T;
    match color {
        Color::Green => T::Green,
        Color::Yellow => T::Yellow,
        Color::Magenta => T::Magenta,
        Color::Blue => T::Blue,
        Color::Red => T::Red,
        Color::Rgb { r, g, b } => T::Rgb { r, g, b },
        _ => T::Cyan,
    }
}
