// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color helpers for `task list` / `expert list-jobs` tables.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers / column titles.
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: task and dataset names.
    pub const MUTED: u8 = 240;
}

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .usage(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

/// Format text with the header color, used for table column titles.
pub fn header(text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(codes::HEADER), text, RESET)
    } else {
        text.to_string()
    }
}

/// Format text with the muted color, used for task/dataset names.
pub fn muted(text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(codes::MUTED), text, RESET)
    } else {
        text.to_string()
    }
}

/// Colorize a [`tg_core::State`]'s display string by rough semantic meaning.
///
/// Green: completed/finalized. Yellow: pending/running/assigned/registered.
/// Red: failed/canceled/killed. Matches on the first word so a
/// right-padded column cell still colors correctly.
pub fn status(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    let first_word = text
        .trim()
        .split(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or("")
        .to_uppercase();
    let code = match first_word.as_str() {
        "COMPLETED" | "FINALIZED" => "\x1b[32m",
        "ASSIGNED" | "PENDING" | "RUNNING" | "REGISTERED" => "\x1b[33m",
        "FAILED" | "CANCELED" | "CANCELLED" | "KILLED" => "\x1b[31m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
