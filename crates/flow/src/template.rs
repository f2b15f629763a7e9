// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-template token substitution (§4.D, §9).
//!
//! `%IN` and `%<KEY>` are matched as whole tokens bounded by a word boundary
//! rather than a plain substring replace, so `%INPUT` is not clobbered by a
//! `%IN` substitution when both tokens appear in the same command. This
//! resolves the token-collision question left open upstream.

use regex::Regex;

fn token_pattern(token: &str) -> String {
    format!(r"%{}\b", regex::escape(token))
}

/// True iff `command` contains the literal token `%token` at a word
/// boundary (§3 Task invariant: placeholder completeness).
pub fn contains_token(command: &str, token: &str) -> bool {
    #[allow(clippy::expect_used)]
    let re = Regex::new(&token_pattern(token)).expect("valid token regex");
    re.is_match(command)
}

/// Substitute every occurrence of the whole token `%token` with
/// `replacement`. Occurrences of a longer token that merely starts with
/// `token` (e.g. `%INPUT` when substituting `%IN`) are left untouched.
pub fn substitute(command: &str, token: &str, replacement: &str) -> String {
    #[allow(clippy::expect_used)]
    let re = Regex::new(&token_pattern(token)).expect("valid token regex");
    re.replace_all(command, regex::NoExpand(replacement)).into_owned()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
