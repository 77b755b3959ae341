//! Conversion helpers for string-valued options
//!
//! Configuration front ends hand options over as strings; these helpers turn
//! them into typed values, falling back to a default (with a diagnostic) on
//! malformed input rather than failing.

use super::diagnostics;
use super::error::{LoggerError, Result};
use super::level::Level;
use std::collections::HashMap;

/// Key/value option source used for `${key}` substitution.
pub type Properties = HashMap<String, String>;

const DELIM_START: &str = "${";
const DELIM_STOP: char = '}';
const MAX_SUBST_DEPTH: usize = 32;

/// `"true"` / `"false"` in any case, surrounding whitespace ignored.
pub fn to_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

pub fn to_int(value: Option<&str>, default: i32) -> i32 {
    let Some(value) = value else {
        return default;
    };
    let trimmed = value.trim();
    trimmed.parse().unwrap_or_else(|_| {
        diagnostics::error(format!("[{}] is not in proper int form.", trimmed));
        default
    })
}

/// Level by name. `"NULL"` (any case) means "no level", used to clear a
/// logger's explicit level.
///
/// A `name#qualifier` form is accepted for compatibility; the qualifier is
/// ignored.
pub fn to_level(value: Option<&str>, default: Level) -> Option<Level> {
    let Some(value) = value else {
        return Some(default);
    };
    let value = value.trim();
    let name = match value.split_once('#') {
        Some((name, qualifier)) => {
            diagnostics::debug(format!(
                "ignoring level qualifier [{}] of [{}]",
                qualifier, name
            ));
            name
        }
        None => value,
    };
    if name.eq_ignore_ascii_case("NULL") {
        return None;
    }
    Some(Level::to_level(name, default))
}

/// Byte count with an optional `KB`, `MB` or `GB` suffix (powers of 1024).
pub fn to_file_size(value: Option<&str>, default: u64) -> u64 {
    let Some(value) = value else {
        return default;
    };
    let upper = value.trim().to_ascii_uppercase();
    let (digits, multiplier) = [("KB", 1u64 << 10), ("MB", 1 << 20), ("GB", 1 << 30)]
        .iter()
        .find_map(|(suffix, multiplier)| {
            upper
                .find(suffix)
                .map(|index| (&upper[..index], *multiplier))
        })
        .unwrap_or((upper.as_str(), 1));

    match digits.trim().parse::<u64>() {
        Ok(n) => n.saturating_mul(multiplier),
        Err(_) => {
            diagnostics::error(format!("[{}] not in expected format.", value));
            default
        }
    }
}

/// Replace backslash escapes (`\n`, `\r`, `\t`, `\f`, `\\`, `\"`, `\'`) by the
/// characters they denote. Unknown escapes keep the escaped character.
pub fn convert_special_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\u{000C}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Expand `${key}` references, looking `key` up in the environment first and
/// then in `props`. Replacements are expanded recursively; unknown keys
/// expand to nothing.
pub fn subst_vars(value: &str, props: Option<&Properties>) -> Result<String> {
    subst_vars_at_depth(value, props, 0)
}

fn subst_vars_at_depth(value: &str, props: Option<&Properties>, depth: usize) -> Result<String> {
    if depth > MAX_SUBST_DEPTH {
        return Err(LoggerError::config(
            "options",
            format!("\"{}\" nests variable substitution too deeply", value),
        ));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut offset = 0;

    while let Some(start) = rest.find(DELIM_START) {
        out.push_str(&rest[..start]);
        let after = &rest[start + DELIM_START.len()..];
        let Some(stop) = after.find(DELIM_STOP) else {
            return Err(LoggerError::config(
                "options",
                format!(
                    "\"{}\" has no closing brace. Opening brace at position {}.",
                    value,
                    offset + start
                ),
            ));
        };

        let key = &after[..stop];
        let replacement = std::env::var(key)
            .ok()
            .or_else(|| props.and_then(|p| p.get(key).cloned()));
        if let Some(replacement) = replacement {
            out.push_str(&subst_vars_at_depth(&replacement, props, depth + 1)?);
        }

        let consumed = start + DELIM_START.len() + stop + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Look `key` up in `props` and expand its value. A value that fails to
/// expand is returned verbatim.
pub fn find_and_subst(key: &str, props: &Properties) -> Option<String> {
    let value = props.get(key)?;
    match subst_vars(value, Some(props)) {
        Ok(expanded) => Some(expanded),
        Err(e) => {
            diagnostics::error_with(format!("Bad option value [{}].", value), &e);
            Some(value.clone())
        }
    }
}
