//! Identifier checks used by [`QueryArgs::validate`](crate::QueryArgs::validate).
//!
//! Compilers render identifiers verbatim, so callers that take column or table
//! names from untrusted input should validate first. Accepted forms:
//!
//! - unquoted segments matching `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted segments (`"Some Name"`, `""` escapes a quote), no NUL
//! - any of the above joined with `.` (`public.subscriptions`)

use crate::error::{SqlError, SqlResult};

/// Check that `s` is a plain or dotted SQL identifier.
///
/// `what` names the thing being checked in the error message ("column",
/// "table", ...).
pub fn check_ident(what: &str, s: &str) -> SqlResult<()> {
    if s.is_empty() {
        return Err(SqlError::validation(format!("{what}: identifier cannot be empty")));
    }
    if s.contains('\0') {
        return Err(SqlError::validation(format!(
            "{what}: identifier cannot contain NUL character"
        )));
    }

    let mut chars = s.chars().peekable();
    let mut first_segment = true;

    while chars.peek().is_some() || first_segment {
        if !first_segment {
            // The loop guard guarantees a next char; it must be the separator.
            match chars.next() {
                Some('.') if chars.peek().is_some() => {}
                Some('.') => {
                    return Err(SqlError::validation(format!(
                        "{what}: trailing '.' in identifier '{s}'"
                    )));
                }
                Some(c) => {
                    return Err(SqlError::validation(format!(
                        "{what}: expected '.' between identifier parts in '{s}', got '{c}'"
                    )));
                }
                None => break,
            }
        }
        first_segment = false;

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut len = 0usize;
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        len += 1;
                    }
                    Some('"') => break,
                    Some(_) => len += 1,
                    None => {
                        return Err(SqlError::validation(format!(
                            "{what}: unclosed quoted identifier '{s}'"
                        )));
                    }
                }
            }
            if len == 0 {
                return Err(SqlError::validation(format!(
                    "{what}: empty quoted identifier in '{s}'"
                )));
            }
            continue;
        }

        let mut len = 0usize;
        while let Some(&c) = chars.peek() {
            if c == '.' {
                break;
            }
            let ok = if len == 0 {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c == '$' || c.is_ascii_alphanumeric()
            };
            if !ok {
                return Err(SqlError::validation(format!(
                    "{what}: invalid character '{c}' in identifier '{s}'"
                )));
            }
            len += 1;
            chars.next();
        }
        if len == 0 {
            return Err(SqlError::validation(format!(
                "{what}: empty identifier segment in '{s}'"
            )));
        }
    }

    Ok(())
}
