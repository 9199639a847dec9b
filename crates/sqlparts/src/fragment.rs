//! Partial SQL text with its bound values.
//!
//! A [`Fragment`] stores SQL pieces and placeholder markers as separate parts
//! and keeps one argument per marker, so the marker/argument alignment holds
//! by construction. Final placeholders (`$1`, `?`, ...) are only produced
//! by [`Fragment::render`], which takes the index of the first placeholder.
//! This lets independently built fragments continue a single numbering.
//!
//! ```ignore
//! let mut f = Fragment::new("LIMIT ");
//! f.push_bind(10i64);
//! assert_eq!(f.text(), "LIMIT ?");
//! assert_eq!(f.render(&Postgres, 3).0, "LIMIT $3");
//! ```

use crate::dialect::Dialect;
use crate::value::Value;

/// Dialect-neutral marker used by [`Fragment::text`].
pub const MARKER: &str = "?";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Raw(String),
    Marker,
}

/// SQL parts plus one bound value per marker.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Fragment {
    parts: Vec<Part>,
    args: Vec<Value>,
}

impl Fragment {
    /// Create a fragment starting with raw SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let mut parts = Vec::new();
        if !sql.is_empty() {
            parts.push(Part::Raw(sql));
        }
        Self {
            parts,
            args: Vec::new(),
        }
    }

    /// The empty fragment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no arguments).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(Part::Raw(sql.to_string())),
        }
        self
    }

    /// Append a marker and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(Part::Marker);
        self.args.push(value.into());
        self
    }

    /// Append `items` separated by `sep`, each written by `f`.
    pub fn push_joined<I, F>(&mut self, items: I, sep: &str, mut f: F) -> &mut Self
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item),
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            f(self, item);
        }
        self
    }

    /// Append another fragment, consuming it.
    pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
        for part in other.parts {
            match part {
                Part::Raw(s) => {
                    self.push(&s);
                }
                Part::Marker => self.parts.push(Part::Marker),
            }
        }
        self.args.extend(other.args);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Value> {
        self.args
    }

    pub fn marker_count(&self) -> usize {
        self.parts.iter().filter(|p| matches!(p, Part::Marker)).count()
    }

    /// Text with every marker written as [`MARKER`].
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Raw(s) => out.push_str(s),
                Part::Marker => out.push_str(MARKER),
            }
        }
        out
    }

    /// Render with the dialect's placeholders, the first one numbered `start`.
    ///
    /// Returns the SQL text and the arguments in placeholder order.
    ///
    /// # Panics
    /// Panics if the number of rendered placeholders differs from the number
    /// of arguments, which means a fragment builder is broken.
    pub fn render(self, dialect: &dyn Dialect, start: usize) -> (String, Vec<Value>) {
        let mut out = String::new();
        let mut next = start;

        for part in &self.parts {
            match part {
                Part::Raw(s) => out.push_str(s),
                Part::Marker => {
                    out.push_str(&dialect.placeholder(next));
                    next += 1;
                }
            }
        }

        assert_eq!(
            next - start,
            self.args.len(),
            "placeholder/argument mismatch in `{out}`"
        );
        (out, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn markers_track_args() {
        let mut f = Fragment::new("WHERE a = ");
        f.push_bind(1i64).push(" AND b = ").push_bind("x");

        assert_eq!(f.text(), "WHERE a = ? AND b = ?");
        assert_eq!(f.marker_count(), 2);
        assert_eq!(f.args(), &[Value::Int(1), Value::from("x")]);
    }

    #[test]
    fn render_continues_numbering() {
        let mut f = Fragment::new("LIMIT ");
        f.push_bind(10i64).push(" OFFSET ").push_bind(5i64);

        let (sql, args) = f.clone().render(&Postgres, 3);
        assert_eq!(sql, "LIMIT $3 OFFSET $4");
        assert_eq!(args, vec![Value::Int(10), Value::Int(5)]);

        let (sql, _) = f.render(&Sqlite, 3);
        assert_eq!(sql, "LIMIT ? OFFSET ?");
    }

    #[test]
    fn compose_keeps_order() {
        let mut w = Fragment::new("a = ");
        w.push_bind(1i64);
        let mut l = Fragment::new(" LIMIT ");
        l.push_bind(2i64);

        let mut q = Fragment::empty();
        q.push_fragment(w).push_fragment(l);

        assert_eq!(q.text(), "a = ? LIMIT ?");
        assert_eq!(q.args(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn empty_fragment_renders_nothing() {
        let f = Fragment::new("");
        assert!(f.is_empty());
        assert_eq!(f.render(&Postgres, 1), (String::new(), vec![]));
    }

    #[test]
    fn push_joined_separates() {
        let mut f = Fragment::new("VALUES (");
        f.push_joined([1i64, 2, 3], ", ", |f, v| {
            f.push_bind(v);
        })
        .push(")");
        assert_eq!(f.text(), "VALUES (?, ?, ?)");
    }
}
