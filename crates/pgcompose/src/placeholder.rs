//! Placeholder marks and the final rewrite pass.
//!
//! Fragments always render the generic mark `?`. Only a finished statement is
//! rewritten into the driver's syntax, in one left-to-right pass over the
//! whole text. Every `?` is a mark; there is no escape sequence.
//!
//! The scan knows nothing about quoted SQL literals or comments: a `?` inside
//! `'...'` is rewritten like any other mark.

use std::borrow::Cow;

/// The generic placeholder mark.
pub const MARK: char = '?';

/// How generic `?` marks are presented to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaceholderFormat {
    /// Leave `?` marks unchanged.
    #[default]
    Question,
    /// Replace the Nth mark (1-based, left to right) with `prefix` + N.
    Numbered { prefix: Cow<'static, str> },
}

impl PlaceholderFormat {
    /// `$1, $2, ...` (PostgreSQL).
    pub const DOLLAR: PlaceholderFormat = PlaceholderFormat::Numbered {
        prefix: Cow::Borrowed("$"),
    };

    /// `:1, :2, ...` (Oracle).
    pub const COLON: PlaceholderFormat = PlaceholderFormat::Numbered {
        prefix: Cow::Borrowed(":"),
    };

    /// `@p1, @p2, ...` (SQL Server).
    pub const AT_P: PlaceholderFormat = PlaceholderFormat::Numbered {
        prefix: Cow::Borrowed("@p"),
    };

    /// A numbered format with a custom prefix.
    pub fn numbered(prefix: impl Into<Cow<'static, str>>) -> Self {
        PlaceholderFormat::Numbered {
            prefix: prefix.into(),
        }
    }

    /// Rewrite every generic mark in `sql` into this format.
    pub fn replace_placeholders(&self, sql: &str) -> String {
        match self {
            PlaceholderFormat::Question => sql.to_string(),
            PlaceholderFormat::Numbered { prefix } => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut n = 0usize;
                let mut rest = sql;
                while let Some(pos) = rest.find(MARK) {
                    n += 1;
                    out.push_str(&rest[..pos]);
                    out.push_str(prefix);
                    out.push_str(&n.to_string());
                    rest = &rest[pos + 1..];
                }
                out.push_str(rest);
                out
            }
        }
    }
}

/// Count the unresolved generic marks in `sql`.
pub fn count_placeholders(sql: &str) -> usize {
    sql.matches(MARK).count()
}

/// `n` comma-separated marks: `placeholders(3) == "?,?,?"`.
pub fn placeholders(n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(n * 2 - 1);
    for i in 0..n {
        if i > 0 {
            out.push(',');
        }
        out.push(MARK);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_identity() {
        let sql = "SELECT * FROM t WHERE a = ? AND b IN (?,?)";
        assert_eq!(PlaceholderFormat::Question.replace_placeholders(sql), sql);
    }

    #[test]
    fn dollar_numbers_left_to_right() {
        let sql = "x = ? AND y IN (?,?) AND z = ?";
        assert_eq!(
            PlaceholderFormat::DOLLAR.replace_placeholders(sql),
            "x = $1 AND y IN ($2,$3) AND z = $4"
        );
    }

    #[test]
    fn custom_prefixes() {
        assert_eq!(PlaceholderFormat::COLON.replace_placeholders("a = ?"), "a = :1");
        assert_eq!(PlaceholderFormat::AT_P.replace_placeholders("a = ?, b = ?"), "a = @p1, b = @p2");
        assert_eq!(PlaceholderFormat::numbered("#").replace_placeholders("?"), "#1");
    }

    #[test]
    fn adjacent_marks_are_numbered_separately() {
        assert_eq!(PlaceholderFormat::DOLLAR.replace_placeholders("??"), "$1$2");
        assert_eq!(count_placeholders("??"), 2);
    }

    #[test]
    fn quoted_marks_are_rewritten_too() {
        assert_eq!(
            PlaceholderFormat::DOLLAR.replace_placeholders("a = '?' AND b = ?"),
            "a = '$1' AND b = $2"
        );
    }

    #[test]
    fn double_digit_indices() {
        let sql = vec!["?"; 12].join(",");
        let out = PlaceholderFormat::DOLLAR.replace_placeholders(&sql);
        assert!(out.ends_with("$11,$12"));
    }

    #[test]
    fn placeholder_lists() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }

    #[test]
    fn counts_marks() {
        assert_eq!(count_placeholders(""), 0);
        assert_eq!(count_placeholders("? ? ?"), 3);
        assert_eq!(count_placeholders("???"), 3);
    }
}
