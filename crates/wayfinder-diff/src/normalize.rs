#![forbid(unsafe_code)]

//! Whitespace normalization applied to both sides before comparison.
//!
//! Rules, in order:
//!
//! 1. `\r\n` and lone `\r` become `\n`.
//! 2. Runs of spaces and tabs collapse to a single space.
//! 3. Lines holding only whitespace become empty, and consecutive empty
//!    lines collapse to one.
//! 4. Leading and trailing whitespace is trimmed.
//!
//! # Example
//!
//! ```
//! use wayfinder_diff::normalize::normalize_whitespace;
//!
//! assert_eq!(
//!     normalize_whitespace("  one\t\ttwo\r\n\r\n \r\nthree  "),
//!     "one two\n\nthree"
//! );
//! ```

/// Normalize `text` for comparison.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let unified = unify_line_endings(text);
    let mut out = String::with_capacity(unified.len());
    let mut previous_blank = false;

    for (index, line) in unified.split('\n').enumerate() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        if index > 0 {
            out.push('\n');
        }
        if !blank {
            collapse_spaces_into(line, &mut out);
        }
        previous_blank = blank;
    }

    out.trim().to_owned()
}

fn unify_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

fn collapse_spaces_into(line: &str, out: &mut String) {
    let mut in_run = false;
    for c in line.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_are_unified() {
        assert_eq!(normalize_whitespace("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn spaces_and_tabs_collapse() {
        assert_eq!(normalize_whitespace("a \t  b\t\tc"), "a b c");
    }

    #[test]
    fn blank_lines_collapse_to_one() {
        assert_eq!(normalize_whitespace("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n  \n\t\nb"), "a\n\nb");
    }

    #[test]
    fn ends_are_trimmed() {
        assert_eq!(normalize_whitespace("\n\n  hello  \n\n"), "hello");
        assert_eq!(normalize_whitespace(" \t\r\n "), "");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn idempotent() {
        let once = normalize_whitespace("x  y\r\n\r\n\r\nz\t");
        assert_eq!(normalize_whitespace(&once), once);
    }
}
