#![forbid(unsafe_code)]

//! Two-cursor alignment with bounded lookahead.
//!
//! The aligner walks both token sequences left to right. On a mismatch it
//! looks up to `lookahead` tokens ahead, first in the new sequence for the
//! current old token (an insertion), then in the old sequence for the
//! current new token (a deletion). When neither window holds a match the
//! pair is treated as a substitution.
//!
//! This is linear in the input length times the window size. It is not a
//! minimal edit script: changes wider than the window surface as
//! substitutions rather than as a shifted match.

use crate::run::{DiffRun, RunBuilder, RunKind};
use crate::token::Token;

/// Align `old` against `new`, returning coalesced runs.
///
/// `same` runs carry the text of the new side.
#[must_use]
pub fn align(old: &[Token<'_>], new: &[Token<'_>], lookahead: usize) -> Vec<DiffRun> {
    let mut out = RunBuilder::default();
    let (mut oi, mut ni) = (0, 0);

    loop {
        match (old.get(oi), new.get(ni)) {
            (None, None) => break,
            (None, Some(_)) => {
                out.push_all(RunKind::Added, new[ni..].iter().map(|t| t.text));
                break;
            }
            (Some(_), None) => {
                out.push_all(RunKind::Removed, old[oi..].iter().map(|t| t.text));
                break;
            }
            (Some(o), Some(n)) if o.key == n.key => {
                out.push(RunKind::Same, n.text);
                oi += 1;
                ni += 1;
            }
            (Some(o), Some(n)) => {
                if let Some(found) = find_ahead(new, ni, o.key, lookahead) {
                    out.push_all(RunKind::Added, new[ni..found].iter().map(|t| t.text));
                    ni = found;
                } else if let Some(found) = find_ahead(old, oi, n.key, lookahead) {
                    out.push_all(RunKind::Removed, old[oi..found].iter().map(|t| t.text));
                    oi = found;
                } else {
                    out.push(RunKind::Removed, o.text);
                    out.push(RunKind::Added, n.text);
                    oi += 1;
                    ni += 1;
                }
            }
        }
    }

    out.finish()
}

/// Index of the first token in `cursor+1 ..= cursor+window` whose key is `key`.
fn find_ahead(tokens: &[Token<'_>], cursor: usize, key: &str, window: usize) -> Option<usize> {
    let end = cursor.saturating_add(window).saturating_add(1).min(tokens.len());
    let start = (cursor + 1).min(end);
    tokens[start..end]
        .iter()
        .position(|t| t.key == key)
        .map(|offset| start + offset)
}
