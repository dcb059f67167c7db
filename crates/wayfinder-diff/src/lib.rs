#![forbid(unsafe_code)]

//! Diff: token-level change lists for two versions of a text.
//!
//! # Role in wayfinder
//! `wayfinder-diff` backs the content editor's "what changed" view. It is
//! independent of the tour engine and has no required dependencies beyond
//! grapheme segmentation for excerpts.
//!
//! # Pipeline
//! 1. [`normalize_whitespace`](normalize::normalize_whitespace) on both sides.
//! 2. Equal after normalization: a single [`RunKind::NoChanges`] run.
//! 3. [`tokenize`](token::tokenize) per [`Granularity`].
//! 4. [`align`](align::align) with the granularity's lookahead window.
//! 5. Render with [`DiffRun::display_text`], which excerpts long unchanged runs.
//!
//! # Example
//!
//! ```
//! use wayfinder_diff::{diff, DiffRun, Granularity, RunKind};
//!
//! let report = diff("A B C", "A X B C", Granularity::Word);
//! assert_eq!(
//!     report.runs,
//!     vec![
//!         DiffRun::new(RunKind::Same, "A "),
//!         DiffRun::new(RunKind::Added, "X "),
//!         DiffRun::new(RunKind::Same, "B C"),
//!     ]
//! );
//! assert_eq!(report.summary.added_chars, 2);
//! ```

pub mod align;
pub mod normalize;
pub mod run;
pub mod token;

use std::borrow::Cow;

pub use normalize::normalize_whitespace;
pub use run::{DiffRun, RunKind};
pub use token::{Granularity, Token, tokenize};

/// Tuning for [`diff_with`]. Unset fields use the granularity's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    pub granularity: Granularity,
    pub lookahead: Option<usize>,
    pub excerpt_threshold: Option<usize>,
}

impl DiffOptions {
    #[must_use]
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn lookahead(mut self, tokens: usize) -> Self {
        self.lookahead = Some(tokens);
        self
    }

    #[must_use]
    pub fn excerpt_threshold(mut self, chars: usize) -> Self {
        self.excerpt_threshold = Some(chars);
        self
    }

    fn effective_lookahead(&self) -> usize {
        self.lookahead
            .unwrap_or_else(|| self.granularity.lookahead())
    }

    fn effective_threshold(&self) -> usize {
        self.excerpt_threshold
            .unwrap_or_else(|| self.granularity.excerpt_threshold())
    }
}

/// Character totals per classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffSummary {
    pub added_chars: usize,
    pub removed_chars: usize,
    pub unchanged_chars: usize,
}

impl DiffSummary {
    fn tally(runs: &[DiffRun]) -> Self {
        runs.iter().fold(Self::default(), |mut acc, run| {
            let n = run.char_count();
            match run.kind {
                RunKind::Added => acc.added_chars += n,
                RunKind::Removed => acc.removed_chars += n,
                RunKind::Same | RunKind::NoChanges => acc.unchanged_chars += n,
            }
            acc
        })
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.added_chars > 0 || self.removed_chars > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffReport {
    pub granularity: Granularity,
    pub runs: Vec<DiffRun>,
    pub summary: DiffSummary,
    pub excerpt_threshold: usize,
}

impl DiffReport {
    /// Both sides were equal after normalization.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        matches!(self.runs.as_slice(), [run] if run.kind == RunKind::NoChanges)
    }

    /// Runs paired with their display text.
    pub fn display_runs(&self) -> impl Iterator<Item = (RunKind, Cow<'_, str>)> + '_ {
        self.runs
            .iter()
            .map(|run| (run.kind, run.display_text_with(self.excerpt_threshold)))
    }
}

/// Diff `original` against `current` with default tuning.
#[must_use]
pub fn diff(original: &str, current: &str, granularity: Granularity) -> DiffReport {
    diff_with(original, current, &DiffOptions::new(granularity))
}

#[must_use]
pub fn diff_with(original: &str, current: &str, options: &DiffOptions) -> DiffReport {
    let old = normalize_whitespace(original);
    let new = normalize_whitespace(current);

    let runs = if old == new {
        vec![DiffRun::new(RunKind::NoChanges, new)]
    } else {
        let lookahead = options.effective_lookahead();
        let old_tokens = tokenize(&old, options.granularity);
        let new_tokens = tokenize(&new, options.granularity);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            granularity = %options.granularity,
            old_tokens = old_tokens.len(),
            new_tokens = new_tokens.len(),
            lookahead,
            "aligning"
        );
        align::align(&old_tokens, &new_tokens, lookahead)
    };

    let summary = DiffSummary::tally(&runs);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        runs = runs.len(),
        added = summary.added_chars,
        removed = summary.removed_chars,
        "diff computed"
    );

    DiffReport {
        granularity: options.granularity,
        runs,
        summary,
        excerpt_threshold: options.effective_threshold(),
    }
}
