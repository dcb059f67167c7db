#![forbid(unsafe_code)]

//! Classified runs and their display excerpts.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

use crate::token::Granularity;

/// Classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RunKind {
    Same,
    Added,
    Removed,
    /// Both sides are equal after normalization. Always the only run.
    NoChanges,
}

/// A maximal stretch of identically classified tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffRun {
    pub kind: RunKind,
    pub text: String,
}

impl DiffRun {
    #[must_use]
    pub fn new(kind: RunKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Length of the run in chars.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Text to render, excerpted per the granularity's threshold.
    #[must_use]
    pub fn display_text(&self, granularity: Granularity) -> Cow<'_, str> {
        self.display_text_with(granularity.excerpt_threshold())
    }

    /// Text to render. A `same` run longer than `threshold` chars keeps its
    /// first and last `threshold / 5` graphemes around an omission marker.
    #[must_use]
    pub fn display_text_with(&self, threshold: usize) -> Cow<'_, str> {
        if self.kind != RunKind::Same || self.char_count() <= threshold {
            return Cow::Borrowed(&self.text);
        }
        excerpt(&self.text, threshold / 5)
    }
}

fn excerpt(text: &str, keep: usize) -> Cow<'_, str> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if keep == 0 || graphemes.len() <= keep * 2 {
        return Cow::Borrowed(text);
    }
    let head = graphemes[..keep].concat();
    let tail = graphemes[graphemes.len() - keep..].concat();
    let omitted = text.chars().count() - head.chars().count() - tail.chars().count();
    Cow::Owned(format!("{head}… [{omitted} chars omitted] …{tail}"))
}

/// Accumulates classified fragments, merging neighbours of the same kind.
#[derive(Debug, Default)]
pub(crate) struct RunBuilder {
    runs: Vec<DiffRun>,
}

impl RunBuilder {
    pub(crate) fn push(&mut self, kind: RunKind, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => self.runs.push(DiffRun::new(kind, text)),
        }
    }

    pub(crate) fn push_all<'a>(&mut self, kind: RunKind, texts: impl IntoIterator<Item = &'a str>) {
        for text in texts {
            self.push(kind, text);
        }
    }

    pub(crate) fn finish(self) -> Vec<DiffRun> {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_merges_neighbours() {
        let mut builder = RunBuilder::default();
        builder.push(RunKind::Same, "a ");
        builder.push(RunKind::Same, "b ");
        builder.push(RunKind::Added, "");
        builder.push(RunKind::Added, "c");
        builder.push(RunKind::Same, " d");
        assert_eq!(
            builder.finish(),
            vec![
                DiffRun::new(RunKind::Same, "a b "),
                DiffRun::new(RunKind::Added, "c"),
                DiffRun::new(RunKind::Same, " d"),
            ]
        );
    }

    #[test]
    fn short_runs_display_in_full() {
        let run = DiffRun::new(RunKind::Same, "x".repeat(200));
        assert_eq!(run.display_text(Granularity::Word).len(), 200);
    }

    #[test]
    fn long_same_run_is_excerpted() {
        let text = format!("{}{}", "a".repeat(300), "b".repeat(300));
        let run = DiffRun::new(RunKind::Same, text);
        let shown = run.display_text(Granularity::Sentence);
        assert_eq!(
            shown,
            format!("{}… [520 chars omitted] …{}", "a".repeat(40), "b".repeat(40))
        );
        assert_eq!(run.char_count(), 600);
    }

    #[test]
    fn changed_runs_are_never_excerpted() {
        let run = DiffRun::new(RunKind::Added, "z".repeat(5000));
        assert!(matches!(run.display_text(Granularity::Line), Cow::Borrowed(_)));
    }

    #[test]
    fn excerpt_respects_grapheme_clusters() {
        let cluster = "e\u{301}";
        let run = DiffRun::new(RunKind::Same, cluster.repeat(120));
        let shown = run.display_text_with(100);
        assert!(shown.starts_with(&cluster.repeat(20)));
        assert!(shown.ends_with(&cluster.repeat(20)));
        assert!(shown.contains("[160 chars omitted]"));
    }
}
