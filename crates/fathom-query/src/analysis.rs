//! The text-analysis contract the parser consumes.
//!
//! Analysis is an external concern; the parser only needs "given a field
//! name and raw text, produce the output terms in order". An analyzer may
//! legitimately produce zero terms (the input was discarded, e.g. a
//! stopword) or several (one input unit split or expanded), and the parser
//! never assumes one output per input.
//!
//! Two small reference analyzers are provided for hosts that do not bring
//! their own pipeline; production backends adapt a real tokenizer chain to
//! [`Analyzer`].

/// A single term produced by analysis, with byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedTerm {
    /// The output term text.
    pub text: String,
    /// Byte offset of the first source character.
    pub start: usize,
    /// Byte offset one past the last source character.
    pub end: usize,
}

impl AnalyzedTerm {
    /// Creates a term with its source span.
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Turns raw field text into zero or more indexable terms.
pub trait Analyzer {
    /// Analyzes `text` for `field`, returning output terms in order.
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedTerm>;
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, field: &str, text: &str) -> Vec<AnalyzedTerm> {
        (**self).analyze(field, text)
    }
}

/// Splits on whitespace, optionally lowercasing.
///
/// Keeps digits and punctuation intact, so `1.0` and `.NET` survive as
/// single terms.
#[derive(Debug, Clone, Copy)]
pub struct WhitespaceAnalyzer {
    /// Whether output terms are lowercased.
    lowercase: bool,
}

impl WhitespaceAnalyzer {
    /// Creates a whitespace analyzer.
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }
}

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedTerm> {
        split_runs(text, |ch| !ch.is_whitespace(), self.lowercase)
    }
}

/// Splits on anything that is not a letter and lowercases.
///
/// Digits and punctuation are separators and never appear in output, so a
/// purely numeric input analyzes to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LetterAnalyzer;

impl Analyzer for LetterAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedTerm> {
        split_runs(text, char::is_alphabetic, true)
    }
}

/// Collects maximal runs of characters accepted by `keep`.
fn split_runs(text: &str, keep: impl Fn(char) -> bool, lowercase: bool) -> Vec<AnalyzedTerm> {
    let mut terms = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, ch) in text.char_indices() {
        if keep(ch) {
            run_start.get_or_insert(index);
        } else if let Some(start) = run_start.take() {
            terms.push(make_term(&text[start..index], start, index, lowercase));
        }
    }
    if let Some(start) = run_start {
        terms.push(make_term(&text[start..], start, text.len(), lowercase));
    }

    terms
}

/// Builds one output term, lowercasing if requested.
fn make_term(run: &str, start: usize, end: usize, lowercase: bool) -> AnalyzedTerm {
    let text = if lowercase {
        run.to_lowercase()
    } else {
        run.to_string()
    };
    AnalyzedTerm::new(text, start, end)
}
