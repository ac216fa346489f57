//! Tantivy-backed text analysis for fathom query parsing.
//!
//! Adapts Tantivy's tokenizer pipeline to the [`fathom_query::Analyzer`]
//! contract, so leaf terms in parsed queries go through the same analysis
//! chain an index would apply at ingest time:
//!
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `LowerCaser` - normalizes tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 4. `Stemmer` - applies language-specific stemming
//!
//! # Example
//!
//! ```
//! use fathom_analysis::StemmingAnalyzer;
//! use fathom_query::QueryParser;
//!
//! let parser = QueryParser::new(StemmingAnalyzer::from_name("english").unwrap());
//! let tree = parser.parse("title:\"error handling\"", "body").unwrap().unwrap();
//! assert_eq!(tree.to_query_string("body"), "title:\"error handl\"");
//! ```

#![warn(missing_docs)]

use fathom_query::{AnalyzedTerm, Analyzer};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer, TokenStream,
};
use thiserror::Error;

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Errors from building an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The stemmer language name was not recognized.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),
}

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Accepts the lowercase names of Tantivy's `Language` enum, case
/// insensitively.
pub fn parse_language(name: &str) -> Result<Language, AnalysisError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(AnalysisError::InvalidLanguage(other.to_string())),
    }
}

/// Text analysis through Tantivy's tokenize/lowercase/filter/stem chain.
///
/// The same analyzer serves every field; build one per field set if fields
/// need different languages and dispatch on the field name in a wrapper.
#[derive(Clone)]
pub struct StemmingAnalyzer {
    /// The underlying Tantivy pipeline.
    analyzer: TextAnalyzer,
}

impl StemmingAnalyzer {
    /// Creates an analyzer stemming for the given language.
    pub fn new(language: Language) -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
            .filter(Stemmer::new(language))
            .build();
        Self { analyzer }
    }

    /// Creates an analyzer from a language name string.
    pub fn from_name(language_name: &str) -> Result<Self, AnalysisError> {
        Ok(Self::new(parse_language(language_name)?))
    }
}

impl Analyzer for StemmingAnalyzer {
    fn analyze(&self, _field: &str, text: &str) -> Vec<AnalyzedTerm> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();

        while let Some(token) = stream.next() {
            terms.push(AnalyzedTerm::new(
                token.text.clone(),
                token.offset_from,
                token.offset_to,
            ));
        }

        terms
    }
}
