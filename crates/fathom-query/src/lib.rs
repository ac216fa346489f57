//! Precedence-aware query parsing and AST for fathom search.
//!
//! This crate turns a query string into an owned query tree:
//!
//! - **Terms**: `rust` - words run through text analysis
//! - **Phrases**: `"error handling"~2` - exact sequences with optional slop
//! - **Boolean operators**: `a AND b OR c` - with real precedence, so
//!   `A AND B OR C AND D` groups as `(A AND B) OR (C AND D)`
//! - **Modifiers**: `+required -prohibited !prohibited NOT prohibited`
//! - **Grouping**: `(a b) OR (c d)` - explicit precedence control
//! - **Fields**: `title:guide`, `title:(dog OR cat)` - scoped clauses
//! - **Wildcards**: `te?m`, `term*` - the latter matched as a prefix
//! - **Fuzzy terms**: `term~`, `term~0.7` - legacy similarity mapping
//! - **Ranges**: `created:[1/1/2002 TO 1/4/2002]` - date-aware per field
//! - **Boosting**: `rust^2.5`, `(germ term)^2.0`
//!
//! Text analysis is an external concern consumed through [`Analyzer`]; an
//! analyzer may discard a token or expand one token into several, and the
//! tree shape follows.
//!
//! # Example
//!
//! ```
//! use fathom_query::{QueryParser, WhitespaceAnalyzer};
//!
//! let parser = QueryParser::new(WhitespaceAnalyzer::new(true));
//! let tree = parser.parse("+title:(dog OR cat) -deprecated", "body").unwrap();
//! assert!(tree.is_some());
//! ```

#![warn(missing_docs)]

mod analysis;
mod ast;
mod config;
pub mod datetools;
mod error;
mod escape;
mod leaf;
mod lexer;
mod normalize;
mod parser;

pub use analysis::{AnalyzedTerm, Analyzer, LetterAnalyzer, WhitespaceAnalyzer};
pub use ast::{Occur, QueryNode};
pub use config::{
    max_clause_count, set_max_clause_count, Operator, ParserConfig, DEFAULT_MAX_CLAUSE_COUNT,
};
pub use datetools::Resolution;
pub use error::{LexError, QueryParseError};
pub use leaf::{Fuzziness, LeafBuilder, TextLeafBuilder, DEFAULT_MAX_EDITS};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::QueryParser;
