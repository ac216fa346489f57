//! Query parser.
//!
//! Parses a token stream into a query tree using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query     → disj+                      // adjacency, the loosest level
//! disj      → conj (("OR" | "||") conj)*
//! conj      → modclause (("AND" | "&&") modclause)*
//! modclause → ("+" | "-" | "!" | "NOT")? clause
//! clause    → primary ("^"FLOAT | "~"FLOAT?)*
//! primary   → WORD | PHRASE | WORD ":" primary | "(" query ")" | range
//! range     → ("[" | "{") endpoint "TO" endpoint ("]" | "}")
//! ```
//!
//! # Precedence (tightest to loosest)
//!
//! 1. Grouping: `(...)`
//! 2. Field prefix: `field:`
//! 3. Modifiers: `+`, `-`, `!`, `NOT`
//! 4. AND
//! 5. OR
//! 6. Adjacency (no written operator)
//!
//! `A AND B OR C AND D` therefore groups as `(A AND B) OR (C AND D)`, and
//! `A OR B C` as `(A OR B) C`. Explicit modifiers always win; unmodified
//! members are required inside an AND, optional inside an OR, and follow
//! the configured default operator when merely adjacent.

use crate::{
    analysis::Analyzer,
    ast::{Occur, QueryNode},
    config::{max_clause_count, Operator, ParserConfig},
    error::QueryParseError,
    escape,
    leaf::{Fuzziness, LeafBuilder, TextLeafBuilder},
    lexer::{tokenize, Token, TokenKind},
    normalize::{combine, finish, Clause, ClauseCounter},
};

/// Precedence-aware query parser bound to an analyzer.
///
/// Configuration setters apply to all subsequent parses on this instance;
/// each parse captures an immutable snapshot up front, so a parse in
/// flight never observes a half-applied change. Instances are independent;
/// share one across threads only behind external synchronization.
pub struct QueryParser<A> {
    /// Settings applied to every parse on this instance.
    config: ParserConfig,
    /// External text analysis.
    analyzer: A,
}

impl<A: Analyzer> QueryParser<A> {
    /// Creates a parser with default configuration.
    pub fn new(analyzer: A) -> Self {
        Self::with_config(analyzer, ParserConfig::new())
    }

    /// Creates a parser with the given configuration.
    pub fn with_config(analyzer: A, config: ParserConfig) -> Self {
        Self { config, analyzer }
    }

    /// The current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Mutable access to the configuration, for use between parses.
    pub fn config_mut(&mut self) -> &mut ParserConfig {
        &mut self.config
    }

    /// Parses a query string against a default field.
    ///
    /// Returns `Ok(None)` when analysis discards every clause (for example
    /// a query made entirely of stopwords). Errors carry the offending
    /// fragment and byte offset; no partial tree is returned.
    pub fn parse(
        &self,
        input: &str,
        default_field: &str,
    ) -> Result<Option<QueryNode>, QueryParseError> {
        let tokens = tokenize(input)?;
        let config = self.config.clone();
        let builder = TextLeafBuilder::new(&self.analyzer, &config);
        let adjacency_occur = match config.default_operator() {
            Operator::And => Occur::Must,
            Operator::Or => Occur::Should,
        };
        let parser = Parser {
            tokens,
            position: 0,
            input,
            builder: &builder,
            adjacency_occur,
            counter: ClauseCounter::new(max_clause_count()),
        };
        parser.parse(default_field)
    }
}

/// Grammar-level parser over a token stream.
struct Parser<'a, B> {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    position: usize,
    /// Original input, for error fragments.
    input: &'a str,
    /// Leaf construction for the active dialect.
    builder: &'a B,
    /// Occur given to unmodified members of adjacency groups.
    adjacency_occur: Occur,
    /// Running clause total for this parse.
    counter: ClauseCounter,
}

impl<B: LeafBuilder> Parser<'_, B> {
    /// Parses the whole token stream.
    fn parse(mut self, default_field: &str) -> Result<Option<QueryNode>, QueryParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let clause = self.parse_adjacent(default_field)?;

        if let Some(token) = self.peek() {
            let kind = token.kind.clone();
            return Err(self.error_here(format!("unexpected {}", describe(&kind))));
        }

        finish(clause, &mut self.counter)
    }

    /// Parses: query → disj+
    fn parse_adjacent(&mut self, field: &str) -> Result<Clause, QueryParseError> {
        let mut clauses = vec![self.parse_disj(field)?];

        while self.at_clause_start() {
            clauses.push(self.parse_disj(field)?);
        }

        combine(clauses, self.adjacency_occur, &mut self.counter)
    }

    /// Parses: disj → conj (OR conj)*
    fn parse_disj(&mut self, field: &str) -> Result<Clause, QueryParseError> {
        let mut clauses = vec![self.parse_conj(field)?];

        while self.eat(|kind| matches!(kind, TokenKind::Or)) {
            clauses.push(self.parse_conj(field)?);
        }

        combine(clauses, Occur::Should, &mut self.counter)
    }

    /// Parses: conj → modclause (AND modclause)*
    fn parse_conj(&mut self, field: &str) -> Result<Clause, QueryParseError> {
        let mut clauses = vec![self.parse_modclause(field)?];

        while self.eat(|kind| matches!(kind, TokenKind::And)) {
            clauses.push(self.parse_modclause(field)?);
        }

        combine(clauses, Occur::Must, &mut self.counter)
    }

    /// Parses: modclause → modifier? clause
    fn parse_modclause(&mut self, field: &str) -> Result<Clause, QueryParseError> {
        let modifier = match self.peek_kind() {
            Some(TokenKind::Plus) => {
                self.advance();
                Some(Occur::Must)
            }
            Some(TokenKind::Minus | TokenKind::Bang | TokenKind::Not) => {
                self.advance();
                Some(Occur::MustNot)
            }
            _ => None,
        };

        let mut clause = self.parse_primary(field, true)?;
        if modifier.is_some() {
            clause.occur = modifier;
        }
        Ok(clause)
    }

    /// Parses a primary expression with its suffixes.
    ///
    /// `allow_field` is cleared after a field prefix so `a:b:c` fails
    /// instead of silently rescoping.
    fn parse_primary(&mut self, field: &str, allow_field: bool) -> Result<Clause, QueryParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("unexpected end of query"));
        };

        match token.kind.clone() {
            TokenKind::Word(word) => {
                if allow_field && matches!(self.peek_kind_at(1), Some(TokenKind::Colon)) {
                    self.advance(); // field name
                    self.advance(); // colon
                    let scoped = escape::unescape(&word);
                    return self.parse_primary(&scoped, false);
                }
                self.advance();
                let (tilde, boost) = self.read_suffixes();
                let fuzzy = tilde.map(|value| match value {
                    None => Fuzziness::Default,
                    Some(similarity) => Fuzziness::Similarity(similarity),
                });
                let node = self.builder.word(field, &word, fuzzy)?;
                Ok(boosted(node, None, boost))
            }

            TokenKind::Phrase(content) => {
                self.advance();
                let (tilde, boost) = self.read_suffixes();
                let slop = tilde.map(|value| value.unwrap_or(0.0));
                let node = self.builder.phrase(field, &content, slop)?;
                Ok(boosted(node, None, boost))
            }

            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_adjacent(field)?;
                if !self.eat(|kind| matches!(kind, TokenKind::RParen)) {
                    return Err(self.error_here("expected closing parenthesis"));
                }
                let boost = self.read_boost();
                Ok(boosted(inner.node, inner.occur, boost))
            }

            TokenKind::RangeOpen { inclusive } => self.parse_range(field, inclusive),

            other => Err(self.error_here(format!("unexpected {}", describe(&other)))),
        }
    }

    /// Parses: range → open endpoint TO endpoint close
    fn parse_range(&mut self, field: &str, lower_inclusive: bool) -> Result<Clause, QueryParseError> {
        self.advance(); // opening bracket

        let lower = self.range_endpoint()?;

        if !self.eat(|kind| matches!(kind, TokenKind::RangeTo)) {
            return Err(self.range_error_here("expected TO between range endpoints"));
        }

        let upper = self.range_endpoint()?;

        let upper_inclusive = match self.peek_kind() {
            Some(&TokenKind::RangeClose { inclusive }) => {
                self.advance();
                inclusive
            }
            _ => return Err(self.range_error_here("expected closing range bracket")),
        };

        let boost = self.read_boost();
        let node = self
            .builder
            .range(field, &lower, &upper, lower_inclusive, upper_inclusive)?;
        Ok(boosted(node, None, boost))
    }

    /// Reads one range endpoint: a word or a quoted string.
    fn range_endpoint(&mut self) -> Result<String, QueryParseError> {
        match self.peek_kind() {
            Some(TokenKind::Word(text) | TokenKind::Phrase(text)) => {
                let text = text.clone();
                self.advance();
                Ok(text)
            }
            _ => Err(self.range_error_here("expected range endpoint")),
        }
    }

    /// Reads trailing `~`/`^` suffixes in either order, at most one each.
    fn read_suffixes(&mut self) -> (Option<Option<f32>>, Option<f32>) {
        let mut tilde = None;
        let mut boost = None;

        loop {
            match self.peek_kind() {
                Some(&TokenKind::Tilde(value)) if tilde.is_none() => {
                    tilde = Some(value);
                    self.advance();
                }
                Some(&TokenKind::Caret(factor)) if boost.is_none() => {
                    boost = Some(factor);
                    self.advance();
                }
                _ => break,
            }
        }

        (tilde, boost)
    }

    /// Reads an optional trailing boost.
    fn read_boost(&mut self) -> Option<f32> {
        match self.peek_kind() {
            Some(&TokenKind::Caret(factor)) => {
                self.advance();
                Some(factor)
            }
            _ => None,
        }
    }

    /// Whether the current token can start a clause.
    fn at_clause_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Word(_)
                    | TokenKind::Phrase(_)
                    | TokenKind::LParen
                    | TokenKind::RangeOpen { .. }
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Bang
                    | TokenKind::Not
            )
        )
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Returns the current token kind without consuming it.
    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// Returns the token kind `offset` tokens ahead.
    fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.position + offset).map(|t| &t.kind)
    }

    /// Consumes the current token if its kind matches.
    fn eat(&mut self, matches: impl Fn(&TokenKind) -> bool) -> bool {
        if self.peek_kind().is_some_and(matches) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Builds a syntax error at the current token.
    fn error_here(&self, message: impl Into<String>) -> QueryParseError {
        match self.peek() {
            Some(token) => QueryParseError::syntax(
                message,
                token.start,
                &self.input[token.start..token.end],
            ),
            None => QueryParseError::syntax(message, self.input.len(), ""),
        }
    }

    /// Builds a malformed-range error at the current token.
    fn range_error_here(&self, message: impl Into<String>) -> QueryParseError {
        let position = self.peek().map_or(self.input.len(), |t| t.start);
        QueryParseError::range(message, position)
    }
}

/// Applies an optional boost to a built node, keeping its modifier.
fn boosted(node: Option<QueryNode>, occur: Option<Occur>, boost: Option<f32>) -> Clause {
    let node = match (node, boost) {
        (Some(node), Some(factor)) => Some(QueryNode::boost(node, factor)),
        (node, _) => node,
    };
    Clause { node, occur }
}

/// Short description of a token kind for error messages.
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Word(word) => format!("word {word:?}"),
        TokenKind::Phrase(_) => "phrase".into(),
        TokenKind::And => "AND (needs an expression before it)".into(),
        TokenKind::Or => "OR (needs an expression before it)".into(),
        TokenKind::Not => "NOT".into(),
        TokenKind::Bang => "'!'".into(),
        TokenKind::Plus => "'+'".into(),
        TokenKind::Minus => "'-'".into(),
        TokenKind::Colon => "':'".into(),
        TokenKind::LParen => "'('".into(),
        TokenKind::RParen => "closing parenthesis".into(),
        TokenKind::Caret(_) => "boost (needs an expression before it)".into(),
        TokenKind::Tilde(_) => "fuzzy suffix (needs a term before it)".into(),
        TokenKind::RangeOpen { .. } => "range bracket".into(),
        TokenKind::RangeClose { .. } => "range bracket".into(),
        TokenKind::RangeTo => "TO".into(),
    }
}
