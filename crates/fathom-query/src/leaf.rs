//! Leaf clause construction.
//!
//! The grammar is dialect-neutral: everything token-shaped that becomes a
//! tree leaf goes through [`LeafBuilder`], so a different query dialect
//! only needs a different builder, not a different grammar.

use crate::{
    analysis::Analyzer,
    ast::QueryNode,
    config::ParserConfig,
    datetools,
    error::QueryParseError,
    escape,
};

/// Edit budget used when `~` carries no value.
pub const DEFAULT_MAX_EDITS: u8 = 2;

/// The payload of a `~` suffix on a word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fuzziness {
    /// `term~`: the default edit budget.
    Default,
    /// `term~0.7`: a legacy similarity in `[0, 1]`.
    Similarity(f32),
}

/// Builds leaf query nodes from raw token text.
///
/// `raw` arguments keep their escape sequences; builders resolve them.
/// `Ok(None)` means analysis discarded the leaf entirely; the caller prunes
/// it from the enclosing group.
pub trait LeafBuilder {
    /// Builds a leaf from a bare word, with an optional fuzzy suffix.
    fn word(
        &self,
        field: &str,
        raw: &str,
        fuzzy: Option<Fuzziness>,
    ) -> Result<Option<QueryNode>, QueryParseError>;

    /// Builds a leaf from a quoted phrase, with an optional slop suffix.
    fn phrase(
        &self,
        field: &str,
        raw: &str,
        slop: Option<f32>,
    ) -> Result<Option<QueryNode>, QueryParseError>;

    /// Builds a range leaf from endpoint text.
    fn range(
        &self,
        field: &str,
        lower: &str,
        upper: &str,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Result<Option<QueryNode>, QueryParseError>;
}

/// The standard dialect: analysis-driven terms and phrases, wildcard and
/// prefix classification, legacy fuzzy similarity mapping, and date-aware
/// ranges.
pub struct TextLeafBuilder<'a, A> {
    /// External analysis, invoked for plain words and phrase content.
    analyzer: &'a A,
    /// Configuration snapshot for the current parse.
    config: &'a ParserConfig,
}

impl<'a, A: Analyzer> TextLeafBuilder<'a, A> {
    /// Creates a builder over an analyzer and a configuration snapshot.
    pub fn new(analyzer: &'a A, config: &'a ParserConfig) -> Self {
        Self { analyzer, config }
    }

    /// Unescapes expanded-term text, lowercasing when configured.
    ///
    /// Wildcard, prefix, fuzzy, and range text bypasses analysis, so the
    /// lowercase flag is the only case folding it ever sees.
    fn expanded_text(&self, raw: &str) -> String {
        let text = escape::unescape(raw);
        if self.config.lowercase_expanded_terms() {
            text.to_lowercase()
        } else {
            text
        }
    }

    /// Runs analysis over literal text and shapes the result.
    ///
    /// Zero output terms prune the leaf; one builds a `Term`; several build
    /// an ordered `Phrase` (one source unit expanded in place, not a
    /// disjunction).
    fn analyzed(&self, field: &str, text: &str, slop: u32) -> Option<QueryNode> {
        let mut terms = self.analyzer.analyze(field, text);
        match terms.len() {
            0 => None,
            1 => Some(QueryNode::term(field, terms.remove(0).text)),
            _ => Some(QueryNode::phrase(
                field,
                terms.into_iter().map(|t| t.text).collect(),
                slop,
            )),
        }
    }
}

impl<A: Analyzer> LeafBuilder for TextLeafBuilder<'_, A> {
    fn word(
        &self,
        field: &str,
        raw: &str,
        fuzzy: Option<Fuzziness>,
    ) -> Result<Option<QueryNode>, QueryParseError> {
        if let Some(fuzzy) = fuzzy {
            let max_edits = match fuzzy {
                Fuzziness::Default => DEFAULT_MAX_EDITS,
                Fuzziness::Similarity(similarity) => similarity_to_edits(similarity)?,
            };
            return Ok(Some(QueryNode::Fuzzy {
                field: field.into(),
                text: self.expanded_text(raw),
                max_edits,
                prefix_length: self.config.fuzzy_prefix_length(),
            }));
        }

        if escape::has_unescaped_wildcard(raw) {
            let pattern = self.expanded_text(raw);
            if escape::is_prefix_pattern(raw) {
                let mut prefix = pattern;
                prefix.pop();
                return Ok(Some(QueryNode::Prefix {
                    field: field.into(),
                    prefix,
                }));
            }
            return Ok(Some(QueryNode::Wildcard {
                field: field.into(),
                pattern,
            }));
        }

        Ok(self.analyzed(field, &escape::unescape(raw), 0))
    }

    fn phrase(
        &self,
        field: &str,
        raw: &str,
        slop: Option<f32>,
    ) -> Result<Option<QueryNode>, QueryParseError> {
        let slop = slop.map_or(0, |s| s.max(0.0) as u32);
        Ok(self.analyzed(field, &escape::unescape(raw), slop))
    }

    fn range(
        &self,
        field: &str,
        lower: &str,
        upper: &str,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Result<Option<QueryNode>, QueryParseError> {
        let lower = escape::unescape(lower);
        let upper = escape::unescape(upper);

        if let Some(resolution) = self.config.resolution_for_field(field) {
            let endpoints = (
                datetools::parse_short_date(&lower),
                datetools::parse_short_date(&upper),
            );
            if let (Some(lower_date), Some(upper_date)) = endpoints {
                // an inclusive upper bound covers its whole final period
                let upper_ts = if upper_inclusive {
                    datetools::end_of_day(upper_date)
                } else {
                    datetools::start_of_day(upper_date)
                };
                return Ok(Some(QueryNode::Range {
                    field: field.into(),
                    lower: datetools::date_to_string(
                        datetools::start_of_day(lower_date),
                        resolution,
                    ),
                    upper: datetools::date_to_string(upper_ts, resolution),
                    lower_inclusive,
                    upper_inclusive,
                }));
            }
        }

        // endpoints that are not dates fall back to plain strings
        let (lower, upper) = if self.config.lowercase_expanded_terms() {
            (lower.to_lowercase(), upper.to_lowercase())
        } else {
            (lower, upper)
        };
        Ok(Some(QueryNode::Range {
            field: field.into(),
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }))
    }
}

/// Maps a legacy similarity in `[0, 1]` to an edit budget.
///
/// `0.0` maps to 2, `0.7` to 1, `1.0` to 0. Values outside the legal range
/// are rejected, never clamped.
fn similarity_to_edits(similarity: f32) -> Result<u8, QueryParseError> {
    if !(0.0..=1.0).contains(&similarity) {
        return Err(QueryParseError::InvalidSimilarity(similarity));
    }
    let edits = (2.0 * (1.0 - similarity)).round() as u8;
    Ok(edits.min(DEFAULT_MAX_EDITS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LetterAnalyzer, WhitespaceAnalyzer};
    use crate::datetools::Resolution;

    fn build<'a, A: Analyzer>(analyzer: &'a A, config: &'a ParserConfig) -> TextLeafBuilder<'a, A> {
        TextLeafBuilder::new(analyzer, config)
    }

    #[test]
    fn plain_word_becomes_term() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config).word("f", "Hello", None).unwrap();
        assert_eq!(node, Some(QueryNode::term("f", "hello")));
    }

    #[test]
    fn discarded_word_prunes() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config).word("f", "42", None).unwrap();
        assert_eq!(node, None);
    }

    #[test]
    fn split_word_becomes_ordered_phrase() {
        // the letter analyzer splits "wi-fi" at the hyphen
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config).word("f", "wi-fi", None).unwrap();
        assert_eq!(
            node,
            Some(QueryNode::phrase("f", vec!["wi".into(), "fi".into()], 0))
        );
    }

    #[test]
    fn fuzzy_defaults_to_two_edits() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config)
            .word("f", "term", Some(Fuzziness::Default))
            .unwrap();
        assert_eq!(
            node,
            Some(QueryNode::Fuzzy {
                field: "f".into(),
                text: "term".into(),
                max_edits: 2,
                prefix_length: 0,
            })
        );
    }

    #[test]
    fn similarity_mapping() {
        assert_eq!(similarity_to_edits(0.0).unwrap(), 2);
        assert_eq!(similarity_to_edits(0.7).unwrap(), 1);
        assert_eq!(similarity_to_edits(1.0).unwrap(), 0);
    }

    #[test]
    fn similarity_above_one_is_rejected() {
        let err = similarity_to_edits(1.1).unwrap_err();
        assert!(matches!(err, QueryParseError::InvalidSimilarity(_)));

        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let err = build(&analyzer, &config)
            .word("f", "term", Some(Fuzziness::Similarity(2.0)))
            .unwrap_err();
        assert!(matches!(err, QueryParseError::InvalidSimilarity(_)));
    }

    #[test]
    fn fuzzy_respects_prefix_length_and_lowercase() {
        let analyzer = LetterAnalyzer;
        let mut config = ParserConfig::new();
        config.set_fuzzy_prefix_length(3);
        let node = build(&analyzer, &config)
            .word("f", "Term", Some(Fuzziness::Default))
            .unwrap();
        assert_eq!(
            node,
            Some(QueryNode::Fuzzy {
                field: "f".into(),
                text: "term".into(),
                max_edits: 2,
                prefix_length: 3,
            })
        );

        config.set_lowercase_expanded_terms(false);
        let node = build(&analyzer, &config)
            .word("f", "Term", Some(Fuzziness::Default))
            .unwrap();
        assert!(matches!(node, Some(QueryNode::Fuzzy { text, .. }) if text == "Term"));
    }

    #[test]
    fn trailing_star_builds_prefix() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config).word("f", "Term*", None).unwrap();
        assert_eq!(
            node,
            Some(QueryNode::Prefix {
                field: "f".into(),
                prefix: "term".into(),
            })
        );
    }

    #[test]
    fn inner_wildcards_build_wildcard() {
        let analyzer = LetterAnalyzer;
        let mut config = ParserConfig::new();
        config.set_lowercase_expanded_terms(false);
        let builder = build(&analyzer, &config);

        let node = builder.word("f", "Te?m*gerM", None).unwrap();
        assert_eq!(
            node,
            Some(QueryNode::Wildcard {
                field: "f".into(),
                pattern: "Te?m*gerM".into(),
            })
        );

        // two stars disqualify the prefix form
        let node = builder.word("f", "te*m*", None).unwrap();
        assert!(matches!(node, Some(QueryNode::Wildcard { .. })));
    }

    #[test]
    fn escaped_wildcards_are_literal_text() {
        let analyzer = WhitespaceAnalyzer::new(false);
        let config = ParserConfig::new();
        let builder = build(&analyzer, &config);

        // no live wildcard left: analysis path
        let node = builder.word("f", r"te\*t", None).unwrap();
        assert_eq!(node, Some(QueryNode::term("f", "te*t")));

        // live trailing star plus an escaped one inside
        let node = builder.word("f", r"te\*t*", None).unwrap();
        assert_eq!(
            node,
            Some(QueryNode::Prefix {
                field: "f".into(),
                prefix: "te*t".into(),
            })
        );
    }

    #[test]
    fn phrase_shapes() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let builder = build(&analyzer, &config);

        // several terms: a phrase with slop
        let node = builder.phrase("f", "term germ", Some(2.0)).unwrap();
        assert_eq!(
            node,
            Some(QueryNode::phrase(
                "f",
                vec!["term".into(), "germ".into()],
                2
            ))
        );

        // one term: degrades to a term, slop dropped
        let node = builder.phrase("f", "term", Some(2.0)).unwrap();
        assert_eq!(node, Some(QueryNode::term("f", "term")));

        // nothing left: pruned
        let node = builder.phrase("f", " ", Some(2.0)).unwrap();
        assert_eq!(node, None);
    }

    #[test]
    fn fractional_slop_truncates() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config)
            .phrase("f", "term germ", Some(2.9))
            .unwrap();
        assert!(matches!(node, Some(QueryNode::Phrase { slop: 2, .. })));
    }

    #[test]
    fn lexicographic_range_lowercases_by_default() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config)
            .range("f", "A", "C", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(node.to_query_string("f"), "[a TO c]");

        let mut config = ParserConfig::new();
        config.set_lowercase_expanded_terms(false);
        let node = build(&analyzer, &config)
            .range("f", "A", "C", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(node.to_query_string("f"), "[A TO C]");
    }

    #[test]
    fn date_range_encodes_at_field_resolution() {
        let analyzer = LetterAnalyzer;
        let mut config = ParserConfig::new();
        config.set_default_date_resolution(Some(Resolution::Day));
        let node = build(&analyzer, &config)
            .range("f", "1/1/2002", "1/4/2002", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(node.to_query_string("f"), "[20020101 TO 20020104]");
    }

    #[test]
    fn inclusive_upper_bound_extends_to_end_of_day() {
        let analyzer = LetterAnalyzer;
        let mut config = ParserConfig::new();
        config.set_default_date_resolution(Some(Resolution::Millisecond));
        let builder = build(&analyzer, &config);

        let node = builder
            .range("f", "1/1/2002", "1/4/2002", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(
            node.to_query_string("f"),
            "[20020101000000000 TO 20020104235959999]"
        );

        // exclusive upper bound stays at midnight
        let node = builder
            .range("f", "1/1/2002", "1/4/2002", true, false)
            .unwrap()
            .unwrap();
        assert_eq!(
            node.to_query_string("f"),
            "[20020101000000000 TO 20020104000000000}"
        );
    }

    #[test]
    fn date_like_endpoints_without_resolution_stay_literal() {
        let analyzer = LetterAnalyzer;
        let config = ParserConfig::new();
        let node = build(&analyzer, &config)
            .range("f", "1/1/2002", "1/4/2002", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(node.to_query_string("f"), "[1/1/2002 TO 1/4/2002]");
    }

    #[test]
    fn half_date_range_falls_back_to_strings() {
        let analyzer = LetterAnalyzer;
        let mut config = ParserConfig::new();
        config.set_default_date_resolution(Some(Resolution::Day));
        let node = build(&analyzer, &config)
            .range("f", "1/1/2002", "zebra", true, true)
            .unwrap()
            .unwrap();
        assert_eq!(node.to_query_string("f"), "[1/1/2002 TO zebra]");
    }
}
