//! Query abstract syntax tree.
//!
//! The parser's sole output: an owned, immutable tree with no sharing and
//! no back-references, safe to hand across threads once built.

use std::fmt;

/// Whether a boolean sub-clause is required, prohibited, or optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause must not match.
    MustNot,
    /// The clause is optional but contributes to scoring.
    Should,
}

impl Occur {
    /// The prefix this occur renders as (`+`, `-`, or nothing).
    fn prefix(self) -> &'static str {
        match self {
            Self::Must => "+",
            Self::MustNot => "-",
            Self::Should => "",
        }
    }
}

/// A node in the parsed query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A single term scoped to a field.
    Term {
        /// Field to match against.
        field: String,
        /// The analyzed term text.
        text: String,
    },

    /// An ordered sequence of terms matched as a phrase.
    Phrase {
        /// Field to match against.
        field: String,
        /// Phrase terms in position order.
        terms: Vec<String>,
        /// Maximum allowed position distance between terms.
        slop: u32,
    },

    /// A wildcard pattern (`*` matches any run, `?` one character).
    Wildcard {
        /// Field to match against.
        field: String,
        /// The pattern, with one level of input escaping removed.
        pattern: String,
    },

    /// A trailing-`*`-only wildcard, represented as a plain prefix.
    Prefix {
        /// Field to match against.
        field: String,
        /// The literal prefix (without the trailing `*`).
        prefix: String,
    },

    /// A term matched within an edit-distance budget.
    Fuzzy {
        /// Field to match against.
        field: String,
        /// The term text.
        text: String,
        /// Maximum Levenshtein edits, 0 to 2.
        max_edits: u8,
        /// Number of leading characters that must match exactly.
        prefix_length: u32,
    },

    /// A range over encoded endpoint strings.
    Range {
        /// Field to match against.
        field: String,
        /// Encoded lower endpoint.
        lower: String,
        /// Encoded upper endpoint.
        upper: String,
        /// Whether the lower endpoint itself matches.
        lower_inclusive: bool,
        /// Whether the upper endpoint itself matches.
        upper_inclusive: bool,
    },

    /// A boolean combination of clauses. Never empty after construction.
    Boolean {
        /// Sub-clauses with their occur markers, in source order.
        clauses: Vec<(QueryNode, Occur)>,
    },

    /// A scoring boost applied to the inner node.
    Boost {
        /// The boosted expression.
        inner: Box<QueryNode>,
        /// The boost factor.
        factor: f32,
    },
}

impl QueryNode {
    /// Creates a term node.
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a phrase node from terms in position order.
    pub fn phrase(field: impl Into<String>, terms: Vec<String>, slop: u32) -> Self {
        Self::Phrase {
            field: field.into(),
            terms,
            slop,
        }
    }

    /// Creates a boolean node from clauses.
    pub fn boolean(clauses: Vec<(Self, Occur)>) -> Self {
        Self::Boolean { clauses }
    }

    /// Wraps a node in a boost.
    pub fn boost(inner: Self, factor: f32) -> Self {
        Self::Boost {
            inner: Box::new(inner),
            factor,
        }
    }

    /// Formats the node as a query string, eliding `default_field` prefixes.
    ///
    /// This is the compact diagnostic form: `+a -b`, `"germ term"^2.0`,
    /// `{a TO z}`, `title:dog`. Nested booleans are parenthesized.
    pub fn to_query_string(&self, default_field: &str) -> String {
        match self {
            Self::Term { field, text } => {
                format!("{}{}", field_prefix(field, default_field), text)
            }
            Self::Phrase { field, terms, slop } => {
                let slop_suffix = if *slop > 0 {
                    format!("~{slop}")
                } else {
                    String::new()
                };
                format!(
                    "{}\"{}\"{}",
                    field_prefix(field, default_field),
                    terms.join(" "),
                    slop_suffix
                )
            }
            Self::Wildcard { field, pattern } => {
                format!("{}{}", field_prefix(field, default_field), pattern)
            }
            Self::Prefix { field, prefix } => {
                format!("{}{}*", field_prefix(field, default_field), prefix)
            }
            Self::Fuzzy {
                field,
                text,
                max_edits,
                ..
            } => {
                format!("{}{}~{}", field_prefix(field, default_field), text, max_edits)
            }
            Self::Range {
                field,
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => {
                let open = if *lower_inclusive { '[' } else { '{' };
                let close = if *upper_inclusive { ']' } else { '}' };
                format!(
                    "{}{}{} TO {}{}",
                    field_prefix(field, default_field),
                    open,
                    lower,
                    upper,
                    close
                )
            }
            Self::Boolean { clauses } => {
                let parts: Vec<String> = clauses
                    .iter()
                    .map(|(node, occur)| {
                        format!(
                            "{}{}",
                            occur.prefix(),
                            node.render_operand(default_field)
                        )
                    })
                    .collect();
                parts.join(" ")
            }
            Self::Boost { inner, factor } => {
                format!("{}^{:?}", inner.render_operand(default_field), factor)
            }
        }
    }

    /// Renders a node in operand position, parenthesizing nested booleans.
    fn render_operand(&self, default_field: &str) -> String {
        match self {
            Self::Boolean { .. } => format!("({})", self.to_query_string(default_field)),
            _ => self.to_query_string(default_field),
        }
    }

    /// Formats the node as an indented tree for debugging.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term { field, text } => writeln!(f, "{prefix}Term({field}:{text:?})"),
            Self::Phrase { field, terms, slop } => {
                writeln!(f, "{prefix}Phrase({field}:{terms:?}, slop={slop})")
            }
            Self::Wildcard { field, pattern } => {
                writeln!(f, "{prefix}Wildcard({field}:{pattern:?})")
            }
            Self::Prefix { field, prefix: p } => writeln!(f, "{prefix}Prefix({field}:{p:?})"),
            Self::Fuzzy {
                field,
                text,
                max_edits,
                prefix_length,
            } => writeln!(
                f,
                "{prefix}Fuzzy({field}:{text:?}, edits={max_edits}, prefix={prefix_length})"
            ),
            Self::Range {
                field,
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => writeln!(
                f,
                "{prefix}Range({field}:{lower:?}..{upper:?}, incl=({lower_inclusive}, {upper_inclusive}))"
            ),
            Self::Boolean { clauses } => {
                writeln!(f, "{prefix}Boolean")?;
                for (node, occur) in clauses {
                    writeln!(f, "{prefix}  {occur:?}")?;
                    node.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Self::Boost { inner, factor } => {
                writeln!(f, "{prefix}Boost({factor})")?;
                inner.fmt_tree(f, indent + 1)
            }
        }
    }
}

/// Field prefix for rendering, empty when the field is the default.
fn field_prefix(field: &str, default_field: &str) -> String {
    if field == default_field {
        String::new()
    } else {
        format!("{field}:")
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_elides_default_field() {
        let node = QueryNode::term("body", "rust");
        assert_eq!(node.to_query_string("body"), "rust");
        assert_eq!(node.to_query_string("title"), "body:rust");
    }

    #[test]
    fn phrase_rendering() {
        let node = QueryNode::phrase("body", vec!["error".into(), "handling".into()], 0);
        assert_eq!(node.to_query_string("body"), "\"error handling\"");

        let node = QueryNode::phrase("body", vec!["error".into(), "handling".into()], 2);
        assert_eq!(node.to_query_string("body"), "\"error handling\"~2");
    }

    #[test]
    fn boolean_rendering_with_occurs() {
        let node = QueryNode::boolean(vec![
            (QueryNode::term("f", "a"), Occur::Must),
            (QueryNode::term("f", "b"), Occur::MustNot),
            (QueryNode::term("f", "c"), Occur::Should),
        ]);
        assert_eq!(node.to_query_string("f"), "+a -b c");
    }

    #[test]
    fn nested_boolean_parenthesized() {
        let inner = QueryNode::boolean(vec![
            (QueryNode::term("f", "a"), Occur::Should),
            (QueryNode::term("f", "b"), Occur::Should),
        ]);
        let node = QueryNode::boolean(vec![
            (QueryNode::term("f", "c"), Occur::Should),
            (inner, Occur::Should),
        ]);
        assert_eq!(node.to_query_string("f"), "c (a b)");
    }

    #[test]
    fn boost_factor_always_has_decimal() {
        let node = QueryNode::boost(QueryNode::term("f", "term"), 2.0);
        assert_eq!(node.to_query_string("f"), "term^2.0");

        let node = QueryNode::boost(QueryNode::term("f", "term"), 2.5);
        assert_eq!(node.to_query_string("f"), "term^2.5");
    }

    #[test]
    fn boosted_boolean_parenthesized() {
        let inner = QueryNode::boolean(vec![
            (QueryNode::term("f", "germ"), Occur::Should),
            (QueryNode::term("f", "term"), Occur::Should),
        ]);
        let node = QueryNode::boost(inner, 2.0);
        assert_eq!(node.to_query_string("f"), "(germ term)^2.0");
    }

    #[test]
    fn fuzzy_and_wildcard_rendering() {
        let node = QueryNode::Fuzzy {
            field: "f".into(),
            text: "term".into(),
            max_edits: 2,
            prefix_length: 0,
        };
        assert_eq!(node.to_query_string("f"), "term~2");

        let node = QueryNode::Prefix {
            field: "f".into(),
            prefix: "term".into(),
        };
        assert_eq!(node.to_query_string("f"), "term*");

        let node = QueryNode::Wildcard {
            field: "f".into(),
            pattern: "te?m*gerM".into(),
        };
        assert_eq!(node.to_query_string("f"), "te?m*gerM");
    }

    #[test]
    fn range_rendering_tracks_bracket_styles() {
        let node = QueryNode::Range {
            field: "f".into(),
            lower: "a".into(),
            upper: "z".into(),
            lower_inclusive: true,
            upper_inclusive: false,
        };
        assert_eq!(node.to_query_string("f"), "[a TO z}");
    }

    #[test]
    fn tree_display() {
        let node = QueryNode::boolean(vec![
            (QueryNode::term("f", "a"), Occur::Must),
            (QueryNode::boost(QueryNode::term("f", "b"), 1.5), Occur::Should),
        ]);
        let rendered = node.to_string();
        assert!(rendered.contains("Boolean"));
        assert!(rendered.contains("Must"));
        assert!(rendered.contains("Boost(1.5)"));
    }
}
