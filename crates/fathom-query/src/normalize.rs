//! Boolean group construction.
//!
//! Grammar levels hand their members here. Pruned members disappear,
//! single-member levels dissolve, and every clause that lands in a real
//! group is counted against the parse's clause ceiling as it lands.

use crate::{
    ast::{Occur, QueryNode},
    error::QueryParseError,
};

/// Running clause total for one parse, checked against the ceiling.
pub(crate) struct ClauseCounter {
    /// Clauses placed in boolean groups so far.
    count: usize,
    /// Ceiling captured when the parse started.
    limit: usize,
}

impl ClauseCounter {
    /// Creates a counter with the given ceiling.
    pub(crate) fn new(limit: usize) -> Self {
        Self { count: 0, limit }
    }

    /// Records one clause, failing the moment the ceiling is crossed.
    pub(crate) fn add(&mut self) -> Result<(), QueryParseError> {
        self.count += 1;
        if self.count > self.limit {
            Err(QueryParseError::TooManyClauses { limit: self.limit })
        } else {
            Ok(())
        }
    }
}

/// A parsed clause: the node, absent when analysis pruned it, plus the
/// modifier written on it, if any.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Clause {
    /// The built node, `None` when analysis discarded the leaf or group.
    pub(crate) node: Option<QueryNode>,
    /// The explicit `+`/`-`/`!`/`NOT` modifier, if one was written.
    pub(crate) occur: Option<Occur>,
}

impl Clause {
    /// A clause pruned out of existence.
    pub(crate) fn empty() -> Self {
        Self {
            node: None,
            occur: None,
        }
    }

    /// An unmodified clause around a node.
    pub(crate) fn plain(node: QueryNode) -> Self {
        Self {
            node: Some(node),
            occur: None,
        }
    }
}

/// Combines the members of one grammar level.
///
/// A level left with one member dissolves into it, keeping its written
/// modifier; unmodified members of a real group get `default_occur`.
pub(crate) fn combine(
    clauses: Vec<Clause>,
    default_occur: Occur,
    counter: &mut ClauseCounter,
) -> Result<Clause, QueryParseError> {
    let mut present: Vec<Clause> = clauses.into_iter().filter(|c| c.node.is_some()).collect();

    match present.len() {
        0 => Ok(Clause::empty()),
        1 => Ok(present.remove(0)),
        _ => {
            let mut resolved = Vec::with_capacity(present.len());
            for clause in present {
                let Some(node) = clause.node else { continue };
                counter.add()?;
                resolved.push((node, clause.occur.unwrap_or(default_occur)));
            }
            Ok(Clause::plain(QueryNode::Boolean { clauses: resolved }))
        }
    }
}

/// Finishes a parse.
///
/// A lone unmodified or optional clause is returned bare (the collapsed
/// form of a one-clause group); `+`/`-` markers on a lone clause survive
/// inside a one-clause boolean.
pub(crate) fn finish(
    clause: Clause,
    counter: &mut ClauseCounter,
) -> Result<Option<QueryNode>, QueryParseError> {
    let Clause { node, occur } = clause;
    let Some(node) = node else {
        return Ok(None);
    };
    match occur {
        None | Some(Occur::Should) => Ok(Some(node)),
        Some(occur) => {
            counter.add()?;
            Ok(Some(QueryNode::Boolean {
                clauses: vec![(node, occur)],
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> ClauseCounter {
        ClauseCounter::new(1024)
    }

    fn term(text: &str) -> QueryNode {
        QueryNode::term("f", text)
    }

    #[test]
    fn all_pruned_combines_to_empty() {
        let mut counter = counter();
        let result = combine(
            vec![Clause::empty(), Clause::empty()],
            Occur::Should,
            &mut counter,
        )
        .unwrap();
        assert_eq!(result, Clause::empty());
    }

    #[test]
    fn single_member_dissolves_with_modifier() {
        let mut counter = counter();
        let clause = Clause {
            node: Some(term("a")),
            occur: Some(Occur::MustNot),
        };
        let result = combine(
            vec![Clause::empty(), clause.clone()],
            Occur::Must,
            &mut counter,
        )
        .unwrap();
        assert_eq!(result, clause);
    }

    #[test]
    fn group_defaults_unmodified_members() {
        let mut counter = counter();
        let result = combine(
            vec![
                Clause::plain(term("a")),
                Clause {
                    node: Some(term("b")),
                    occur: Some(Occur::MustNot),
                },
            ],
            Occur::Must,
            &mut counter,
        )
        .unwrap();
        assert_eq!(
            result.node.unwrap(),
            QueryNode::boolean(vec![
                (term("a"), Occur::Must),
                (term("b"), Occur::MustNot),
            ])
        );
    }

    #[test]
    fn ceiling_trips_mid_group() {
        let mut counter = ClauseCounter::new(2);
        let err = combine(
            vec![
                Clause::plain(term("one")),
                Clause::plain(term("two")),
                Clause::plain(term("three")),
            ],
            Occur::Should,
            &mut counter,
        )
        .unwrap_err();
        assert_eq!(err, QueryParseError::TooManyClauses { limit: 2 });
    }

    #[test]
    fn finish_keeps_lone_negation_wrapped() {
        let mut counter = counter();
        let clause = Clause {
            node: Some(term("draft")),
            occur: Some(Occur::MustNot),
        };
        let node = finish(clause, &mut counter).unwrap().unwrap();
        assert_eq!(
            node,
            QueryNode::boolean(vec![(term("draft"), Occur::MustNot)])
        );
    }

    #[test]
    fn finish_unwraps_optional_clause() {
        let mut counter = counter();
        let clause = Clause {
            node: Some(term("a")),
            occur: Some(Occur::Should),
        };
        assert_eq!(finish(clause, &mut counter).unwrap(), Some(term("a")));

        let clause = Clause::plain(term("a"));
        assert_eq!(finish(clause, &mut counter).unwrap(), Some(term("a")));
    }

    #[test]
    fn finish_empty_is_none() {
        let mut counter = counter();
        assert_eq!(finish(Clause::empty(), &mut counter).unwrap(), None);
    }
}
