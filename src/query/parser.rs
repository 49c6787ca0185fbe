//! Filter and selection expression parsing.
//!
//! Grammar (whitespace is insignificant and stripped before tokenizing):
//!
//! ```text
//! expr       := group ('|' group)*
//! group      := term ('&' term)*
//! term       := path [quantifier] op value
//! quantifier := '[all]' | '[any]'
//! op         := '=' | '<' | '>'
//! path       := name ['.' name]
//! ```
//!
//! A clause is split at the first occurrence of the first operator found
//! when scanning in the order `=`, `>`, `<`. A literal that itself contains
//! one of these characters can therefore be split somewhere the author did
//! not intend (`a>b=c` reads as field `a>b`, value `c`). This is a known
//! limitation of the language.

use std::str::FromStr;

use super::filter::{CompareOp, Conjunction, Literal, Predicate, Quantifier, Term};
use crate::error::QueryError;
use crate::flow::FieldPath;

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove a `[all]`/`[any]` marker from the field portion of a clause.
fn strip_quantifier(field: &str) -> (String, Quantifier) {
    for quantifier in [Quantifier::All, Quantifier::Any] {
        if let Some(marker) = quantifier.marker() {
            if field.contains(marker) {
                return (field.replace(marker, ""), quantifier);
            }
        }
    }
    (field.to_string(), Quantifier::Plain)
}

/// Parse a single clause such as `dp>1024` or `non_norm_stats[any].b = 41`.
pub fn parse_term(clause: &str) -> Result<Term, QueryError> {
    let clause = strip_whitespace(clause);
    if clause.is_empty() {
        return Err(QueryError::EmptyClause);
    }

    let (op, at) = CompareOp::SCAN_ORDER
        .iter()
        .find_map(|op| clause.find(op.symbol()).map(|at| (*op, at)))
        .ok_or_else(|| QueryError::MissingOperator {
            clause: clause.clone(),
        })?;

    let (field, value) = (&clause[..at], &clause[at + 1..]);
    let (field, quantifier) = strip_quantifier(field);
    if field.is_empty() {
        return Err(QueryError::EmptyField {
            clause: clause.clone(),
        });
    }

    let path = FieldPath::parse(&field)?;
    Ok(Term::new(path, quantifier, op, Literal::from_raw(value)))
}

/// Parse a full `--where` expression. `None` or a blank string matches all.
pub fn parse_filter(expr: Option<&str>) -> Result<Predicate, QueryError> {
    let Some(expr) = expr.filter(|e| !e.trim().is_empty()) else {
        return Ok(Predicate::match_all());
    };

    let groups = expr
        .split('|')
        .map(|group| {
            group
                .split('&')
                .map(parse_term)
                .collect::<Result<Vec<_>, _>>()
                .map(Conjunction::new)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate::new(groups))
}

/// Parse a `--select` path such as `dp` or `non_norm_stats.ipt`.
pub fn parse_selection(path: &str) -> Result<FieldPath, QueryError> {
    FieldPath::parse(&strip_whitespace(path))
}

impl FromStr for Term {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_term(s)
    }
}

impl FromStr for Predicate {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_filter(Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_terms() {
        let t = parse_term("dp = 443").unwrap();
        assert_eq!(t.path().outer(), "dp");
        assert_eq!(t.path().inner(), None);
        assert_eq!(t.quantifier(), Quantifier::Plain);
        assert_eq!(t.op(), CompareOp::Eq);
        assert_eq!(t.value(), &Literal::Int(443));

        let t = parse_term("dp>1024").unwrap();
        assert_eq!(t.op(), CompareOp::Gt);

        let t = parse_term(" ipt <\t5 ").unwrap();
        assert_eq!(t.op(), CompareOp::Lt);
        assert_eq!(t.value(), &Literal::Int(5));
    }

    #[test]
    fn test_parse_string_literal() {
        let t = parse_term("sa = 10.0.0.1").unwrap();
        assert_eq!(t.value(), &Literal::Str("10.0.0.1".into()));
    }

    #[test]
    fn test_parse_quantifiers_and_subfields() {
        let t = parse_term("non_norm_stats[any].b = 478").unwrap();
        assert_eq!(t.quantifier(), Quantifier::Any);
        assert_eq!(t.path().outer(), "non_norm_stats");
        assert_eq!(t.path().inner(), Some("b"));

        let t = parse_term("bd[all] > 10").unwrap();
        assert_eq!(t.quantifier(), Quantifier::All);
        assert_eq!(t.path().outer(), "bd");
        assert_eq!(t.path().inner(), None);

        let t = parse_term("ohttp.uri=/index.html").unwrap();
        assert_eq!(t.path().inner(), Some("uri"));
        assert_eq!(t.value(), &Literal::Str("/index.html".into()));
    }

    #[test]
    fn test_operator_scan_order() {
        // '=' is looked for before '>' and '<'.
        let t = parse_term("label=a>b").unwrap();
        assert_eq!(t.op(), CompareOp::Eq);
        assert_eq!(t.value(), &Literal::Str("a>b".into()));

        // ...even when '>' appears earlier in the clause.
        let t = parse_term("a>b=c").unwrap();
        assert_eq!(t.op(), CompareOp::Eq);
        assert_eq!(t.path().outer(), "a>b");
        assert_eq!(t.value(), &Literal::Str("c".into()));

        // '>' is looked for before '<'.
        let t = parse_term("x<y>z").unwrap();
        assert_eq!(t.op(), CompareOp::Gt);
        assert_eq!(t.path().outer(), "x<y");
    }

    #[test]
    fn test_split_at_first_occurrence() {
        let t = parse_term("uri=a=b").unwrap();
        assert_eq!(t.path().outer(), "uri");
        assert_eq!(t.value(), &Literal::Str("a=b".into()));
    }

    #[test]
    fn test_malformed_terms() {
        assert_eq!(
            parse_term("dp"),
            Err(QueryError::MissingOperator {
                clause: "dp".into()
            })
        );
        assert_eq!(
            parse_term(" = 5"),
            Err(QueryError::EmptyField {
                clause: "=5".into()
            })
        );
        assert_eq!(
            parse_term("[any]>5"),
            Err(QueryError::EmptyField {
                clause: "[any]>5".into()
            })
        );
        assert_eq!(parse_term("   "), Err(QueryError::EmptyClause));
        assert_eq!(
            parse_term("a.b.c=1"),
            Err(QueryError::UnsupportedPath {
                path: "a.b.c".into()
            })
        );
    }

    #[test]
    fn test_parse_filter_structure() {
        let pred = parse_filter(Some("dp=80 | dp=443")).unwrap();
        assert_eq!(pred.groups().len(), 2);
        assert!(pred.groups().iter().all(|g| g.terms().len() == 1));

        let pred = parse_filter(Some("non_norm_stats[any].b = 41 & ip = 2 | pr = 17")).unwrap();
        assert_eq!(pred.groups().len(), 2);
        assert_eq!(pred.groups()[0].terms().len(), 2);
        assert_eq!(pred.groups()[1].terms().len(), 1);
        assert_eq!(pred.to_string(), "non_norm_stats[any].b=41 & ip=2 | pr=17");
    }

    #[test]
    fn test_parse_filter_absent_or_blank() {
        assert!(parse_filter(None).unwrap().is_match_all());
        assert!(parse_filter(Some("")).unwrap().is_match_all());
        assert!(parse_filter(Some("  ")).unwrap().is_match_all());
    }

    #[test]
    fn test_parse_filter_rejects_empty_clauses() {
        assert_eq!(parse_filter(Some("dp=80|")), Err(QueryError::EmptyClause));
        assert_eq!(parse_filter(Some("dp=80&&pr=6")), Err(QueryError::EmptyClause));
    }

    #[test]
    fn test_from_str() {
        let pred: Predicate = "dp=80&pr=6".parse().unwrap();
        assert_eq!(pred.groups()[0].terms().len(), 2);
        let term: Term = "sp<1024".parse().unwrap();
        assert_eq!(term.op(), CompareOp::Lt);
    }

    #[test]
    fn test_parse_selection() {
        let path = parse_selection(" non_norm_stats.ipt ").unwrap();
        assert_eq!(path.outer(), "non_norm_stats");
        assert_eq!(path.inner(), Some("ipt"));
        assert!(parse_selection("a.b.c").is_err());
    }
}
