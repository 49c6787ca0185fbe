//! Predicate evaluation for flow filtering.
//!
//! A filter is kept in disjunctive normal form: a `Predicate` is an OR over
//! `Conjunction` groups, each an AND over `Term` comparisons. Absent fields
//! never satisfy a comparison, so evaluation has no error path.

use std::fmt;

use crate::flow::{FieldPath, FieldValue, FlowRecord};

/// Comparison operators for predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
}

impl CompareOp {
    /// Operators in the order a clause is scanned for them.
    pub const SCAN_ORDER: [CompareOp; 3] = [CompareOp::Eq, CompareOp::Gt, CompareOp::Lt];

    /// The operator's character in the filter language.
    pub fn symbol(self) -> char {
        match self {
            CompareOp::Eq => '=',
            CompareOp::Lt => '<',
            CompareOp::Gt => '>',
        }
    }

    fn compare_i64(self, left: i64, right: i64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
        }
    }

    fn compare_f64(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
        }
    }

    fn compare_str(self, left: &str, right: &str) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
        }
    }

    /// Evaluate `value <op> literal`.
    ///
    /// Numbers compare numerically, strings lexicographically; any other
    /// pairing is false.
    pub fn evaluate(self, value: &FieldValue, literal: &Literal) -> bool {
        match (value, literal) {
            (FieldValue::Int(v), Literal::Int(l)) => self.compare_i64(*v, *l),
            (FieldValue::Float(v), Literal::Int(l)) => self.compare_f64(*v, *l as f64),
            (FieldValue::String(v), Literal::Str(l)) => self.compare_str(v, l),
            _ => false,
        }
    }
}

/// How a term applies to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    /// Compare the field itself.
    #[default]
    Plain,
    /// Every element of a non-empty sequence must match (`[all]`).
    All,
    /// At least one element of a sequence must match (`[any]`).
    Any,
}

impl Quantifier {
    /// The marker written after the field name, if any.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Quantifier::Plain => None,
            Quantifier::All => Some("[all]"),
            Quantifier::Any => Some("[any]"),
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Str(String),
}

impl Literal {
    /// Digits-only text becomes an integer; everything else stays a string.
    pub fn from_raw(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(v) = raw.parse::<i64>() {
                return Literal::Int(v);
            }
        }
        Literal::Str(raw.to_string())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A single comparison: `field [quantifier] op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    path: FieldPath,
    quantifier: Quantifier,
    op: CompareOp,
    value: Literal,
}

impl Term {
    pub fn new(path: FieldPath, quantifier: Quantifier, op: CompareOp, value: Literal) -> Self {
        Self {
            path,
            quantifier,
            op,
            value,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }

    /// Evaluate this term against one flow.
    pub fn matches(&self, flow: &FlowRecord) -> bool {
        let Some(top) = self.path.resolve_outer(flow) else {
            return false;
        };

        match self.quantifier {
            Quantifier::Plain => self.matches_element(top),
            // An empty sequence fails closed rather than matching vacuously.
            Quantifier::All => match top.as_list() {
                Some(items) if !items.is_empty() => {
                    items.iter().all(|item| self.matches_element(item))
                }
                _ => false,
            },
            Quantifier::Any => top
                .as_list()
                .is_some_and(|items| items.iter().any(|item| self.matches_element(item))),
        }
    }

    fn matches_element(&self, value: &FieldValue) -> bool {
        self.path
            .select_inner(value)
            .is_some_and(|v| self.op.evaluate(v, &self.value))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.outer())?;
        if let Some(marker) = self.quantifier.marker() {
            write!(f, "{marker}")?;
        }
        if let Some(inner) = self.path.inner() {
            write!(f, ".{inner}")?;
        }
        write!(f, "{}{}", self.op.symbol(), self.value)
    }
}

/// Terms joined by AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunction {
    terms: Vec<Term>,
}

impl Conjunction {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// All terms must match. An empty group matches nothing.
    pub fn matches(&self, flow: &FlowRecord) -> bool {
        !self.terms.is_empty() && self.terms.iter().all(|t| t.matches(flow))
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

/// Conjunction groups joined by OR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    groups: Vec<Conjunction>,
}

impl Predicate {
    pub fn new(groups: Vec<Conjunction>) -> Self {
        Self { groups }
    }

    /// The predicate used when no filter is given.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Conjunction] {
        &self.groups
    }

    /// Any group must match. A predicate without groups matches everything.
    pub fn matches(&self, flow: &FlowRecord) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|g| g.matches(flow))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return write!(f, "*");
        }
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{group}")?;
        }
        Ok(())
    }
}
