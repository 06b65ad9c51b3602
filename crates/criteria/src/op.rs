//! Comparison operators for field clauses.

use std::cmp::Ordering;

/// Operator of a [`Clause`](crate::Clause).
///
/// Not every operator applies to every value type; [`Op::accepts`] is the
/// single source of truth and is checked when a clause is added to a
/// specification builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,

    // strings
    StartsWith,
    EndsWith,
    Contains,
    /// SQL-style LIKE pattern (`%`, `_`, `[...]`), case-insensitive.
    Like,
    Regex,

    // numbers and timestamps
    Gt,
    Gte,
    Lt,
    Lte,
    /// Alias for `Lt`, reads better on timestamps.
    Before,
    /// Alias for `Gt`, reads better on timestamps.
    After,

    /// Enum discriminant is one of a set.
    In,
    /// Alias for `Eq`, reads better on booleans.
    Is,
}

impl Op {
    /// Returns `true` if this operator can be applied to a value of the
    /// given type name (as produced by `ClauseValue::type_name`).
    pub fn accepts(self, value_type: &str) -> bool {
        match value_type {
            "string" => matches!(
                self,
                Op::Eq | Op::Ne | Op::StartsWith | Op::EndsWith | Op::Contains
            ),
            "pattern" => matches!(self, Op::Like),
            "regex" => matches!(self, Op::Regex),
            "number" => matches!(self, Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte),
            "timestamp" => matches!(
                self,
                Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte | Op::Before | Op::After
            ),
            "enum" => matches!(self, Op::Eq | Op::Ne),
            "enum set" => matches!(self, Op::In),
            "bool" => matches!(self, Op::Eq | Op::Ne | Op::Is),
            _ => false,
        }
    }

    /// Folds aliases into their canonical operator.
    pub fn normalize(self) -> Op {
        match self {
            Op::Before => Op::Lt,
            Op::After => Op::Gt,
            Op::Is => Op::Eq,
            other => other,
        }
    }

    /// Evaluates an ordering-based operator against `field.cmp(clause)`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self.normalize() {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Contains => "contains",
            Op::Like => "like",
            Op::Regex => "regex",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Before => "before",
            Op::After => "after",
            Op::In => "in",
            Op::Is => "is",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
