//! Sort directions, order kinds and key comparison.

use std::cmp::Ordering;

use crate::expression::OrderExpression;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an ordering entry within a specification's ordering chain.
///
/// `OrderBy` and `OrderByDescending` start the chain (primary key);
/// `ThenBy` and `ThenByDescending` refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    OrderBy,
    OrderByDescending,
    ThenBy,
    ThenByDescending,
}

impl OrderKind {
    /// Returns `true` for the chain-starting kinds.
    pub fn is_primary(self) -> bool {
        matches!(self, OrderKind::OrderBy | OrderKind::OrderByDescending)
    }

    pub fn dir(self) -> Dir {
        match self {
            OrderKind::OrderBy | OrderKind::ThenBy => Dir::Asc,
            OrderKind::OrderByDescending | OrderKind::ThenByDescending => Dir::Desc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::OrderBy => "order_by",
            OrderKind::OrderByDescending => "order_by_descending",
            OrderKind::ThenBy => "then_by",
            OrderKind::ThenByDescending => "then_by_descending",
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares two sort keys.
///
/// This is a total order. `None` sorts after everything else and NaN before
/// every other number. Keys of different types are ranked by type: bool,
/// number, timestamp, enum, string.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::Enum(_) => 3,
        Value::String(_) => 4,
        Value::None => 5,
    }
}

/// Compares two items key by key along a resolved ordering chain.
pub(crate) fn compare_by_chain<T>(a: &T, b: &T, chain: &[&OrderExpression<T>]) -> Ordering {
    for expression in chain {
        let ordering = expression
            .dir()
            .apply(compare_values(&expression.key(a), &expression.key(b)));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
