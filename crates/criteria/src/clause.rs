//! Declarative field clauses.
//!
//! A [`Clause`] names a field, an operator and a value. Specifications turn
//! clauses into where-predicates for any type implementing
//! [`FieldAccess`](crate::FieldAccess), and use the clause text as the
//! predicate description in query plans.

use regex::Regex;

use crate::error::{Result, SpecificationError};
use crate::like::LikePattern;
use crate::op::Op;
use crate::value::{Number, Timestamp, Value};

/// A single field predicate.
///
/// ```
/// use criteria::{Clause, Op, Value};
///
/// let clause = Clause::new("name", Op::Like, "%ann%").unwrap();
/// assert!(clause.matches(&Value::String("Joanna")));
/// assert_eq!(clause.to_string(), "name like %ann%");
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    pub field: String,
    pub op: Op,
    pub value: ClauseValue,
}

impl Clause {
    /// Creates a clause, compiling string values for `Like` and `Regex`.
    ///
    /// Fails when the operator does not apply to the value type or the
    /// pattern does not compile.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<ClauseValue>) -> Result<Self> {
        let value = match (op, value.into()) {
            (Op::Like, ClauseValue::String(s)) => ClauseValue::Pattern(LikePattern::new(&s)?),
            (Op::Regex, ClauseValue::String(s)) => ClauseValue::Regex(Regex::new(&s)?),
            (_, value) => value,
        };

        if !op.accepts(value.type_name()) {
            return Err(SpecificationError::InvalidOperatorForType {
                op: op.as_str(),
                value_type: value.type_name(),
            });
        }

        Ok(Clause {
            field: field.into(),
            op,
            value,
        })
    }

    /// Evaluates the clause against a field value.
    ///
    /// Missing fields and type mismatches never match, for any operator.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match (&self.value, field_value) {
            (ClauseValue::String(expected), Value::String(s)) => match self.op.normalize() {
                Op::Eq => s == expected,
                Op::Ne => s != expected,
                Op::StartsWith => s.starts_with(expected.as_str()),
                Op::EndsWith => s.ends_with(expected.as_str()),
                Op::Contains => s.contains(expected.as_str()),
                _ => false,
            },
            (ClauseValue::Pattern(pattern), Value::String(s)) => pattern.is_match(s),
            (ClauseValue::Regex(regex), Value::String(s)) => regex.is_match(s),
            (ClauseValue::Number(expected), Value::Number(n)) => n
                .compare(*expected)
                .is_some_and(|ordering| self.op.eval_ordering(ordering)),
            (ClauseValue::Timestamp(expected), Value::Timestamp(ts)) => {
                self.op.eval_ordering(ts.cmp(expected))
            }
            (ClauseValue::Enum(expected), Value::Enum(d)) => {
                self.op.eval_ordering(d.cmp(expected))
            }
            (ClauseValue::EnumSet(set), Value::Enum(d)) => set.contains(d),
            (ClauseValue::Bool(expected), Value::Bool(b)) => {
                self.op.eval_ordering(b.cmp(expected))
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

/// Owned comparison value stored in a clause.
#[derive(Debug, Clone)]
pub enum ClauseValue {
    String(String),
    Pattern(LikePattern),
    Regex(Regex),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    EnumSet(Vec<u32>),
    Bool(bool),
}

impl ClauseValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ClauseValue::String(_) => "string",
            ClauseValue::Pattern(_) => "pattern",
            ClauseValue::Regex(_) => "regex",
            ClauseValue::Number(_) => "number",
            ClauseValue::Timestamp(_) => "timestamp",
            ClauseValue::Enum(_) => "enum",
            ClauseValue::EnumSet(_) => "enum set",
            ClauseValue::Bool(_) => "bool",
        }
    }
}

impl std::fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClauseValue::String(s) => f.write_str(s),
            ClauseValue::Pattern(p) => write!(f, "{}", p),
            ClauseValue::Regex(r) => write!(f, "/{}/", r.as_str()),
            ClauseValue::Number(Number::I64(n)) => write!(f, "{}", n),
            ClauseValue::Number(Number::U64(n)) => write!(f, "{}", n),
            ClauseValue::Number(Number::F64(n)) => write!(f, "{}", n),
            ClauseValue::Timestamp(ts) => write!(f, "@{}", ts.as_millis()),
            ClauseValue::Enum(d) => write!(f, "#{}", d),
            ClauseValue::EnumSet(set) => {
                let items: Vec<String> = set.iter().map(|d| format!("#{}", d)).collect();
                write!(f, "[{}]", items.join(", "))
            }
            ClauseValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        ClauseValue::String(s)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::String(s.to_string())
    }
}

impl From<LikePattern> for ClauseValue {
    fn from(p: LikePattern) -> Self {
        ClauseValue::Pattern(p)
    }
}

impl From<Regex> for ClauseValue {
    fn from(r: Regex) -> Self {
        ClauseValue::Regex(r)
    }
}

impl From<Number> for ClauseValue {
    fn from(n: Number) -> Self {
        ClauseValue::Number(n)
    }
}

impl From<Timestamp> for ClauseValue {
    fn from(t: Timestamp) -> Self {
        ClauseValue::Timestamp(t)
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Bool(b)
    }
}

impl From<Vec<u32>> for ClauseValue {
    fn from(v: Vec<u32>) -> Self {
        ClauseValue::EnumSet(v)
    }
}

macro_rules! clause_value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ClauseValue {
                fn from(n: $ty) -> Self {
                    ClauseValue::Number(Number::from(n))
                }
            }
        )*
    };
}

clause_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
