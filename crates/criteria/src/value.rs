//! Runtime values used for comparisons and ordering keys.
//!
//! A [`Value`] is what a key selector or a [`FieldAccess`](crate::FieldAccess)
//! implementation hands back for an item. It borrows string data from the
//! item so ordering a large collection never clones keys.

use std::cmp::Ordering;

/// A comparable value borrowed from an item.
///
/// # Example
///
/// ```
/// use criteria::{Number, Value};
///
/// struct Customer {
///     name: String,
///     age: u32,
/// }
///
/// fn key<'a>(customer: &'a Customer) -> Value<'a> {
///     Value::String(&customer.name)
/// }
///
/// let c = Customer { name: "Ada".into(), age: 36 };
/// assert_eq!(key(&c), Value::String("Ada"));
/// assert_eq!(Value::from(c.age), Value::Number(Number::U64(36)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Borrowed string.
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Milliseconds since the Unix epoch.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean.
    Bool(bool),
    /// Missing, null, or unknown field.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is `Value::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the string slice, if this is a string.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is numeric.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a timestamp.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Bool(_) => "bool",
            Value::None => "none",
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::String(s.as_str())
    }
}

impl<T: Into<Value<'static>>> From<Option<T>> for Value<'static> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl From<bool> for Value<'static> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Timestamp> for Value<'static> {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Number> for Value<'static> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value<'static> {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Numeric value preserving signedness and precision.
///
/// Same-variant comparisons are exact; mixed variants compare as `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Floating point.
    F64(f64),
}

impl Number {
    /// Converts to `f64` for mixed-type comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers. `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting.
    ///
    /// NaN sorts before every other number. Signed and unsigned integers
    /// compare exactly; any pair involving a float compares as `f64`.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a.cmp(&b),
            (Number::U64(a), Number::U64(b)) => a.cmp(&b),
            (Number::I64(a), Number::U64(b)) => match u64::try_from(a) {
                Ok(a) => a.cmp(&b),
                Err(_) => Ordering::Less,
            },
            (Number::U64(a), Number::I64(b)) => match u64::try_from(b) {
                Ok(b) => a.cmp(&b),
                Err(_) => Ordering::Greater,
            },
            _ => {
                let (a, b) = (self.to_f64(), other.to_f64());
                match (a.is_nan(), b.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                }
            }
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Milliseconds since the Unix epoch.
///
/// ```
/// use criteria::Timestamp;
///
/// assert!(Timestamp::from_secs(1) < Timestamp::from_millis(1500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numbers_compare_as_float() {
        assert_eq!(
            Number::I64(-1).compare(Number::U64(1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(3).compare(Number::F64(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::I64(1)), None);
    }

    #[test]
    fn total_order_puts_nan_first() {
        let nan = Number::F64(f64::NAN);
        assert_eq!(nan.total_cmp(Number::I64(i64::MIN)), Ordering::Less);
        assert_eq!(Number::F64(-1.0).total_cmp(nan), Ordering::Greater);
        assert_eq!(nan.total_cmp(Number::F64(f64::NAN)), Ordering::Equal);
        assert_eq!(Number::I64(-1).total_cmp(Number::U64(0)), Ordering::Less);
        assert_eq!(
            Number::U64(u64::MAX).total_cmp(Number::I64(i64::MAX)),
            Ordering::Greater
        );
        assert_eq!(Number::I64(2).total_cmp(Number::F64(2.0)), Ordering::Equal);
    }

    #[test]
    fn large_unsigned_compare_exactly() {
        let a = Number::U64(u64::MAX);
        let b = Number::U64(u64::MAX - 1);
        assert_eq!(a.compare(b), Some(Ordering::Greater));
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(7i32), Value::Number(Number::I64(7)));
        assert_eq!(Value::from(7usize), Value::Number(Number::U64(7)));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("x"), Value::String("x"));
        assert_eq!(Value::from(None::<i32>), Value::None);
        assert_eq!(Value::from(Some(2u8)), Value::Number(Number::U64(2)));

        let owned = String::from("owned");
        assert_eq!(Value::from(&owned), Value::String("owned"));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::String("a").type_name(), "string");
        assert_eq!(Value::Timestamp(Timestamp(0)).type_name(), "timestamp");
        assert_eq!(Value::None.type_name(), "none");
    }

    #[test]
    fn timestamp_units() {
        let ts = Timestamp::from_secs(90);
        assert_eq!(ts.as_millis(), 90_000);
        assert_eq!(ts.as_secs(), 90);
    }
}
