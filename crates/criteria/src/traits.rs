//! Named field access for clause-, field- and search-based criteria.

use crate::value::{Timestamp, Value};

/// Types whose fields can be addressed by name.
///
/// Implementing this trait unlocks the field-name builder methods
/// (`filter_clause`, `order_by_field`, `search_field`). It is usually derived
/// with `#[derive(FieldAccess)]` from `criteria-macros` (re-exported under the
/// `derive` feature), but manual implementations are straightforward:
///
/// ```
/// use criteria::{FieldAccess, Number, Value};
///
/// struct Customer {
///     name: String,
///     age: u32,
/// }
///
/// impl FieldAccess for Customer {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "age" => Value::Number(Number::from(self.age)),
///             _ => Value::None,
///         }
///     }
///
///     fn field_names() -> &'static [&'static str] {
///         &["name", "age"]
///     }
/// }
/// ```
pub trait FieldAccess {
    /// Value of the named field, or [`Value::None`] if there is no such field.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Names of all addressable fields.
    ///
    /// When non-empty, builders reject unknown field names up front instead
    /// of silently matching nothing. The default (empty) disables the check.
    fn field_names() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }

    /// Free-function form of [`field_value`](Self::field_value).
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field_value(field)
    }
}

/// Maps enum variants to stable discriminants for `#[field(Enum)]` fields.
///
/// ```
/// use criteria::FieldEnum;
///
/// enum Status {
///     Open,
///     Closed,
/// }
///
/// impl FieldEnum for Status {
///     fn discriminant(&self) -> u32 {
///         match self {
///             Status::Open => 0,
///             Status::Closed => 1,
///         }
///     }
/// }
/// ```
pub trait FieldEnum {
    fn discriminant(&self) -> u32;
}

/// Converts datetime-like values for `#[field(Timestamp)]` fields.
pub trait FieldTimestamp {
    fn timestamp(&self) -> Timestamp;
}

impl FieldTimestamp for i64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl FieldTimestamp for u64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self as i64)
    }
}

impl FieldTimestamp for Timestamp {
    fn timestamp(&self) -> Timestamp {
        *self
    }
}

impl FieldTimestamp for std::time::SystemTime {
    fn timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(after) => Timestamp::from_millis(after.as_millis() as i64),
            Err(before) => Timestamp::from_millis(-(before.duration().as_millis() as i64)),
        }
    }
}

pub(crate) fn check_field<T: FieldAccess>(field: &str) -> crate::Result<()> {
    if field.is_empty() {
        return Err(crate::SpecificationError::ArgumentNull("field"));
    }
    let known = T::field_names();
    if !known.is_empty() && !known.contains(&field) {
        return Err(crate::SpecificationError::invalid_argument(
            "field",
            format!("unknown field '{}'", field),
        ));
    }
    Ok(())
}
