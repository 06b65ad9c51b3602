//! Proc macros for criteria.
//!
//! # Available Macros
//!
//! - [`FieldAccess`] - Generate named field access for field-based criteria
//!
//! # Examples
//!
//! For working examples, see `criteria/tests/derive.rs`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod field;

/// Derives the `FieldAccess` trait for structs queried by field name.
///
/// Only annotated fields are addressable; unannotated fields are left out.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field (supports Eq, Ne, Contains, StartsWith, EndsWith, Like, Regex) |
/// | `Number` | Numeric field (supports Eq, Ne, Gt, Gte, Lt, Lte) |
/// | `Timestamp` | Timestamp field (supports Eq, Ne, Before, After, Gt, Gte, Lt, Lte) - requires `FieldTimestamp` impl |
/// | `Enum` | Enum field (supports Eq, Ne, In) - requires `FieldEnum` impl |
/// | `Bool` | Boolean field (supports Eq, Ne, Is) |
/// | `optional` | The field is an `Option<_>` of the given kind; `None` yields `Value::None` |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom name in criteria |
/// | `ty = "..."` | Kind given as a string, e.g. `ty = "enum"` |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Task::NAME`, `Task::PRIORITY`)
/// 2. `FieldAccess::field_value()`
/// 3. `FieldAccess::field_names()`, so unknown names are rejected when a
///    specification is built
///
/// # Example
///
/// ```ignore
/// use criteria::{FieldAccess, Specification};
/// use criteria_macros::FieldAccess;
///
/// #[derive(FieldAccess)]
/// struct Task {
///     #[field(String)]
///     name: String,
///
///     #[field(Number)]
///     priority: u8,
///
///     #[field(String, optional, rename = "owner")]
///     assignee: Option<String>,
///
///     #[field(skip)]
///     internal_id: u64,
/// }
///
/// let spec = Specification::<Task>::builder()
///     .search_field(Task::NAME, "%bug%", 1)
///     .order_by_field_descending(Task::PRIORITY)
///     .build()?;
/// ```
#[proc_macro_derive(FieldAccess, attributes(field))]
pub fn field_access_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    field::field_access_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
