//! Implementation of the `#[derive(FieldAccess)]` macro.

mod attrs;
mod derive;

pub use derive::field_access_derive_impl;
