//! Parsing of `#[field(...)]` attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

/// How a field is exposed as a `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

const EXPECTED: &str = "String, Number, Timestamp, Enum, Bool";

impl FieldKind {
    fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            other => Err(Error::new(
                span,
                format!("unknown field kind '{}'. Expected one of: {}", other, EXPECTED),
            )),
        }
    }

    fn from_ident(ident: &Ident) -> Result<Self> {
        Self::from_name(&ident.to_string(), ident.span())
    }
}

/// Options from one field's `#[field(...)]` attribute.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    pub kind: Option<FieldKind>,
    pub optional: bool,
    pub skip: bool,
    pub rename: Option<String>,
}

fn string_literal(expr: &Expr, what: &str) -> Result<(String, Span)> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok((s.value(), s.span())),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", what),
        )),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("optional") => attr.optional = true,
                Meta::Path(p) => {
                    let ident = p.get_ident().ok_or_else(|| {
                        Error::new(p.span(), format!("expected a field kind: {}", EXPECTED))
                    })?;
                    attr.kind = Some(FieldKind::from_ident(ident)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let (name, span) = string_literal(&nv.value, "rename")?;
                    if name.is_empty() {
                        return Err(Error::new(span, "rename must not be empty"));
                    }
                    attr.rename = Some(name);
                }
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let (name, span) = string_literal(&nv.value, "ty")?;
                    attr.kind = Some(FieldKind::from_name(&name, span)?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        format!(
                            "unknown field attribute. Expected: {}, optional, skip, rename = \"...\", or ty = \"...\"",
                            EXPECTED
                        ),
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Reads the `#[field(...)]` attribute of a struct field, if any.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("field") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}
