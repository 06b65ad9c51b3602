//! Code generation for `#[derive(FieldAccess)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Ident, Result};

use super::attrs::{parse_field_attrs, FieldKind};

/// Expands the derive for a struct with named fields.
pub fn field_access_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "FieldAccess can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "FieldAccess can only be derived for structs",
            ))
        }
    };

    let mut arms: Vec<TokenStream> = Vec::new();
    let mut constants: Vec<TokenStream> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attr = parse_field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(kind) = attr.kind else {
            if attr.optional || attr.rename.is_some() {
                return Err(Error::new(
                    field.span(),
                    "a field kind is required alongside optional or rename",
                ));
            }
            continue;
        };

        let query_name = attr.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate field name '{}'", query_name),
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        constants.push(quote! {
            pub const #const_name: &'static str = #query_name;
        });

        let value = if attr.optional {
            optional_value(kind, field_name)
        } else {
            value(kind, field_name)
        };
        arms.push(quote! {
            #query_name => #value,
        });
        names.push(query_name);
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::criteria::FieldAccess for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::criteria::Value<'_> {
                match field {
                    #(#arms)*
                    _ => ::criteria::Value::None,
                }
            }

            fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

fn value(kind: FieldKind, field: &Ident) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::criteria::Value::String(::core::convert::AsRef::<str>::as_ref(&self.#field))
        },
        FieldKind::Number => quote! {
            ::criteria::Value::Number(::criteria::Number::from(self.#field))
        },
        FieldKind::Timestamp => quote! {
            ::criteria::Value::Timestamp(::criteria::FieldTimestamp::timestamp(&self.#field))
        },
        FieldKind::Enum => quote! {
            ::criteria::Value::Enum(::criteria::FieldEnum::discriminant(&self.#field))
        },
        FieldKind::Bool => quote! { ::criteria::Value::Bool(self.#field) },
    }
}

fn optional_value(kind: FieldKind, field: &Ident) -> TokenStream {
    let present = match kind {
        FieldKind::String => quote! {
            ::criteria::Value::String(::core::convert::AsRef::<str>::as_ref(v))
        },
        FieldKind::Number => quote! {
            ::criteria::Value::Number(::criteria::Number::from(*v))
        },
        FieldKind::Timestamp => quote! {
            ::criteria::Value::Timestamp(::criteria::FieldTimestamp::timestamp(v))
        },
        FieldKind::Enum => quote! {
            ::criteria::Value::Enum(::criteria::FieldEnum::discriminant(v))
        },
        FieldKind::Bool => quote! { ::criteria::Value::Bool(*v) },
    };
    quote! {
        match &self.#field {
            ::core::option::Option::Some(v) => #present,
            ::core::option::Option::None => ::criteria::Value::None,
        }
    }
}

/// Converts a field name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(source: &str) -> Result<String> {
        let input: DeriveInput = syn::parse_str(source)?;
        field_access_derive_impl(input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("createdAt"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("my-field"), "MY_FIELD");
        assert_eq!(to_screaming_snake_case("owner.name"), "OWNER_NAME");
    }

    #[test]
    fn lists_only_annotated_fields() {
        let code = expand(
            "struct Task { #[field(String)] name: String, notes: String, #[field(skip)] id: u64 }",
        )
        .unwrap();
        assert!(code.contains("pub const NAME"));
        assert!(!code.contains("NOTES"));
        assert!(!code.contains("\"id\""));
    }

    #[test]
    fn rejects_enums() {
        let err = expand("enum Status { Open, Closed }").unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn rejects_tuple_structs() {
        assert!(expand("struct Pair(u8, u8);").is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = expand(
            r#"struct Task { #[field(String)] name: String, #[field(String, rename = "name")] title: String }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field name"));
    }

    #[test]
    fn rename_requires_kind() {
        assert!(expand(r#"struct Task { #[field(rename = "x")] name: String }"#).is_err());
    }
}
