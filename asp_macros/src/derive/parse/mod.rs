//! Parsing of the derive input and its `#[asp(...)]` attributes.

mod args;
#[cfg(test)]
mod tests;

use proc_macro2::TokenStream;
use syn::{Attribute, Data, DeriveInput, Fields, Generics, Ident, LitStr, Type};

use args::{AspArg, parse_asp_args};

use super::crate_path;

/// Tag values gathered from a field's `#[asp(...)]` attributes.
///
/// Strings are kept verbatim; an empty string is an explicit clear and is
/// distinct from an absent tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldAttrs {
    pub combined: Option<String>,
    pub long: Option<String>,
    pub short: Option<String>,
    pub env: Option<String>,
    pub desc: Option<String>,
    pub sensitive: Option<String>,
    pub skip: bool,
    pub embed: bool,
}

/// One named field with its parsed attributes.
pub(crate) struct SchemaField {
    pub ident: Ident,
    pub ty: Type,
    pub attrs: FieldAttrs,
}

/// Everything code generation needs from the derive input.
pub(crate) struct SchemaInput<'a> {
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub krate: TokenStream,
    pub fields: Vec<SchemaField>,
}

const SHAPE_ERROR: &str = "Schema can only be derived for structs with named fields";

/// Gathers the struct identifier, crate path and fields in one pass.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<SchemaInput<'_>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            SHAPE_ERROR,
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            data.struct_token,
            SHAPE_ERROR,
        ));
    };

    let crate_override = parse_struct_attrs(&input.attrs)?;
    let fields = named
        .named
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .clone()
                .ok_or_else(|| syn::Error::new_spanned(field, SHAPE_ERROR))?;
            Ok(SchemaField {
                ident,
                ty: field.ty.clone(),
                attrs: parse_field_attrs(&field.attrs)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(SchemaInput {
        ident: &input.ident,
        generics: &input.generics,
        krate: crate_path::resolve(crate_override.as_ref()),
        fields,
    })
}

fn asp_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("asp"))
}

/// Reads the struct-level `#[asp(crate = "...")]` override.
fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<Option<syn::Path>> {
    let mut crate_path = None;
    for attr in asp_attrs(attrs) {
        for arg in parse_asp_args(attr)? {
            match arg {
                AspArg::Value(key, value) if key == "crate" => {
                    set_once(&mut crate_path, &key, value.parse::<syn::Path>()?)?;
                }
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "only `crate = \"...\"` is supported on the struct",
                    ));
                }
            }
        }
    }
    Ok(crate_path)
}

/// Parses the `#[asp(...)]` attributes attached to a field.
///
/// # Errors
///
/// Returns an error for unknown keys, repeated keys or values of the wrong
/// shape.
pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in asp_attrs(attrs) {
        for arg in parse_asp_args(attr)? {
            apply_field_arg(&mut out, arg)?;
        }
    }
    Ok(out)
}

fn apply_field_arg(out: &mut FieldAttrs, arg: AspArg) -> syn::Result<()> {
    match arg {
        AspArg::Combined(lit) => {
            if lit.value() == "-" {
                out.skip = true;
                return Ok(());
            }
            set_string(&mut out.combined, "combined tag", &lit)
        }
        AspArg::Value(key, value) => {
            let target = match key.to_string().as_str() {
                "long" => &mut out.long,
                "short" => &mut out.short,
                "env" => &mut out.env,
                "desc" => &mut out.desc,
                "sensitive" => &mut out.sensitive,
                _ => return Err(unknown_key(&key)),
            };
            set_string(target, &key.to_string(), &value)
        }
        AspArg::Flag(key) => match key.to_string().as_str() {
            "sensitive" => set_once(&mut out.sensitive, &key, "true".to_owned()),
            "skip" => {
                out.skip = true;
                Ok(())
            }
            "embed" => {
                out.embed = true;
                Ok(())
            }
            _ => Err(unknown_key(&key)),
        },
    }
}

fn set_string(target: &mut Option<String>, what: &str, lit: &LitStr) -> syn::Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(lit.span(), format!("duplicate {what}")));
    }
    *target = Some(lit.value());
    Ok(())
}

fn set_once<T>(target: &mut Option<T>, key: &Ident, value: T) -> syn::Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(key.span(), format!("duplicate `{key}` attribute")));
    }
    *target = Some(value);
    Ok(())
}

fn unknown_key(key: &Ident) -> syn::Error {
    syn::Error::new(
        key.span(),
        format!(
            "unknown asp attribute `{key}`; expected one of long, short, env, desc, \
             sensitive, skip, embed"
        ),
    )
}
