//! Expansion of `#[derive(Schema)]`.

mod classify;
mod crate_path;
mod generate;
mod parse;

use proc_macro2::TokenStream;
use syn::DeriveInput;

use parse::parse_input;

#[cfg(test)]
pub(crate) use generate::type_text;

/// Expands the derive for `input`.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let schema = parse_input(input)?;
    generate::schema_impl(&schema)
}
