//! Procedural macros for `asp`.
//!
//! `#[derive(Schema)]` describes a struct with named fields to the `asp`
//! runtime: each field is classified as a leaf value, a nested schema or an
//! unsupported type, and its `#[asp(...)]` tags are recorded for name
//! resolution at attach time.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;


/// Derive macro for `asp::Schema`.
///
/// Field attributes:
///
/// - `#[asp("long,short,env,desc,sensitive")]` sets several names at once;
///   empty components keep their defaults. `#[asp("-")]` skips the field.
/// - `long`, `short`, `env`, `desc` and `sensitive` take a string and set a
///   single attribute; an empty string clears it. Bare `sensitive` means
///   `sensitive = "true"`.
/// - `skip` leaves the field out; it is rebuilt with `Default::default()`.
/// - `embed` flattens a nested schema into its parent's names.
///
/// The struct attribute `#[asp(crate = "path")]` changes the path used to
/// reach the runtime crate.
#[proc_macro_derive(Schema, attributes(asp))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
