//! Crate path resolution for renamed dependencies.
//!
//! Converts the optional `#[asp(crate = "...")]` attribute value into the
//! tokens that prefix every runtime path in generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Resolve the crate path from the parsed struct attribute, defaulting to
/// `::asp`.
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::asp }, |path| quote! { #path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default(None, ":: asp")]
    #[case::custom(Some("my_alias"), "my_alias")]
    #[case::local(Some("crate"), "crate")]
    #[case::nested(Some("deps::asp"), "deps :: asp")]
    fn resolve_produces_expected_tokens(#[case] input: Option<&str>, #[case] expected: &str) {
        let parsed = input.map(|s| syn::parse_str::<syn::Path>(s).expect("valid path"));
        let tokens = resolve(parsed.as_ref());
        assert_eq!(tokens.to_string(), expected);
    }
}
