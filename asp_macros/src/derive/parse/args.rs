//! Token-level grammar of `#[asp(...)]` arguments.

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Ident, LitStr, Token};

/// One comma separated argument.
pub(super) enum AspArg {
    /// `"long,short,env,desc,sensitive"`.
    Combined(LitStr),
    /// `key = "value"`.
    Value(Ident, LitStr),
    /// A bare `key`.
    Flag(Ident),
}

impl AspArg {
    pub(super) fn span(&self) -> Span {
        match self {
            Self::Combined(lit) => lit.span(),
            Self::Value(key, _) | Self::Flag(key) => key.span(),
        }
    }
}

impl Parse for AspArg {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Combined(input.parse()?));
        }
        let key = input.call(Ident::parse_any)?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value = input
                .parse::<LitStr>()
                .map_err(|e| syn::Error::new(e.span(), format!("`{key}` takes a string literal")))?;
            return Ok(Self::Value(key, value));
        }
        Ok(Self::Flag(key))
    }
}

/// Parses the argument list of one `#[asp(...)]` attribute.
pub(super) fn parse_asp_args(attr: &Attribute) -> syn::Result<Vec<AspArg>> {
    let args = attr.parse_args_with(Punctuated::<AspArg, Token![,]>::parse_terminated)?;
    Ok(args.into_iter().collect())
}
