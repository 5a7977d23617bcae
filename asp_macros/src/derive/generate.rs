//! Token generation for the `Schema` impl.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};

use super::classify::{FieldKind, classify};
use super::parse::{SchemaField, SchemaInput};

/// Builds `impl Schema for ...` along with one `FieldMeta` constant per
/// bound field.
pub(crate) fn schema_impl(input: &SchemaInput<'_>) -> syn::Result<TokenStream> {
    let krate = &input.krate;
    let ident = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut consts = Vec::new();
    let mut visits = Vec::new();
    let mut assembles = Vec::new();
    let mut first_unsupported = None;

    for (index, field) in input.fields.iter().enumerate() {
        let name = &field.ident;
        let ty = &field.ty;
        if field.attrs.skip {
            assembles.push(quote! { #name: ::core::default::Default::default() });
            continue;
        }
        let kind = classify(ty);
        if field.attrs.embed && kind != FieldKind::Nested {
            return Err(syn::Error::new_spanned(
                ty,
                "`embed` requires a nested schema type",
            ));
        }

        let meta = format_ident!("__ASP_FIELD_{}", index);
        consts.push(field_meta(krate, &meta, field));
        match kind {
            FieldKind::Leaf => {
                visits.push(quote! {
                    visitor.leaf(&#meta, #krate::Leaf::to_leaf(&self.#name))?;
                });
                assembles.push(quote! {
                    #name: #krate::assemble_leaf::<#ty>(source, &#meta)?
                });
            }
            FieldKind::Nested => {
                visits.push(quote! { visitor.nested(&#meta, &self.#name)?; });
                assembles.push(quote! {
                    #name: #krate::assemble_nested::<#ty>(source, &#meta)?
                });
            }
            FieldKind::Unsupported => {
                visits.push(quote! { visitor.unsupported(&#meta)?; });
                first_unsupported.get_or_insert(meta);
            }
        }
    }

    let visit_body = if visits.is_empty() {
        quote! {
            let _ = visitor;
            ::core::result::Result::Ok(())
        }
    } else {
        quote! {
            #(#visits)*
            ::core::result::Result::Ok(())
        }
    };
    let assemble_body = match first_unsupported {
        Some(meta) => quote! {
            ::core::result::Result::Err(source.unsupported(&#meta))
        },
        None if consts.is_empty() => quote! {
            let _ = source;
            ::core::result::Result::Ok(Self { #(#assembles,)* })
        },
        None => quote! {
            ::core::result::Result::Ok(Self { #(#assembles,)* })
        },
    };

    Ok(quote! {
        const _: () = {
            #(#consts)*

            #[automatically_derived]
            impl #impl_generics #krate::Schema for #ident #ty_generics #where_clause {
                fn visit(
                    &self,
                    visitor: &mut dyn #krate::SchemaVisitor,
                ) -> #krate::AspResult<()> {
                    #visit_body
                }

                fn assemble(
                    source: &mut dyn #krate::LeafSource,
                ) -> #krate::AspResult<Self> {
                    #assemble_body
                }
            }
        };
    })
}

fn field_meta(krate: &TokenStream, meta: &syn::Ident, field: &SchemaField) -> TokenStream {
    let name = field.ident.to_string();
    let type_name = type_text(&field.ty);
    let embedded = field.attrs.embed;
    let attrs = &field.attrs;
    let [combined, long, short, env, desc, sensitive] = [
        &attrs.combined,
        &attrs.long,
        &attrs.short,
        &attrs.env,
        &attrs.desc,
        &attrs.sensitive,
    ]
    .map(optional_str);
    quote! {
        const #meta: #krate::FieldMeta = #krate::FieldMeta {
            name: #name,
            type_name: #type_name,
            embedded: #embedded,
            tags: #krate::FieldTags {
                combined: #combined,
                long: #long,
                short: #short,
                env: #env,
                desc: #desc,
                sensitive: #sensitive,
            },
        };
    }
}

fn optional_str(value: &Option<String>) -> TokenStream {
    value.as_ref().map_or_else(
        || quote! { ::core::option::Option::None },
        |v| quote! { ::core::option::Option::Some(#v) },
    )
}

/// Source text of a type with token spacing tidied, e.g. `Vec<f32>`.
pub(crate) fn type_text(ty: &syn::Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}
