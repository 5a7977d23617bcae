//! Unit tests for `#[asp(...)]` attribute parsing.

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use syn::{Attribute, DeriveInput, parse_quote};

use super::*;

fn field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    parse_field_attrs(attrs).map_err(|e| anyhow!(e.to_string()))
}

#[rstest]
fn parses_the_combined_tag() -> Result<()> {
    let attrs: Vec<Attribute> = vec![parse_quote!(#[asp("exam,e,EXAM_ENV,An example,true")])];
    let parsed = field_attrs(&attrs)?;
    ensure!(parsed.combined.as_deref() == Some("exam,e,EXAM_ENV,An example,true"));
    ensure!(parsed.long.is_none());
    ensure!(!parsed.skip);
    Ok(())
}

#[rstest]
fn parses_specific_tags_and_keeps_empty_values() -> Result<()> {
    let attrs: Vec<Attribute> = vec![
        parse_quote!(#[asp(long = "", short = "p")]),
        parse_quote!(#[asp(env = "PORT", desc = "the {Name} port", sensitive = "false")]),
    ];
    let parsed = field_attrs(&attrs)?;
    ensure!(parsed.long.as_deref() == Some(""));
    ensure!(parsed.short.as_deref() == Some("p"));
    ensure!(parsed.env.as_deref() == Some("PORT"));
    ensure!(parsed.desc.as_deref() == Some("the {Name} port"));
    ensure!(parsed.sensitive.as_deref() == Some("false"));
    Ok(())
}

#[rstest]
#[case::bare(parse_quote!(#[asp(sensitive)]), Some("true"), false, false)]
#[case::skip(parse_quote!(#[asp(skip)]), None, true, false)]
#[case::dash(parse_quote!(#[asp("-")]), None, true, false)]
#[case::embed(parse_quote!(#[asp(embed)]), None, false, true)]
fn parses_flags(
    #[case] attr: Attribute,
    #[case] sensitive: Option<&str>,
    #[case] skip: bool,
    #[case] embed: bool,
) -> Result<()> {
    let parsed = field_attrs(&[attr])?;
    ensure!(parsed.sensitive.as_deref() == sensitive);
    ensure!(parsed.skip == skip);
    ensure!(parsed.embed == embed);
    Ok(())
}

#[rstest]
#[case::unknown(parse_quote!(#[asp(rename = "x")]), "unknown asp attribute `rename`; expected one of long, short, env, desc, sensitive, skip, embed")]
#[case::unknown_flag(parse_quote!(#[asp(flatten)]), "unknown asp attribute `flatten`; expected one of long, short, env, desc, sensitive, skip, embed")]
#[case::repeated(parse_quote!(#[asp(long = "a", long = "b")]), "duplicate long")]
#[case::not_a_string(parse_quote!(#[asp(short = 'p')]), "`short` takes a string literal")]
fn rejects_bad_attributes(#[case] attr: Attribute, #[case] message: &str) {
    let err = parse_field_attrs(&[attr]).err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some(message));
}

#[rstest]
fn ignores_foreign_attributes() -> Result<()> {
    let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(rename = "x")]), parse_quote!(#[doc = "docs"])];
    ensure!(field_attrs(&attrs)? == FieldAttrs::default());
    Ok(())
}

#[rstest]
fn reads_the_crate_override() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[asp(crate = "renamed")]
        struct Config {
            #[asp(short = "v")]
            verbose: bool,
        }
    };
    let parsed = parse_input(&input).map_err(|e| anyhow!(e.to_string()))?;
    ensure!(parsed.krate.to_string() == "renamed");
    ensure!(parsed.fields.len() == 1);
    let field = parsed.fields.first().ok_or_else(|| anyhow!("missing field"))?;
    ensure!(field.ident == "verbose");
    ensure!(field.attrs.short.as_deref() == Some("v"));
    Ok(())
}

#[rstest]
#[case::tuple(parse_quote!(struct Pair(u64, u64);), "Schema can only be derived for structs with named fields")]
#[case::enumeration(parse_quote!(enum Mode { A, B }), "Schema can only be derived for structs with named fields")]
#[case::struct_key(
    parse_quote!(#[asp(long = "x")] struct Config { a: u64 }),
    "only `crate = \"...\"` is supported on the struct"
)]
fn rejects_unsupported_inputs(#[case] input: DeriveInput, #[case] message: &str) {
    let err = parse_input(&input).err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some(message));
}
