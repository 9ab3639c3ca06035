//! Manual `parse_nested_meta` parsing of `#[edit(...)]` attributes.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, Field, Lit};

use super::container::StructAttrs;
use super::field::FieldAttrs;

pub fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut result = StructAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("edit") {
            continue;
        }
        attr.parse_nested_meta(|meta| parse_struct_meta(&meta, &mut result))?;
    }
    Ok(result)
}

fn parse_struct_meta(meta: &ParseNestedMeta, result: &mut StructAttrs) -> syn::Result<()> {
    let ident = meta.path.get_ident().map(|i| i.to_string());
    match ident.as_deref() {
        Some("name") | Some("rename") => result.name = Some(string_value(meta)?),
        Some(name) => {
            return Err(syn::Error::new_spanned(
                &meta.path,
                format!("unknown edit attribute: `{}`", name),
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                &meta.path,
                "expected identifier for edit attribute",
            ));
        }
    }
    Ok(())
}

pub fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut raw = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("edit") {
            continue;
        }
        raw.span = Some(attr.bracket_token.span.join());
        attr.parse_nested_meta(|meta| parse_field_meta(&meta, &mut raw))?;
    }
    Ok(raw)
}

fn parse_field_meta(meta: &ParseNestedMeta, raw: &mut FieldAttrs) -> syn::Result<()> {
    let ident = meta.path.get_ident().map(|i| i.to_string());

    match ident.as_deref() {
        Some("skip") => raw.skip = true,
        Some("exclude") => raw.exclude = true,
        Some("readonly") => raw.readonly = true,
        Some("nested") => raw.nested = true,
        Some("opaque") => raw.opaque = true,
        Some("rename") | Some("name") => raw.rename = Some(string_value(meta)?),
        Some("description") | Some("desc") => raw.description = Some(string_value(meta)?),
        Some("comment") => raw.comments.push(string_value(meta)?),
        Some("default") => {
            let value: Expr = meta.value()?.parse()?;
            raw.default = Some(match value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.value(),
                Expr::Lit(ExprLit {
                    lit: Lit::Int(i), ..
                }) => i.base10_digits().to_string(),
                Expr::Lit(ExprLit {
                    lit: Lit::Float(f), ..
                }) => f.base10_digits().to_string(),
                Expr::Lit(ExprLit {
                    lit: Lit::Bool(b), ..
                }) => b.value.to_string(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "default must be a string, number, or boolean literal",
                    ));
                }
            });
        }
        Some(name) => {
            return Err(syn::Error::new_spanned(
                &meta.path,
                format!("unknown edit attribute: `{}`", name),
            ));
        }
        None => {
            return Err(syn::Error::new_spanned(
                &meta.path,
                "expected identifier for edit attribute",
            ));
        }
    }
    Ok(())
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Comment text of a `#[serde(rename = "// text")]` attribute.
pub fn serde_comment_from_attrs(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut comment: Option<String> = None;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(value) = parse_serde_string_value(meta)? {
                    if let Some(text) = value.strip_prefix("//") {
                        let text = text.strip_prefix(' ').unwrap_or(text);
                        comment.get_or_insert_with(|| text.to_string());
                    }
                }
            } else if !meta.input.is_empty() && !meta.input.peek(syn::Token![,]) {
                // Consume the value of unrelated serde keys.
                if meta.input.peek(syn::Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                } else {
                    meta.parse_nested_meta(|nested| {
                        if nested.input.peek(syn::Token![=]) {
                            let _: Expr = nested.value()?.parse()?;
                        }
                        Ok(())
                    })?;
                }
            }
            Ok(())
        })?;
    }

    Ok(comment)
}

fn parse_serde_string_value(meta: ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let value: Expr = meta.value()?.parse()?;
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = value
        {
            return Ok(Some(lit.value()));
        }
        return Ok(None);
    }

    if meta.input.is_empty() {
        return Ok(None);
    }

    let mut value: Option<String> = None;
    meta.parse_nested_meta(|m| {
        let is_serialize = m.path.is_ident("serialize");
        let is_deserialize = m.path.is_ident("deserialize");
        if is_serialize || is_deserialize {
            if let Some(rename) = parse_serde_string_value(m)? {
                if value.is_none() || is_serialize {
                    value = Some(rename);
                }
            }
        }
        Ok(())
    })?;

    Ok(value)
}
