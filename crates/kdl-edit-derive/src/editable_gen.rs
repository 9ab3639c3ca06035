use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

use crate::attrs::{parse_struct_attrs, FieldInfo, FieldShape};

pub fn generate_editable_impl(input: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Editable can only be derived for structs with named fields, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Editable can only be derived for structs with named fields, not unions",
            ));
        }
    };
    let named = match &data.fields {
        Fields::Named(named) => named,
        Fields::Unnamed(_) | Fields::Unit => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Editable can only be derived for structs with named fields",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(&input.attrs)?;
    let type_name = struct_attrs.resolved_name(struct_name);

    let mut fields: Vec<FieldInfo> = Vec::new();
    for field in &named.named {
        if let Some(info) = FieldInfo::from_field(field)? {
            if fields.iter().any(|seen| seen.name == info.name) {
                return Err(syn::Error::new_spanned(
                    &field.ident,
                    format!("duplicate editable field name `{}`", info.name),
                ));
            }
            fields.push(info);
        }
    }

    let descriptors = fields.iter().map(descriptor_tokens);
    let get_arms = fields.iter().map(get_arm);
    let set_arms = fields.iter().map(set_arm);
    let nested: Vec<&FieldInfo> = fields
        .iter()
        .filter(|info| info.shape == FieldShape::Nested)
        .collect();
    let nested_names: Vec<&str> = nested.iter().map(|info| info.name.as_str()).collect();
    let nested_idents: Vec<&syn::Ident> = nested.iter().map(|info| &info.ident).collect();

    Ok(quote! {
        impl #impl_generics ::kdl_edit::Editable for #struct_name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> &'static [::kdl_edit::FieldDescriptor] {
                const FIELDS: &[::kdl_edit::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn get(
                &self,
                field: &str,
            ) -> ::core::result::Result<::kdl_edit::FieldValue, ::kdl_edit::AccessError> {
                const TYPE_NAME: &str = #type_name;
                match field {
                    #(#get_arms)*
                    _ => ::core::result::Result::Err(
                        ::kdl_edit::AccessError::unknown_field(TYPE_NAME, field),
                    ),
                }
            }

            fn set(
                &mut self,
                field: &str,
                value: ::kdl_edit::FieldValue,
            ) -> ::core::result::Result<(), ::kdl_edit::AccessError> {
                const TYPE_NAME: &str = #type_name;
                let _ = &value;
                match field {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        ::kdl_edit::AccessError::unknown_field(TYPE_NAME, field),
                    ),
                }
            }

            fn nested(&self, field: &str) -> ::core::option::Option<&dyn ::kdl_edit::Editable> {
                match field {
                    #(#nested_names => ::core::option::Option::Some(
                        &self.#nested_idents as &dyn ::kdl_edit::Editable,
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn nested_mut(
                &mut self,
                field: &str,
            ) -> ::core::option::Option<&mut dyn ::kdl_edit::Editable> {
                match field {
                    #(#nested_names => ::core::option::Option::Some(
                        &mut self.#nested_idents as &mut dyn ::kdl_edit::Editable,
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    })
}

fn optional_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(text) => quote!(::core::option::Option::Some(#text)),
        None => quote!(::core::option::Option::None),
    }
}

fn descriptor_tokens(info: &FieldInfo) -> TokenStream {
    let name = LitStr::new(&info.name, info.ident.span());
    let kind = info.shape.kind_tokens();
    let type_label = &info.type_label;
    let excluded = info.is_excluded();
    let readonly = info.is_readonly();
    let text = info.text;
    let sequence = info.sequence;
    let description = optional_str(info.attrs.description.as_deref());
    let default_option = optional_str(info.attrs.default.as_deref());
    let comments = &info.attrs.comments;
    let serialized_comment = optional_str(info.serialized_comment.as_deref());

    quote! {
        ::kdl_edit::FieldDescriptor {
            excluded: #excluded,
            readonly: #readonly,
            text: #text,
            sequence: #sequence,
            description: #description,
            default_option: #default_option,
            comments: &[#(#comments),*],
            serialized_comment: #serialized_comment,
            ..::kdl_edit::FieldDescriptor::new(#name, #kind, #type_label)
        }
    }
}

fn get_arm(info: &FieldInfo) -> TokenStream {
    let name = &info.name;
    let ident = &info.ident;
    let body = match info.shape {
        FieldShape::Boolean => quote! {
            ::core::result::Result::Ok(::kdl_edit::FieldValue::Bool(self.#ident))
        },
        FieldShape::Integer32 => quote! {
            ::core::result::Result::Ok(::kdl_edit::FieldValue::Int(self.#ident))
        },
        FieldShape::Float32 => quote! {
            ::core::result::Result::Ok(::kdl_edit::FieldValue::Float(self.#ident))
        },
        FieldShape::Float64 => quote! {
            ::core::result::Result::Ok(::kdl_edit::FieldValue::Double(self.#ident))
        },
        FieldShape::Opaque => quote! {
            ::kdl_edit::FieldValue::from_serialize(&self.#ident)
                .map_err(|err| ::kdl_edit::AccessError::convert(TYPE_NAME, field, err))
        },
        FieldShape::Nested => quote! {
            ::core::result::Result::Err(::kdl_edit::AccessError::not_scalar(TYPE_NAME, field))
        },
    };
    quote! { #name => #body, }
}

fn set_arm(info: &FieldInfo) -> TokenStream {
    let name = &info.name;
    let ident = &info.ident;
    let ty = &info.ty;

    if info.is_readonly() {
        return quote! {
            #name => ::core::result::Result::Err(
                ::kdl_edit::AccessError::read_only(TYPE_NAME, field),
            ),
        };
    }

    let assign = match info.shape {
        FieldShape::Boolean => quote! { self.#ident = value.into_bool(TYPE_NAME, field)?; },
        FieldShape::Integer32 => quote! { self.#ident = value.into_i32(TYPE_NAME, field)?; },
        FieldShape::Float32 => quote! { self.#ident = value.into_f32(TYPE_NAME, field)?; },
        FieldShape::Float64 => quote! { self.#ident = value.into_f64(TYPE_NAME, field)?; },
        FieldShape::Opaque => quote! {
            self.#ident = value.into_opaque::<#ty>(TYPE_NAME, field)?;
        },
        FieldShape::Nested => {
            return quote! {
                #name => ::core::result::Result::Err(
                    ::kdl_edit::AccessError::not_scalar(TYPE_NAME, field),
                ),
            };
        }
    };
    quote! {
        #name => {
            #assign
            ::core::result::Result::Ok(())
        }
    }
}
