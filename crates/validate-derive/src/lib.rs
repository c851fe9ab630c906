//! Derive macro for `profile_store_shared::Validate`.
//!
//! ```ignore
//! #[derive(Validate)]
//! #[validate(error = "DraftError")]
//! struct Draft {
//!     #[validate(non_empty, max_len = 200)]
//!     name: String,
//!     #[validate(custom = "check_files")]
//!     files: Vec<File>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitInt, LitStr, Path,
    PathArguments, Type,
};

/// Derive `profile_store_shared::Validate` with field-level checks.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand_validate(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Debug)]
enum Rule {
    NonEmpty,
    MaxLen(LitInt),
    Custom(Path),
}

struct FieldRules {
    label: LitStr,
    rules: Vec<Rule>,
}

fn expand_validate(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let error_ty = container_error_type(&input.attrs)?;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Validate can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "Validate requires named fields",
        ));
    };

    let mut checks = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let FieldRules { label, rules } = field_rules(&field.attrs, ident)?;
        let (is_option, inner) = split_option(&field.ty);
        for rule in rules {
            let check = match rule {
                Rule::NonEmpty => {
                    require_text(inner, "non_empty")?;
                    let err = quote! {
                        <#error_ty as profile_store_shared::ValidationError>::empty(#label)
                    };
                    text_check(ident, is_option, &quote! { value.trim().is_empty() }, &err)
                },
                Rule::MaxLen(max) => {
                    require_text(inner, "max_len")?;
                    let err = quote! {
                        <#error_ty as profile_store_shared::ValidationError>::too_long(
                            #label,
                            value.chars().count(),
                            #max,
                        )
                    };
                    text_check(
                        ident,
                        is_option,
                        &quote! { value.chars().count() > #max },
                        &err,
                    )
                },
                Rule::Custom(path) => {
                    if is_option {
                        quote! { #path(self.#ident.as_ref())?; }
                    } else {
                        quote! { #path(&self.#ident)?; }
                    }
                },
            };
            checks.push(check);
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics profile_store_shared::Validate for #name #ty_generics #where_clause {
            type Error = #error_ty;

            fn validate(&self) -> ::core::result::Result<(), Self::Error> {
                #(#checks)*
                Ok(())
            }
        }
    })
}

fn text_check(
    ident: &Ident,
    is_option: bool,
    failing: &proc_macro2::TokenStream,
    err: &proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
    if is_option {
        quote! {
            if let Some(value) = self.#ident.as_deref() {
                if #failing {
                    return Err(#err);
                }
            }
        }
    } else {
        quote! {
            {
                let value: &str = &self.#ident;
                if #failing {
                    return Err(#err);
                }
            }
        }
    }
}

fn container_error_type(attrs: &[Attribute]) -> Result<Path, syn::Error> {
    let mut error_ty: Option<Path> = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("validate")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("error") {
                return Err(meta.error("unsupported validate attribute on container"));
            }
            if error_ty.is_some() {
                return Err(meta.error("duplicate validate(error = ...)"));
            }
            let value: LitStr = meta.value()?.parse()?;
            error_ty = Some(value.parse()?);
            Ok(())
        })?;
    }

    error_ty.ok_or_else(|| {
        syn::Error::new(
            Span::call_site(),
            "missing #[validate(error = \"path\")] on struct",
        )
    })
}

fn field_rules(attrs: &[Attribute], ident: &Ident) -> Result<FieldRules, syn::Error> {
    let mut rules = Vec::new();
    let mut label: Option<LitStr> = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("validate")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("field") {
                if label.is_some() {
                    return Err(meta.error("duplicate validate(field = ...)"));
                }
                label = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("non_empty") {
                rules.push(Rule::NonEmpty);
            } else if meta.path.is_ident("max_len") {
                rules.push(Rule::MaxLen(meta.value()?.parse()?));
            } else if meta.path.is_ident("custom") {
                let value: LitStr = meta.value()?.parse()?;
                rules.push(Rule::Custom(value.parse()?));
            } else {
                return Err(meta.error("unsupported validate attribute on field"));
            }
            Ok(())
        })?;
    }
    let label = label.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    Ok(FieldRules { label, rules })
}

fn split_option(ty: &Type) -> (bool, &Type) {
    option_inner(ty).map_or((false, ty), |inner| (true, inner))
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    first_type_arg(&segment.arguments)
}

fn first_type_arg(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn require_text(ty: &Type, rule: &str) -> Result<(), syn::Error> {
    if is_text(ty) {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            ty,
            format!("{rule} can only be used on String or Box<str> fields"),
        ))
    }
}

fn is_text(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_text(&reference.elem),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return false;
            };
            if segment.ident == "String" || segment.ident == "str" {
                return true;
            }
            segment.ident == "Box" && first_type_arg(&segment.arguments).is_some_and(is_text)
        },
        _ => false,
    }
}
