use crate::attr::{DefaultAttr, ParamField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Error, Expr, ExprLit, ExprUnary, Field, Fields, ItemStruct, Lit, LitFloat, UnOp};

const MAX_FIELDS: usize = 64;

// expand_query_params
pub fn expand_query_params(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new_spanned(args, "`query_params` takes no arguments").to_compile_error();
    }

    let item: ItemStruct = match syn::parse2(input) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error(),
    };

    match expand(item) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(mut item: ItemStruct) -> syn::Result<TokenStream> {
    let Fields::Named(named) = &mut item.fields else {
        return Err(Error::new_spanned(&item.ident, "`query_params` can only be applied to structs with named fields"));
    };

    let fields = named.named.iter().map(ParamField::parse).collect::<syn::Result<Vec<_>>>()?;

    let direct = fields.iter().filter(|field| !field.flatten).count();
    if direct > MAX_FIELDS {
        return Err(Error::new_spanned(&item.ident, format!("a query schema can declare at most {MAX_FIELDS} fields, use `#[param(flatten)]` to split it")));
    }

    for field in &mut named.named {
        field.attrs.retain(|attr| !attr.path().is_ident("param"));
    }
    named.named.push(Field::parse_named.parse2(quote! {
        #[doc(hidden)]
        __fields_set: ::micro_qp::FieldsSet
    })?);

    let ident = &item.ident;
    let schema_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let mut names = Vec::with_capacity(fields.len());
    let mut descriptors = Vec::with_capacity(fields.len());
    let mut extractions = Vec::with_capacity(fields.len());
    let mut encoders = Vec::with_capacity(fields.len());
    let mut index = 0_usize;

    for field in &fields {
        let field_ident = &field.ident;
        let ty = &field.ty;
        let name = &field.name;

        if field.flatten {
            names.push(quote! {
                ::micro_qp::FieldName::Flatten(<#ty as ::micro_qp::QueryParams>::FIELD_NAMES)
            });
            descriptors.push(quote! {
                __fields.extend(<#ty as ::micro_qp::QueryParams>::fields());
            });
            extractions.push(quote! {
                let #field_ident = ::micro_qp::__private::nested::<#ty>(__args, &mut __errors);
            });
            encoders.push(quote! {
                __pairs.extend(::micro_qp::QueryParams::query_pairs(&self.#field_ident));
            });
            continue;
        }

        let constraints: Vec<TokenStream> = field
            .bounds
            .iter()
            .map(|bound| {
                let variant = bound.kind.variant();
                let expr = &bound.expr;
                if bound.kind.is_length() {
                    quote!(::micro_qp::Constraint::#variant(#expr))
                } else {
                    let expr = float_literal(expr).unwrap_or_else(|| quote!(#expr));
                    quote!(::micro_qp::Constraint::#variant(::micro_qp::__private::bound(#expr)))
                }
            })
            .collect();

        let with_default = match &field.default {
            DefaultAttr::Implicit => quote!(),
            DefaultAttr::Trait => quote! {
                .with_default(::micro_qp::DefaultValue::of::<#ty>(&::core::default::Default::default()))
            },
            DefaultAttr::Expr(expr) => quote! {
                .with_default(::micro_qp::DefaultValue::of::<#ty>(&(#expr)))
            },
        };
        let with_description = field.description.as_ref().map(|description| quote!(.with_description(#description)));

        names.push(quote!(::micro_qp::FieldName::Param(#name)));
        descriptors.push(quote! {
            __fields.push(
                ::micro_qp::FieldDescriptor::of::<#ty>(#name)
                    #with_default
                    #with_description
                    #(.with_constraint(#constraints))*
            );
        });

        let default = match &field.default {
            DefaultAttr::Implicit => quote!(<#ty as ::micro_qp::QueryValue>::absent),
            DefaultAttr::Trait => quote!(|| ::core::option::Option::Some(<#ty as ::core::default::Default>::default())),
            DefaultAttr::Expr(expr) => quote!(|| ::core::option::Option::Some::<#ty>(#expr)),
        };

        extractions.push(quote! {
            let #field_ident = ::micro_qp::__private::field::<#ty, _>(
                __args,
                #name,
                #index,
                #default,
                &[#(#constraints),*],
                &mut __set,
                &mut __errors,
            );
        });

        encoders.push(quote! {
            if self.__fields_set.contains(#index) {
                if let ::core::option::Option::Some(__value) = ::micro_qp::QueryValue::to_raw(&self.#field_ident) {
                    __pairs.push((#name, __value));
                }
            }
        });

        index += 1;
    }

    let idents: Vec<_> = fields.iter().map(|field| &field.ident).collect();
    let duplicate_message = format!("query schema `{schema_name}` declares a parameter name more than once");

    // generic schemas are checked when first instantiated, through the reference in `construct`
    let check_now = item.generics.params.is_empty().then(|| {
        quote! {
            const _: () = #ident::__UNIQUE_FIELD_NAMES;
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics #ident #ty_generics #where_clause {
            #[doc(hidden)]
            const __UNIQUE_FIELD_NAMES: () = ::core::assert!(
                ::micro_qp::FieldName::duplicate(<Self as ::micro_qp::QueryParams>::FIELD_NAMES).is_none(),
                #duplicate_message
            );
        }

        #check_now

        impl #impl_generics ::micro_qp::QueryParams for #ident #ty_generics #where_clause {
            const NAME: &'static str = #schema_name;

            const FIELD_NAMES: &'static [::micro_qp::FieldName] = &[#(#names),*];

            fn fields() -> ::std::vec::Vec<::micro_qp::FieldDescriptor> {
                let () = Self::__UNIQUE_FIELD_NAMES;
                #[allow(unused_mut, reason = "a schema without fields has nothing to push")]
                let mut __fields = ::std::vec::Vec::new();
                #(#descriptors)*
                __fields
            }

            fn construct(__args: &::micro_qp::QueryArgs) -> ::core::result::Result<Self, ::micro_qp::ValidationErrors> {
                let () = Self::__UNIQUE_FIELD_NAMES;
                #[allow(unused_mut, reason = "a schema without fields never records an error")]
                let mut __errors = ::micro_qp::ValidationErrors::new();
                #[allow(unused_mut, reason = "schemas made only of composed fields never record a field")]
                let mut __set = ::micro_qp::FieldsSet::new();
                #(#extractions)*

                match (#(#idents,)*) {
                    (#(::core::option::Option::Some(#idents),)*) if __errors.is_empty() => {
                        ::core::result::Result::Ok(Self { #(#idents,)* __fields_set: __set })
                    }
                    _ => ::core::result::Result::Err(__errors),
                }
            }

            fn query_pairs(&self) -> ::std::vec::Vec<(&'static str, ::std::string::String)> {
                #[allow(unused_mut, reason = "a schema without fields has nothing to push")]
                let mut __pairs = ::std::vec::Vec::new();
                #(#encoders)*
                __pairs
            }
        }
    })
}

// an unsuffixed integer bound would be typed `i32` and overflow past its range
fn float_literal(expr: &Expr) -> Option<TokenStream> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(int), .. }) if int.suffix().is_empty() => {
            let float = LitFloat::new(&format!("{}.0", int.base10_digits()), int.span());
            Some(quote!(#float))
        }
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr, .. }) => float_literal(expr).map(|float| quote!(-#float)),
        _ => None,
    }
}
