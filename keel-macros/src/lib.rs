mod decode_field;

use decode_field::{decode_field, register_field};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implements `Bean` for a struct with named fields and a `Default` implementation.
///
/// Field attributes:
/// - `#[bean(name = "..")]` registers the property under a different name.
/// - `#[bean(nested)]` on an `Option<T>` or `Option<Box<T>>` field whose `T` is a bean.
/// - `#[bean(skip)]` hides the field.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let Fields::Named(..) = &item.fields else {
        panic!(
            "Bean can only be derived for structs with named fields, `{}` is not one",
            item.ident
        );
    };
    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let registrations = item
        .fields
        .iter()
        .map(decode_field)
        .filter(|v| !v.skip)
        .map(|v| register_field(&v));
    quote! {
        impl #impl_generics ::keel::Bean for #ident #ty_generics #where_clause {
            fn instantiate() -> Self {
                ::std::default::Default::default()
            }
            fn introspect(introspector: &mut ::keel::Introspector<Self>) {
                #(#registrations)*
            }
        }
    }
    .into()
}
