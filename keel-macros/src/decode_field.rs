use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Field, GenericArgument, Ident, LitStr, Path, PathArguments, Type, parse::ParseBuffer,
};

/// How the nested bean is held by the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NestedHolder {
    Option,
    OptionBox,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) skip: bool,
    pub(crate) nested: Option<(NestedHolder, Type)>,
}

fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = path.segments.len();
    len > 0
        && len <= expect.len()
        && path
            .segments
            .iter()
            .rev()
            .zip(expect.iter().rev())
            .all(|(segment, expect)| segment.ident == expect)
}

/// The single type argument of `ty` when it is one of `paths`.
fn generic_argument<'a>(ty: &'a Type, paths: &[&[&str]]) -> Option<&'a Type> {
    let Type::Path(ty) = ty else {
        return None;
    };
    if ty.qself.is_some() || !paths.iter().any(|v| matches_path(&ty.path, v)) {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &ty.path.segments.last()?.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn decode_nested(ty: &Type) -> (NestedHolder, Type) {
    let inner = generic_argument(
        ty,
        &[&["std", "option", "Option"], &["core", "option", "Option"]],
    )
    .unwrap_or_else(|| {
        panic!(
            "`#[bean(nested)]` expects a field of type `Option<T>` or `Option<Box<T>>`, found `{}`",
            ty.to_token_stream()
        )
    });
    match generic_argument(
        inner,
        &[&["std", "boxed", "Box"], &["alloc", "boxed", "Box"]],
    ) {
        Some(bean) => (NestedHolder::OptionBox, bean.clone()),
        None => (NestedHolder::Option, inner.clone()),
    }
}

pub fn decode_field(field: &Field) -> FieldMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Bean can only be derived for structs with named fields");
    let mut name = ident.to_string();
    if let Some(raw) = name.strip_prefix("r#") {
        name = raw.to_string();
    }
    let mut metadata = FieldMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        skip: false,
        nested: None,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("bean") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `bean`, use it like: `#[bean(attribute, ...)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[bean(name = \"my_property\")]`");
                    };
                    metadata.name = v.value();
                } else if arg.path.is_ident("nested") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `nested`, use it like: `#[bean(nested)]`");
                    };
                    metadata.nested = Some(decode_nested(&field.ty));
                } else if arg.path.is_ident("skip") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `skip`, use it like: `#[bean(skip)]`");
                    };
                    metadata.skip = true;
                } else {
                    panic!(
                        "Unknown attribute `{}` inside bean macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    metadata
}

/// The introspector call registering the field.
pub fn register_field(metadata: &FieldMetadata) -> TokenStream {
    let ident = &metadata.ident;
    let name = &metadata.name;
    match &metadata.nested {
        Some((NestedHolder::Option, bean)) => quote! {
            introspector.nested::<#bean>(
                #name,
                |v: &Self| v.#ident.as_ref(),
                |v: &mut Self| v.#ident.as_mut(),
                |v: &mut Self, n: #bean| v.#ident = ::std::option::Option::Some(n),
            );
        },
        Some((NestedHolder::OptionBox, bean)) => quote! {
            introspector.nested::<#bean>(
                #name,
                |v: &Self| v.#ident.as_deref(),
                |v: &mut Self| v.#ident.as_deref_mut(),
                |v: &mut Self, n: #bean| {
                    v.#ident = ::std::option::Option::Some(::std::boxed::Box::new(n))
                },
            );
        },
        None => {
            let ty = &metadata.ty;
            quote! {
                introspector.field::<#ty>(#name, |v: &Self| &v.#ident, |v: &mut Self| &mut v.#ident);
            }
        }
    }
}
