use crate::attributes::FieldAttributes;
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Data, DataStruct, DeriveInput, Error, Field, GenericArgument, Index, Member, PathArguments,
    Result, Type,
};

const FILL: &str = "fill";
const POINTERS: [&str; 2] = ["Arc", "InstancePtr"];

fn last_segment(ty: &Type) -> Option<(String, Option<&Type>)> {
    let Type::Path(path) = ty else {
        return None;
    };

    let segment = path.path.segments.last()?;
    let argument = match &segment.arguments {
        PathArguments::AngleBracketed(arguments) => {
            arguments.args.iter().find_map(|argument| match argument {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
        }
        _ => None,
    };

    Some((segment.ident.to_string(), argument))
}

fn is_pointer(ty: &Type) -> bool {
    last_segment(ty)
        .map(|(ident, _)| POINTERS.contains(&ident.as_str()))
        .unwrap_or(false)
}

// Instance pointers, optional instance pointers and vectors of instance pointers.
fn is_injectable(ty: &Type) -> bool {
    match last_segment(ty) {
        Some((ident, _)) if POINTERS.contains(&ident.as_str()) => true,
        Some((ident, Some(inner))) if ident == "Option" || ident == "Vec" => is_pointer(inner),
        _ => false,
    }
}

fn field_attributes(field: &Field) -> Result<Option<FieldAttributes>> {
    field
        .attrs
        .iter()
        .filter(|attribute| attribute.path().is_ident(FILL))
        .map(FieldAttributes::try_from)
        .next()
        .transpose()
}

fn generate_field_fill(index: usize, field: &Field) -> Result<Option<TokenStream>> {
    let attributes = field_attributes(field)?;
    let injectable = match &attributes {
        Some(attributes) => !attributes.skip,
        None => is_injectable(&field.ty),
    };

    if !injectable {
        return Ok(None);
    }

    let (member, field_name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (
            Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
            index.to_string(),
        ),
    };

    let attributes = attributes.unwrap_or_default();
    let optional = attributes.optional;
    let name = attributes.name.map(|name| quote!(.name(#name)));

    Ok(Some(quote! {
        bindery::fill::FieldSlot::fill_slot(
            &mut self.#member,
            container,
            &bindery::fill::FieldHints::new(#field_name).optional(#optional)#name,
        )?;
    }))
}

pub fn expand_fill(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return Err(Error::new(
            input.span(),
            "Can only derive Fill on structs!",
        ));
    };

    let fills: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| generate_field_fill(index, field))
        .try_collect()?;
    let fills = fills.into_iter().flatten();

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics bindery::fill::Fill for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn fill(
                &mut self,
                container: &mut bindery::container::Container,
            ) -> std::result::Result<(), bindery::error::ResolutionError> {
                #(#fills)*
                Ok(())
            }
        }
    })
}
