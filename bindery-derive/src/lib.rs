use crate::fill::expand_fill;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error};

mod attributes;
mod fill;

#[proc_macro_derive(Fill, attributes(fill))]
pub fn generate_fill(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_fill(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
