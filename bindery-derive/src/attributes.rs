use syn::{Attribute, Error, LitStr};

#[derive(Default)]
pub struct FieldAttributes {
    pub optional: bool,
    pub name: Option<LitStr>,
    pub skip: bool,
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut attributes = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("optional") {
                attributes.optional = true;
            } else if meta.path.is_ident("name") {
                attributes.name = Some(meta.value().and_then(|value| value.parse())?);
            } else if meta.path.is_ident("skip") {
                attributes.skip = true;
            } else {
                return Err(meta.error("Unsupported fill attribute!"));
            }

            Ok(())
        })?;

        Ok(attributes)
    }
}
