use crate::common::{TagClass, TagStructure};
use crate::universal::EncodedType;

/// Callback assigning a semantic type to a non-universal element.
///
/// Returning `None` leaves the element `ApplicationDefined`.
pub type TypeResolver = fn(TagClass, TagStructure, u64) -> Option<EncodedType>;

/// Default cap on constructed-element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Additional settings for the tree reader.
///
/// The structure is opaque for better extensibility. An instance with
/// default values is constructed by [`new()`](#method.new), and all
/// available settings can be replaced through a builder-like interface,
/// by calling the appropriate functions.
#[derive(Clone, Copy, Debug)]
pub struct ReaderSettings {
    max_depth: usize,
    type_resolver: Option<TypeResolver>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings {
            max_depth: DEFAULT_MAX_DEPTH,
            type_resolver: None,
        }
    }
}

impl ReaderSettings {
    /// Create an instance of the structure with default settings.
    pub fn new() -> ReaderSettings {
        ReaderSettings {
            ..Default::default()
        }
    }

    /// Set the maximum nesting depth of constructed elements. A depth of
    /// zero admits only primitive top-level elements.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the function which assigns encoded types to elements of the
    /// application, context and private classes.
    pub fn set_type_resolver(mut self, resolver: TypeResolver) -> Self {
        self.type_resolver = Some(resolver);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn resolve(&self, class: TagClass, structure: TagStructure, id: u64) -> EncodedType {
        if class == TagClass::Universal {
            return EncodedType::derive(class, id);
        }
        self.type_resolver
            .and_then(|resolve| resolve(class, structure, id))
            .unwrap_or(EncodedType::ApplicationDefined)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ldap_types(class: TagClass, _: TagStructure, id: u64) -> Option<EncodedType> {
        match (class, id) {
            (TagClass::Context, 0) => Some(EncodedType::OctetString),
            _ => None,
        }
    }

    #[test]
    fn resolver_applies_to_tagged_classes_only() {
        let settings = ReaderSettings::new().set_type_resolver(ldap_types);
        assert_eq!(
            settings.resolve(TagClass::Context, TagStructure::Primitive, 0),
            EncodedType::OctetString
        );
        assert_eq!(
            settings.resolve(TagClass::Context, TagStructure::Primitive, 3),
            EncodedType::ApplicationDefined
        );
        assert_eq!(
            settings.resolve(TagClass::Universal, TagStructure::Primitive, 0),
            EncodedType::EndOfContent
        );
    }

    #[test]
    fn chained_setters() {
        let settings = ReaderSettings::new().set_max_depth(3);
        assert_eq!(settings.max_depth(), 3);
        assert_eq!(ReaderSettings::default().max_depth(), DEFAULT_MAX_DEPTH);
    }
}
