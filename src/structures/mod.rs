//! Typed values and their content codecs.
//!
//! Each submodule knows how to turn one kind of value into the content
//! octets of a primitive element and back. The structs wrapping the values
//! carry a class and tag number, defaulting to the universal ones, so that
//! implicitly tagged values can be written with struct update syntax:
//!
//! ```
//! use bertree::common::TagClass;
//! use bertree::structures::{IntoElement, OctetString};
//!
//! let password = OctetString {
//!     class: TagClass::Context,
//!     id: 0,
//!     inner: b"secret".to_vec(),
//! }
//! .into_element();
//! assert_eq!(password.as_octets().unwrap(), b"secret");
//! ```

use crate::structure::Element;

pub mod boolean;
pub mod integer;
pub mod null;
pub mod octetstring;
pub mod oid;
pub mod sequence;

pub use self::boolean::Boolean;
pub use self::integer::{Enumerated, Integer};
pub use self::null::{EndOfContent, Null};
pub use self::octetstring::{BitString, OctetString};
pub use self::oid::{ObjectIdentifier, Oid};
pub use self::sequence::{Sequence, Set};

pub trait IntoElement {
    /// Encode yourself into a generic element.
    ///
    /// Only the content encoding differs between types; class, tag number and
    /// length are handled once, by the writer, for every element.
    fn into_element(self) -> Element;
}

impl IntoElement for Element {
    fn into_element(self) -> Element {
        self
    }
}
