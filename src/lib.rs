//! Basic Encoding Rules codec working on element trees.
//!
//! Input bytes are read into a tree of [`Element`](structure/struct.Element.html)s
//! with [`Reader`](parse/struct.Reader.html), inspected with the typed
//! accessors on `Element`, and written back with
//! [`write_elements`](write/fn.write_elements.html). Trees can be assembled
//! and taken apart either through the typed [`Builder`](build/struct.Builder.html)
//! and [`Scanner`](scan/struct.Scanner.html), or through compact directive
//! strings in the [`directive`](directive/index.html) module.
//!
//! Only definite lengths are supported.

pub mod build;
pub mod common;
pub mod directive;
pub mod error;
pub mod parse;
pub mod scan;
pub mod settings;
pub mod structure;
pub mod structures;
pub mod universal;
pub mod write;

pub use build::Builder;
pub use directive::{Arg, Slot};
pub use error::{BerError, Result};
pub use parse::{parse_tag, read_elements, Reader};
pub use scan::Scanner;
pub use settings::ReaderSettings;
pub use structure::{Element, Payload};
pub use structures::Oid;
pub use write::{write_element, write_elements};
