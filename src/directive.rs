//! Directive strings.
//!
//! A directive is a compact string of letters, each describing one element
//! of a tree. The same string drives both directions: [`build`](fn.build.html)
//! turns a list of [`Arg`](enum.Arg.html) values into elements, and
//! [`extract`](fn.extract.html) checks a tree against the letters and stores
//! the values it finds into [`Slot`](enum.Slot.html)s.
//!
//! | Letter | Build | Extract |
//! |--------|-------|---------|
//! | `i`, `d` | integer | integer |
//! | `E` | enumerated | enumerated |
//! | `b` | boolean | boolean |
//! | `s` | octet string from text | octet string as bytes |
//! | `x` | octet string from bytes | octet string as bytes |
//! | `B` | bit string | bit string |
//! | `o` | object identifier | object identifier |
//! | `t` | class and tag of the next element | expected, or reported, class and tag of the next element |
//! | `0` | null | null |
//! | `.` | end-of-content | end-of-content |
//! | `e` | prebuilt element | any element |
//! | `{` | open a sequence | descend into a constructed element |
//! | `}` | close the sequence | return to the parent |
//! | `S` | | skip one element |
//! | `$` | | scope must be exhausted |
//! | `p` | | offset of the next element |
//!
//! Scopes are checked for balance before any argument is used. Whitespace
//! is ignored.
//!
//! ```
//! use bertree::common::TagClass;
//! use bertree::directive::{self, Arg, Slot};
//!
//! let tree = directive::build(
//!     "{dt{dsts}}",
//!     vec![
//!         Arg::Int(1),
//!         Arg::Tag(TagClass::Application, 0),
//!         Arg::Int(3),
//!         Arg::Str("cn=admin"),
//!         Arg::Tag(TagClass::Context, 0),
//!         Arg::Str("password"),
//!     ],
//! )
//! .unwrap();
//!
//! let (mut msgid, mut version, mut dn) = (0, 0, Vec::new());
//! directive::extract(
//!     &tree,
//!     "{dt{ds",
//!     &mut [
//!         Slot::Int(&mut msgid),
//!         Slot::Tag(TagClass::Application, 0),
//!         Slot::Int(&mut version),
//!         Slot::Bytes(&mut dn),
//!     ],
//! )
//! .unwrap();
//! assert_eq!((msgid, version, &dn[..]), (1, 3, &b"cn=admin"[..]));
//! ```

use log::debug;

use crate::build::Builder;
use crate::common::{Tag, TagClass};
use crate::error::{BerError, Result};
use crate::scan::Scanner;
use crate::structure::Element;
use crate::structures::Oid;

/// One value consumed by a build directive.
#[derive(Clone, Debug)]
pub enum Arg<'a> {
    Int(i64),
    Bool(bool),
    Str(&'a str),
    Bytes(&'a [u8]),
    Oid(&'a Oid),
    Tag(TagClass, u64),
    Element(Element),
}

impl<'a> Arg<'a> {
    fn kind(&self) -> &'static str {
        match *self {
            Arg::Int(_) => "integer",
            Arg::Bool(_) => "boolean",
            Arg::Str(_) => "string",
            Arg::Bytes(_) => "bytes",
            Arg::Oid(_) => "object identifier",
            Arg::Tag(..) => "tag",
            Arg::Element(_) => "element",
        }
    }
}

/// One destination filled by an extract directive.
///
/// `Tag` is an input: it names the class and tag number the next element
/// must carry. `ReadTag` receives them instead, whatever they are. Either
/// way the next letter decodes the element implicitly.
#[derive(Debug)]
pub enum Slot<'a> {
    Int(&'a mut i64),
    Bool(&'a mut bool),
    Bytes(&'a mut Vec<u8>),
    Oid(&'a mut Oid),
    Tag(TagClass, u64),
    ReadTag(&'a mut TagClass, &'a mut u64),
    Element(&'a mut Option<Element>),
    Offset(&'a mut Option<usize>),
}

impl<'a> Slot<'a> {
    fn kind(&self) -> &'static str {
        match *self {
            Slot::Int(_) => "integer",
            Slot::Bool(_) => "boolean",
            Slot::Bytes(_) => "bytes",
            Slot::Oid(_) => "object identifier",
            Slot::Tag(..) | Slot::ReadTag(..) => "tag",
            Slot::Element(_) => "element",
            Slot::Offset(_) => "offset",
        }
    }
}

/// Meaning of a directive letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Letter {
    Integer,
    Enumerated,
    Boolean,
    String,
    Octets,
    BitString,
    Oid,
    Tag,
    Null,
    EndOfContent,
    Element,
    Open,
    Close,
    Skip,
    End,
    Offset,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Letter> {
        Some(match c {
            'i' | 'd' => Letter::Integer,
            'E' => Letter::Enumerated,
            'b' => Letter::Boolean,
            's' => Letter::String,
            'x' => Letter::Octets,
            'B' => Letter::BitString,
            'o' => Letter::Oid,
            't' => Letter::Tag,
            '0' => Letter::Null,
            '.' => Letter::EndOfContent,
            'e' => Letter::Element,
            '{' => Letter::Open,
            '}' => Letter::Close,
            'S' => Letter::Skip,
            '$' => Letter::End,
            'p' => Letter::Offset,
            _ => return None,
        })
    }

    /// Whether the letter has a meaning when building.
    pub fn builds(self) -> bool {
        !matches!(self, Letter::Skip | Letter::End | Letter::Offset)
    }
}

#[derive(Clone, Copy, Debug)]
struct Step {
    position: usize,
    ch: char,
    letter: Letter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Build,
    Extract,
}

/// Tokenize a directive and check its scopes before anything is consumed.
fn compile(directive: &str, mode: Mode) -> Result<Vec<Step>> {
    let mut steps = Vec::with_capacity(directive.len());
    let mut depth = 0usize;
    for (position, ch) in directive.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let letter = Letter::from_char(ch).ok_or_else(|| BerError::DirectiveMismatch {
            letter: ch,
            position,
            reason: "unknown directive letter".to_owned(),
        })?;
        if mode == Mode::Build && !letter.builds() {
            return Err(BerError::DirectiveMismatch {
                letter: ch,
                position,
                reason: "letter is only valid when extracting".to_owned(),
            });
        }
        match letter {
            Letter::Open => depth += 1,
            Letter::Close => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(BerError::UnbalancedScope { position })?;
            }
            _ => (),
        }
        steps.push(Step {
            position,
            ch,
            letter,
        });
    }
    if depth != 0 {
        return Err(BerError::UnbalancedScope {
            position: directive.chars().count(),
        });
    }
    Ok(steps)
}

fn missing(step: &Step, what: &str) -> BerError {
    BerError::DirectiveMismatch {
        letter: step.ch,
        position: step.position,
        reason: format!("no {} argument left", what),
    }
}

fn wrong_kind(step: &Step, expected: &str, found: &str) -> BerError {
    BerError::DirectiveMismatch {
        letter: step.ch,
        position: step.position,
        reason: format!("expected {} argument, got {}", expected, found),
    }
}

/// Report an error under the letter written in the directive, which may
/// be an alias of the one the builder or scanner knows.
fn relabel(err: BerError, steps: &[Step]) -> BerError {
    match err {
        BerError::DirectiveMismatch {
            letter,
            position,
            reason,
        } => BerError::DirectiveMismatch {
            letter: steps
                .iter()
                .find(|s| s.position == position)
                .map_or(letter, |s| s.ch),
            position,
            reason,
        },
        err => err,
    }
}

/// Build a sibling chain from a directive and its arguments.
pub fn build<'a, I>(directive: &str, args: I) -> Result<Vec<Element>>
where
    I: IntoIterator<Item = Arg<'a>>,
{
    let steps = compile(directive, Mode::Build)?;
    let mut args = args.into_iter();
    let mut b = Builder::new();
    for step in &steps {
        if b.failed() {
            break;
        }
        b = b.at(step.position);
        macro_rules! next_arg {
            ($variant:ident, $what:expr) => {
                match args.next() {
                    Some(Arg::$variant(v)) => v,
                    Some(other) => return Err(wrong_kind(step, $what, other.kind())),
                    None => return Err(missing(step, $what)),
                }
            };
        }
        b = match step.letter {
            Letter::Integer => b.integer(next_arg!(Int, "integer")),
            Letter::Enumerated => b.enumerated(next_arg!(Int, "integer")),
            Letter::Boolean => b.boolean(next_arg!(Bool, "boolean")),
            Letter::String => b.string(next_arg!(Str, "string")),
            Letter::Octets => match args.next() {
                Some(Arg::Bytes(v)) => b.octets(v),
                Some(Arg::Str(v)) => b.octets(v.as_bytes()),
                Some(other) => return Err(wrong_kind(step, "bytes", other.kind())),
                None => return Err(missing(step, "bytes")),
            },
            Letter::BitString => b.bit_string(next_arg!(Bytes, "bytes")),
            Letter::Oid => b.oid(next_arg!(Oid, "object identifier")),
            Letter::Tag => match args.next() {
                Some(Arg::Tag(class, id)) => b.tag(class, id),
                Some(other) => return Err(wrong_kind(step, "tag", other.kind())),
                None => return Err(missing(step, "tag")),
            },
            Letter::Null => b.null(),
            Letter::EndOfContent => b.end_of_content(),
            Letter::Element => b.element(next_arg!(Element, "element")),
            Letter::Open => b.begin_sequence(),
            Letter::Close => b.end(),
            Letter::Skip | Letter::End | Letter::Offset => {
                return Err(BerError::DirectiveMismatch {
                    letter: step.ch,
                    position: step.position,
                    reason: "letter is only valid when extracting".to_owned(),
                })
            }
        };
    }
    let elements = b
        .at(directive.chars().count())
        .finish()
        .map_err(|err| relabel(err, &steps))?;
    let unused = args.count();
    if unused > 0 {
        return Err(BerError::InvalidArgument(format!(
            "{} argument(s) left after the directive",
            unused
        )));
    }
    Ok(elements)
}

/// Build exactly one element.
pub fn build_one<'a, I>(directive: &str, args: I) -> Result<Element>
where
    I: IntoIterator<Item = Arg<'a>>,
{
    let mut elements = build(directive, args)?;
    match elements.len() {
        1 => Ok(elements.remove(0)),
        n => Err(BerError::InvalidArgument(format!(
            "directive {:?} built {} top-level elements",
            directive, n
        ))),
    }
}

/// Match a sibling chain against a directive, filling `slots` in order.
///
/// On failure, slots filled before the failing letter keep their values.
pub fn extract(elements: &[Element], directive: &str, slots: &mut [Slot]) -> Result<()> {
    let steps = compile(directive, Mode::Extract)?;
    let mut slots = slots.iter_mut();
    let mut s = Scanner::new(elements);
    for step in &steps {
        s.set_position(step.position);
        macro_rules! next_slot {
            ($variant:ident, $what:expr) => {
                match slots.next() {
                    Some(Slot::$variant(v)) => v,
                    Some(other) => return Err(wrong_kind(step, $what, other.kind())),
                    None => return Err(missing(step, $what)),
                }
            };
        }
        let res = match step.letter {
            Letter::Integer => {
                let out = next_slot!(Int, "integer");
                s.integer().map(|v| **out = v)
            }
            Letter::Enumerated => {
                let out = next_slot!(Int, "integer");
                s.enumerated().map(|v| **out = v)
            }
            Letter::Boolean => {
                let out = next_slot!(Bool, "boolean");
                s.boolean().map(|v| **out = v)
            }
            Letter::String => {
                let out = next_slot!(Bytes, "bytes");
                s.string().map(|v| {
                    out.clear();
                    out.extend_from_slice(v);
                })
            }
            Letter::Octets => {
                let out = next_slot!(Bytes, "bytes");
                s.octets().map(|v| {
                    out.clear();
                    out.extend_from_slice(v);
                })
            }
            Letter::BitString => {
                let out = next_slot!(Bytes, "bytes");
                s.bit_string().map(|v| {
                    out.clear();
                    out.extend_from_slice(v);
                })
            }
            Letter::Oid => {
                let out = next_slot!(Oid, "object identifier");
                s.oid().map(|v| **out = v)
            }
            Letter::Tag => match slots.next() {
                Some(Slot::Tag(class, id)) => s.tag(*class, *id),
                Some(Slot::ReadTag(class, id)) => s.read_tag().map(|(c, n)| {
                    **class = c;
                    **id = n;
                }),
                Some(other) => return Err(wrong_kind(step, "tag", other.kind())),
                None => return Err(missing(step, "tag")),
            },
            Letter::Null => s.null(),
            Letter::EndOfContent => s.end_of_content(),
            Letter::Element => {
                let out = next_slot!(Element, "element");
                s.element().map(|v| **out = Some(v.clone()))
            }
            Letter::Open => s.enter(),
            Letter::Close => s.leave(),
            Letter::Skip => s.skip(),
            Letter::End => s.end(),
            Letter::Offset => {
                let out = next_slot!(Offset, "offset");
                s.offset().map(|v| **out = v)
            }
        };
        res.map_err(|err| relabel(err, &steps))?;
    }
    if let Some((class, id)) = s.pending() {
        let err = BerError::DirectiveMismatch {
            letter: 't',
            position: directive.chars().count(),
            reason: format!("tag {} is not followed by an element", Tag(class, id)),
        };
        debug!("extract failed: {}", err);
        return Err(err);
    }
    let unused = slots.count();
    if unused > 0 {
        return Err(BerError::InvalidArgument(format!(
            "{} slot(s) left after the directive",
            unused
        )));
    }
    Ok(())
}

/// Match a single element against a directive.
pub fn extract_element(elem: &Element, directive: &str, slots: &mut [Slot]) -> Result<()> {
    extract(std::slice::from_ref(elem), directive, slots)
}
