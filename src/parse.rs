//! Tag/length parsing and the tree reader.

use log::{debug, trace};
use nom::bits::{bits, complete::take as take_bits};
use nom::bytes::complete::{take, take_till};
use nom::combinator::map_opt;
use nom::number::complete::be_u8;
use nom::sequence::tuple;
use nom::IResult;

use crate::common::{TagClass, TagStructure, LONG_FORM_TAG};
use crate::error::{BerError, Result};
use crate::settings::ReaderSettings;
use crate::structure::{Element, Payload};
use crate::universal::EncodedType;

/// Continuation octets allowed in a long-form tag number.
pub const MAX_TAG_OCTETS: usize = 4;

fn class_bits(i: (&[u8], usize)) -> IResult<(&[u8], usize), TagClass> {
    map_opt(take_bits(2usize), TagClass::from_u8)(i)
}

fn pc_bit(i: (&[u8], usize)) -> IResult<(&[u8], usize), TagStructure> {
    map_opt(take_bits(1usize), TagStructure::from_u8)(i)
}

fn tagnr_bits(i: (&[u8], usize)) -> IResult<(&[u8], usize), u8> {
    take_bits(5usize)(i)
}

/// Split the identifier octet into class, structure and the low tag bits.
pub fn parse_type_header(i: &[u8]) -> IResult<&[u8], (TagClass, TagStructure, u8)> {
    bits(tuple((class_bits, pc_bit, tagnr_bits)))(i)
}

fn octet(i: &[u8]) -> IResult<&[u8], u8> {
    be_u8(i)
}

fn continuation_octets(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till(|b: u8| b & 0x80 == 0)(i)
}

fn length_octets(i: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    take(count)(i)
}

/// Extract an unsigned big-endian integer, or `None` if it overflows `usize`.
pub fn parse_uint(i: &[u8]) -> Option<usize> {
    i.iter()
        .try_fold(0usize, |acc, &byte| acc.checked_mul(256).map(|v| v | byte as usize))
}

/// Decode the identifier octets at `position`.
///
/// Returns class, structure, tag number and the number of octets consumed.
pub fn decode_tag(buf: &[u8], position: usize) -> Result<(TagClass, TagStructure, u64, usize)> {
    let input = buf.get(position..).unwrap_or(&[]);
    let (rest, (class, structure, low)) =
        parse_type_header(input).map_err(|_| BerError::truncated(position, 1, input.len()))?;
    if low != LONG_FORM_TAG {
        return Ok((class, structure, low as u64, 1));
    }
    let (rest, more) =
        continuation_octets(rest).map_err(|_| BerError::truncated(position, 2, input.len()))?;
    if more.len() >= MAX_TAG_OCTETS {
        return Err(BerError::TagOverflow { offset: position });
    }
    let (_, last) =
        octet(rest).map_err(|_| BerError::truncated(position, more.len() + 2, input.len()))?;
    let id = more
        .iter()
        .chain(Some(&last))
        .fold(0u64, |acc, &b| (acc << 7) | (b & 0x7f) as u64);
    Ok((class, structure, id, more.len() + 2))
}

/// Decode the length octets at `position`.
///
/// Returns the content length and the number of octets consumed.
pub fn decode_length(buf: &[u8], position: usize) -> Result<(usize, usize)> {
    let input = buf.get(position..).unwrap_or(&[]);
    let (rest, first) = octet(input).map_err(|_| BerError::truncated(position, 1, input.len()))?;
    match first {
        0x80 => Err(BerError::UnsupportedIndefiniteLength { offset: position }),
        // reserved by X.690 8.1.3.5
        0xff => Err(BerError::LengthOverflow { offset: position }),
        short if short & 0x80 == 0 => Ok((short as usize, 1)),
        long => {
            let count = (long & 0x7f) as usize;
            let (_, octets) = length_octets(rest, count)
                .map_err(|_| BerError::truncated(position, count + 1, input.len()))?;
            let len = parse_uint(octets).ok_or(BerError::LengthOverflow { offset: position })?;
            Ok((len, count + 1))
        }
    }
}

/// Constructed element whose children are still being read.
struct Frame {
    class: TagClass,
    id: u64,
    encoding: EncodedType,
    offset: usize,
    end: usize,
    children: Vec<Element>,
}

impl Frame {
    fn into_element(self) -> Element {
        Element {
            class: self.class,
            id: self.id,
            encoding: self.encoding,
            payload: Payload::Constructed(self.children),
            offset: Some(self.offset),
        }
    }
}

/// Tree reader.
///
/// Nesting is tracked on an explicit stack, so adversarial input can't
/// exhaust the call stack; the depth is capped by
/// [`ReaderSettings`](../settings/struct.ReaderSettings.html).
#[derive(Clone, Copy, Debug, Default)]
pub struct Reader {
    settings: ReaderSettings,
}

impl Reader {
    pub fn new(settings: ReaderSettings) -> Reader {
        Reader { settings }
    }

    /// Parse the element starting at `position`.
    ///
    /// Returns the element and the position just past it. Bytes after the
    /// element are left alone. On failure, everything parsed so far is
    /// dropped.
    pub fn read_element(&self, buf: &[u8], position: usize) -> Result<(Element, usize)> {
        self.read_tree(buf, position).map_err(|e| {
            debug!("failed to read element at offset {}: {}", position, e);
            e
        })
    }

    /// Parse a chain of sibling elements filling the whole buffer.
    pub fn read_elements(&self, buf: &[u8]) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        let mut pos = 0;
        while pos < buf.len() {
            let (elem, next) = self.read_element(buf, pos)?;
            elements.push(elem);
            pos = next;
        }
        Ok(elements)
    }

    fn read_tree(&self, buf: &[u8], position: usize) -> Result<(Element, usize)> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut pos = position;
        loop {
            // close every scope whose content region is used up
            while let Some(frame) = stack.pop() {
                if frame.end != pos {
                    stack.push(frame);
                    break;
                }
                let elem = frame.into_element();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => return Ok((elem, pos)),
                }
            }

            // children may not run past the end of their parent
            let limit = stack.last().map_or(buf.len(), |frame| frame.end);
            let region = &buf[..limit];
            let (class, structure, id, tag_len) = decode_tag(region, pos)?;
            let (len, len_len) = decode_length(region, pos + tag_len)?;
            let start = pos + tag_len + len_len;
            let available = limit - start;
            if len > available {
                return Err(BerError::truncated(start, len, available));
            }
            let end = start + len;
            let encoding = self.settings.resolve(class, structure, id);
            trace!(
                "element {:?}/{} {:?} at {}, {} content bytes",
                class,
                id,
                structure,
                pos,
                len
            );

            match structure {
                TagStructure::Primitive => {
                    let elem = Element {
                        class,
                        id,
                        encoding,
                        payload: Payload::Primitive(buf[start..end].to_vec()),
                        offset: Some(start),
                    };
                    pos = end;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(elem),
                        None => return Ok((elem, pos)),
                    }
                }
                TagStructure::Constructed => {
                    if stack.len() >= self.settings.max_depth() {
                        return Err(BerError::DepthExceeded {
                            offset: pos,
                            limit: self.settings.max_depth(),
                        });
                    }
                    stack.push(Frame {
                        class,
                        id,
                        encoding,
                        offset: start,
                        end,
                        children: Vec::new(),
                    });
                    pos = start;
                }
            }
        }
    }
}

/// Parse one element with default settings, returning the unconsumed input.
pub fn parse_tag(i: &[u8]) -> Result<(&[u8], Element)> {
    let (elem, end) = Reader::default().read_element(i, 0)?;
    Ok((&i[end..], elem))
}

/// Parse all sibling elements in `buf` with default settings.
pub fn read_elements(buf: &[u8]) -> Result<Vec<Element>> {
    Reader::default().read_elements(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_primitive() {
        let bytes: Vec<u8> = vec![2, 2, 255, 127];
        let (rest, tag) = parse_tag(&bytes[..]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(tag, Element::integer(-129));
        assert_eq!(tag.offset, Some(2));
        assert_eq!(tag.encoding, EncodedType::Integer);
    }

    #[test]
    fn test_constructed() {
        let bytes: Vec<u8> = vec![
            48, 14, 12, 12, 72, 101, 108, 108, 111, 32, 87, 111, 114, 108, 100, 33,
        ];
        let result_tag = Element::sequence(vec![Element {
            class: TagClass::Universal,
            id: 12,
            encoding: EncodedType::Other(12),
            payload: Payload::Primitive(b"Hello World!".to_vec()),
            offset: None,
        }]);
        let (rest, tag) = parse_tag(&bytes[..]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(tag, result_tag);
        assert_eq!(tag.children()[0].offset, Some(4));
    }

    #[test]
    fn test_long_length() {
        let mut bytes: Vec<u8> = vec![0x30, 0x82, 0x01, 0x01, 0x80, 0x0C];
        bytes.extend_from_slice(b"JustALongTag");
        bytes.extend_from_slice(&[0x81, 0x81, 0xF0]);
        for _ in 0..20 {
            bytes.extend_from_slice(b"JustALongTag");
        }
        assert_eq!(bytes.len(), 0x0101 + 4);

        let (rest, tag) = parse_tag(&bytes[..]).unwrap();
        assert!(rest.is_empty());
        let children = tag.expect_constructed().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].class, TagClass::Context);
        assert_eq!(children[0].id, 0);
        assert_eq!(children[1].id, 1);
        assert_eq!(
            children[1].primitive_content().unwrap().len(),
            0xf0
        );
    }

    #[test]
    fn test_trailing_bytes_are_returned() {
        let bytes = [0x05, 0x00, 0xaa];
        let (rest, tag) = parse_tag(&bytes).unwrap();
        assert_eq!(rest, &[0xaa]);
        assert_eq!(tag, Element::null());
    }

    #[test]
    fn test_tag_short_and_long() {
        assert_eq!(
            decode_tag(&[0x60], 0),
            Ok((TagClass::Application, TagStructure::Constructed, 0, 1))
        );
        assert_eq!(
            decode_tag(&[0x9f, 0x81, 0x00], 0),
            Ok((TagClass::Context, TagStructure::Primitive, 128, 3))
        );
        assert_eq!(
            decode_tag(&[0x1f, 0xff, 0xff, 0xff, 0x7f], 0),
            Ok((
                TagClass::Universal,
                TagStructure::Primitive,
                crate::common::MAX_TAG_NUMBER,
                5
            ))
        );
    }

    #[test]
    fn test_tag_overflow_before_truncation() {
        assert_eq!(
            decode_tag(&[0x1f, 0x80, 0x80, 0x80, 0x80, 0x02], 0),
            Err(BerError::TagOverflow { offset: 0 })
        );
        assert_eq!(
            decode_tag(&[0x1f, 0x80, 0x80, 0x80, 0x80], 0),
            Err(BerError::TagOverflow { offset: 0 })
        );
        assert!(matches!(
            decode_tag(&[0x1f, 0x80], 0),
            Err(BerError::TruncatedInput { .. })
        ));
        assert!(matches!(
            decode_tag(&[], 0),
            Err(BerError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_length_forms() {
        assert_eq!(decode_length(&[0x7f], 0), Ok((127, 1)));
        assert_eq!(decode_length(&[0x81, 0x80], 0), Ok((128, 2)));
        assert_eq!(decode_length(&[0x00, 0x82, 0x01, 0x00], 1), Ok((256, 3)));
        assert_eq!(
            decode_length(&[0x80], 0),
            Err(BerError::UnsupportedIndefiniteLength { offset: 0 })
        );
        assert!(matches!(
            decode_length(&[0x82, 0x01], 0),
            Err(BerError::TruncatedInput { .. })
        ));
        assert_eq!(
            decode_length(&[0xff], 0),
            Err(BerError::LengthOverflow { offset: 0 })
        );
    }

    #[test]
    fn test_length_overflow() {
        let mut bytes = vec![0x89];
        bytes.extend_from_slice(&[0x01; 9]);
        assert_eq!(
            decode_length(&bytes, 0),
            Err(BerError::LengthOverflow { offset: 0 })
        );
        assert_eq!(parse_uint(&[0x00, 0x01, 0x00]), Some(256));
    }

    #[test]
    fn test_child_overruns_parent() {
        // the sequence claims 3 bytes, its integer claims 2 more than that
        let bytes = [0x30, 0x03, 0x02, 0x03, 0x01, 0x00, 0x00];
        assert!(matches!(
            parse_tag(&bytes),
            Err(BerError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_depth_cap() {
        let nested = [0x30, 0x04, 0x30, 0x02, 0x30, 0x00];
        let reader = Reader::new(ReaderSettings::new().set_max_depth(2));
        assert!(matches!(
            reader.read_element(&nested, 0),
            Err(BerError::DepthExceeded { limit: 2, .. })
        ));
        let reader = Reader::new(ReaderSettings::new().set_max_depth(3));
        let (tree, end) = reader.read_element(&nested, 0).unwrap();
        assert_eq!(end, nested.len());
        assert_eq!(tree.children()[0].children()[0].children().len(), 0);
    }

    #[test]
    fn test_deep_nesting_with_raised_cap() {
        // every level is a four-octet long-form header around the next
        let depth = 2_000;
        let mut bytes = Vec::with_capacity(depth * 6 + 2);
        for level in (0..depth).rev() {
            bytes.extend_from_slice(&[0x30, 0x84]);
            bytes.extend_from_slice(&((2 + 6 * level) as u32).to_be_bytes());
        }
        bytes.extend_from_slice(&[0x05, 0x00]);

        assert!(matches!(
            parse_tag(&bytes),
            Err(BerError::DepthExceeded { .. })
        ));
        let reader = Reader::new(ReaderSettings::new().set_max_depth(depth));
        let (_, end) = reader.read_element(&bytes, 0).unwrap();
        assert_eq!(end, bytes.len());
    }

    #[test]
    fn test_sibling_chain() {
        let bytes = [0x02, 0x01, 0x01, 0x01, 0x01, 0xff];
        let elements = read_elements(&bytes).unwrap();
        assert_eq!(elements, vec![Element::integer(1), Element::boolean(true)]);
        assert_eq!(elements[1].offset, Some(5));
    }
}
