//! Tree writer.

use bytes::{BufMut, Bytes};
use log::trace;

use crate::common::{identifier_octet, TagClass, TagStructure, LONG_FORM_TAG, MAX_TAG_NUMBER};
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};

/// Number of identifier octets for a tag number.
pub fn tag_length(id: u64) -> usize {
    if id < LONG_FORM_TAG as u64 {
        1
    } else {
        1 + base128_digits(id)
    }
}

fn base128_digits(mut n: u64) -> usize {
    let mut count = 1;
    while n > 0x7f {
        n >>= 7;
        count += 1;
    }
    count
}

/// Number of length octets for a content length.
pub fn length_length(len: usize) -> usize {
    if len < 0x80 {
        1
    } else {
        1 + big_endian_octets(len)
    }
}

fn big_endian_octets(n: usize) -> usize {
    ((usize::BITS - n.leading_zeros()) as usize + 7) / 8
}

/// Write the identifier octets, short form whenever the number allows.
pub fn encode_tag<B: BufMut>(w: &mut B, class: TagClass, structure: TagStructure, id: u64) {
    if id < LONG_FORM_TAG as u64 {
        w.put_u8(identifier_octet(class, structure, id as u8));
        return;
    }
    w.put_u8(identifier_octet(class, structure, LONG_FORM_TAG));
    let count = base128_digits(id);
    for i in (0..count).rev() {
        let digit = ((id >> (7 * i)) & 0x7f) as u8;
        w.put_u8(if i > 0 { digit | 0x80 } else { digit });
    }
}

/// Write the length octets in the shortest definite form.
pub fn encode_length<B: BufMut>(w: &mut B, len: usize) {
    if len < 0x80 {
        w.put_u8(len as u8);
        return;
    }
    let count = big_endian_octets(len);
    w.put_u8(0x80 | count as u8);
    w.put_slice(&len.to_be_bytes()[(usize::BITS / 8) as usize - count..]);
}

fn content_length(elem: &Element) -> usize {
    match elem.payload {
        Payload::Primitive(ref content) => content.len(),
        Payload::Constructed(ref children) => children.iter().map(calc_total_length).sum(),
    }
}

/// Header plus content length of an element and its subtree.
pub fn calc_total_length(elem: &Element) -> usize {
    let len = content_length(elem);
    tag_length(elem.id) + length_length(len) + len
}

/// Size pass: check tag numbers and record the content length of every
/// constructed element, in pre-order. Returns the total length.
fn measure(elem: &Element, lengths: &mut Vec<usize>) -> Result<usize> {
    if elem.id > MAX_TAG_NUMBER {
        return Err(BerError::InvalidArgument(format!(
            "tag number {} exceeds {}",
            elem.id, MAX_TAG_NUMBER
        )));
    }
    let len = match elem.payload {
        Payload::Primitive(ref content) => content.len(),
        Payload::Constructed(ref children) => {
            let slot = lengths.len();
            lengths.push(0);
            let mut sum = 0;
            for child in children {
                sum += measure(child, lengths)?;
            }
            lengths[slot] = sum;
            sum
        }
    };
    Ok(tag_length(elem.id) + length_length(len) + len)
}

fn emit<B: BufMut>(w: &mut B, elem: &Element, lengths: &[usize], next: &mut usize) {
    encode_tag(w, elem.class, elem.structure(), elem.id);
    match elem.payload {
        Payload::Primitive(ref content) => {
            encode_length(w, content.len());
            w.put_slice(content);
        }
        Payload::Constructed(ref children) => {
            encode_length(w, lengths[*next]);
            *next += 1;
            for child in children {
                emit(w, child, lengths, next);
            }
        }
    }
}

/// Serialize an element depth-first into `w`.
///
/// Constructed lengths are always computed from the children, never stored.
/// Fails without writing anything if a tag number exceeds
/// [`MAX_TAG_NUMBER`](../common/constant.MAX_TAG_NUMBER.html).
pub fn encode_into<B: BufMut>(w: &mut B, elem: &Element) -> Result<()> {
    let mut lengths = Vec::new();
    measure(elem, &mut lengths)?;
    emit(w, elem, &lengths, &mut 0);
    Ok(())
}

/// Serialize a sibling chain into a buffer of exactly the needed size.
pub fn write_elements(elements: &[Element]) -> Result<Vec<u8>> {
    let mut lengths = Vec::new();
    let mut total = 0;
    for elem in elements {
        total += measure(elem, &mut lengths)?;
    }
    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| BerError::AllocationFailure(total))?;
    let mut next = 0;
    for elem in elements {
        emit(&mut out, elem, &lengths, &mut next);
    }
    trace!("encoded {} element(s) into {} bytes", elements.len(), out.len());
    Ok(out)
}

/// Serialize one element.
pub fn write_element(elem: &Element) -> Result<Vec<u8>> {
    write_elements(std::slice::from_ref(elem))
}

/// Serialize one element into an immutable, cheaply cloneable buffer.
pub fn to_bytes(elem: &Element) -> Result<Bytes> {
    write_element(elem).map(Bytes::from)
}
