//! Slice-level TLV readers for self-contained payloads (control values,
//! captured filter subtrees). The PDU-level scanner in [`super::de`] must
//! suspend mid-TLV; these readers work on complete buffers and are built on
//! `nom`'s complete combinators.

use nom::bytes::complete::take;
use nom::IResult;

use crate::error::DecodeError;
use crate::tag::Class;

use super::Identifier;

/// A complete TLV borrowed from a payload slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TlvSlice<'a> {
    pub id: Identifier,
    pub contents: &'a [u8],
}

impl TlvSlice<'_> {
    /// The single identifier octet, or 0xff for (grammar-impossible)
    /// multi-byte tags so lookups simply fail to match.
    pub fn initial_octet(&self) -> u8 {
        self.id.initial_octet().unwrap_or(0xff)
    }
}

fn parse_identifier(input: &[u8]) -> IResult<&[u8], (Identifier, bool)> {
    let (input, octet) = take(1usize)(input)?;
    let initial = octet[0];

    let class = Class::from_bits(initial >> 6);
    let constructed = initial & 0x20 != 0;
    let number = u32::from(initial & 0x1f);

    if number < 0x1f {
        return Ok((input, (Identifier::new(class, constructed, number), false)));
    }

    let (input, body) = nom::bytes::complete::take_while(|b: u8| b & 0x80 != 0)(input)?;
    let (input, end) = take(1usize)(input)?;
    let mut number: u32 = 0;
    let mut overflow = body.len() > 4;
    for byte in body {
        overflow |= number >> 21 != 0;
        number = (number << 7) | u32::from(byte & 0x7f);
    }
    overflow |= number >> 21 != 0;
    number = (number << 7) | u32::from(end[0]);

    Ok((input, (Identifier::new(class, constructed, number), overflow)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], Option<u64>> {
    let (input, octet) = take(1usize)(input)?;
    let initial = octet[0];
    if initial == 0x80 {
        return Ok((input, None));
    }
    if initial < 0x80 {
        return Ok((input, Some(u64::from(initial))));
    }

    let count = usize::from(initial & 0x7f);
    let (input, bytes) = take(count)(input)?;
    let mut length: u64 = 0;
    for byte in bytes {
        length = length.saturating_mul(256).saturating_add(u64::from(*byte));
    }
    Ok((input, Some(length)))
}

fn map_nom_err<E>(_: nom::Err<E>) -> DecodeError {
    DecodeError::UnexpectedEndOfInput
}

/// Reads one complete TLV off the front of `input`.
pub(crate) fn parse_tlv(input: &[u8]) -> Result<(TlvSlice<'_>, &[u8]), DecodeError> {
    let (rest, (id, overflow)) = parse_identifier(input).map_err(map_nom_err)?;
    if overflow {
        return Err(DecodeError::TagOverflow);
    }
    let (rest, length) = parse_length(rest).map_err(map_nom_err)?;
    let length = length.ok_or(DecodeError::IndefiniteLength)?;
    if length > u64::from(i32::MAX as u32) {
        return Err(DecodeError::LengthOverflow);
    }
    let (rest, contents) =
        take(length as usize)(rest).map_err(map_nom_err::<nom::error::Error<&[u8]>>)?;
    Ok((TlvSlice { id, contents }, rest))
}

/// Reads one TLV and checks its identifier octet against `octet`.
pub(crate) fn expect_tlv<'a>(
    input: &'a [u8],
    octet: u8,
    state: &'static str,
) -> Result<(&'a [u8], &'a [u8]), DecodeError> {
    let (tlv, rest) = parse_tlv(input)?;
    if tlv.initial_octet() != octet {
        return Err(DecodeError::grammar(state, tlv.initial_octet()));
    }
    Ok((tlv.contents, rest))
}

/// Reads one TLV only when its identifier octet matches `octet`.
pub(crate) fn optional_tlv<'a>(
    input: &'a [u8],
    octet: u8,
) -> Result<Option<(&'a [u8], &'a [u8])>, DecodeError> {
    if input.is_empty() {
        return Ok(None);
    }
    let (tlv, rest) = parse_tlv(input)?;
    if tlv.initial_octet() != octet {
        return Ok(None);
    }
    Ok(Some((tlv.contents, rest)))
}

/// Fails unless the payload slice is fully consumed.
pub(crate) fn expect_end(input: &[u8]) -> Result<(), DecodeError> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::TrailingBytesInStructure {
            remaining: input.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    #[test]
    fn tlv_long_length_form() {
        let mut input = vec![0x04, 0x81, 0x80];
        input.extend_from_slice(&[0xf0; 0x80]);
        let (tlv, rest) = parse_tlv(&input).unwrap();
        assert_eq!(tlv.id, Identifier::primitive(Tag::OCTET_STRING));
        assert_eq!(tlv.contents.len(), 0x80);
        assert!(rest.is_empty());
    }

    #[test]
    fn tlv_multi_byte_tag() {
        let input = [0x9f, 0x82, 0x37, 0x01, 0xaa];
        let (tlv, _) = parse_tlv(&input).unwrap();
        assert_eq!(tlv.id.tag, Tag::context(311));
        assert_eq!(tlv.contents, &[0xaa]);
        assert_eq!(tlv.initial_octet(), 0xff);
    }

    #[test]
    fn tlv_rejections() {
        assert_eq!(parse_tlv(&[0x04]), Err(DecodeError::UnexpectedEndOfInput));
        assert_eq!(parse_tlv(&[0x04, 0x05, 0x00]), Err(DecodeError::UnexpectedEndOfInput));
        assert_eq!(parse_tlv(&[0x24, 0x80, 0x00, 0x00]), Err(DecodeError::IndefiniteLength));
        assert_eq!(
            parse_tlv(&[0x04, 0x84, 0xff, 0x00, 0x00, 0x00]),
            Err(DecodeError::LengthOverflow)
        );
    }
}
