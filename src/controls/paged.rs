//! Simple paged results (RFC 2696).

use bytes::Bytes;

use crate::ber::parser::{expect_end, expect_tlv};
use crate::ber::{decode_integer_u32, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::tag::Tag;

use super::{Control, ControlFactory, ControlValue};

/// `realSearchControlValue ::= SEQUENCE { size INTEGER, cookie OCTET STRING }`
///
/// In a request `size` is the requested page size; in a response it is the
/// server's content-count estimate. An empty cookie in a response means the
/// result set is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagedResults {
    pub size: u32,
    pub cookie: Bytes,
}

impl PagedResults {
    pub const OID: &'static str = "1.2.840.113556.1.4.319";

    pub fn new(size: u32) -> Self {
        Self {
            size,
            cookie: Bytes::new(),
        }
    }
}

pub(super) struct PagedResultsFactory;

impl ControlFactory for PagedResultsFactory {
    fn oid(&self) -> &'static str {
        PagedResults::OID
    }

    fn new_control(&self) -> Control {
        Control::new(PagedResults::OID, ControlValue::PagedResults(PagedResults::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "paged results")?;
        expect_end(rest)?;
        let (size, rest) = expect_tlv(seq, 0x02, "paged results")?;
        let (cookie, rest) = expect_tlv(rest, 0x04, "paged results")?;
        expect_end(rest)?;

        control.value = ControlValue::PagedResults(PagedResults {
            size: decode_integer_u32(size)?,
            cookie: Bytes::copy_from_slice(cookie),
        });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::PagedResults(paged) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "paged results control value",
            });
        };
        let mark = enc.pos();
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), &paged.cookie);
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(paged.size));
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn value_round_trip() {
        let bytes = hex!("30 0b 02 01 05 04 06 61 62 63 64 65 66");
        let factory = PagedResultsFactory;
        let mut control = factory.new_control();
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(
            control.value,
            ControlValue::PagedResults(PagedResults {
                size: 5,
                cookie: Bytes::from_static(b"abcdef"),
            })
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        assert_eq!(enc.into_bytes(), bytes);
    }

    #[test]
    fn value_must_be_a_sequence() {
        let factory = PagedResultsFactory;
        let mut control = factory.new_control();
        assert!(factory.decode_value(&mut control, &hex!("02 01 05")).is_err());
    }
}
