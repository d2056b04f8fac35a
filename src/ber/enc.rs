//! # Encoding BER
//!
//! The encoder writes tail-first: a structure's content is emitted before
//! its header, and the header's length field is derived from the distance
//! between two position marks. Nested lengths therefore come out correct in
//! a single pass, with no back-patching, and the output is canonical DER.

use crate::error::EncodeError;
use crate::octets::ReverseBuffer;
use crate::oid;
use crate::tag::Tag;

use super::Identifier;

/// A reverse BER/DER encoder over a [`ReverseBuffer`].
///
/// Children of a constructed value must be prepended in reverse field
/// order; [`BerEncoder::finish`] then closes the structure:
///
/// ```
/// use ldap_codec::ber::{BerEncoder, Identifier};
/// use ldap_codec::tag::Tag;
///
/// let mut enc = BerEncoder::new();
/// let mark = enc.pos();
/// enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), b"cn");
/// enc.integer(Identifier::primitive(Tag::INTEGER), 7);
/// enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
/// assert_eq!(enc.into_bytes(), &[0x30, 0x07, 0x02, 0x01, 0x07, 0x04, 0x02, b'c', b'n']);
/// ```
#[derive(Debug, Default)]
pub struct BerEncoder {
    buf: ReverseBuffer,
}

impl BerEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: ReverseBuffer::with_capacity(capacity),
        }
    }

    /// Current position mark. Everything prepended after taking a mark
    /// becomes the content of the structure closed against it.
    pub fn pos(&self) -> usize {
        self.buf.pos()
    }

    /// Consumes the encoder, returning the encoding head-first.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    /// Prepends raw, already-encoded octets.
    pub fn prepend_slice(&mut self, bytes: &[u8]) {
        self.buf.prepend_slice(bytes);
    }

    /// Closes a structure whose content was prepended since `mark`,
    /// prepending the definite length and the identifier octets.
    pub fn finish(&mut self, identifier: Identifier, mark: usize) {
        let length = self.buf.pos() - mark;
        self.prepend_length(length);
        self.prepend_identifier(identifier);
    }

    /// Encodes a primitive value with the given identifier and contents.
    pub fn primitive(&mut self, identifier: Identifier, contents: &[u8]) {
        let mark = self.pos();
        self.buf.prepend_slice(contents);
        self.finish(identifier, mark);
    }

    /// Encodes a two's-complement, minimum-length INTEGER.
    pub fn integer(&mut self, identifier: Identifier, value: i64) {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while start < 7 {
            let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
                || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        self.primitive(identifier, &bytes[start..]);
    }

    /// Encodes an ENUMERATED with the universal tag.
    pub fn enumerated(&mut self, value: i64) {
        self.integer(Identifier::primitive(Tag::ENUMERATED), value);
    }

    /// Encodes a BOOLEAN as the DER canonical `0xff`/`0x00`.
    pub fn boolean(&mut self, identifier: Identifier, value: bool) {
        self.primitive(identifier, &[if value { 0xff } else { 0x00 }]);
    }

    /// Encodes an OCTET STRING (or any string type carried as octets).
    pub fn octet_string(&mut self, identifier: Identifier, contents: &[u8]) {
        self.primitive(identifier, contents);
    }

    /// Encodes a NULL.
    pub fn null(&mut self, identifier: Identifier) {
        self.primitive(identifier, &[]);
    }

    /// Encodes an OBJECT IDENTIFIER from its arcs.
    pub fn object_identifier(&mut self, arcs: &[u32]) -> Result<(), EncodeError> {
        let packed = oid::encode_packed(arcs).map_err(|_| EncodeError::UnsupportedVariant {
            what: "object identifier arcs",
        })?;
        self.primitive(Identifier::primitive(Tag::OBJECT_IDENTIFIER), &packed);
        Ok(())
    }

    /// Prepends the identifier octets. Tag numbers above 30 use the
    /// base-128 continuation form.
    ///
    /// ```text
    /// ---------------------------------
    /// | class | P/C |   tag number    |
    /// ---------------------------------
    /// ```
    pub fn prepend_identifier(&mut self, identifier: Identifier) {
        const FIVE_BITS: u32 = (1 << 5) - 1;
        let mut initial = (identifier.tag.class as u8) << 6;
        if identifier.is_constructed() {
            initial |= 0x20;
        }

        let number = identifier.tag.value;
        if number >= FIVE_BITS {
            let mut continuation = Vec::new();
            oid::push_base128(number, &mut continuation);
            self.buf.prepend_slice(&continuation);
            self.buf.prepend(initial | FIVE_BITS as u8);
        } else {
            self.buf.prepend(initial | number as u8);
        }
    }

    /// Prepends a definite length: short form below 128, otherwise the
    /// minimal long form.
    pub fn prepend_length(&mut self, length: usize) {
        if length <= 127 {
            self.buf.prepend(length as u8);
        } else {
            let bytes = (length as u64).to_be_bytes();
            let skip = bytes.iter().take_while(|b| **b == 0).count();
            self.buf.prepend_slice(&bytes[skip..]);
            self.buf.prepend(0x80 | (bytes.len() - skip) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Class;
    use pretty_assertions::assert_eq;

    fn encoded(f: impl FnOnce(&mut BerEncoder)) -> Vec<u8> {
        let mut enc = BerEncoder::new();
        f(&mut enc);
        enc.into_bytes()
    }

    #[test]
    fn identifier_octets() {
        assert_eq!(
            encoded(|e| e.null(Identifier::new(Class::Private, true, 127))),
            &[0xff, 0x7f, 0x00]
        );
        assert_eq!(
            encoded(|e| e.null(Identifier::new(Class::Context, false, 30))),
            &[0x9e, 0x00]
        );
        assert_eq!(
            encoded(|e| e.null(Identifier::new(Class::Context, false, 31))),
            &[0x9f, 0x1f, 0x00]
        );
    }

    #[test]
    fn length_forms() {
        let short = encoded(|e| e.octet_string(Identifier::primitive(Tag::OCTET_STRING), &[0xaa; 127]));
        assert_eq!(&short[..2], &[0x04, 0x7f]);

        let long = encoded(|e| e.octet_string(Identifier::primitive(Tag::OCTET_STRING), &[0xaa; 128]));
        assert_eq!(&long[..3], &[0x04, 0x81, 0x80]);

        let longer = encoded(|e| e.octet_string(Identifier::primitive(Tag::OCTET_STRING), &[0xaa; 256]));
        assert_eq!(&longer[..4], &[0x04, 0x82, 0x01, 0x00]);
    }

    #[test]
    fn minimal_integers() {
        let id = Identifier::primitive(Tag::INTEGER);
        assert_eq!(encoded(|e| e.integer(id, 0)), &[0x02, 0x01, 0x00]);
        assert_eq!(encoded(|e| e.integer(id, 127)), &[0x02, 0x01, 0x7f]);
        assert_eq!(encoded(|e| e.integer(id, 128)), &[0x02, 0x02, 0x00, 0x80]);
        assert_eq!(encoded(|e| e.integer(id, -1)), &[0x02, 0x01, 0xff]);
        assert_eq!(encoded(|e| e.integer(id, -128)), &[0x02, 0x01, 0x80]);
        assert_eq!(encoded(|e| e.integer(id, 4096)), &[0x02, 0x02, 0x10, 0x00]);
        assert_eq!(
            encoded(|e| e.integer(id, i64::MIN)),
            &[0x02, 0x08, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn nested_structures_close_bottom_up() {
        let bytes = encoded(|e| {
            let outer = e.pos();
            let inner = e.pos();
            e.integer(Identifier::primitive(Tag::INTEGER), 5);
            e.finish(Identifier::constructed(Tag::SEQUENCE), inner);
            e.octet_string(Identifier::primitive(Tag::OCTET_STRING), b"ab");
            e.finish(Identifier::constructed(Tag::SEQUENCE), outer);
        });
        assert_eq!(
            bytes,
            &[0x30, 0x09, 0x04, 0x02, b'a', b'b', 0x30, 0x03, 0x02, 0x01, 0x05]
        );
    }

    #[test]
    fn object_identifier() {
        assert_eq!(
            encoded(|e| e.object_identifier(&[1, 3, 6, 1, 4, 1, 311, 21, 20]).unwrap()),
            &[0x06, 0x09, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x15, 0x14]
        );
    }
}
