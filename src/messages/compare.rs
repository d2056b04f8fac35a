//! Compare operation and the attribute-value assertion it shares with
//! filters.

use bytes::Bytes;

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::tag::Tag;

use super::result::LdapResult;

/// An attribute description paired with a value to assert against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeValueAssertion {
    pub attribute_desc: String,
    pub assertion_value: Bytes,
}

impl AttributeValueAssertion {
    pub fn new(attribute_desc: impl Into<String>, assertion_value: impl Into<Bytes>) -> Self {
        Self {
            attribute_desc: attribute_desc.into(),
            assertion_value: assertion_value.into(),
        }
    }

    pub(crate) fn encode_components(&self, enc: &mut BerEncoder) {
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), &self.assertion_value);
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.attribute_desc.as_bytes(),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareRequest {
    pub entry: String,
    pub ava: AttributeValueAssertion,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl CompareRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        let ava = enc.pos();
        self.ava.encode_components(enc);
        enc.finish(Identifier::constructed(Tag::SEQUENCE), ava);
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.entry.as_bytes());
        enc.finish(Identifier::constructed(Tag::application(14)), mark);
        Ok(())
    }
}

/// Its result code is the answer: `compareTrue` or `compareFalse` on the
/// happy paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareResponse {
    pub result: LdapResult,
}

impl CompareResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(15)), mark);
        Ok(())
    }
}
