//! Add and delete operations.

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::tag::Tag;

use super::result::LdapResult;
use super::PartialAttribute;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddRequest {
    pub entry: String,
    pub attributes: Vec<PartialAttribute>,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl AddRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        super::encode_attribute_list(enc, &self.attributes);
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.entry.as_bytes());
        enc.finish(Identifier::constructed(Tag::application(8)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddResponse {
    pub result: LdapResult,
}

impl AddResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(9)), mark);
        Ok(())
    }
}

/// `[APPLICATION 10] LDAPDN` carried directly as the primitive payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DelRequest {
    pub dn: String,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl DelRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        enc.octet_string(Identifier::primitive(Tag::application(10)), self.dn.as_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DelResponse {
    pub result: LdapResult,
}

impl DelResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(11)), mark);
        Ok(())
    }
}
