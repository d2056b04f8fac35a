//! Extended, intermediate and abandon operations.

use bytes::Bytes;

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::tag::Tag;

use super::result::LdapResult;
use super::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedRequest {
    /// `[0]` the dotted-decimal OID naming the extended operation.
    pub request_name: String,
    /// `[1]` operation-specific payload.
    pub request_value: Option<Bytes>,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl ExtendedRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if let Some(value) = &self.request_value {
            enc.octet_string(Identifier::primitive(Tag::context(1)), value);
        }
        enc.octet_string(Identifier::primitive(Tag::context(0)), self.request_name.as_bytes());
        enc.finish(Identifier::constructed(Tag::application(23)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedResponse {
    pub result: LdapResult,
    /// `[10]` echoes or names the responding operation.
    pub response_name: Option<String>,
    /// `[11]` operation-specific payload.
    pub response_value: Option<Bytes>,
}

impl ExtendedResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if let Some(value) = &self.response_value {
            enc.octet_string(Identifier::primitive(Tag::context(11)), value);
        }
        if let Some(name) = &self.response_name {
            enc.octet_string(Identifier::primitive(Tag::context(10)), name.as_bytes());
        }
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(24)), mark);
        Ok(())
    }
}

/// A mid-operation server message, mostly used by the content-sync
/// machinery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntermediateResponse {
    pub response_name: Option<String>,
    pub response_value: Option<Bytes>,
}

impl IntermediateResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if let Some(value) = &self.response_value {
            enc.octet_string(Identifier::primitive(Tag::context(1)), value);
        }
        if let Some(name) = &self.response_name {
            enc.octet_string(Identifier::primitive(Tag::context(0)), name.as_bytes());
        }
        enc.finish(Identifier::constructed(Tag::application(25)), mark);
        Ok(())
    }
}

/// `[APPLICATION 16] MessageID` carried directly as the primitive payload.
/// No response is ever sent for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbandonRequest {
    pub message_id: MessageId,
}

impl AbandonRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        enc.integer(
            Identifier::primitive(Tag::application(16)),
            i64::from(self.message_id),
        );
        Ok(())
    }
}
