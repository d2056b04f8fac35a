//! The LDAP message model: every RFC 4511 operation, the result envelope,
//! and the per-message controls container.

mod add;
mod bind;
mod compare;
mod extended;
mod modify;
mod result;
mod search;

pub use add::{AddRequest, AddResponse, DelRequest, DelResponse};
pub use bind::{BindAuthentication, BindRequest, BindResponse, UnbindRequest};
pub use compare::{AttributeValueAssertion, CompareRequest, CompareResponse};
pub use extended::{AbandonRequest, ExtendedRequest, ExtendedResponse, IntermediateResponse};
pub use modify::{
    ModifyChange, ModifyDnRequest, ModifyDnResponse, ModifyOperation, ModifyRequest,
    ModifyResponse,
};
pub use result::{LdapResult, ResultCode};
pub use search::{
    DerefAliases, SearchResultDone, SearchResultEntry, SearchResultReference, SearchRequest,
    SearchScope,
};

use bytes::Bytes;

use crate::ber::{BerEncoder, Identifier};
use crate::controls::Controls;
use crate::error::EncodeError;
use crate::tag::Tag;

/// ID value pairing a request with its responses. Zero is reserved for
/// unsolicited notifications.
pub type MessageId = u32;

/// The envelope for all LDAP operations.
#[derive(Debug, Clone, PartialEq)]
pub struct LdapMessage {
    pub message_id: MessageId,
    pub op: ProtocolOp,
    pub controls: Controls,
}

impl LdapMessage {
    pub fn new(message_id: MessageId, op: ProtocolOp) -> Self {
        Self {
            message_id,
            op,
            controls: Controls::new(),
        }
    }
}

/// The kind of operation carried in an [`LdapMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolOp {
    BindRequest(BindRequest),
    BindResponse(BindResponse),
    UnbindRequest(UnbindRequest),
    SearchRequest(SearchRequest),
    SearchResultEntry(SearchResultEntry),
    SearchResultDone(SearchResultDone),
    SearchResultReference(SearchResultReference),
    ModifyRequest(ModifyRequest),
    ModifyResponse(ModifyResponse),
    AddRequest(AddRequest),
    AddResponse(AddResponse),
    DelRequest(DelRequest),
    DelResponse(DelResponse),
    ModifyDnRequest(ModifyDnRequest),
    ModifyDnResponse(ModifyDnResponse),
    CompareRequest(CompareRequest),
    CompareResponse(CompareResponse),
    AbandonRequest(AbandonRequest),
    ExtendedRequest(ExtendedRequest),
    ExtendedResponse(ExtendedResponse),
    IntermediateResponse(IntermediateResponse),
}

impl ProtocolOp {
    /// The application tag number selecting this operation on the wire.
    pub fn application_tag(&self) -> u8 {
        match self {
            ProtocolOp::BindRequest(_) => 0,
            ProtocolOp::BindResponse(_) => 1,
            ProtocolOp::UnbindRequest(_) => 2,
            ProtocolOp::SearchRequest(_) => 3,
            ProtocolOp::SearchResultEntry(_) => 4,
            ProtocolOp::SearchResultDone(_) => 5,
            ProtocolOp::ModifyRequest(_) => 6,
            ProtocolOp::ModifyResponse(_) => 7,
            ProtocolOp::AddRequest(_) => 8,
            ProtocolOp::AddResponse(_) => 9,
            ProtocolOp::DelRequest(_) => 10,
            ProtocolOp::DelResponse(_) => 11,
            ProtocolOp::ModifyDnRequest(_) => 12,
            ProtocolOp::ModifyDnResponse(_) => 13,
            ProtocolOp::CompareRequest(_) => 14,
            ProtocolOp::CompareResponse(_) => 15,
            ProtocolOp::AbandonRequest(_) => 16,
            ProtocolOp::SearchResultReference(_) => 19,
            ProtocolOp::ExtendedRequest(_) => 23,
            ProtocolOp::ExtendedResponse(_) => 24,
            ProtocolOp::IntermediateResponse(_) => 25,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(
            self,
            ProtocolOp::BindRequest(_)
                | ProtocolOp::UnbindRequest(_)
                | ProtocolOp::SearchRequest(_)
                | ProtocolOp::ModifyRequest(_)
                | ProtocolOp::AddRequest(_)
                | ProtocolOp::DelRequest(_)
                | ProtocolOp::ModifyDnRequest(_)
                | ProtocolOp::CompareRequest(_)
                | ProtocolOp::AbandonRequest(_)
                | ProtocolOp::ExtendedRequest(_)
        )
    }

    /// The application tag of the response paired with this request.
    /// `unbind` and `abandon` expect none; responses themselves pair with
    /// nothing.
    pub fn matching_response_tag(&self) -> Option<u8> {
        match self {
            ProtocolOp::BindRequest(_) => Some(1),
            ProtocolOp::SearchRequest(_) => Some(5),
            ProtocolOp::ModifyRequest(_) => Some(7),
            ProtocolOp::AddRequest(_) => Some(9),
            ProtocolOp::DelRequest(_) => Some(11),
            ProtocolOp::ModifyDnRequest(_) => Some(13),
            ProtocolOp::CompareRequest(_) => Some(15),
            ProtocolOp::ExtendedRequest(_) => Some(24),
            _ => None,
        }
    }

    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        match self {
            ProtocolOp::BindRequest(op) => op.encode(enc),
            ProtocolOp::BindResponse(op) => op.encode(enc),
            ProtocolOp::UnbindRequest(op) => op.encode(enc),
            ProtocolOp::SearchRequest(op) => op.encode(enc),
            ProtocolOp::SearchResultEntry(op) => op.encode(enc),
            ProtocolOp::SearchResultDone(op) => op.encode(enc),
            ProtocolOp::SearchResultReference(op) => op.encode(enc),
            ProtocolOp::ModifyRequest(op) => op.encode(enc),
            ProtocolOp::ModifyResponse(op) => op.encode(enc),
            ProtocolOp::AddRequest(op) => op.encode(enc),
            ProtocolOp::AddResponse(op) => op.encode(enc),
            ProtocolOp::DelRequest(op) => op.encode(enc),
            ProtocolOp::DelResponse(op) => op.encode(enc),
            ProtocolOp::ModifyDnRequest(op) => op.encode(enc),
            ProtocolOp::ModifyDnResponse(op) => op.encode(enc),
            ProtocolOp::CompareRequest(op) => op.encode(enc),
            ProtocolOp::CompareResponse(op) => op.encode(enc),
            ProtocolOp::AbandonRequest(op) => op.encode(enc),
            ProtocolOp::ExtendedRequest(op) => op.encode(enc),
            ProtocolOp::ExtendedResponse(op) => op.encode(enc),
            ProtocolOp::IntermediateResponse(op) => op.encode(enc),
        }
    }
}

/// A request that can be abandoned after it was sent.
pub trait AbandonableRequest {
    fn abandon(&mut self);
    fn is_abandoned(&self) -> bool;
}

macro_rules! abandonable {
    ($($op:ty),+ $(,)?) => {
        $(
            impl AbandonableRequest for $op {
                fn abandon(&mut self) {
                    self.abandoned = true;
                }

                fn is_abandoned(&self) -> bool {
                    self.abandoned
                }
            }
        )+
    }
}

abandonable!(
    SearchRequest,
    ModifyRequest,
    AddRequest,
    DelRequest,
    ModifyDnRequest,
    CompareRequest,
    ExtendedRequest,
);

/// An attribute as it appears on the wire: a description and raw values in
/// wire order, before any schema processing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialAttribute {
    pub id: String,
    pub values: Vec<Bytes>,
}

impl PartialAttribute {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values<I, B>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            id: id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Emits `SEQUENCE { type, vals SET OF value }` tail-first.
    pub(crate) fn encode(&self, enc: &mut BerEncoder) {
        let mark = enc.pos();
        let set = enc.pos();
        for value in self.values.iter().rev() {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), value);
        }
        enc.finish(Identifier::constructed(Tag::SET), set);
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.id.as_bytes());
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
    }
}

pub(crate) fn encode_attribute_list(enc: &mut BerEncoder, attributes: &[PartialAttribute]) {
    let mark = enc.pos();
    for attribute in attributes.iter().rev() {
        attribute.encode(enc);
    }
    enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
}
