//! # ldap-codec
//!
//! An LDAP (RFC 4511) wire codec and schema-aware value engine.
//!
//! The decoder is a push-mode state machine: feed a [`MessageContainer`]
//! arbitrary chunks of a byte stream and it suspends at any byte boundary,
//! resuming on the next chunk. Per-operation grammar tables keyed by
//! `(state, tag)` drive it. The encoder writes tail-first into a reverse
//! buffer, so nested lengths come out right in a single pass and the
//! output is canonical DER: re-encoding an accepted canonical PDU
//! reproduces it byte for byte.
//!
//! ```
//! use ldap_codec::{DecodeOutcome, LdapCodec, ProtocolOp};
//!
//! let codec = LdapCodec::new();
//! let mut container = codec.new_container();
//!
//! // 30 0c 02 01 01 61 07 0a 01 00 04 00 04 00 — an empty BindResponse
//! let pdu: &[u8] = &[
//!     0x30, 0x0c, 0x02, 0x01, 0x01, 0x61, 0x07, 0x0a, 0x01, 0x00, 0x04,
//!     0x00, 0x04, 0x00,
//! ];
//! let DecodeOutcome::Message { message, .. } = codec.decode(pdu, &mut container).unwrap()
//! else {
//!     panic!("incomplete");
//! };
//! assert!(matches!(message.op, ProtocolOp::BindResponse(_)));
//! assert_eq!(codec.encode(&message).unwrap(), pdu);
//! ```
//!
//! Above the wire sit the schema registries ([`schema::SchemaRegistries`])
//! and the value engine ([`Value`]): values bound to an attribute type are
//! normalized through its equality matching rule, validated against its
//! syntax, and compared with its comparator.

pub mod ber;
pub mod codec;
pub mod controls;
pub mod dn;
pub mod entry;
pub mod error;
pub mod filter;
mod grammar;
pub mod messages;
pub mod octets;
pub mod oid;
pub mod schema;
pub mod tag;
pub mod time;
pub mod value;

pub use codec::{DecodeOutcome, LdapCodec, MessageContainer};
pub use controls::{Control, ControlFactory, ControlRegistry, Controls, ControlValue};
pub use dn::{Ava, Dn, Rdn};
pub use entry::{apply_modification, Attribute, Entry, ImmutableEntry, Modification};
pub use error::{AccessError, DecodeError, DnError, EncodeError, SchemaError};
pub use filter::Filter;
pub use messages::{LdapMessage, MessageId, ProtocolOp, ResultCode};
pub use time::GeneralizedTime;
pub use value::Value;
