//! Errors raised while decoding BER input into LDAP messages.

use snafu::Snafu;

/// An error raised by the streaming decoder.
///
/// Any of these poisons the container it occurred on: further calls return
/// [`DecodeError::Poisoned`] until the container is reset.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum DecodeError {
    /// The enclosing structure ended in the middle of a tag's octets.
    #[snafu(display("structure boundary splits a tag"))]
    TruncatedTag,

    /// The enclosing structure ended in the middle of a length's octets.
    #[snafu(display("structure boundary splits a length"))]
    TruncatedLength,

    /// A length did not fit the representable range (long form above four
    /// octets, or a value above 2^31 - 1).
    #[snafu(display("length exceeds the representable range"))]
    LengthOverflow,

    /// A multi-byte tag number did not fit in 28 bits.
    #[snafu(display("tag number does not fit in 28 bits"))]
    TagOverflow,

    /// An indefinite length octet appeared where LDAP requires definite
    /// lengths.
    #[snafu(display("indefinite length is not permitted here"))]
    IndefiniteLength,

    /// A child value declared more content than its parent has left.
    #[snafu(display("child value overruns its parent structure"))]
    ChildOverrunsParent,

    /// A structure still had content after its last expected field.
    #[snafu(display("{remaining} trailing byte(s) in structure"))]
    TrailingBytesInStructure { remaining: u32 },

    /// The protocol-op choice carried an application tag outside the LDAP
    /// operation set.
    #[snafu(display("unknown operation tag {tag:#04x}"))]
    UnknownOperationTag { tag: u8 },

    /// An INTEGER or ENUMERATED payload was empty, oversized, or out of the
    /// field's range.
    #[snafu(display("invalid INTEGER encoding"))]
    InvalidInteger,

    /// A packed OBJECT IDENTIFIER payload was malformed, or an OID-valued
    /// string field did not hold a dotted-decimal OID.
    #[snafu(display("malformed OBJECT IDENTIFIER"))]
    InvalidOid,

    /// A BOOLEAN payload was not exactly one octet.
    #[snafu(display("BOOLEAN content must be exactly one octet"))]
    InvalidBoolean,

    /// A configured bound (PDU size, structure length, nesting depth) was
    /// exceeded. Raised before any content is buffered.
    #[snafu(display("{what} limit exceeded ({value} > {limit})"))]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    /// A tag arrived that no transition of the current grammar state
    /// accepts.
    #[snafu(display("tag {tag:#04x} not accepted in state {state}"))]
    GrammarMismatch { state: &'static str, tag: u8 },

    /// A structure ended before its required fields were read.
    #[snafu(display("structure ended before required fields were read"))]
    UnexpectedEndOfInput,

    /// A directory-string field held octets that are not valid UTF-8.
    #[snafu(display("string field is not valid UTF-8"))]
    InvalidUtf8,

    /// The container was already poisoned by an earlier error and must be
    /// reset before further use.
    #[snafu(display("decoder container is poisoned"))]
    Poisoned,
}

impl DecodeError {
    pub(crate) fn grammar(state: &'static str, tag: u8) -> Self {
        DecodeError::GrammarMismatch { state, tag }
    }
}
