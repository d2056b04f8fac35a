//! Errors raised by the schema registries and the value engine.

use snafu::Snafu;

/// An error raised while applying schema to values, attributes or entries.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum SchemaError {
    /// The attribute type has no equality matching rule and is not relaxed,
    /// so no normalized form can be derived.
    #[snafu(display("attribute type {oid} has no normalizer"))]
    NoNormalizer { oid: String },

    /// The value does not conform to the attribute type's syntax.
    #[snafu(display("value does not satisfy syntax {oid}"))]
    InvalidSyntax { oid: String },

    /// The value is already bound to a different attribute type.
    #[snafu(display("value is already bound to attribute type {oid}"))]
    AlreadyBound { oid: String },

    /// A binary value was bound to a human-readable syntax (or vice versa)
    /// and could not be converted.
    #[snafu(display("value shape does not match the syntax's human-readable flag"))]
    HumanReadableMismatch,

    /// No attribute type is registered under the given OID or alias.
    #[snafu(display("no such attribute type: {id}"))]
    NoSuchAttributeType { id: String },

    /// No matching rule is registered under the given OID or alias.
    #[snafu(display("no such matching rule: {id}"))]
    NoSuchMatchingRule { id: String },

    /// An increment modification targeted a non-numeric attribute or
    /// carried a non-integer operand.
    #[snafu(display("increment requires a numeric attribute and an integer operand"))]
    InvalidIncrement,
}
