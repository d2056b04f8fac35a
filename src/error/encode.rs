//! Errors raised while re-encoding LDAP messages.

use snafu::Snafu;

/// An error raised by the reverse encoder.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum EncodeError {
    /// The message holds a variant the encoder has no wire form for, such
    /// as a typed control whose factory is not registered.
    #[snafu(display("no wire form for {what}"))]
    UnsupportedVariant { what: &'static str },

    /// A numeric field was outside the range its wire form can carry.
    #[snafu(display("numeric value {value} overflows {field}"))]
    NumericOverflow { field: &'static str, value: i64 },
}
