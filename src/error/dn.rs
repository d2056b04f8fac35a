//! Errors raised while parsing RFC 4514 distinguished names.

use snafu::Snafu;

/// An error raised by the DN text parser.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum DnError {
    /// An RDN or attribute-type/value component was empty.
    #[snafu(display("empty component at position {position}"))]
    EmptyComponent { position: usize },

    /// A backslash escaped a character that is not escapable.
    #[snafu(display("invalid escape sequence at position {position}"))]
    BadEscape { position: usize },

    /// A `\HH` escape or `#`-prefixed value held a non-hex digit.
    #[snafu(display("invalid hex digit at position {position}"))]
    BadHex { position: usize },

    /// A character is not permitted where it appeared.
    #[snafu(display("character {character:?} not permitted at position {position}"))]
    BadChar { character: char, position: usize },

    /// An attribute type was not followed by `=`.
    #[snafu(display("missing '=' after attribute type at position {position}"))]
    MissingEqual { position: usize },

    /// A quoted value was never closed.
    #[snafu(display("unbalanced quotes starting at position {position}"))]
    UnbalancedQuotes { position: usize },
}
