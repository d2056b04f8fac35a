//! Syntax checkers: predicates validating raw values against their
//! declared syntax.

use crate::dn::Dn;
use crate::oid;
use crate::time::GeneralizedTime;

/// Validates that a raw value conforms to a syntax.
pub trait SyntaxChecker: Send + Sync {
    /// The OID of the syntax this checker serves.
    fn oid(&self) -> &str;

    fn is_valid_str(&self, value: &str) -> bool;

    /// Binary values are valid when they are UTF-8 and the text form is.
    fn is_valid_bytes(&self, value: &[u8]) -> bool {
        core::str::from_utf8(value).is_ok_and(|text| self.is_valid_str(text))
    }
}

/// Any octets at all.
pub struct OctetStringChecker;

impl SyntaxChecker for OctetStringChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.40"
    }

    fn is_valid_str(&self, _value: &str) -> bool {
        true
    }

    fn is_valid_bytes(&self, _value: &[u8]) -> bool {
        true
    }
}

/// Non-empty UTF-8.
pub struct DirectoryStringChecker;

impl SyntaxChecker for DirectoryStringChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.15"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        !value.is_empty()
    }
}

pub struct Ia5StringChecker;

impl SyntaxChecker for Ia5StringChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.26"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        value.is_ascii()
    }
}

/// RFC 4517 Integer: an optional minus, no leading zeros.
pub struct IntegerChecker;

impl SyntaxChecker for IntegerChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.27"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        let digits = value.strip_prefix('-').unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return false;
        }
        // "-0" is not a number
        !(value.starts_with('-') && digits == "0")
    }
}

pub struct BooleanChecker;

impl SyntaxChecker for BooleanChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.7"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        value == "TRUE" || value == "FALSE"
    }
}

pub struct DnChecker;

impl SyntaxChecker for DnChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.12"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        Dn::parse(value).is_ok()
    }
}

/// A numeric OID or a descriptor (`keystring`).
pub struct OidChecker;

impl SyntaxChecker for OidChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.38"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        if oid::is_dotted(value) {
            return true;
        }
        let mut bytes = value.bytes();
        match bytes.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-')
            }
            _ => false,
        }
    }
}

pub struct GeneralizedTimeChecker;

impl SyntaxChecker for GeneralizedTimeChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.24"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        GeneralizedTime::parse(value).is_ok()
    }
}

/// Digits and spaces, at least one character.
pub struct NumericStringChecker;

impl SyntaxChecker for NumericStringChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.4.1.1466.115.121.1.36"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit() || b == b' ')
    }
}

/// The 8-4-4-4-12 hex shape of RFC 4122.
pub struct UuidChecker;

impl SyntaxChecker for UuidChecker {
    fn oid(&self) -> &str {
        "1.3.6.1.1.16.1"
    }

    fn is_valid_str(&self, value: &str) -> bool {
        let bytes = value.as_bytes();
        if bytes.len() != 36 {
            return false;
        }
        bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
    }
}
