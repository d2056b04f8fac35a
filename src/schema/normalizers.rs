//! Normalizers: the canonical-form half of a matching rule. Keyed in the
//! registry by the OID of the matching rule they serve.

use crate::dn::Dn;
use crate::error::SchemaError;
use crate::time::GeneralizedTime;

/// Produces the canonical form values are compared in. Must be idempotent:
/// normalizing a normalized value changes nothing.
pub trait Normalizer: Send + Sync {
    /// The OID of the matching rule this normalizer serves.
    fn oid(&self) -> &str;

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError>;

    /// Binary values default to UTF-8 string normalization when the octets
    /// are valid UTF-8, identity otherwise.
    fn normalize_bytes(&self, value: &[u8]) -> Result<Vec<u8>, SchemaError> {
        match core::str::from_utf8(value) {
            Ok(text) => Ok(self.normalize_str(text)?.into_bytes()),
            Err(_) => Ok(value.to_vec()),
        }
    }
}

/// Trims edges and squashes inner runs of whitespace to single spaces.
pub(crate) fn deep_trim(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for word in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Trim, squash and case-fold: the canonical form of caseIgnore matching.
pub(crate) fn deep_trim_to_lower(value: &str) -> String {
    deep_trim(value).to_lowercase()
}

/// caseIgnoreMatch and friends.
pub struct CaseIgnoreNormalizer;

impl Normalizer for CaseIgnoreNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.2"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(deep_trim_to_lower(value))
    }
}

/// caseExactMatch: whitespace handling without case folding.
pub struct CaseExactNormalizer;

impl Normalizer for CaseExactNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.5"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(deep_trim(value))
    }
}

/// octetStringMatch: bytes are already canonical.
pub struct NoOpNormalizer;

impl Normalizer for NoOpNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.17"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(value.to_owned())
    }

    fn normalize_bytes(&self, value: &[u8]) -> Result<Vec<u8>, SchemaError> {
        Ok(value.to_vec())
    }
}

/// numericStringMatch: spaces are insignificant.
pub struct NumericStringNormalizer;

impl Normalizer for NumericStringNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.8"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(value.chars().filter(|c| *c != ' ').collect())
    }
}

/// integerMatch: minimal decimal form.
pub struct IntegerNormalizer;

impl Normalizer for IntegerNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.14"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        let trimmed = value.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SchemaError::InvalidSyntax {
                oid: "1.3.6.1.4.1.1466.115.121.1.27".to_owned(),
            });
        }
        let digits = digits.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        if negative && digits != "0" {
            Ok(format!("-{digits}"))
        } else {
            Ok(digits.to_owned())
        }
    }
}

/// booleanMatch: `TRUE` or `FALSE`, any input case.
pub struct BooleanNormalizer;

impl Normalizer for BooleanNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.13"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        let upper = value.trim().to_uppercase();
        match upper.as_str() {
            "TRUE" | "FALSE" => Ok(upper),
            _ => Err(SchemaError::InvalidSyntax {
                oid: "1.3.6.1.4.1.1466.115.121.1.7".to_owned(),
            }),
        }
    }
}

/// generalizedTimeMatch: the canonical UTC `Z` form.
pub struct GeneralizedTimeNormalizer;

impl Normalizer for GeneralizedTimeNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.27"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(GeneralizedTime::parse(value.trim())?.format_canonical())
    }
}

/// distinguishedNameMatch: the DN's normalized text form.
pub struct DnNormalizer;

impl Normalizer for DnNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.1"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        let dn = Dn::parse(value).map_err(|_| SchemaError::InvalidSyntax {
            oid: "1.3.6.1.4.1.1466.115.121.1.12".to_owned(),
        })?;
        Ok(dn.normalized().to_owned())
    }
}

/// objectIdentifierMatch: descriptors fold case, numeric OIDs pass through.
pub struct OidNormalizer;

impl Normalizer for OidNormalizer {
    fn oid(&self) -> &str {
        "2.5.13.0"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(value.trim().to_lowercase())
    }
}

/// uuidMatch: lowercase hex form.
pub struct UuidNormalizer;

impl Normalizer for UuidNormalizer {
    fn oid(&self) -> &str {
        "1.3.6.1.1.16.2"
    }

    fn normalize_str(&self, value: &str) -> Result<String, SchemaError> {
        Ok(value.trim().to_lowercase())
    }
}
