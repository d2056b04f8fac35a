//! The result envelope shared by every response operation.

use core::fmt;

use crate::ber::{BerEncoder, Identifier};
use crate::tag::Tag;

/// The code reporting the outcome of an operation.
///
/// A newtype rather than an enum so that extension codes pass through the
/// codec untouched; the RFC 4511 names (and the content-sync extension
/// code) are associated constants.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResultCode(pub u32);

macro_rules! result_codes {
    ($($name:ident = $value:expr, $label:literal;)+) => {
        impl ResultCode {
            $(pub const $name: ResultCode = ResultCode($value);)+
        }

        impl ResultCode {
            /// The RFC name of the code, when it has one.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($label),)+
                    _ => None,
                }
            }
        }
    }
}

result_codes! {
    SUCCESS = 0, "success";
    OPERATIONS_ERROR = 1, "operationsError";
    PROTOCOL_ERROR = 2, "protocolError";
    TIME_LIMIT_EXCEEDED = 3, "timeLimitExceeded";
    SIZE_LIMIT_EXCEEDED = 4, "sizeLimitExceeded";
    COMPARE_FALSE = 5, "compareFalse";
    COMPARE_TRUE = 6, "compareTrue";
    AUTH_METHOD_NOT_SUPPORTED = 7, "authMethodNotSupported";
    STRONGER_AUTH_REQUIRED = 8, "strongerAuthRequired";
    // -- 9 reserved --
    REFERRAL = 10, "referral";
    ADMIN_LIMIT_EXCEEDED = 11, "adminLimitExceeded";
    UNAVAILABLE_CRITICAL_EXTENSION = 12, "unavailableCriticalExtension";
    CONFIDENTIALITY_REQUIRED = 13, "confidentialityRequired";
    SASL_BIND_IN_PROGRESS = 14, "saslBindInProgress";
    NO_SUCH_ATTRIBUTE = 16, "noSuchAttribute";
    UNDEFINED_ATTRIBUTE_TYPE = 17, "undefinedAttributeType";
    INAPPROPRIATE_MATCHING = 18, "inappropriateMatching";
    CONSTRAINT_VIOLATION = 19, "constraintViolation";
    ATTRIBUTE_OR_VALUE_EXISTS = 20, "attributeOrValueExists";
    INVALID_ATTRIBUTE_SYNTAX = 21, "invalidAttributeSyntax";
    // -- 22-31 unused --
    NO_SUCH_OBJECT = 32, "noSuchObject";
    ALIAS_PROBLEM = 33, "aliasProblem";
    INVALID_DN_SYNTAX = 34, "invalidDNSyntax";
    // -- 35 reserved --
    ALIAS_DEREFERENCING_PROBLEM = 36, "aliasDereferencingProblem";
    // -- 37-47 unused --
    INAPPROPRIATE_AUTHENTICATION = 48, "inappropriateAuthentication";
    INVALID_CREDENTIALS = 49, "invalidCredentials";
    INSUFFICIENT_ACCESS_RIGHTS = 50, "insufficientAccessRights";
    BUSY = 51, "busy";
    UNAVAILABLE = 52, "unavailable";
    UNWILLING_TO_PERFORM = 53, "unwillingToPerform";
    LOOP_DETECT = 54, "loopDetect";
    // -- 55-63 unused --
    NAMING_VIOLATION = 64, "namingViolation";
    OBJECT_CLASS_VIOLATION = 65, "objectClassViolation";
    NOT_ALLOWED_ON_NON_LEAF = 66, "notAllowedOnNonLeaf";
    NOT_ALLOWED_ON_RDN = 67, "notAllowedOnRDN";
    ENTRY_ALREADY_EXISTS = 68, "entryAlreadyExists";
    OBJECT_CLASS_MODS_PROHIBITED = 69, "objectClassModsProhibited";
    // -- 70 reserved for CLDAP --
    AFFECTS_MULTIPLE_DSAS = 71, "affectsMultipleDSAs";
    // -- 72-79 unused --
    OTHER = 80, "other";
    CANCELED = 118, "canceled";
    NO_SUCH_OPERATION = 119, "noSuchOperation";
    TOO_LATE = 120, "tooLate";
    CANNOT_CANCEL = 121, "cannotCancel";
    E_SYNC_REFRESH_REQUIRED = 4096, "e-syncRefreshRequired";
}

impl From<&crate::error::DecodeError> for ResultCode {
    /// Decode failures surface to the peer as `protocolError`.
    fn from(_: &crate::error::DecodeError) -> Self {
        ResultCode::PROTOCOL_ERROR
    }
}

impl From<&crate::error::SchemaError> for ResultCode {
    /// Schema failures on inbound values surface as
    /// `invalidAttributeSyntax`.
    fn from(_: &crate::error::SchemaError) -> Self {
        ResultCode::INVALID_ATTRIBUTE_SYNTAX
    }
}

impl From<&crate::error::DnError> for ResultCode {
    /// DN failures surface as `invalidDNSyntax`.
    fn from(_: &crate::error::DnError) -> Self {
        ResultCode::INVALID_DN_SYNTAX
    }
}

impl From<&crate::error::AccessError> for ResultCode {
    fn from(_: &crate::error::AccessError) -> Self {
        ResultCode::OTHER
    }
}

impl fmt::Debug for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ResultCode({name})"),
            None => write!(f, "ResultCode({})", self.0),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The envelope for the result of any operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LdapResult {
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    pub referral: Option<Vec<String>>,
}

impl LdapResult {
    pub fn new(result_code: ResultCode) -> Self {
        Self {
            result_code,
            ..Self::default()
        }
    }

    pub fn success() -> Self {
        Self::new(ResultCode::SUCCESS)
    }

    pub fn is_success(&self) -> bool {
        self.result_code == ResultCode::SUCCESS
    }

    /// Emits the result components tail-first. Fields that trail the
    /// referral on the wire must already be in the encoder.
    pub(crate) fn encode(&self, enc: &mut BerEncoder) {
        if let Some(referral) = &self.referral {
            let mark = enc.pos();
            for uri in referral.iter().rev() {
                enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), uri.as_bytes());
            }
            enc.finish(Identifier::constructed(Tag::context(3)), mark);
        }
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.diagnostic_message.as_bytes(),
        );
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.matched_dn.as_bytes(),
        );
        enc.enumerated(i64::from(self.result_code.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_boundary_mapping() {
        use crate::error::{DecodeError, DnError, SchemaError};

        assert_eq!(
            ResultCode::from(&DecodeError::TruncatedTag),
            ResultCode::PROTOCOL_ERROR
        );
        assert_eq!(
            ResultCode::from(&SchemaError::HumanReadableMismatch),
            ResultCode::INVALID_ATTRIBUTE_SYNTAX
        );
        assert_eq!(
            ResultCode::from(&DnError::MissingEqual { position: 0 }),
            ResultCode::INVALID_DN_SYNTAX
        );
    }

    #[test]
    fn named_and_extension_codes() {
        assert_eq!(ResultCode::SUCCESS.name(), Some("success"));
        assert_eq!(ResultCode::E_SYNC_REFRESH_REQUIRED.0, 4096);
        assert_eq!(ResultCode(9).name(), None);
        assert_eq!(format!("{:?}", ResultCode(80)), "ResultCode(other)");
        assert_eq!(format!("{:?}", ResultCode(90)), "ResultCode(90)");
    }
}
