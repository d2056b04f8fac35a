//! Modify and modify-DN operations.

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::tag::Tag;

use super::result::LdapResult;
use super::PartialAttribute;

/// The kind of change applied by one modification. `Increment` is the RFC
/// 4525 extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperation {
    Add = 0,
    Delete = 1,
    Replace = 2,
    Increment = 3,
}

impl ModifyOperation {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(ModifyOperation::Add),
            1 => Some(ModifyOperation::Delete),
            2 => Some(ModifyOperation::Replace),
            3 => Some(ModifyOperation::Increment),
            _ => None,
        }
    }
}

/// One change of a modify request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyChange {
    pub operation: ModifyOperation,
    pub modification: PartialAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyRequest {
    pub object: String,
    pub changes: Vec<ModifyChange>,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl ModifyRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();

        let changes = enc.pos();
        for change in self.changes.iter().rev() {
            let change_mark = enc.pos();
            change.modification.encode(enc);
            enc.enumerated(change.operation as i64);
            enc.finish(Identifier::constructed(Tag::SEQUENCE), change_mark);
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), changes);

        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.object.as_bytes());
        enc.finish(Identifier::constructed(Tag::application(6)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyResponse {
    pub result: LdapResult,
}

impl ModifyResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(7)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyDnRequest {
    pub entry: String,
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    /// `[0]` moves the entry below a new parent.
    pub new_superior: Option<String>,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl ModifyDnRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if let Some(new_superior) = &self.new_superior {
            enc.octet_string(Identifier::primitive(Tag::context(0)), new_superior.as_bytes());
        }
        enc.boolean(Identifier::primitive(Tag::BOOL), self.delete_old_rdn);
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.new_rdn.as_bytes());
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.entry.as_bytes());
        enc.finish(Identifier::constructed(Tag::application(12)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyDnResponse {
    pub result: LdapResult,
}

impl ModifyDnResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(13)), mark);
        Ok(())
    }
}
