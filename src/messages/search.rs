//! Search request and its three response shapes.

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::filter::Filter;
use crate::tag::Tag;

use super::result::LdapResult;
use super::PartialAttribute;

/// How much of the tree below the base object a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    BaseObject = 0,
    SingleLevel = 1,
    WholeSubtree = 2,
}

impl SearchScope {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(SearchScope::BaseObject),
            1 => Some(SearchScope::SingleLevel),
            2 => Some(SearchScope::WholeSubtree),
            _ => None,
        }
    }
}

/// When the server chases alias entries during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerefAliases {
    #[default]
    NeverDerefAliases = 0,
    DerefInSearching = 1,
    DerefFindingBaseObj = 2,
    DerefAlways = 3,
}

impl DerefAliases {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(DerefAliases::NeverDerefAliases),
            1 => Some(DerefAliases::DerefInSearching),
            2 => Some(DerefAliases::DerefFindingBaseObj),
            3 => Some(DerefAliases::DerefAlways),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub base_object: String,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    /// 0 means no client-side limit.
    pub size_limit: u32,
    /// Seconds; 0 means no client-side limit.
    pub time_limit: u32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
    /// Set once an abandon request for this operation went out.
    pub abandoned: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            base_object: String::new(),
            scope: SearchScope::default(),
            deref_aliases: DerefAliases::default(),
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter: Filter::Present("objectClass".into()),
            attributes: Vec::new(),
            abandoned: false,
        }
    }
}

impl SearchRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();

        let attrs = enc.pos();
        for attribute in self.attributes.iter().rev() {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), attribute.as_bytes());
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), attrs);

        self.filter.encode(enc)?;
        enc.boolean(Identifier::primitive(Tag::BOOL), self.types_only);
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(self.time_limit));
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(self.size_limit));
        enc.enumerated(self.deref_aliases as i64);
        enc.enumerated(self.scope as i64);
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.base_object.as_bytes(),
        );
        enc.finish(Identifier::constructed(Tag::application(3)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResultEntry {
    pub object_name: String,
    pub attributes: Vec<PartialAttribute>,
}

impl SearchResultEntry {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        super::encode_attribute_list(enc, &self.attributes);
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.object_name.as_bytes(),
        );
        enc.finish(Identifier::constructed(Tag::application(4)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResultDone {
    pub result: LdapResult,
}

impl SearchResultDone {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(5)), mark);
        Ok(())
    }
}

/// Continuation references returned while servicing a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResultReference {
    pub uris: Vec<String>,
}

impl SearchResultReference {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        for uri in self.uris.iter().rev() {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), uri.as_bytes());
        }
        enc.finish(Identifier::constructed(Tag::application(19)), mark);
        Ok(())
    }
}
