//! LDAP controls: the per-message container, the factory trait, and the
//! OID-keyed registries for request and response directions.

mod assertion;
mod flags;
mod paged;
mod proxied;
mod psearch;
mod pwpolicy;
mod sort;
mod sync;
mod vlv;

pub use assertion::{
    AssertionControl, ReadEntryRequest, ReadEntryResponse, POST_READ_OID, PRE_READ_OID,
};
pub use flags::{ManageDsaIT, Subentries, TreeDelete};
pub use paged::PagedResults;
pub use proxied::ProxiedAuthorization;
pub use psearch::{ChangeType, EntryChangeNotification, PersistentSearch};
pub use pwpolicy::{PasswordPolicy, PasswordPolicyError, PasswordPolicyWarning};
pub use sort::{SortKey, SortRequest, SortResponse};
pub use sync::{SyncDone, SyncRequest, SyncRequestMode, SyncState, SyncStateType};
pub use vlv::{VirtualListViewRequest, VirtualListViewResponse, VlvTarget};

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::ber::BerEncoder;
use crate::error::{DecodeError, EncodeError};

/// A per-PDU extension identified by OID.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub oid: String,
    /// A critical control the peer does not support fails the operation
    /// instead of being ignored.
    pub criticality: bool,
    pub value: ControlValue,
}

impl Control {
    pub fn new(oid: impl Into<String>, value: ControlValue) -> Self {
        Self {
            oid: oid.into(),
            criticality: false,
            value,
        }
    }

    #[must_use]
    pub fn critical(mut self) -> Self {
        self.criticality = true;
        self
    }
}

/// The decoded payload of a control. Controls without a registered factory
/// keep their value octets raw.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    /// No value octets on the wire.
    Absent,
    /// Value octets retained undecoded.
    Raw(Bytes),
    PagedResults(PagedResults),
    SortRequest(SortRequest),
    SortResponse(SortResponse),
    PersistentSearch(PersistentSearch),
    EntryChangeNotification(EntryChangeNotification),
    Subentries(Subentries),
    ProxiedAuthorization(ProxiedAuthorization),
    PasswordPolicy(PasswordPolicy),
    Assertion(AssertionControl),
    ReadEntryRequest(ReadEntryRequest),
    ReadEntryResponse(ReadEntryResponse),
    SyncRequest(SyncRequest),
    SyncState(SyncState),
    SyncDone(SyncDone),
    VirtualListViewRequest(VirtualListViewRequest),
    VirtualListViewResponse(VirtualListViewResponse),
}

/// The insertion-ordered control set of a message.
///
/// At most one control per OID: inserting an OID again overwrites the
/// earlier control in place, so iteration (and re-encoding) keeps the
/// original wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Controls {
    entries: Vec<Control>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, control: Control) {
        match self.entries.iter_mut().find(|c| c.oid == control.oid) {
            Some(slot) => *slot = control,
            None => self.entries.push(control),
        }
    }

    pub fn get(&self, oid: &str) -> Option<&Control> {
        self.entries.iter().find(|c| c.oid == oid)
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.get(oid).is_some()
    }

    pub fn remove(&mut self, oid: &str) -> Option<Control> {
        let index = self.entries.iter().position(|c| c.oid == oid)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Control> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Controls {
    type Item = &'a Control;
    type IntoIter = std::slice::Iter<'a, Control>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Control> for Controls {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        let mut controls = Controls::new();
        for control in iter {
            controls.insert(control);
        }
        controls
    }
}

/// Produces, decodes and encodes the value payload of one control type.
pub trait ControlFactory: Send + Sync {
    /// The OID the factory is registered under.
    fn oid(&self) -> &'static str;

    /// An empty control instance of the known type.
    fn new_control(&self) -> Control;

    /// Parses the value octets into the control's typed payload.
    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError>;

    /// Emits the control's value payload tail-first. Only called when
    /// [`ControlFactory::has_value`] is true.
    fn encode_value(&self, enc: &mut BerEncoder, control: &Control)
        -> Result<(), EncodeError>;

    /// Whether the control carries value octets at all.
    fn has_value(&self, control: &Control) -> bool {
        !matches!(control.value, ControlValue::Absent)
    }
}

/// The OID-to-factory maps, split by direction: a control OID may decode
/// differently in requests and responses (pre/post-read carry an attribute
/// list one way and an entry the other).
///
/// Write-once at initialization; registering at runtime requires external
/// synchronization by the caller.
pub struct ControlRegistry {
    request: BTreeMap<&'static str, Arc<dyn ControlFactory>>,
    response: BTreeMap<&'static str, Arc<dyn ControlFactory>>,
}

impl ControlRegistry {
    /// A registry with no factories; every control decodes raw.
    pub fn empty() -> Self {
        Self {
            request: BTreeMap::new(),
            response: BTreeMap::new(),
        }
    }

    /// The built-in factory set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        let paged: Arc<dyn ControlFactory> = Arc::new(paged::PagedResultsFactory);
        registry.register_request(paged.clone());
        registry.register_response(paged);

        registry.register_request(Arc::new(sort::SortRequestFactory));
        registry.register_response(Arc::new(sort::SortResponseFactory));

        registry.register_request(Arc::new(psearch::PersistentSearchFactory));
        registry.register_response(Arc::new(psearch::EntryChangeNotificationFactory));

        registry.register_request(Arc::new(flags::TreeDeleteFactory));
        registry.register_request(Arc::new(flags::ManageDsaITFactory));
        registry.register_request(Arc::new(flags::SubentriesFactory));

        registry.register_request(Arc::new(proxied::ProxiedAuthorizationFactory));

        let pwpolicy: Arc<dyn ControlFactory> = Arc::new(pwpolicy::PasswordPolicyFactory);
        registry.register_request(pwpolicy.clone());
        registry.register_response(pwpolicy);

        registry.register_request(Arc::new(assertion::AssertionFactory));
        registry.register_request(Arc::new(assertion::PreReadRequestFactory));
        registry.register_response(Arc::new(assertion::PreReadResponseFactory));
        registry.register_request(Arc::new(assertion::PostReadRequestFactory));
        registry.register_response(Arc::new(assertion::PostReadResponseFactory));

        registry.register_request(Arc::new(sync::SyncRequestFactory));
        registry.register_response(Arc::new(sync::SyncStateFactory));
        registry.register_response(Arc::new(sync::SyncDoneFactory));

        registry.register_request(Arc::new(vlv::VirtualListViewRequestFactory));
        registry.register_response(Arc::new(vlv::VirtualListViewResponseFactory));

        registry
    }

    pub fn register_request(&mut self, factory: Arc<dyn ControlFactory>) {
        self.request.insert(factory.oid(), factory);
    }

    pub fn register_response(&mut self, factory: Arc<dyn ControlFactory>) {
        self.response.insert(factory.oid(), factory);
    }

    pub fn request_factory(&self, oid: &str) -> Option<&Arc<dyn ControlFactory>> {
        self.request.get(oid)
    }

    pub fn response_factory(&self, oid: &str) -> Option<&Arc<dyn ControlFactory>> {
        self.response.get(oid)
    }

    /// The factory for `oid` in the given direction.
    pub fn factory(&self, oid: &str, request: bool) -> Option<&Arc<dyn ControlFactory>> {
        if request {
            self.request_factory(oid)
        } else {
            self.response_factory(oid)
        }
    }

    /// Explicit teardown: drops every factory. Subsequent decodes keep
    /// control values raw.
    pub fn clear(&mut self) {
        self.request.clear();
        self.response.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_last_writer_wins_in_place() {
        let mut controls = Controls::new();
        controls.insert(Control::new("1.1", ControlValue::Absent));
        controls.insert(Control::new("1.2", ControlValue::Absent));
        controls.insert(Control::new("1.1", ControlValue::Raw(Bytes::from_static(b"x"))).critical());

        assert_eq!(controls.len(), 2);
        let order: Vec<&str> = controls.iter().map(|c| c.oid.as_str()).collect();
        assert_eq!(order, ["1.1", "1.2"]);
        assert!(controls.get("1.1").unwrap().criticality);
    }

    #[test]
    fn builtin_registry_is_direction_aware() {
        let registry = ControlRegistry::with_builtins();
        assert!(registry.request_factory(PagedResults::OID).is_some());
        assert!(registry.response_factory(PagedResults::OID).is_some());
        assert!(registry.request_factory(EntryChangeNotification::OID).is_none());
        assert!(registry.response_factory(EntryChangeNotification::OID).is_some());
        assert!(registry.request_factory(ProxiedAuthorization::OID).is_some());

        let mut registry = registry;
        registry.clear();
        assert!(registry.is_empty());
    }
}
