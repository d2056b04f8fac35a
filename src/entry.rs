//! Attributes, entries, and the application of modifications.

use std::sync::Arc;

use bytes::Bytes;

use crate::dn::Dn;
use crate::error::{AccessError, SchemaError};
use crate::messages::ModifyOperation;
use crate::schema::AttributeType;
use crate::value::Value;

/// An attribute: an id, an optionally resolved type, and a set of values.
///
/// Values behave as a set under the type's equality matching rule: adding
/// a value equal to a present one is a no-op. Iteration follows insertion
/// order. At most one null value fits (a null equals any other null of the
/// same shape).
#[derive(Debug, Clone)]
pub struct Attribute {
    id: String,
    attribute_type: Option<Arc<AttributeType>>,
    values: Vec<Value>,
}

impl Attribute {
    /// A schema-unaware attribute; values compare by byte identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute_type: None,
            values: Vec::new(),
        }
    }

    /// A schema-aware attribute; added values are bound to the type.
    pub fn with_type(attribute_type: Arc<AttributeType>) -> Self {
        Self {
            id: attribute_type.name().to_owned(),
            attribute_type: Some(attribute_type),
            values: Vec::new(),
        }
    }

    /// The user-provided attribute description.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attribute_type(&self) -> Option<&Arc<AttributeType>> {
        self.attribute_type.as_ref()
    }

    pub fn is_schema_aware(&self) -> bool {
        self.attribute_type.is_some()
    }

    /// The key attributes are stored under in an entry.
    pub(crate) fn key(&self) -> String {
        match &self.attribute_type {
            Some(attribute_type) => attribute_type.oid().to_owned(),
            None => self.id.to_lowercase(),
        }
    }

    /// True when this attribute answers to `id`.
    pub fn is_named(&self, id: &str) -> bool {
        if self.id.eq_ignore_ascii_case(id) {
            return true;
        }
        self.attribute_type
            .as_ref()
            .is_some_and(|at| at.is_named(id))
    }

    /// Adds a value; binds it first when the attribute is schema-aware.
    /// Returns false when a matching value was already present.
    pub fn add(&mut self, mut value: Value) -> Result<bool, SchemaError> {
        if let Some(attribute_type) = &self.attribute_type {
            value.bind(attribute_type)?;
        }
        if self.values.iter().any(|v| v.matches(&value)) {
            return Ok(false);
        }
        self.values.push(value);
        Ok(true)
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> Result<bool, SchemaError> {
        self.add(Value::from_string(value.into()))
    }

    pub fn add_bytes(&mut self, value: impl Into<Bytes>) -> Result<bool, SchemaError> {
        self.add(Value::from_bytes(value.into()))
    }

    /// Removes the value matching `value` under the equality rule; false
    /// when absent. An unbound probe is compared through the attribute
    /// type's rule.
    pub fn remove(&mut self, value: &Value) -> bool {
        match self.values.iter().position(|v| v.matches(value)) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|v| v.matches(value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    /// Values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    fn deep_clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            attribute_type: self.attribute_type.clone(),
            values: self.values.iter().map(Value::deep_clone).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Attribute {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// An entry: a DN plus attributes in insertion order, keyed by attribute
/// type OID (or lowercased id when no type is resolved).
#[derive(Debug, Clone, Default)]
pub struct Entry {
    dn: Dn,
    attributes: Vec<Attribute>,
}

impl Entry {
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: Vec::new(),
        }
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_named(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.is_named(id))
    }

    pub fn contains_attribute(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts `attribute`, replacing any attribute with the same key in
    /// place. Returns the replaced attribute.
    pub fn put(&mut self, attribute: Attribute) -> Option<Attribute> {
        let key = attribute.key();
        match self.attributes.iter_mut().find(|a| a.key() == key) {
            Some(slot) => Some(core::mem::replace(slot, attribute)),
            None => {
                self.attributes.push(attribute);
                None
            }
        }
    }

    /// Merges `attribute` into an existing attribute with the same key, or
    /// inserts it.
    pub fn add(&mut self, attribute: Attribute) -> Result<(), SchemaError> {
        let key = attribute.key();
        match self.attributes.iter_mut().find(|a| a.key() == key) {
            Some(existing) => {
                for value in attribute.values {
                    existing.add(value)?;
                }
                Ok(())
            }
            None => {
                self.attributes.push(attribute);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Attribute> {
        let index = self.attributes.iter().position(|a| a.is_named(id))?;
        Some(self.attributes.remove(index))
    }

    /// True when the entry's objectClass attribute holds `name`, compared
    /// case-insensitively.
    pub fn has_object_class(&self, name: &str) -> bool {
        let Some(object_classes) = self.get("objectClass") else {
            return false;
        };
        object_classes.iter().any(|value| {
            value
                .raw_str()
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(name))
        })
    }

    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// A clone sharing value payloads.
    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    /// A clone with its own copy of every value payload.
    pub fn deep_clone(&self) -> Self {
        Self {
            dn: self.dn.clone(),
            attributes: self.attributes.iter().map(Attribute::deep_clone).collect(),
        }
    }

    /// A read-only view of this entry.
    pub fn freeze(self) -> ImmutableEntry {
        ImmutableEntry { inner: self }
    }
}

/// A read-only entry view: read operations forward, every mutation fails
/// with [`AccessError::Immutable`].
#[derive(Debug, Clone)]
pub struct ImmutableEntry {
    inner: Entry,
}

impl ImmutableEntry {
    pub fn dn(&self) -> &Dn {
        self.inner.dn()
    }

    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.inner.get(id)
    }

    pub fn contains_attribute(&self, id: &str) -> bool {
        self.inner.contains_attribute(id)
    }

    pub fn has_object_class(&self, name: &str) -> bool {
        self.inner.has_object_class(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.inner.iter()
    }

    pub fn set_dn(&mut self, _dn: Dn) -> Result<(), AccessError> {
        Err(AccessError::Immutable)
    }

    pub fn put(&mut self, _attribute: Attribute) -> Result<(), AccessError> {
        Err(AccessError::Immutable)
    }

    pub fn add(&mut self, _attribute: Attribute) -> Result<(), AccessError> {
        Err(AccessError::Immutable)
    }

    pub fn remove(&mut self, _id: &str) -> Result<(), AccessError> {
        Err(AccessError::Immutable)
    }

    pub fn clear(&mut self) -> Result<(), AccessError> {
        Err(AccessError::Immutable)
    }

    /// Back to a mutable entry (a copy; the view stays valid).
    pub fn thaw(&self) -> Entry {
        self.inner.clone()
    }
}

/// One attribute change of a modify operation.
#[derive(Debug, Clone)]
pub struct Modification {
    pub operation: ModifyOperation,
    pub attribute: Attribute,
}

impl Modification {
    pub fn new(operation: ModifyOperation, attribute: Attribute) -> Self {
        Self {
            operation,
            attribute,
        }
    }
}

/// Applies one modification to an entry, per RFC 4511 section 4.6 (and
/// RFC 4525 for increment).
pub fn apply_modification(
    entry: &mut Entry,
    modification: &Modification,
) -> Result<(), SchemaError> {
    let attribute = &modification.attribute;
    match modification.operation {
        ModifyOperation::Add => entry.add(attribute.clone()),
        ModifyOperation::Delete => {
            if attribute.is_empty() {
                entry.remove(attribute.id());
                return Ok(());
            }
            if let Some(existing) = entry.get_mut(attribute.id()) {
                for value in attribute.iter() {
                    existing.remove(value);
                }
                if existing.is_empty() {
                    entry.remove(attribute.id());
                }
            }
            Ok(())
        }
        ModifyOperation::Replace => {
            if attribute.is_empty() {
                entry.remove(attribute.id());
            } else {
                entry.put(attribute.clone());
            }
            Ok(())
        }
        ModifyOperation::Increment => increment(entry, attribute),
    }
}

fn increment(entry: &mut Entry, attribute: &Attribute) -> Result<(), SchemaError> {
    // exactly one integer operand
    let delta = match attribute.first() {
        Some(value) if attribute.len() == 1 => value
            .raw_str()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or(SchemaError::InvalidIncrement)?,
        _ => return Err(SchemaError::InvalidIncrement),
    };

    let existing = entry
        .get_mut(attribute.id())
        .ok_or(SchemaError::InvalidIncrement)?;

    let mut incremented = Vec::with_capacity(existing.len());
    for value in existing.iter() {
        let current: i64 = value
            .raw_str()
            .and_then(|text| text.parse().ok())
            .ok_or(SchemaError::InvalidIncrement)?;
        incremented.push(
            current
                .checked_add(delta)
                .ok_or(SchemaError::InvalidIncrement)?,
        );
    }

    let mut replacement = match existing.attribute_type() {
        Some(attribute_type) => Attribute::with_type(attribute_type.clone()),
        None => Attribute::new(existing.id()),
    };
    for value in incremented {
        replacement.add_string(value.to_string())?;
    }
    *existing = replacement;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistries;
    use pretty_assertions::assert_eq;

    fn schema_attr(id: &str) -> Attribute {
        Attribute::with_type(SchemaRegistries::core().attribute_types().get(id).unwrap())
    }

    #[test]
    fn attribute_set_semantics() {
        let mut cn = schema_attr("cn");
        assert!(cn.add_string("John Doe").unwrap());
        assert!(!cn.add_string("  JOHN   doe ").unwrap());
        assert!(cn.add_string("Jane Doe").unwrap());
        assert_eq!(cn.len(), 2);
        assert!(cn.contains(&Value::from_string("john DOE")));

        assert!(cn.remove(&Value::from_string(" JOHN doe ")));
        assert_eq!(cn.len(), 1);
        assert!(!cn.remove(&Value::from_string("gone")));
    }

    #[test]
    fn at_most_one_null_value() {
        let mut attr = Attribute::new("note");
        assert!(attr.add(Value::null_string()).unwrap());
        assert!(!attr.add(Value::null_string()).unwrap());
        assert_eq!(attr.len(), 1);
    }

    #[test]
    fn entry_put_get_remove() {
        let mut entry = Entry::new(Dn::parse("cn=app,dc=example,dc=com").unwrap());
        let mut cn = schema_attr("cn");
        cn.add_string("app").unwrap();
        assert!(entry.put(cn).is_none());

        // lookup by alias and by oid
        assert!(entry.get("commonName").is_some());
        assert!(entry.get("2.5.4.3").is_some());

        // put replaces in place by type oid
        let mut cn2 = schema_attr("commonName");
        cn2.add_string("other").unwrap();
        assert!(entry.put(cn2).is_some());
        assert_eq!(entry.len(), 1);
        assert!(entry.get("cn").unwrap().contains(&Value::from_string("other")));

        assert!(entry.remove("CN").is_some());
        assert!(entry.is_empty());
    }

    #[test]
    fn object_class_check() {
        let mut entry = Entry::new(Dn::root());
        let mut oc = schema_attr("objectClass");
        oc.add_string("top").unwrap();
        oc.add_string("inetOrgPerson").unwrap();
        entry.put(oc);

        assert!(entry.has_object_class("inetorgperson"));
        assert!(entry.has_object_class("TOP"));
        assert!(!entry.has_object_class("domain"));
    }

    #[test]
    fn immutable_view_rejects_mutation() {
        let mut entry = Entry::new(Dn::root());
        entry.put(Attribute::new("cn"));
        let mut view = entry.freeze();

        assert_eq!(view.len(), 1);
        assert_eq!(view.put(Attribute::new("sn")), Err(AccessError::Immutable));
        assert_eq!(view.clear(), Err(AccessError::Immutable));
        assert_eq!(view.remove("cn"), Err(AccessError::Immutable));
        assert_eq!(view.len(), 1);

        let thawed = view.thaw();
        assert_eq!(thawed.len(), 1);
    }

    #[test]
    fn modifications_follow_the_table() {
        let mut entry = Entry::new(Dn::parse("cn=g,dc=x").unwrap());
        let mut member = schema_attr("member");
        member.add_string("cn=a,dc=x").unwrap();
        entry.put(member);

        // add merges
        let mut more = schema_attr("member");
        more.add_string("cn=b,dc=x").unwrap();
        apply_modification(&mut entry, &Modification::new(ModifyOperation::Add, more)).unwrap();
        assert_eq!(entry.get("member").unwrap().len(), 2);

        // remove listed values, attribute dropped when empty
        let mut gone = schema_attr("member");
        gone.add_string("CN=A,dc=x").unwrap();
        gone.add_string("cn=b,DC=X").unwrap();
        apply_modification(&mut entry, &Modification::new(ModifyOperation::Delete, gone))
            .unwrap();
        assert!(entry.get("member").is_none());

        // replace with empty list drops, with values overwrites
        let mut desc = schema_attr("description");
        desc.add_string("text").unwrap();
        entry.put(desc);
        apply_modification(
            &mut entry,
            &Modification::new(ModifyOperation::Replace, schema_attr("description")),
        )
        .unwrap();
        assert!(entry.get("description").is_none());
    }

    #[test]
    fn increment_requires_numbers() {
        let mut entry = Entry::new(Dn::root());
        let mut counter = Attribute::new("uidNumber");
        counter.add_string("1000").unwrap();
        entry.put(counter);

        let mut delta = Attribute::new("uidNumber");
        delta.add_string("5").unwrap();
        apply_modification(
            &mut entry,
            &Modification::new(ModifyOperation::Increment, delta),
        )
        .unwrap();
        assert!(entry
            .get("uidNumber")
            .unwrap()
            .contains(&Value::from_string("1005")));

        let mut bad = Attribute::new("cn");
        bad.add_string("oops").unwrap();
        entry.put({
            let mut cn = Attribute::new("cn");
            cn.add_string("text").unwrap();
            cn
        });
        assert_eq!(
            apply_modification(&mut entry, &Modification::new(ModifyOperation::Increment, bad)),
            Err(SchemaError::InvalidIncrement)
        );
    }

    #[test]
    fn deep_clone_copies_payloads() {
        let mut entry = Entry::new(Dn::root());
        let mut blob = Attribute::new("userPassword");
        blob.add_bytes(&b"secret"[..]).unwrap();
        entry.put(blob);

        let deep = entry.deep_clone();
        let shallow = entry.shallow_clone();
        assert_eq!(
            deep.get("userPassword").unwrap().first().unwrap().bytes(),
            shallow.get("userPassword").unwrap().first().unwrap().bytes(),
        );
    }
}
