//! The OID-keyed registry shared by every schema object kind.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps OIDs to schema objects, with case-insensitive name aliases.
pub struct OidRegistry<T: ?Sized> {
    by_oid: BTreeMap<String, Arc<T>>,
    /// lowercase alias -> oid
    aliases: BTreeMap<String, String>,
}

impl<T: ?Sized> OidRegistry<T> {
    pub fn new() -> Self {
        Self {
            by_oid: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Registers `value` under `oid` and every alias in `names`. A
    /// re-registered OID or alias overwrites the earlier binding.
    pub fn register(&mut self, oid: &str, names: &[&str], value: Arc<T>) {
        self.by_oid.insert(oid.to_owned(), value);
        for name in names {
            self.aliases.insert(name.to_lowercase(), oid.to_owned());
        }
    }

    /// Looks up by OID or by alias, case-insensitively.
    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        if let Some(value) = self.by_oid.get(id) {
            return Some(value.clone());
        }
        let oid = self.aliases.get(&id.to_lowercase())?;
        self.by_oid.get(oid).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }

    /// Iterates registered objects in OID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.by_oid.iter().map(|(oid, value)| (oid.as_str(), value))
    }
}

impl<T: ?Sized> Default for OidRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_lookup_is_case_insensitive() {
        let mut registry: OidRegistry<str> = OidRegistry::new();
        registry.register("2.5.4.3", &["cn", "commonName"], Arc::from("value"));

        assert!(registry.get("2.5.4.3").is_some());
        assert!(registry.get("CN").is_some());
        assert!(registry.get("commonname").is_some());
        assert!(registry.get("sn").is_none());
        assert_eq!(registry.len(), 1);
    }
}
