//! Schema registries: attribute types, object classes, matching rules,
//! syntaxes, and the normalizer/comparator/syntax-checker capability sets,
//! all keyed by OID with name aliases.
//!
//! Registries are loaded once and then only read; share them behind an
//! `Arc` and query from as many threads as needed.

mod attribute_type;
mod checkers;
mod comparators;
mod core_schema;
mod matching;
mod normalizers;
mod object_class;
mod registry;

pub use attribute_type::{AttributeType, AttributeUsage};
pub use checkers::SyntaxChecker;
pub use comparators::Comparator;
pub use matching::{MatchingRule, Syntax};
pub use normalizers::Normalizer;
pub use object_class::{ObjectClass, ObjectClassKind};
pub use registry::OidRegistry;

pub(crate) use normalizers::deep_trim_to_lower;

use std::sync::Arc;

use once_cell::sync::Lazy;

/// All registries of one schema.
pub struct SchemaRegistries {
    attribute_types: OidRegistry<AttributeType>,
    object_classes: OidRegistry<ObjectClass>,
    matching_rules: OidRegistry<MatchingRule>,
    syntaxes: OidRegistry<Syntax>,
    normalizers: OidRegistry<dyn Normalizer>,
    comparators: OidRegistry<dyn Comparator>,
    syntax_checkers: OidRegistry<dyn SyntaxChecker>,
}

impl SchemaRegistries {
    /// Empty registries, ready for loading.
    pub fn new() -> Self {
        Self {
            attribute_types: OidRegistry::new(),
            object_classes: OidRegistry::new(),
            matching_rules: OidRegistry::new(),
            syntaxes: OidRegistry::new(),
            normalizers: OidRegistry::new(),
            comparators: OidRegistry::new(),
            syntax_checkers: OidRegistry::new(),
        }
    }

    /// The built-in core schema (RFC 4512/4519 subset), shared
    /// process-wide. Built on first use.
    pub fn core() -> Arc<SchemaRegistries> {
        static CORE: Lazy<Arc<SchemaRegistries>> =
            Lazy::new(|| Arc::new(core_schema::build()));
        CORE.clone()
    }

    pub fn attribute_types(&self) -> &OidRegistry<AttributeType> {
        &self.attribute_types
    }

    pub fn attribute_types_mut(&mut self) -> &mut OidRegistry<AttributeType> {
        &mut self.attribute_types
    }

    pub fn object_classes(&self) -> &OidRegistry<ObjectClass> {
        &self.object_classes
    }

    pub fn object_classes_mut(&mut self) -> &mut OidRegistry<ObjectClass> {
        &mut self.object_classes
    }

    pub fn matching_rules(&self) -> &OidRegistry<MatchingRule> {
        &self.matching_rules
    }

    pub fn matching_rules_mut(&mut self) -> &mut OidRegistry<MatchingRule> {
        &mut self.matching_rules
    }

    pub fn syntaxes(&self) -> &OidRegistry<Syntax> {
        &self.syntaxes
    }

    pub fn syntaxes_mut(&mut self) -> &mut OidRegistry<Syntax> {
        &mut self.syntaxes
    }

    pub fn normalizers(&self) -> &OidRegistry<dyn Normalizer> {
        &self.normalizers
    }

    pub fn normalizers_mut(&mut self) -> &mut OidRegistry<dyn Normalizer> {
        &mut self.normalizers
    }

    pub fn comparators(&self) -> &OidRegistry<dyn Comparator> {
        &self.comparators
    }

    pub fn comparators_mut(&mut self) -> &mut OidRegistry<dyn Comparator> {
        &mut self.comparators
    }

    pub fn syntax_checkers(&self) -> &OidRegistry<dyn SyntaxChecker> {
        &self.syntax_checkers
    }

    pub fn syntax_checkers_mut(&mut self) -> &mut OidRegistry<dyn SyntaxChecker> {
        &mut self.syntax_checkers
    }

    /// Transitive superior test: is `descendant` below `ancestor` in the
    /// attribute-type hierarchy? A type is not its own descendant.
    pub fn is_descendant(&self, descendant: &str, ancestor: &str) -> bool {
        let Some(ancestor) = self.attribute_types.get(ancestor) else {
            return false;
        };
        let Some(mut current) = self.attribute_types.get(descendant) else {
            return false;
        };
        while let Some(superior) = current.superior() {
            let Some(next) = self.attribute_types.get(superior) else {
                return false;
            };
            if next.oid() == ancestor.oid() {
                return true;
            }
            current = next;
        }
        false
    }
}

impl Default for SchemaRegistries {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_schema_lookups() {
        let schema = SchemaRegistries::core();
        let cn = schema.attribute_types().get("cn").unwrap();
        assert_eq!(cn.oid(), "2.5.4.3");
        assert_eq!(schema.attribute_types().get("CommonName").unwrap().oid(), "2.5.4.3");
        assert_eq!(schema.attribute_types().get("2.5.4.3").unwrap().oid(), "2.5.4.3");
        assert!(cn.equality().is_some());
        assert!(cn.is_human_readable());

        assert!(schema.matching_rules().get("caseIgnoreMatch").is_some());
        assert!(schema.syntaxes().get("1.3.6.1.4.1.1466.115.121.1.15").is_some());
        assert!(schema.object_classes().get("inetOrgPerson").is_some());
    }

    #[test]
    fn descendant_relation_is_transitive() {
        let schema = SchemaRegistries::core();
        assert!(schema.is_descendant("cn", "name"));
        assert!(schema.is_descendant("2.5.4.3", "2.5.4.41"));
        assert!(schema.is_descendant("givenName", "name"));
        assert!(schema.is_descendant("seeAlso", "distinguishedName"));
        assert!(!schema.is_descendant("name", "cn"));
        assert!(!schema.is_descendant("cn", "cn"));
        assert!(!schema.is_descendant("cn", "nonexistent"));
    }
}
