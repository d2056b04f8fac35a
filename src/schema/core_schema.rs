//! The built-in core schema: the RFC 4512/4519 subset the codec needs to
//! be useful out of the box.

use std::sync::Arc;

use super::attribute_type::{AttributeType, AttributeUsage};
use super::checkers::*;
use super::comparators::*;
use super::matching::{MatchingRule, Syntax};
use super::normalizers::*;
use super::object_class::{ObjectClass, ObjectClassKind};
use super::{Comparator, Normalizer, SchemaRegistries, SyntaxChecker};

// syntax OIDs
const DIRECTORY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.15";
const IA5_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.26";
const INTEGER: &str = "1.3.6.1.4.1.1466.115.121.1.27";
const BOOLEAN: &str = "1.3.6.1.4.1.1466.115.121.1.7";
const DN: &str = "1.3.6.1.4.1.1466.115.121.1.12";
const OID_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.38";
const GENERALIZED_TIME: &str = "1.3.6.1.4.1.1466.115.121.1.24";
const NUMERIC_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.36";
const OCTET_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.40";
const UUID: &str = "1.3.6.1.1.16.1";

pub(super) fn build() -> SchemaRegistries {
    let mut schema = SchemaRegistries::new();

    // syntaxes and their checkers
    let syntaxes: &[(&str, &str, bool, Arc<dyn SyntaxChecker>)] = &[
        (DIRECTORY_STRING, "Directory String", true, Arc::new(DirectoryStringChecker)),
        (IA5_STRING, "IA5 String", true, Arc::new(Ia5StringChecker)),
        (INTEGER, "INTEGER", true, Arc::new(IntegerChecker)),
        (BOOLEAN, "Boolean", true, Arc::new(BooleanChecker)),
        (DN, "DN", true, Arc::new(DnChecker)),
        (OID_SYNTAX, "OID", true, Arc::new(OidChecker)),
        (GENERALIZED_TIME, "Generalized Time", true, Arc::new(GeneralizedTimeChecker)),
        (NUMERIC_STRING, "Numeric String", true, Arc::new(NumericStringChecker)),
        (OCTET_STRING, "Octet String", false, Arc::new(OctetStringChecker)),
        (UUID, "UUID", true, Arc::new(UuidChecker)),
    ];
    for (oid, description, human_readable, checker) in syntaxes {
        schema.syntax_checkers_mut().register(checker.oid(), &[], checker.clone());
        schema.syntaxes_mut().register(
            oid,
            &[*description],
            Arc::new(Syntax::new(*oid, *description, *human_readable, checker.clone())),
        );
    }
    let syntax = |schema: &SchemaRegistries, oid: &str| {
        schema.syntaxes().get(oid).expect("syntax registered above")
    };

    // matching rules with their normalizer/comparator capability pairs
    let case_ignore: Arc<dyn Normalizer> = Arc::new(CaseIgnoreNormalizer);
    let case_exact: Arc<dyn Normalizer> = Arc::new(CaseExactNormalizer);
    let noop: Arc<dyn Normalizer> = Arc::new(NoOpNormalizer);
    let numeric: Arc<dyn Normalizer> = Arc::new(NumericStringNormalizer);
    let integer_norm: Arc<dyn Normalizer> = Arc::new(IntegerNormalizer);
    let boolean_norm: Arc<dyn Normalizer> = Arc::new(BooleanNormalizer);
    let time_norm: Arc<dyn Normalizer> = Arc::new(GeneralizedTimeNormalizer);
    let dn_norm: Arc<dyn Normalizer> = Arc::new(DnNormalizer);
    let oid_norm: Arc<dyn Normalizer> = Arc::new(OidNormalizer);
    let uuid_norm: Arc<dyn Normalizer> = Arc::new(UuidNormalizer);

    let string_cmp: Arc<dyn Comparator> = Arc::new(StringComparator);
    let bytes_cmp: Arc<dyn Comparator> = Arc::new(ByteArrayComparator);
    let integer_cmp: Arc<dyn Comparator> = Arc::new(IntegerComparator);
    let time_cmp: Arc<dyn Comparator> = Arc::new(GeneralizedTimeComparator);
    let dn_cmp: Arc<dyn Comparator> = Arc::new(DnComparator);

    let rules: &[(&str, &[&str], &str, &Arc<dyn Normalizer>, &Arc<dyn Comparator>)] = &[
        ("2.5.13.0", &["objectIdentifierMatch"], OID_SYNTAX, &oid_norm, &string_cmp),
        ("2.5.13.1", &["distinguishedNameMatch"], DN, &dn_norm, &dn_cmp),
        ("2.5.13.2", &["caseIgnoreMatch"], DIRECTORY_STRING, &case_ignore, &string_cmp),
        ("2.5.13.3", &["caseIgnoreOrderingMatch"], DIRECTORY_STRING, &case_ignore, &string_cmp),
        ("2.5.13.4", &["caseIgnoreSubstringsMatch"], DIRECTORY_STRING, &case_ignore, &string_cmp),
        ("2.5.13.5", &["caseExactMatch"], DIRECTORY_STRING, &case_exact, &string_cmp),
        ("2.5.13.8", &["numericStringMatch"], NUMERIC_STRING, &numeric, &string_cmp),
        ("2.5.13.13", &["booleanMatch"], BOOLEAN, &boolean_norm, &string_cmp),
        ("2.5.13.14", &["integerMatch"], INTEGER, &integer_norm, &integer_cmp),
        ("2.5.13.15", &["integerOrderingMatch"], INTEGER, &integer_norm, &integer_cmp),
        ("2.5.13.17", &["octetStringMatch"], OCTET_STRING, &noop, &bytes_cmp),
        ("2.5.13.27", &["generalizedTimeMatch"], GENERALIZED_TIME, &time_norm, &time_cmp),
        ("2.5.13.28", &["generalizedTimeOrderingMatch"], GENERALIZED_TIME, &time_norm, &time_cmp),
        ("1.3.6.1.4.1.1466.109.114.2", &["caseIgnoreIA5Match"], IA5_STRING, &case_ignore, &string_cmp),
        ("1.3.6.1.1.16.2", &["uuidMatch"], UUID, &uuid_norm, &string_cmp),
    ];
    for (oid, names, syntax_oid, normalizer, comparator) in rules {
        schema.normalizers_mut().register(oid, &[], (*normalizer).clone());
        schema.comparators_mut().register(oid, &[], (*comparator).clone());
        schema.matching_rules_mut().register(
            oid,
            names,
            Arc::new(MatchingRule::new(
                *oid,
                names,
                *syntax_oid,
                (*normalizer).clone(),
                (*comparator).clone(),
            )),
        );
    }
    let rule = |schema: &SchemaRegistries, id: &str| {
        schema
            .matching_rules()
            .get(id)
            .expect("matching rule registered above")
    };

    // attribute types
    let attribute_types = vec![
        AttributeType::new("2.5.4.0")
            .with_names(&["objectClass"])
            .with_equality(rule(&schema, "objectIdentifierMatch"))
            .with_syntax(syntax(&schema, OID_SYNTAX)),
        AttributeType::new("2.5.4.41")
            .with_names(&["name"])
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_substring(rule(&schema, "caseIgnoreSubstringsMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.3")
            .with_names(&["cn", "commonName"])
            .with_superior("name")
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_substring(rule(&schema, "caseIgnoreSubstringsMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.4")
            .with_names(&["sn", "surname"])
            .with_superior("name")
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_substring(rule(&schema, "caseIgnoreSubstringsMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.42")
            .with_names(&["givenName"])
            .with_superior("name")
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.10")
            .with_names(&["o", "organizationName"])
            .with_superior("name")
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.11")
            .with_names(&["ou", "organizationalUnitName"])
            .with_superior("name")
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.13")
            .with_names(&["description"])
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.20")
            .with_names(&["telephoneNumber"])
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("2.5.4.49")
            .with_names(&["distinguishedName"])
            .with_equality(rule(&schema, "distinguishedNameMatch"))
            .with_syntax(syntax(&schema, DN)),
        AttributeType::new("2.5.4.34")
            .with_names(&["seeAlso"])
            .with_superior("distinguishedName")
            .with_equality(rule(&schema, "distinguishedNameMatch"))
            .with_syntax(syntax(&schema, DN)),
        AttributeType::new("2.5.4.31")
            .with_names(&["member"])
            .with_superior("distinguishedName")
            .with_equality(rule(&schema, "distinguishedNameMatch"))
            .with_syntax(syntax(&schema, DN)),
        AttributeType::new("2.5.4.35")
            .with_names(&["userPassword"])
            .with_equality(rule(&schema, "octetStringMatch"))
            .with_syntax(syntax(&schema, OCTET_STRING)),
        AttributeType::new("0.9.2342.19200300.100.1.1")
            .with_names(&["uid", "userid"])
            .with_equality(rule(&schema, "caseIgnoreMatch"))
            .with_substring(rule(&schema, "caseIgnoreSubstringsMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING)),
        AttributeType::new("0.9.2342.19200300.100.1.25")
            .with_names(&["dc", "domainComponent"])
            .with_equality(rule(&schema, "caseIgnoreIA5Match"))
            .with_syntax(syntax(&schema, IA5_STRING))
            .single_valued(),
        AttributeType::new("2.5.18.1")
            .with_names(&["createTimestamp"])
            .with_equality(rule(&schema, "generalizedTimeMatch"))
            .with_ordering(rule(&schema, "generalizedTimeOrderingMatch"))
            .with_syntax(syntax(&schema, GENERALIZED_TIME))
            .with_usage(AttributeUsage::DirectoryOperation)
            .single_valued(),
        AttributeType::new("2.5.18.2")
            .with_names(&["modifyTimestamp"])
            .with_equality(rule(&schema, "generalizedTimeMatch"))
            .with_ordering(rule(&schema, "generalizedTimeOrderingMatch"))
            .with_syntax(syntax(&schema, GENERALIZED_TIME))
            .with_usage(AttributeUsage::DirectoryOperation)
            .single_valued(),
        AttributeType::new("1.3.6.1.1.16.4")
            .with_names(&["entryUUID"])
            .with_equality(rule(&schema, "uuidMatch"))
            .with_syntax(syntax(&schema, UUID))
            .with_usage(AttributeUsage::DirectoryOperation)
            .single_valued(),
        AttributeType::new("1.3.6.1.4.1.4203.666.1.7")
            .with_names(&["entryCSN"])
            .with_equality(rule(&schema, "caseExactMatch"))
            .with_syntax(syntax(&schema, DIRECTORY_STRING))
            .with_usage(AttributeUsage::DirectoryOperation)
            .single_valued(),
    ];
    for attribute_type in attribute_types {
        let owned_names: Vec<String> = attribute_type.names().to_vec();
        let names: Vec<&str> = owned_names.iter().map(String::as_str).collect();
        let oid = attribute_type.oid().to_owned();
        schema
            .attribute_types_mut()
            .register(&oid, &names, Arc::new(attribute_type));
    }

    // object classes
    let object_classes = vec![
        ObjectClass::new("2.5.6.0")
            .with_names(&["top"])
            .with_kind(ObjectClassKind::Abstract)
            .with_must(&["objectClass"]),
        ObjectClass::new("2.5.6.6")
            .with_names(&["person"])
            .with_superiors(&["top"])
            .with_must(&["sn", "cn"])
            .with_may(&["userPassword", "telephoneNumber", "seeAlso", "description"]),
        ObjectClass::new("2.5.6.7")
            .with_names(&["organizationalPerson"])
            .with_superiors(&["person"])
            .with_may(&["ou", "telephoneNumber"]),
        ObjectClass::new("2.16.840.1.113730.3.2.2")
            .with_names(&["inetOrgPerson"])
            .with_superiors(&["organizationalPerson"])
            .with_may(&["uid", "givenName", "o"]),
        ObjectClass::new("2.5.6.5")
            .with_names(&["organizationalUnit"])
            .with_superiors(&["top"])
            .with_must(&["ou"]),
        ObjectClass::new("0.9.2342.19200300.100.4.13")
            .with_names(&["domain"])
            .with_superiors(&["top"])
            .with_must(&["dc"]),
        ObjectClass::new("2.5.6.9")
            .with_names(&["groupOfNames"])
            .with_superiors(&["top"])
            .with_must(&["member", "cn"])
            .with_may(&["ou", "o", "description"]),
    ];
    for object_class in object_classes {
        let owned_names: Vec<String> = object_class.names().to_vec();
        let names: Vec<&str> = owned_names.iter().map(String::as_str).collect();
        let oid = object_class.oid().to_owned();
        schema
            .object_classes_mut()
            .register(&oid, &names, Arc::new(object_class));
    }

    schema
}
