//! Control decoding and encoding through whole PDUs: the factory registry,
//! direction awareness, raw fallback, and byte-exact round trips.

use bytes::Bytes;
use hex_literal::hex;
use ldap_codec::controls::*;
use ldap_codec::messages::*;
use ldap_codec::{
    Control, ControlRegistry, ControlValue, DecodeError, DecodeOutcome, LdapCodec, LdapMessage,
    ProtocolOp,
};
use pretty_assertions::assert_eq;

fn decode_one(codec: &LdapCodec, bytes: &[u8]) -> LdapMessage {
    codec.decode_message(bytes).expect("complete PDU")
}

// S2: BindResponse carrying a critical paged-results control.
const BIND_RESPONSE_PAGED: [u8; 60] = hex!(
    "30 3a 02 01 01 61 07 0a 01 00 04 00 04 00"
    "a0 2c 30 2a"
    "04 16 31 2e 32 2e 38 34 30 2e 31 31 33 35 35 36 2e 31 2e 34 2e 33 31 39"
    "01 01 ff"
    "04 0d 30 0b 02 01 05 04 06 61 62 63 64 65 66"
);

#[test]
fn paged_results_on_a_bind_response() {
    let codec = LdapCodec::new();
    let message = decode_one(&codec, &BIND_RESPONSE_PAGED);

    assert_eq!(message.controls.len(), 1);
    let control = message.controls.get(PagedResults::OID).unwrap();
    assert!(control.criticality);
    assert_eq!(
        control.value,
        ControlValue::PagedResults(PagedResults {
            size: 5,
            cookie: Bytes::from_static(b"abcdef"),
        })
    );

    assert_eq!(codec.encode(&message).unwrap(), BIND_RESPONSE_PAGED);
}

// S8: every split of S2 parses identically.
#[test]
fn paged_results_fragmented_at_every_position() {
    let codec = LdapCodec::new();
    let whole = decode_one(&codec, &BIND_RESPONSE_PAGED);

    for split in 0..=BIND_RESPONSE_PAGED.len() {
        let mut container = codec.new_container();
        let (head, tail) = BIND_RESPONSE_PAGED.split_at(split);
        let outcome = codec.decode(head, &mut container).unwrap();
        let message = match outcome {
            DecodeOutcome::Message { message, .. } => message,
            DecodeOutcome::NeedMoreInput => match codec.decode(tail, &mut container).unwrap() {
                DecodeOutcome::Message { message, .. } => message,
                DecodeOutcome::NeedMoreInput => panic!("incomplete at {split}"),
            },
        };
        assert_eq!(message, whole, "split at {split}");
    }
}

// S3: the dn: branch of proxied authorization is DN-validated.
#[test]
fn proxied_authorization_dn_form() {
    let codec = LdapCodec::new();
    let good = hex!(
        "30 43 02 01 02 4a 0a 64 63 3d 65 78 61 6d 70 6c 65"
        "a0 32 30 30"
        "04 18 32 2e 31 36 2e 38 34 30 2e 31 2e 31 31 33 37 33 30 2e 33 2e 34 2e 31 38"
        "04 14 64 6e 3a 64 63 3d 65 78 61 6d 70 6c 65 2c 64 63 3d 63 6f 6d"
    );
    let message = decode_one(&codec, &good);
    let control = message.controls.get(ProxiedAuthorization::OID).unwrap();
    assert_eq!(
        control.value,
        ControlValue::ProxiedAuthorization(ProxiedAuthorization {
            authz_id: "dn:dc=example,dc=com".into(),
        })
    );
    assert_eq!(codec.encode(&message).unwrap(), good.to_vec());

    // "dn:dc=example,dc" — the trailing RDN has no value
    let bad = hex!(
        "30 3f 02 01 02 4a 0a 64 63 3d 65 78 61 6d 70 6c 65"
        "a0 2e 30 2c"
        "04 18 32 2e 31 36 2e 38 34 30 2e 31 2e 31 31 33 37 33 30 2e 33 2e 34 2e 31 38"
        "04 10 64 6e 3a 64 63 3d 65 78 61 6d 70 6c 65 2c 64 63"
    );
    let error = codec.decode_message(&bad).unwrap_err();
    assert!(matches!(error, DecodeError::GrammarMismatch { .. }));
}

// S4 and S5: the u: form carries multibyte UTF-8; the anonymous form is
// an empty, present value.
#[test]
fn proxied_authorization_user_and_anonymous_forms() {
    let codec = LdapCodec::new();

    let mut message = LdapMessage::new(
        2,
        ProtocolOp::DelRequest(DelRequest {
            dn: "dc=example".into(),
            ..DelRequest::default()
        }),
    );
    message.controls.insert(Control::new(
        ProxiedAuthorization::OID,
        ControlValue::ProxiedAuthorization(ProxiedAuthorization {
            authz_id: "u:elécharny".into(),
        }),
    ));
    let bytes = codec.encode(&message).unwrap();
    // value is the bare authzId: "u:el" c3 a9 "charny"
    let value_octets = b"u:el\xc3\xa9charny";
    assert!(bytes.windows(value_octets.len()).any(|w| w == value_octets));
    assert_eq!(decode_one(&codec, &bytes), message);

    let mut anonymous = message.clone();
    anonymous.controls.insert(Control::new(
        ProxiedAuthorization::OID,
        ControlValue::ProxiedAuthorization(ProxiedAuthorization::anonymous()),
    ));
    let bytes = codec.encode(&anonymous).unwrap();
    // the control value is present and empty: ...04 00 at the tail
    assert_eq!(&bytes[bytes.len() - 2..], &hex!("04 00"));
    let decoded = decode_one(&codec, &bytes);
    let control = decoded.controls.get(ProxiedAuthorization::OID).unwrap();
    assert_eq!(
        control.value,
        ControlValue::ProxiedAuthorization(ProxiedAuthorization { authz_id: String::new() })
    );
}

#[test]
fn unknown_control_keeps_raw_value() {
    let codec = LdapCodec::new();
    let mut message = LdapMessage::new(
        5,
        ProtocolOp::SearchRequest(SearchRequest {
            base_object: "dc=example".into(),
            ..SearchRequest::default()
        }),
    );
    message.controls.insert(
        Control::new("1.2.3.4.5.6", ControlValue::Raw(Bytes::from_static(&hex!("30 03 02 01 2a"))))
            .critical(),
    );

    let bytes = codec.encode(&message).unwrap();
    let decoded = decode_one(&codec, &bytes);
    let control = decoded.controls.get("1.2.3.4.5.6").unwrap();
    assert!(control.criticality);
    assert_eq!(
        control.value,
        ControlValue::Raw(Bytes::from_static(&hex!("30 03 02 01 2a")))
    );
    assert_eq!(codec.encode(&decoded).unwrap(), bytes);
}

#[test]
fn direction_decides_the_factory() {
    let codec = LdapCodec::new();

    // an entry-change notification only decodes on responses; the same
    // OID on a request keeps its raw bytes
    let mut on_response = LdapMessage::new(
        6,
        ProtocolOp::SearchResultEntry(SearchResultEntry {
            object_name: "cn=x".into(),
            attributes: vec![],
        }),
    );
    on_response.controls.insert(Control::new(
        EntryChangeNotification::OID,
        ControlValue::EntryChangeNotification(EntryChangeNotification {
            change_type: ChangeType::Modify,
            previous_dn: None,
            change_number: Some(7),
        }),
    ));
    let bytes = codec.encode(&on_response).unwrap();
    let decoded = decode_one(&codec, &bytes);
    assert!(matches!(
        decoded.controls.get(EntryChangeNotification::OID).unwrap().value,
        ControlValue::EntryChangeNotification(_)
    ));

    // hand-build the same control value bytes on a DelRequest
    let mut enc_probe = LdapMessage::new(
        6,
        ProtocolOp::DelRequest(DelRequest {
            dn: "cn=x".into(),
            ..DelRequest::default()
        }),
    );
    enc_probe.controls.insert(Control::new(
        EntryChangeNotification::OID,
        ControlValue::Raw(Bytes::from_static(&hex!("30 06 0a 01 04 02 01 07"))),
    ));
    let bytes = codec.encode(&enc_probe).unwrap();
    let decoded = decode_one(&codec, &bytes);
    assert!(matches!(
        decoded.controls.get(EntryChangeNotification::OID).unwrap().value,
        ControlValue::Raw(_)
    ));
}

#[test]
fn typed_controls_round_trip_on_the_wire() {
    let codec = LdapCodec::new();
    let request_controls = vec![
        Control::new(
            SortRequest::OID,
            ControlValue::SortRequest(SortRequest {
                keys: vec![SortKey::new("cn")],
            }),
        ),
        Control::new(
            PersistentSearch::OID,
            ControlValue::PersistentSearch(PersistentSearch::default()),
        ),
        Control::new(TreeDelete::OID, ControlValue::Absent).critical(),
        Control::new(ManageDsaIT::OID, ControlValue::Absent),
        Control::new(
            Subentries::OID,
            ControlValue::Subentries(Subentries { visibility: true }),
        ),
        Control::new(
            AssertionControl::OID,
            ControlValue::Assertion(AssertionControl {
                filter: ldap_codec::Filter::equality("cn", &b"x"[..]),
            }),
        ),
        Control::new(
            PRE_READ_OID,
            ControlValue::ReadEntryRequest(ReadEntryRequest {
                attributes: vec!["cn".into()],
            }),
        ),
        Control::new(
            SyncRequest::OID,
            ControlValue::SyncRequest(SyncRequest {
                mode: SyncRequestMode::RefreshOnly,
                cookie: None,
                reload_hint: false,
            }),
        ),
        Control::new(
            VirtualListViewRequest::OID,
            ControlValue::VirtualListViewRequest(VirtualListViewRequest::default()),
        ),
        Control::new(PasswordPolicy::OID, ControlValue::Absent),
    ];

    let mut message = LdapMessage::new(
        9,
        ProtocolOp::SearchRequest(SearchRequest {
            base_object: "dc=example".into(),
            ..SearchRequest::default()
        }),
    );
    for control in request_controls {
        message.controls.insert(control);
    }

    let bytes = codec.encode(&message).unwrap();
    let decoded = decode_one(&codec, &bytes);
    assert_eq!(decoded, message);
    assert_eq!(codec.encode(&decoded).unwrap(), bytes);

    // response-direction controls on a search result done
    let response_controls = vec![
        Control::new(
            SortResponse::OID,
            ControlValue::SortResponse(SortResponse {
                result: ResultCode::SUCCESS,
                attribute_type: None,
            }),
        ),
        Control::new(
            SyncDone::OID,
            ControlValue::SyncDone(SyncDone {
                cookie: Some(Bytes::from_static(b"c")),
                refresh_deletes: true,
            }),
        ),
        Control::new(
            VirtualListViewResponse::OID,
            ControlValue::VirtualListViewResponse(VirtualListViewResponse {
                target_position: 1,
                content_count: 9,
                result: ResultCode::SUCCESS,
                context_id: None,
            }),
        ),
        Control::new(
            PasswordPolicy::OID,
            ControlValue::PasswordPolicy(PasswordPolicy {
                warning: Some(PasswordPolicyWarning::GraceAuthNsRemaining(1)),
                error: Some(PasswordPolicyError::PasswordExpired),
            }),
        ),
    ];
    let mut message = LdapMessage::new(
        9,
        ProtocolOp::SearchResultDone(SearchResultDone::default()),
    );
    for control in response_controls {
        message.controls.insert(control);
    }
    let bytes = codec.encode(&message).unwrap();
    let decoded = decode_one(&codec, &bytes);
    assert_eq!(decoded, message);
    assert_eq!(codec.encode(&decoded).unwrap(), bytes);
}

#[test]
fn teardown_drops_factories() {
    let mut codec = LdapCodec::new();
    codec.teardown();
    assert!(codec.registry().is_empty());

    let message = decode_one(&codec, &BIND_RESPONSE_PAGED);
    let control = message.controls.get(PagedResults::OID).unwrap();
    assert!(matches!(control.value, ControlValue::Raw(_)));
    // raw values still re-encode byte-exactly
    assert_eq!(codec.encode(&message).unwrap(), BIND_RESPONSE_PAGED);
}

#[test]
fn empty_registry_is_composable() {
    let codec = LdapCodec::with_registry(ControlRegistry::empty());
    let message = decode_one(&codec, &BIND_RESPONSE_PAGED);
    assert!(matches!(
        message.controls.get(PagedResults::OID).unwrap().value,
        ControlValue::Raw(_)
    ));
}

#[test]
fn malformed_control_oid_is_rejected() {
    let codec = LdapCodec::new();
    // controlType "not-an-oid" (10 bytes)
    let bytes = hex!(
        "30 17 02 01 01 42 00"
        "a0 10 30 0e 04 0c 6e 6f 74 2d 61 6e 2d 6f 69 64 21 21"
    );
    let error = codec.decode_message(&bytes).unwrap_err();
    assert_eq!(error, DecodeError::InvalidOid);
}
