//! Wire-level corpus: decode/encode round trips for every operation,
//! fragmented input, and the decoder's failure taxonomy.

use bytes::Bytes;
use hex_literal::hex;
use ldap_codec::ber::DecoderOptions;
use ldap_codec::filter::{Filter, MatchingRuleAssertion, Substring, SubstringFilter};
use ldap_codec::messages::*;
use ldap_codec::{DecodeError, DecodeOutcome, LdapCodec, LdapMessage, ProtocolOp};
use pretty_assertions::assert_eq;

fn decode_one(codec: &LdapCodec, bytes: &[u8]) -> LdapMessage {
    codec.decode_message(bytes).expect("complete PDU")
}

/// Splits `bytes` at `split`, feeding both halves to one container.
fn decode_split(codec: &LdapCodec, bytes: &[u8], split: usize) -> LdapMessage {
    let mut container = codec.new_container();
    let (head, tail) = bytes.split_at(split);
    match codec.decode(head, &mut container).unwrap() {
        DecodeOutcome::Message { message, consumed } => {
            assert_eq!(consumed, head.len());
            assert!(tail.is_empty());
            message
        }
        DecodeOutcome::NeedMoreInput => match codec.decode(tail, &mut container).unwrap() {
            DecodeOutcome::Message { message, consumed } => {
                assert_eq!(consumed, tail.len());
                message
            }
            DecodeOutcome::NeedMoreInput => panic!("incomplete at split {split}"),
        },
    }
}

/// Round-trip identity plus chunk invariance at every split point and
/// byte-at-a-time.
fn assert_wire_invariants(codec: &LdapCodec, bytes: &[u8]) {
    let message = decode_one(codec, bytes);
    assert_eq!(codec.encode(&message).unwrap(), bytes, "re-encode differs");

    for split in 0..=bytes.len() {
        assert_eq!(decode_split(codec, bytes, split), message, "split at {split}");
    }

    let mut container = codec.new_container();
    for (i, byte) in bytes.iter().enumerate() {
        match codec.decode(core::slice::from_ref(byte), &mut container).unwrap() {
            DecodeOutcome::NeedMoreInput => assert!(i + 1 < bytes.len()),
            DecodeOutcome::Message { message: streamed, consumed } => {
                assert_eq!(consumed, 1);
                assert_eq!(i + 1, bytes.len());
                assert_eq!(streamed, message);
            }
        }
    }
}

/// Encode with the API, then check the full wire invariants on the bytes.
fn assert_api_round_trip(codec: &LdapCodec, message: &LdapMessage) {
    let bytes = codec.encode(message).unwrap();
    let decoded = decode_one(codec, &bytes);
    assert_eq!(&decoded, message);
    assert_wire_invariants(codec, &bytes);
}

// S1: empty successful BindResponse.
#[test]
fn bind_response_success() {
    let codec = LdapCodec::new();
    let bytes = hex!("30 0c 02 01 01 61 07 0a 01 00 04 00 04 00");
    let message = decode_one(&codec, &bytes);

    assert_eq!(message.message_id, 1);
    let ProtocolOp::BindResponse(response) = &message.op else {
        panic!("wrong op");
    };
    assert_eq!(response.result.result_code, ResultCode::SUCCESS);
    assert_eq!(response.result.matched_dn, "");
    assert_eq!(response.result.diagnostic_message, "");
    assert_eq!(response.result.referral, None);
    assert_eq!(response.server_sasl_creds, None);

    assert_wire_invariants(&codec, &bytes);
}

// S6: a two-byte extension result code survives both directions.
#[test]
fn extended_result_code() {
    let codec = LdapCodec::new();
    let bytes = hex!("30 0d 02 01 02 65 08 0a 02 10 00 04 00 04 00");
    let message = decode_one(&codec, &bytes);

    let ProtocolOp::SearchResultDone(done) = &message.op else {
        panic!("wrong op");
    };
    assert_eq!(done.result.result_code, ResultCode::E_SYNC_REFRESH_REQUIRED);
    assert_eq!(done.result.result_code.0, 4096);

    assert_wire_invariants(&codec, &bytes);
}

// S7: a BindResponse with no content is not a message.
#[test]
fn empty_response_body_fails() {
    let codec = LdapCodec::new();
    let error = codec.decode_message(&hex!("30 05 02 01 01 61 00")).unwrap_err();
    assert_eq!(error, DecodeError::UnexpectedEndOfInput);
}

#[test]
fn bind_request_wire_form() {
    let codec = LdapCodec::new();
    let message = LdapMessage::new(
        1,
        ProtocolOp::BindRequest(BindRequest::simple("cn=Manager,dc=example,dc=com", &b"secret"[..])),
    );
    let bytes = codec.encode(&message).unwrap();
    assert_eq!(
        bytes,
        hex!(
            "30 2e 02 01 01 60 29 02 01 03"
            "04 1c 63 6e 3d 4d 61 6e 61 67 65 72 2c 64 63 3d 65 78 61 6d 70 6c 65 2c 64 63 3d 63 6f 6d"
            "80 06 73 65 63 72 65 74"
        )
    );
    assert_wire_invariants(&codec, &bytes);
}

#[test]
fn sasl_bind_round_trips() {
    let codec = LdapCodec::new();
    for credentials in [None, Some(Bytes::from_static(b"challenge-response"))] {
        let message = LdapMessage::new(
            7,
            ProtocolOp::BindRequest(BindRequest {
                version: 3,
                name: String::new(),
                authentication: BindAuthentication::Sasl {
                    mechanism: "DIGEST-MD5".into(),
                    credentials: credentials.clone(),
                },
            }),
        );
        assert_api_round_trip(&codec, &message);
    }
}

#[test]
fn search_request_with_full_filter_tree() {
    let codec = LdapCodec::new();
    let message = LdapMessage::new(
        3,
        ProtocolOp::SearchRequest(SearchRequest {
            base_object: "dc=example,dc=com".into(),
            scope: SearchScope::WholeSubtree,
            deref_aliases: DerefAliases::DerefInSearching,
            size_limit: 100,
            time_limit: 30,
            types_only: false,
            filter: Filter::And(vec![
                Filter::equality("objectClass", &b"person"[..]),
                Filter::Or(vec![
                    Filter::Substrings(SubstringFilter {
                        attribute_desc: "cn".into(),
                        substrings: vec![
                            Substring::Initial(Bytes::from_static(b"a")),
                            Substring::Any(Bytes::from_static(b"b")),
                            Substring::Final(Bytes::from_static(b"c")),
                        ],
                    }),
                    Filter::Not(Box::new(Filter::Present("uid".into()))),
                    Filter::GreaterOrEqual(AttributeValueAssertion::new("uidNumber", &b"1000"[..])),
                    Filter::LessOrEqual(AttributeValueAssertion::new("uidNumber", &b"2000"[..])),
                    Filter::ApproxMatch(AttributeValueAssertion::new("sn", &b"smith"[..])),
                    Filter::ExtensibleMatch(MatchingRuleAssertion {
                        matching_rule: Some("caseExactMatch".into()),
                        attribute_desc: Some("sn".into()),
                        match_value: Bytes::from_static(b"Smith"),
                        dn_attributes: true,
                    }),
                ]),
            ]),
            attributes: vec!["cn".into(), "sn".into(), "1.1".into()],
            ..SearchRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &message);
}

#[test]
fn search_responses_round_trip() {
    let codec = LdapCodec::new();

    let entry = LdapMessage::new(
        4,
        ProtocolOp::SearchResultEntry(SearchResultEntry {
            object_name: "cn=John Doe,dc=example,dc=com".into(),
            attributes: vec![
                PartialAttribute::with_values("objectClass", [&b"top"[..], &b"person"[..]]),
                PartialAttribute::with_values("cn", [&b"John Doe"[..]]),
                PartialAttribute::new("seeAlso"),
            ],
        }),
    );
    assert_api_round_trip(&codec, &entry);

    let reference = LdapMessage::new(
        4,
        ProtocolOp::SearchResultReference(SearchResultReference {
            uris: vec![
                "ldap://hostb/OU=People,DC=Example,DC=NET??sub".into(),
                "ldap://hostc/OU=People,DC=Example,DC=NET??sub".into(),
            ],
        }),
    );
    assert_api_round_trip(&codec, &reference);

    let done = LdapMessage::new(
        4,
        ProtocolOp::SearchResultDone(SearchResultDone {
            result: LdapResult {
                result_code: ResultCode::REFERRAL,
                matched_dn: "ou=People,dc=example,dc=com".into(),
                diagnostic_message: "try elsewhere".into(),
                referral: Some(vec!["ldap://hostd/".into()]),
            },
        }),
    );
    assert_api_round_trip(&codec, &done);
}

#[test]
fn modify_family_round_trips() {
    let codec = LdapCodec::new();

    let modify = LdapMessage::new(
        11,
        ProtocolOp::ModifyRequest(ModifyRequest {
            object: "cn=group,dc=example,dc=com".into(),
            changes: vec![
                ModifyChange {
                    operation: ModifyOperation::Add,
                    modification: PartialAttribute::with_values("member", [&b"cn=a"[..]]),
                },
                ModifyChange {
                    operation: ModifyOperation::Delete,
                    modification: PartialAttribute::new("description"),
                },
                ModifyChange {
                    operation: ModifyOperation::Replace,
                    modification: PartialAttribute::with_values("cn", [&b"group"[..]]),
                },
                ModifyChange {
                    operation: ModifyOperation::Increment,
                    modification: PartialAttribute::with_values("uidNumber", [&b"1"[..]]),
                },
            ],
            ..ModifyRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &modify);

    let mod_dn = LdapMessage::new(
        12,
        ProtocolOp::ModifyDnRequest(ModifyDnRequest {
            entry: "cn=old,ou=a,dc=example".into(),
            new_rdn: "cn=new".into(),
            delete_old_rdn: true,
            new_superior: Some("ou=b,dc=example".into()),
            ..ModifyDnRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &mod_dn);

    for op in [
        ProtocolOp::ModifyResponse(ModifyResponse::default()),
        ProtocolOp::ModifyDnResponse(ModifyDnResponse::default()),
    ] {
        assert_api_round_trip(&codec, &LdapMessage::new(13, op));
    }
}

#[test]
fn add_del_compare_round_trips() {
    let codec = LdapCodec::new();

    let add = LdapMessage::new(
        21,
        ProtocolOp::AddRequest(AddRequest {
            entry: "cn=new,dc=example,dc=com".into(),
            attributes: vec![
                PartialAttribute::with_values("objectClass", [&b"person"[..]]),
                PartialAttribute::with_values("cn", [&b"new"[..]]),
                PartialAttribute::with_values("sn", [&b"entry"[..]]),
            ],
            ..AddRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &add);

    let del = LdapMessage::new(
        22,
        ProtocolOp::DelRequest(DelRequest {
            dn: "cn=gone,dc=example,dc=com".into(),
            ..DelRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &del);

    let compare = LdapMessage::new(
        23,
        ProtocolOp::CompareRequest(CompareRequest {
            entry: "cn=x,dc=example".into(),
            ava: AttributeValueAssertion::new("uid", &b"jdoe"[..]),
            ..CompareRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &compare);

    let compare_true = LdapMessage::new(
        23,
        ProtocolOp::CompareResponse(CompareResponse {
            result: LdapResult::new(ResultCode::COMPARE_TRUE),
        }),
    );
    assert_api_round_trip(&codec, &compare_true);

    for op in [
        ProtocolOp::AddResponse(AddResponse::default()),
        ProtocolOp::DelResponse(DelResponse::default()),
    ] {
        assert_api_round_trip(&codec, &LdapMessage::new(24, op));
    }
}

#[test]
fn extended_and_intermediate_round_trips() {
    let codec = LdapCodec::new();

    // STARTTLS
    let request = LdapMessage::new(
        30,
        ProtocolOp::ExtendedRequest(ExtendedRequest {
            request_name: "1.3.6.1.4.1.1466.20037".into(),
            request_value: None,
            ..ExtendedRequest::default()
        }),
    );
    assert_api_round_trip(&codec, &request);

    let response = LdapMessage::new(
        30,
        ProtocolOp::ExtendedResponse(ExtendedResponse {
            result: LdapResult::success(),
            response_name: Some("1.3.6.1.4.1.1466.20037".into()),
            response_value: Some(Bytes::from_static(b"payload")),
        }),
    );
    assert_api_round_trip(&codec, &response);

    let intermediate = LdapMessage::new(
        31,
        ProtocolOp::IntermediateResponse(IntermediateResponse {
            response_name: Some("1.3.6.1.4.1.4203.1.9.1.4".into()),
            response_value: Some(Bytes::from_static(&[0x30, 0x00])),
        }),
    );
    assert_api_round_trip(&codec, &intermediate);
}

#[test]
fn unbind_and_abandon_round_trips() {
    let codec = LdapCodec::new();

    let unbind = LdapMessage::new(40, ProtocolOp::UnbindRequest(UnbindRequest));
    let bytes = codec.encode(&unbind).unwrap();
    assert_eq!(bytes, hex!("30 05 02 01 28 42 00"));
    assert_wire_invariants(&codec, &bytes);

    let abandon = LdapMessage::new(41, ProtocolOp::AbandonRequest(AbandonRequest { message_id: 13 }));
    let bytes = codec.encode(&abandon).unwrap();
    assert_eq!(bytes, hex!("30 06 02 01 29 50 01 0d"));
    assert_wire_invariants(&codec, &bytes);
}

#[test]
fn request_response_pairing() {
    let search = ProtocolOp::SearchRequest(SearchRequest::default());
    assert_eq!(search.application_tag(), 3);
    assert_eq!(search.matching_response_tag(), Some(5));
    assert!(search.is_request());

    assert_eq!(ProtocolOp::UnbindRequest(UnbindRequest).matching_response_tag(), None);
    assert_eq!(
        ProtocolOp::AbandonRequest(AbandonRequest::default()).matching_response_tag(),
        None
    );
    assert!(!ProtocolOp::BindResponse(BindResponse::default()).is_request());
}

#[test]
fn abandonable_requests_track_state() {
    let mut request = SearchRequest::default();
    assert!(!request.is_abandoned());
    request.abandon();
    assert!(request.is_abandoned());
}

#[test]
fn unknown_operation_tag() {
    let codec = LdapCodec::new();
    let error = codec.decode_message(&hex!("30 05 02 01 01 7a 00")).unwrap_err();
    assert_eq!(error, DecodeError::UnknownOperationTag { tag: 0x7a });
}

#[test]
fn child_overruns_parent() {
    let codec = LdapCodec::new();
    let error = codec
        .decode_message(&hex!("30 06 02 01 01 61 05 0a 01 00"))
        .unwrap_err();
    assert_eq!(error, DecodeError::ChildOverrunsParent);
}

#[test]
fn trailing_bytes_in_structure() {
    let codec = LdapCodec::new();
    // a CompareRequest AVA with a third element
    let bytes = hex!("30 16 02 01 05 6e 11 04 04 63 6e 3d 61 30 09 04 02 63 6e 04 01 78 04 00");
    let error = codec.decode_message(&bytes).unwrap_err();
    assert!(matches!(error, DecodeError::TrailingBytesInStructure { .. }));
}

#[test]
fn grammar_mismatch_on_wrong_tag() {
    let codec = LdapCodec::new();
    // message id is not an INTEGER
    let error = codec.decode_message(&hex!("30 03 04 01 01")).unwrap_err();
    assert!(matches!(error, DecodeError::GrammarMismatch { .. }));
}

#[test]
fn indefinite_length_is_rejected() {
    let codec = LdapCodec::new();
    let error = codec.decode_message(&hex!("30 80 02 01 01 00 00")).unwrap_err();
    assert_eq!(error, DecodeError::IndefiniteLength);
}

// invariant 8: the length field alone must trip the limit, before any
// content arrives
#[test]
fn oversized_structure_fails_before_buffering() {
    let codec = LdapCodec::new().with_options(DecoderOptions::new().with_max_pdu_size(1024));
    let mut container = codec.new_container();
    let error = codec
        .decode(&hex!("30 84 7f ff ff ff"), &mut container)
        .unwrap_err();
    assert!(matches!(error, DecodeError::LimitExceeded { .. }));
}

#[test]
fn nesting_depth_is_bounded() {
    let codec = LdapCodec::new().with_options(DecoderOptions::new().with_max_depth(1));
    let error = codec
        .decode_message(&hex!("30 0c 02 01 01 61 07 0a 01 00 04 00 04 00"))
        .unwrap_err();
    assert!(matches!(error, DecodeError::LimitExceeded { .. }));
}

#[test]
fn bad_utf8_in_string_field() {
    let codec = LdapCodec::new();
    // DelRequest whose DN octets are not UTF-8
    let error = codec.decode_message(&hex!("30 07 02 01 01 4a 02 ff fe")).unwrap_err();
    assert_eq!(error, DecodeError::InvalidUtf8);
}
