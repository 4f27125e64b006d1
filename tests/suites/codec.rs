use crate::common::{SECRET, create_test_config};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::json;
use signet::security::crypto::unix_now;
use signet::{MaxAge, Request, SecureCookieCodec, SessionStore, Signer};

#[test]
fn test_end_to_end_token() {
    let codec = SecureCookieCodec::new(SECRET);
    let token = codec.encode("session", &json!({"uid": 42})).unwrap();
    assert_eq!(token.split('|').count(), 3);

    let store = SessionStore::new(
        create_test_config(SECRET),
        Request::with_cookies([("session", token.clone())]),
    )
    .unwrap();
    assert_eq!(
        store.get_secure_cookie("session", MaxAge::Configured),
        Some(json!({"uid": 42}))
    );

    let store = SessionStore::new(
        create_test_config("a-different-secret"),
        Request::with_cookies([("session", token)]),
    )
    .unwrap();
    assert!(store.get_secure_cookie("session", MaxAge::Configured).is_none());
}

#[test]
fn test_wire_format_is_stable() {
    let codec = SecureCookieCodec::new(SECRET);
    let token = codec
        .encode_at("session", &json!({"uid": 42}), 1_300_000_000)
        .unwrap();

    let payload = STANDARD.encode(br#"{"uid":42}"#);
    let signature = Signer::new(SECRET).sign(&["session", &payload, "1300000000"]);
    assert_eq!(token, format!("{payload}|1300000000|{signature}"));
    assert_eq!(payload, "eyJ1aWQiOjQyfQ==");
}

#[test]
fn test_roundtrip_various_mappings() {
    let codec = SecureCookieCodec::new(SECRET);
    for value in [
        json!({}),
        json!({"uid": 42}),
        json!({"name": "Zoë", "pipes": "a|b|c", "list": [1, 2.5, null, true]}),
        json!({"nested": {"deep": {"deeper": ["x"]}}}),
    ] {
        let token = codec.encode("n", &value).unwrap();
        assert_eq!(codec.decode("n", &token, None), Some(value));
    }
}

#[test]
fn test_flipping_any_signature_char_rejects() {
    let codec = SecureCookieCodec::new(SECRET);
    let token = codec.encode("session", &json!({"uid": 42})).unwrap();
    let (head, signature) = token.rsplit_once('|').unwrap();

    for (i, c) in signature.char_indices() {
        let flipped = if c == 'f' { 'e' } else { 'f' };
        let mut forged = signature.to_string();
        forged.replace_range(i..=i, &flipped.to_string());
        assert!(
            codec
                .decode("session", &format!("{head}|{forged}"), None)
                .is_none()
        );
    }
}

#[test]
fn test_swapped_payload_rejects() {
    let codec = SecureCookieCodec::new(SECRET);
    let original = codec.encode_at("session", &json!({"uid": 42}), 100).unwrap();
    let other = codec.encode_at("session", &json!({"uid": 1}), 100).unwrap();

    let original: Vec<&str> = original.split('|').collect();
    let other: Vec<&str> = other.split('|').collect();
    let forged = format!("{}|{}|{}", other[0], original[1], original[2]);

    assert!(codec.decode("session", &forged, None).is_none());
}

#[test]
fn test_wrong_field_count_rejects_even_when_signed() {
    let codec = SecureCookieCodec::new(SECRET);
    let signer = Signer::new(SECRET);
    let payload = STANDARD.encode(br#"{"uid":42}"#);

    let sig = signer.sign(&["session", &payload]);
    assert!(
        codec
            .decode("session", &format!("{payload}|{sig}"), None)
            .is_none()
    );

    let sig = signer.sign(&["session", &payload, "1", "x"]);
    assert!(
        codec
            .decode("session", &format!("{payload}|1|x|{sig}"), None)
            .is_none()
    );
}

#[test]
fn test_expiry_window() {
    let codec = SecureCookieCodec::new(SECRET);
    let now = unix_now();
    let stale = codec.encode_at("session", &json!({"uid": 42}), now - 11).unwrap();
    let fresh = codec.encode_at("session", &json!({"uid": 42}), now - 9).unwrap();

    assert!(codec.decode_at("session", &stale, Some(10), now).is_none());
    assert!(codec.decode_at("session", &fresh, Some(10), now).is_some());
}

#[test]
fn test_expired_and_forged_look_the_same() {
    let codec = SecureCookieCodec::new(SECRET);
    let now = unix_now();
    let expired = codec.encode_at("session", &json!({"uid": 42}), now - 100).unwrap();
    let forged = SecureCookieCodec::new("other")
        .encode_at("session", &json!({"uid": 42}), now)
        .unwrap();

    assert_eq!(
        codec.decode_at("session", &expired, Some(10), now),
        codec.decode_at("session", &forged, Some(10), now)
    );
}
