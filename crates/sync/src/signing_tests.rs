// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn signer() -> RequestSigner {
    RequestSigner::new(&SecretString::from("test-secret".to_string())).unwrap()
}

#[parameterized(
    json_body = { 1_700_000_000, b"{\"steps\":1200}", "cd1119d3d7332bc435349ecbf1e885be3e1ce0b55e2676f4405e1d456f3da9be" },
    empty_body = { 1_700_000_000, b"", "02135fb92b9e5ac01b6ffb10fb1ce695acf10403dc760ecd132a9fd9d96d71d1" },
)]
fn known_signatures(timestamp: i64, body: &[u8], expected: &str) {
    assert_eq!(signer().sign(timestamp, body), expected);
}

#[test]
fn verify_accepts_own_signature() {
    let signer = signer();
    let sig = signer.sign(42, b"payload");
    assert!(signer.verify(42, b"payload", &sig));
}

#[test]
fn verify_rejects_tampering() {
    let signer = signer();
    let sig = signer.sign(42, b"payload");

    assert!(!signer.verify(43, b"payload", &sig));
    assert!(!signer.verify(42, b"payload!", &sig));
    assert!(!signer.verify(42, b"payload", "zz"));

    let other = RequestSigner::new(&SecretString::from("other".to_string())).unwrap();
    assert!(!other.verify(42, b"payload", &sig));
}

#[test]
fn headers_name_timestamp_and_signature() {
    let [ts, sig] = signer().headers(1_700_000_000, b"");
    assert_eq!(ts, (TIMESTAMP_HEADER.to_string(), "1700000000".to_string()));
    assert_eq!(sig.0, SIGNATURE_HEADER);
    assert_eq!(sig.1.len(), 64);
    assert!(sig.1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn empty_secret_is_rejected() {
    let err = RequestSigner::new(&SecretString::from(String::new())).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}

#[test]
fn debug_hides_key() {
    let text = format!("{:?}", signer());
    assert!(!text.contains("test-secret"));
}
