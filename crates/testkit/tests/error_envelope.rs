//! Integration tests for shared error fixtures.

#![allow(missing_docs)]

use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind};
use profile_store_testkit::errors::{
    common_error_codes, injected_fault, injected_fault_code, remote_unavailable,
};
use std::collections::BTreeSet;

#[test]
fn error_envelope_crosses_crates() {
    let fault = injected_fault("kv.put");
    assert_eq!(fault.code, injected_fault_code());
    assert_eq!(fault.class, ErrorClass::NonRetriable);

    let boxed: Box<dyn std::error::Error> = Box::new(fault);
    assert!(boxed.to_string().contains("kv.put"));
}

#[test]
fn remote_outage_is_retriable_and_names_the_operation() {
    let outage = remote_unavailable("remote_http.list");
    assert!(outage.class.is_retriable());
    assert_eq!(outage.kind, ErrorKind::Unexpected);
    assert_eq!(
        outage.metadata.get("operation").map(String::as_str),
        Some("remote_http.list")
    );
}

#[test]
fn common_codes_are_distinct() {
    let codes = common_error_codes();
    let unique: BTreeSet<String> = codes.iter().map(ToString::to_string).collect();
    assert_eq!(unique.len(), codes.len());
    assert!(codes.contains(&ErrorCode::not_found()));
}

#[test]
fn error_envelope_constructors_work() {
    let expected = ErrorEnvelope::expected(ErrorCode::invalid_input(), "bad input");
    assert_eq!(expected.kind, ErrorKind::Expected);
    assert!(!expected.is_cancelled());
    assert!(ErrorEnvelope::cancelled("stop").is_cancelled());
}
