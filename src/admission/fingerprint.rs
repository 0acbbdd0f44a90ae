//! Canonical request fingerprints for duplicate-submission detection.
//!
//! A fingerprint captures what a contract-creation request is *about* —
//! who is submitting, for which customer, at what total, with which items —
//! while excluding everything that legitimately differs between an
//! accidental resubmission and the original (timestamps, request ids).

use std::net::IpAddr;

use serde::Serialize;

use crate::models::installment::CreateContractRequest;

/// Identity of the submitting operator, resolved from upstream auth headers
/// with the client address as fallback.
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub role: Option<String>,
    pub addr: IpAddr,
}

impl Requester {
    /// Stable identity key: user id when authenticated, client IP otherwise.
    pub fn key(&self) -> String {
        match &self.user_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.addr.to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Equality-comparable canonical form of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Builds the fingerprint from the identifying fields of a request.
    ///
    /// Missing customer name parts become empty strings and missing items
    /// an empty list, so partial payloads still produce comparable values.
    pub fn build(requester: &Requester, payload: &CreateContractRequest) -> Self {
        let source = FingerprintSource {
            requester: requester.key(),
            customer_phone: payload.customer.phone_number.as_deref().unwrap_or(""),
            customer_name: payload.customer.display_name(),
            total_amount: payload.total_amount,
            items: payload
                .items
                .iter()
                .map(|item| ItemSummary {
                    name: item.name.as_deref().unwrap_or(""),
                    imei: item.imei.as_deref().unwrap_or(""),
                    price: item.price,
                })
                .collect(),
        };

        // Struct serialization emits fields in declaration order, so the
        // canonical form is deterministic for equal inputs.
        let canonical =
            serde_json::to_string(&source).unwrap_or_else(|_| source.requester.clone());
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct FingerprintSource<'a> {
    requester: String,
    customer_phone: &'a str,
    customer_name: String,
    total_amount: Option<f64>,
    items: Vec<ItemSummary<'a>>,
}

#[derive(Serialize)]
struct ItemSummary<'a> {
    name: &'a str,
    imei: &'a str,
    price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installment::{CustomerInfo, LineItem};

    fn requester(user_id: Option<&str>) -> Requester {
        Requester {
            user_id: user_id.map(str::to_string),
            user_name: None,
            role: None,
            addr: "10.0.0.7".parse().expect("test address"),
        }
    }

    fn sample_payload() -> CreateContractRequest {
        CreateContractRequest {
            customer: CustomerInfo {
                first_name: Some("A".to_string()),
                last_name: Some("B".to_string()),
                company_name: None,
                phone_number: Some("0812345678".to_string()),
            },
            plan_type: Some("plan1".to_string()),
            total_amount: Some(1000.0),
            down_payment: None,
            items: vec![LineItem {
                name: Some("X".to_string()),
                imei: Some("123".to_string()),
                price: Some(1000.0),
                qty: Some(1.0),
            }],
        }
    }

    #[test]
    fn identical_requests_produce_identical_fingerprints() {
        let a = RequestFingerprint::build(&requester(Some("U1")), &sample_payload());
        let b = RequestFingerprint::build(&requester(Some("U1")), &sample_payload());
        assert_eq!(a, b);
    }

    #[test]
    fn different_total_changes_fingerprint() {
        let mut other = sample_payload();
        other.total_amount = Some(2000.0);
        let a = RequestFingerprint::build(&requester(Some("U1")), &sample_payload());
        let b = RequestFingerprint::build(&requester(Some("U1")), &other);
        assert_ne!(a, b);
    }

    #[test]
    fn different_requester_changes_fingerprint() {
        let a = RequestFingerprint::build(&requester(Some("U1")), &sample_payload());
        let b = RequestFingerprint::build(&requester(Some("U2")), &sample_payload());
        assert_ne!(a, b);
    }

    #[test]
    fn missing_name_fields_fold_to_empty_strings() {
        let mut payload = sample_payload();
        payload.customer.first_name = None;
        payload.customer.last_name = None;
        let a = RequestFingerprint::build(&requester(Some("U1")), &payload);

        let mut explicit = sample_payload();
        explicit.customer.first_name = Some(String::new());
        explicit.customer.last_name = Some(String::new());
        let b = RequestFingerprint::build(&requester(Some("U1")), &explicit);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_items_yield_empty_list_not_error() {
        let mut payload = sample_payload();
        payload.items.clear();
        let fp = RequestFingerprint::build(&requester(Some("U1")), &payload);
        assert!(fp.as_str().contains("\"items\":[]"));
    }

    #[test]
    fn anonymous_requester_falls_back_to_client_address() {
        let anon = requester(None);
        assert_eq!(anon.key(), "10.0.0.7");
        let named = requester(Some("U1"));
        assert_eq!(named.key(), "U1");
    }
}
