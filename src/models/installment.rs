//! Wire-level payload and view types for the installment endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /installment/create`.
///
/// Every field the admission gate inspects is optional or defaulted: a
/// malformed submission must reach structural validation so the operator
/// gets the full list of violations, not a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateContractRequest {
    #[serde(default)]
    pub customer: CustomerInfo,
    pub plan_type: Option<String>,
    pub total_amount: Option<f64>,
    pub down_payment: Option<f64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
}

impl CustomerInfo {
    /// Concatenated display name with missing parts as empty strings.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItem {
    pub name: Option<String>,
    pub imei: Option<String>,
    pub price: Option<f64>,
    pub qty: Option<f64>,
}

/// Response of a successful contract creation.
#[derive(Debug, Serialize)]
pub struct ContractCreatedResponse {
    pub success: bool,
    pub contract_no: String,
    pub status: String,
    pub total_amount: f64,
}

/// Full contract view for `GET /installment/:contract_no`.
#[derive(Debug, Serialize)]
pub struct ContractView {
    pub contract_no: String,
    pub status: String,
    pub customer_name: String,
    #[serde(rename = "companyName", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub phone_number: String,
    pub plan_type: String,
    pub total_amount: f64,
    pub down_payment: Option<f64>,
    pub items: Vec<ContractItemView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ContractItemView {
    pub name: String,
    pub imei: Option<String>,
    pub price: f64,
    pub qty: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_and_trims() {
        let customer = CustomerInfo {
            first_name: Some("สมชาย".to_string()),
            last_name: Some("ใจดี".to_string()),
            ..CustomerInfo::default()
        };
        assert_eq!(customer.display_name(), "สมชาย ใจดี");
    }

    #[test]
    fn display_name_with_missing_parts_is_not_an_error() {
        let first_only = CustomerInfo {
            first_name: Some("สมชาย".to_string()),
            ..CustomerInfo::default()
        };
        assert_eq!(first_only.display_name(), "สมชาย");
        assert_eq!(CustomerInfo::default().display_name(), "");
    }

    #[test]
    fn payload_with_missing_fields_deserializes() {
        let payload: CreateContractRequest = serde_json::from_str("{}").expect("empty body");
        assert!(payload.items.is_empty());
        assert!(payload.plan_type.is_none());
        assert!(payload.customer.phone_number.is_none());
    }
}
