//! Structural validation of contract-creation payloads.
//!
//! Violations accumulate into one list instead of failing on the first
//! defect, so the operator corrects everything in a single round trip.
//! Messages are the Thai strings shown verbatim by the calling UI.

use crate::models::installment::CreateContractRequest;

/// Recognized installment plans.
pub const PLAN_TYPES: [&str; 3] = ["plan1", "plan2", "plan3"];

/// Returns every structural violation in deterministic order. An empty list
/// means the payload is submittable.
pub fn validate(payload: &CreateContractRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if payload.items.is_empty() {
        errors.push("ไม่มีสินค้าในตะกร้า".to_string());
    }

    let plan_ok = payload
        .plan_type
        .as_deref()
        .is_some_and(|plan| PLAN_TYPES.contains(&plan));
    if !plan_ok {
        errors.push("แผนการผ่อนชำระไม่ถูกต้อง".to_string());
    }

    let total = payload.total_amount.unwrap_or(0.0);
    if total <= 0.0 {
        errors.push("ยอดรวมต้องมากกว่า 0".to_string());
    }

    let has_first_name = payload
        .customer
        .first_name
        .as_deref()
        .is_some_and(|name| !name.is_empty());
    let has_company = payload
        .customer
        .company_name
        .as_deref()
        .is_some_and(|name| !name.is_empty());
    if !has_first_name && !has_company {
        errors.push("กรุณากรอกชื่อลูกค้าหรือชื่อบริษัท".to_string());
    }

    let has_phone = payload
        .customer
        .phone_number
        .as_deref()
        .is_some_and(|phone| !phone.is_empty());
    if !has_phone {
        errors.push("กรุณากรอกเบอร์โทรศัพท์".to_string());
    }

    if let Some(down_payment) = payload.down_payment {
        if down_payment > total {
            errors.push("เงินดาวน์ไม่สามารถมากกว่ายอดรวมได้".to_string());
        }
    }

    for (index, item) in payload.items.iter().enumerate() {
        let position = index + 1;
        if item.name.as_deref().is_none_or(str::is_empty) {
            errors.push(format!("สินค้าลำดับที่ {position}: ไม่มีชื่อสินค้า"));
        }
        if item.price.unwrap_or(0.0) <= 0.0 {
            errors.push(format!("สินค้าลำดับที่ {position}: ราคาไม่ถูกต้อง"));
        }
        if item.qty.unwrap_or(0.0) <= 0.0 {
            errors.push(format!("สินค้าลำดับที่ {position}: จำนวนไม่ถูกต้อง"));
        }
    }

    errors
}

/// IMEIs that appear on more than one line item of the same request, in
/// first-occurrence order without repeats.
pub fn duplicate_imeis(payload: &CreateContractRequest) -> Vec<String> {
    let imeis: Vec<&str> = payload
        .items
        .iter()
        .filter_map(|item| item.imei.as_deref())
        .filter(|imei| !imei.is_empty())
        .collect();

    let mut duplicates = Vec::new();
    for (index, imei) in imeis.iter().enumerate() {
        let seen_before = imeis[..index].contains(imei);
        if seen_before && !duplicates.iter().any(|known: &String| known == imei) {
            duplicates.push((*imei).to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installment::{CustomerInfo, LineItem};

    fn valid_payload() -> CreateContractRequest {
        CreateContractRequest {
            customer: CustomerInfo {
                first_name: Some("สมชาย".to_string()),
                last_name: Some("ใจดี".to_string()),
                company_name: None,
                phone_number: Some("0812345678".to_string()),
            },
            plan_type: Some("plan1".to_string()),
            total_amount: Some(30000.0),
            down_payment: Some(5000.0),
            items: vec![LineItem {
                name: Some("iPhone 15".to_string()),
                imei: Some("123456789012345".to_string()),
                price: Some(30000.0),
                qty: Some(1.0),
            }],
        }
    }

    #[test]
    fn valid_payload_has_no_violations() {
        assert!(validate(&valid_payload()).is_empty());
    }

    #[test]
    fn all_independent_violations_are_reported_together() {
        let payload = CreateContractRequest {
            plan_type: Some("plan9".to_string()),
            total_amount: Some(1000.0),
            customer: CustomerInfo {
                first_name: Some("A".to_string()),
                ..CustomerInfo::default()
            },
            ..CreateContractRequest::default()
        };
        let errors = validate(&payload);
        assert!(errors.contains(&"ไม่มีสินค้าในตะกร้า".to_string()));
        assert!(errors.contains(&"แผนการผ่อนชำระไม่ถูกต้อง".to_string()));
        assert!(errors.contains(&"กรุณากรอกเบอร์โทรศัพท์".to_string()));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn validation_is_idempotent_and_ordered() {
        let payload = CreateContractRequest::default();
        assert_eq!(validate(&payload), validate(&payload));
    }

    #[test]
    fn down_payment_exceeding_total_is_rejected() {
        let mut payload = valid_payload();
        payload.total_amount = Some(1000.0);
        payload.down_payment = Some(1500.0);
        payload.items[0].price = Some(1000.0);
        let errors = validate(&payload);
        assert!(errors.contains(&"เงินดาวน์ไม่สามารถมากกว่ายอดรวมได้".to_string()));
    }

    #[test]
    fn company_name_substitutes_for_personal_name() {
        let mut payload = valid_payload();
        payload.customer.first_name = None;
        payload.customer.last_name = None;
        payload.customer.company_name = Some("บริษัท ทดสอบ จำกัด".to_string());
        assert!(validate(&payload).is_empty());
    }

    #[test]
    fn item_violations_carry_one_based_positions() {
        let mut payload = valid_payload();
        payload.items.push(LineItem::default());
        let errors = validate(&payload);
        assert!(errors.contains(&"สินค้าลำดับที่ 2: ไม่มีชื่อสินค้า".to_string()));
        assert!(errors.contains(&"สินค้าลำดับที่ 2: ราคาไม่ถูกต้อง".to_string()));
        assert!(errors.contains(&"สินค้าลำดับที่ 2: จำนวนไม่ถูกต้อง".to_string()));
    }

    #[test]
    fn duplicate_imeis_are_listed_once_each() {
        let mut payload = valid_payload();
        payload.items = vec![
            LineItem {
                imei: Some("111".to_string()),
                ..payload.items[0].clone()
            },
            LineItem {
                imei: Some("111".to_string()),
                ..payload.items[0].clone()
            },
            LineItem {
                imei: Some("222".to_string()),
                ..payload.items[0].clone()
            },
        ];
        assert_eq!(duplicate_imeis(&payload), vec!["111".to_string()]);
    }

    #[test]
    fn items_without_imei_never_collide() {
        let mut payload = valid_payload();
        payload.items = vec![LineItem::default(), LineItem::default()];
        assert!(duplicate_imeis(&payload).is_empty());
    }
}
