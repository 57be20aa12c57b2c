//! Order submission flow.
//!
//! Checks run in a fixed order and short-circuit: schema validation, then the
//! delivery-area and contact checks, then the order-creation rate limit. Only
//! the first failure is surfaced. Once everything passes, free-text fields
//! are sanitized, the order record is built with a fresh identifier and
//! `Placed` status, and handed to the persistence collaborator. The flow does
//! not retry or roll back; the collaborator's single result is final.

use crate::backend::DeliveryBackend;
use crate::config::ServiceConfig;
use crate::error::{AquaError, Result};
use crate::order::{generate_order_id, Order};
use crate::ratelimit::{actions, RateLimiter};
use crate::sanitize::sanitize;
use crate::schema::{FieldRule, FieldType, Schema};
use crate::types::OrderStatus;
use chrono::Utc;
use serde_json::json;

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

const NAME_MAX: usize = 50;
const PINCODE_MAX: usize = 6;
const AREA_MAX: usize = 50;
const ADDRESS_MAX: usize = 200;
const PHONE_MAX: usize = 10;

// ---------------------------------------------------------------------------
// OrderRequest
// ---------------------------------------------------------------------------

/// Raw order form input, before validation and sanitization.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub name: String,
    pub pincode: String,
    pub area: String,
    pub address: String,
    pub phone: String,
    pub empty_can_provided: bool,
}

fn order_schema() -> Schema {
    Schema::new()
        .field("name", FieldRule::new(FieldType::String).required().max(NAME_MAX))
        .field("pincode", FieldRule::new(FieldType::String).required().max(PINCODE_MAX))
        .field("area", FieldRule::new(FieldType::String).required().max(AREA_MAX))
        .field("address", FieldRule::new(FieldType::String).required().max(ADDRESS_MAX))
        .field("phone", FieldRule::new(FieldType::String).required().max(PHONE_MAX))
        .field("quantity", FieldRule::new(FieldType::Number).required().min(1.0))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// First violated check as a customer-facing message, or `None` when the
/// request is acceptable.
pub fn validate_request(req: &OrderRequest, cfg: &ServiceConfig) -> Option<String> {
    let data = json!({
        "name": req.name,
        "pincode": req.pincode,
        "area": req.area,
        "address": req.address,
        "phone": req.phone,
        "quantity": req.quantity,
    });
    if let Some(msg) = order_schema().validate(&data) {
        return Some(msg);
    }

    let pincode_ok = req.pincode.len() == cfg.delivery.pincode_len
        && req.pincode.chars().all(|c| c.is_ascii_digit());
    if !pincode_ok {
        return Some(format!(
            "Pincode must be exactly {} digits.",
            cfg.delivery.pincode_len
        ));
    }

    if !req.pincode.starts_with(&cfg.delivery.pincode_prefix) {
        return Some(format!(
            "Sorry, we currently only deliver within {}.",
            cfg.service.city
        ));
    }

    let phone_ok = req.phone.len() == cfg.delivery.phone_len
        && req.phone.chars().all(|c| c.is_ascii_digit());
    if !phone_ok {
        return Some(format!(
            "Phone number must be exactly {} digits.",
            cfg.delivery.phone_len
        ));
    }

    if !req.empty_can_provided {
        return Some("Please confirm the empty can availability.".to_string());
    }

    None
}

// ---------------------------------------------------------------------------
// Order construction
// ---------------------------------------------------------------------------

/// Build the order record from an already-validated request: fresh id,
/// sanitized text fields, `Placed` status, current timestamp.
pub fn build_order(req: &OrderRequest) -> Order {
    Order {
        id: generate_order_id(),
        user_id: req.user_id.clone(),
        name: sanitize(&req.name, NAME_MAX),
        pincode: sanitize(&req.pincode, PINCODE_MAX),
        area: sanitize(&req.area, AREA_MAX),
        address: sanitize(&req.address, ADDRESS_MAX),
        phone: sanitize(&req.phone, PHONE_MAX),
        empty_can_provided: req.empty_can_provided,
        quantity: req.quantity,
        product_id: req.product_id.clone(),
        status: OrderStatus::Placed,
        created_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

pub fn submit_order(
    backend: &dyn DeliveryBackend,
    limiter: &RateLimiter,
    cfg: &ServiceConfig,
    req: &OrderRequest,
) -> Result<Order> {
    if let Some(msg) = validate_request(req, cfg) {
        return Err(AquaError::Validation(msg));
    }

    let decision = limiter.check(
        actions::ORDER_CREATION,
        cfg.limits.order_limit,
        cfg.limits.order_window_ms,
    );
    if decision.limited {
        return Err(AquaError::RateLimited {
            retry_after_secs: decision.retry_after_secs.unwrap_or_default(),
        });
    }

    let order = build_order(req);
    backend.insert_order(&order)?;
    tracing::info!(order = %order.id, user = %order.user_id, "order placed");
    Ok(order)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DirectoryBackend;
    use crate::paths;
    use crate::ratelimit::MemoryStore;
    use tempfile::TempDir;

    fn valid_request() -> OrderRequest {
        OrderRequest {
            user_id: "u-1".to_string(),
            product_id: "p1".to_string(),
            quantity: 2,
            name: "Ravi Kumar".to_string(),
            pincode: "600028".to_string(),
            area: "Adyar".to_string(),
            address: "12 Beach Road".to_string(),
            phone: "9876543210".to_string(),
            empty_can_provided: true,
        }
    }

    fn harness() -> (TempDir, DirectoryBackend, RateLimiter, ServiceConfig) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(paths::AQUAFLOW_DIR)).unwrap();
        let backend = DirectoryBackend::open(dir.path()).unwrap();
        let limiter = RateLimiter::new(Box::new(MemoryStore::new()));
        (dir, backend, limiter, ServiceConfig::new())
    }

    #[test]
    fn valid_request_passes_validation() {
        assert_eq!(validate_request(&valid_request(), &ServiceConfig::new()), None);
    }

    #[test]
    fn missing_name_is_first_failure() {
        let mut req = valid_request();
        req.name.clear();
        req.phone.clear();
        assert_eq!(
            validate_request(&req, &ServiceConfig::new()),
            Some("name is required.".to_string())
        );
    }

    #[test]
    fn short_pincode_rejected() {
        let mut req = valid_request();
        req.pincode = "6000".to_string();
        assert_eq!(
            validate_request(&req, &ServiceConfig::new()),
            Some("Pincode must be exactly 6 digits.".to_string())
        );
    }

    #[test]
    fn out_of_area_pincode_rejected() {
        let mut req = valid_request();
        req.pincode = "500001".to_string();
        assert_eq!(
            validate_request(&req, &ServiceConfig::new()),
            Some("Sorry, we currently only deliver within Chennai.".to_string())
        );
    }

    #[test]
    fn bad_phone_rejected() {
        let mut req = valid_request();
        req.phone = "98765abc10".to_string();
        assert_eq!(
            validate_request(&req, &ServiceConfig::new()),
            Some("Phone number must be exactly 10 digits.".to_string())
        );
    }

    #[test]
    fn missing_consent_rejected() {
        let mut req = valid_request();
        req.empty_can_provided = false;
        assert_eq!(
            validate_request(&req, &ServiceConfig::new()),
            Some("Please confirm the empty can availability.".to_string())
        );
    }

    #[test]
    fn built_order_is_placed_with_fresh_id() {
        let order = build_order(&valid_request());
        assert_eq!(order.status, OrderStatus::Placed);
        paths::validate_order_id(&order.id).unwrap();
        assert_eq!(order.quantity, 2);
    }

    #[test]
    fn built_order_sanitizes_text_fields() {
        let mut req = valid_request();
        req.name = "<script>Ravi</script>".to_string();
        req.address = "  12 Beach Road <b>Adyar</b>  ".to_string();
        let order = build_order(&req);
        assert_eq!(order.name, "Ravi");
        assert_eq!(order.address, "12 Beach Road Adyar");
    }

    #[test]
    fn submit_persists_and_returns_order() {
        let (dir, backend, limiter, cfg) = harness();
        let order = submit_order(&backend, &limiter, &cfg, &valid_request()).unwrap();

        let stored = Order::load(dir.path(), &order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Placed);
        assert_eq!(stored.name, "Ravi Kumar");
    }

    #[test]
    fn rejected_request_is_never_persisted() {
        let (dir, backend, limiter, cfg) = harness();
        let mut req = valid_request();
        req.pincode = "500001".to_string();

        let err = submit_order(&backend, &limiter, &cfg, &req).unwrap_err();
        assert!(matches!(err, AquaError::Validation(_)));
        assert!(Order::list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn sixth_order_in_window_is_rate_limited() {
        let (dir, backend, limiter, cfg) = harness();
        for _ in 0..5 {
            submit_order(&backend, &limiter, &cfg, &valid_request()).unwrap();
        }

        let err = submit_order(&backend, &limiter, &cfg, &valid_request()).unwrap_err();
        match err {
            AquaError::RateLimited { retry_after_secs } => assert!(retry_after_secs > 0),
            other => panic!("expected RateLimited, got {other:?}"),
        }
        // The limited submission left nothing behind.
        assert_eq!(Order::list(dir.path()).unwrap().len(), 5);
    }

    #[test]
    fn validation_runs_before_rate_limiting() {
        let (_dir, backend, limiter, cfg) = harness();
        let mut bad = valid_request();
        bad.pincode = "500001".to_string();

        // Invalid submissions never consume rate-limit budget.
        for _ in 0..20 {
            let err = submit_order(&backend, &limiter, &cfg, &bad).unwrap_err();
            assert!(matches!(err, AquaError::Validation(_)));
        }
        assert!(submit_order(&backend, &limiter, &cfg, &valid_request()).is_ok());
    }
}
