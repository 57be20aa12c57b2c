use crate::error::{AquaError, Result};
use crate::paths;
use crate::types::OrderStatus;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub pincode: String,
    pub area: String,
    pub address: String,
    pub phone: String,
    pub empty_can_provided: bool,
    pub quantity: u32,
    pub product_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::order_path(root, id);
        if !path.exists() {
            return Err(AquaError::OrderNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let order: Order = serde_yaml::from_str(&data)?;
        Ok(order)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::order_path(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// List every stored order, newest first.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let orders_dir = root.join(paths::ORDERS_DIR);
        if !orders_dir.exists() {
            return Ok(Vec::new());
        }

        let mut orders = Vec::new();
        for entry in std::fs::read_dir(&orders_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                let data = std::fs::read_to_string(&path)?;
                let order: Order = serde_yaml::from_str(&data)?;
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    // ---------------------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------------------

    /// One-based progress position within the fixed status sequence, for the
    /// tracking display.
    pub fn progress(&self) -> (usize, usize) {
        (self.status.index() + 1, OrderStatus::all().len())
    }
}

// ---------------------------------------------------------------------------
// Order id generation
// ---------------------------------------------------------------------------

const ORDER_ID_PREFIX: &str = "ORD-";
const ORDER_TOKEN_LEN: usize = 9;
const ORDER_TOKEN_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Client-side order identifier: `ORD-` plus 9 random base-36 characters,
/// uppercased. Matches `^ORD-[A-Z0-9]{9}$`.
pub fn generate_order_id() -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..ORDER_TOKEN_LEN)
        .map(|_| ORDER_TOKEN_CHARS[rng.gen_range(0..ORDER_TOKEN_CHARS.len())] as char)
        .collect();
    format!("{ORDER_ID_PREFIX}{token}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
