use crate::error::Result;
use crate::order::Order;
use crate::product::Catalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Invoice
// ---------------------------------------------------------------------------

/// Line totals for a single order. Payment is collected on delivery, so the
/// invoice carries no payment state beyond that label.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub order_id: String,
    pub date: DateTime<Utc>,
    pub receiver: String,
    pub address: String,
    pub product: String,
    pub quantity: u32,
    pub unit_price: u32,
    pub total: u64,
    pub payment: String,
}

impl Invoice {
    pub fn for_order(order: &Order, catalog: &Catalog) -> Result<Self> {
        let product = catalog.get(&order.product_id)?;
        Ok(Self {
            order_id: order.id.clone(),
            date: order.created_at,
            receiver: order.name.clone(),
            address: format!("{}, {}", order.address, order.area),
            product: product.name.clone(),
            quantity: order.quantity,
            unit_price: product.price,
            total: product.price as u64 * order.quantity as u64,
            payment: "Cash on Delivery".to_string(),
        })
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "INVOICE  {}", self.order_id)?;
        writeln!(f, "Date:    {}", self.date.format("%Y-%m-%d"))?;
        writeln!(f, "To:      {}", self.receiver)?;
        writeln!(f, "         {}", self.address)?;
        writeln!(f)?;
        writeln!(
            f,
            "{} x {}  @ Rs.{}  =  Rs.{}",
            self.quantity, self.product, self.unit_price, self.total
        )?;
        writeln!(f)?;
        writeln!(f, "Total:   Rs.{}", self.total)?;
        write!(f, "Payment: {}", self.payment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
