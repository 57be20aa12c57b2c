use crate::error::{AquaError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price in rupees.
    pub price: u32,
    #[serde(default)]
    pub image: String,
    pub description: String,
}

/// Built-in catalog, used whenever no catalog file is present.
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product {
            id: "p1".to_string(),
            name: "20L Standard Water".to_string(),
            price: 35,
            image: "https://images.unsplash.com/photo-1548919973-5cdf5916ad52?auto=format&fit=crop&q=80&w=600".to_string(),
            description: "Purified and mineral enriched 20 litre water can. Perfect for daily household needs.".to_string(),
        },
        Product {
            id: "p2".to_string(),
            name: "20L RO Purified Water".to_string(),
            price: 45,
            image: "https://images.unsplash.com/photo-1626509653293-3532c589069d?auto=format&fit=crop&q=80&w=600".to_string(),
            description: "Advanced Reverse Osmosis treated ultra-pure drinking water for the health-conscious.".to_string(),
        },
        Product {
            id: "p3".to_string(),
            name: "20L Himalayan Spring".to_string(),
            price: 60,
            image: "https://images.unsplash.com/photo-1616118132284-9344445c7110?auto=format&fit=crop&q=80&w=600".to_string(),
            description: "Premium natural mineral water sourced from pristine high-altitude springs.".to_string(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    /// Load the catalog from `.aquaflow/products.yaml`.
    ///
    /// A missing, empty, or unreadable file falls back to the built-in
    /// catalog so the storefront always has something to sell.
    pub fn load(root: &Path) -> Self {
        let path = paths::products_path(root);
        if !path.exists() {
            return Self {
                products: default_catalog(),
            };
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_yaml::from_str::<Catalog>(&data).map_err(|e| e.to_string()));
        match parsed {
            Ok(catalog) if !catalog.products.is_empty() => catalog,
            Ok(_) => Self {
                products: default_catalog(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "unreadable product catalog, using built-in defaults");
                Self {
                    products: default_catalog(),
                }
            }
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::products_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn get(&self, id: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AquaError::ProductNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
