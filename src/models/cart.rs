//! Cart line model.

use serde::{Deserialize, Serialize};

use super::Product;

/// One cart line: a product in a specific color and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,

    pub quantity: u32,
    pub selected_color: String,
    pub selected_size: String,

    /// `${product_id}-${color}-${size}`, unique within a cart.
    pub identifier: String,
}

impl CartItem {
    pub fn new(product: Product, color: &str, size: &str) -> Self {
        Self {
            identifier: Self::identifier_for(product.id, color, size),
            product,
            quantity: 1,
            selected_color: color.to_string(),
            selected_size: size.to_string(),
        }
    }

    pub fn identifier_for(product_id: i64, color: &str, size: &str) -> String {
        format!("{product_id}-{color}-{size}")
    }

    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}
