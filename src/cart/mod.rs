//! Persisted shopping cart.
//!
//! Lines are keyed by `${product_id}-${color}-${size}`. Every mutation is
//! written through to the `cart` storage key, so a cart survives restarts
//! when the storefront runs on `FileStorage`.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::models::{CartItem, Product};
use crate::storage::Storage;

/// Storage key holding the cart.
pub const CART_KEY: &str = "cart";

/// The shopping cart.
pub struct CartStore {
    storage: Arc<dyn Storage>,
    items: RwLock<Vec<CartItem>>,
}

impl CartStore {
    /// Load the persisted cart. A missing or malformed cart starts empty.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let items = match storage.get_item(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Discarding malformed cart: {}", e);
                    if let Err(e) = storage.remove_item(CART_KEY) {
                        warn!("Error removing cart: {}", e);
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Error reading cart: {}", e);
                Vec::new()
            }
        };
        debug!("Cart loaded with {} lines", items.len());

        Self {
            storage,
            items: RwLock::new(items),
        }
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Add one unit of `product` in the given variant.
    pub fn add(&self, product: &Product, color: &str, size: &str) {
        let identifier = CartItem::identifier_for(product.id, color, size);
        let mut items = self.items.write();
        match items.iter_mut().find(|item| item.identifier == identifier) {
            Some(item) => item.quantity += 1,
            None => items.push(CartItem::new(product.clone(), color, size)),
        }
        self.persist(&items);
    }

    /// Set a line's quantity. Quantities below 1 are ignored; use `remove`.
    pub fn update_quantity(&self, identifier: &str, quantity: u32) {
        if quantity < 1 {
            return;
        }
        let mut items = self.items.write();
        if let Some(item) = items.iter_mut().find(|item| item.identifier == identifier) {
            item.quantity = quantity;
            self.persist(&items);
        }
    }

    pub fn remove(&self, identifier: &str) {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| item.identifier != identifier);
        if items.len() != before {
            self.persist(&items);
        }
    }

    pub fn clear(&self) {
        self.items.write().clear();
        if let Err(e) = self.storage.remove_item(CART_KEY) {
            warn!("Error removing cart: {}", e);
        }
    }

    pub fn total_items(&self) -> u32 {
        self.items.read().iter().map(|item| item.quantity).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.read().iter().map(CartItem::line_total).sum()
    }

    fn persist(&self, items: &[CartItem]) {
        let result = serde_json::to_string(items)
            .map_err(crate::error::Error::from)
            .and_then(|raw| self.storage.set_item(CART_KEY, &raw));
        if let Err(e) = result {
            warn!("Error writing cart: {}", e);
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.items.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: i64, price: f64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": format!("P{id}"), "price": price
        }))
        .unwrap()
    }

    #[test]
    fn test_same_variant_increments() {
        let cart = CartStore::load(Arc::new(MemoryStorage::new()));
        let tee = product(1, 10.0);

        cart.add(&tee, "red", "M");
        cart.add(&tee, "red", "M");
        cart.add(&tee, "blue", "M");

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].identifier, "1-red-M");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.total_items(), 3);
        assert!((cart.total_price() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_and_remove_by_identifier() {
        let cart = CartStore::load(Arc::new(MemoryStorage::new()));
        cart.add(&product(1, 2.5), "red", "S");
        cart.add(&product(2, 4.0), "", "");

        cart.update_quantity("1-red-S", 4);
        cart.update_quantity("1-red-S", 0);
        assert_eq!(cart.items()[0].quantity, 4);

        cart.remove("2--");
        assert_eq!(cart.items().len(), 1);
        assert!((cart.total_price() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cart_survives_reload() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(storage.clone());
        cart.add(&product(7, 1.0), "black", "L");

        let reloaded = CartStore::load(storage.clone());
        assert_eq!(reloaded.items(), cart.items());

        reloaded.clear();
        assert!(storage.get_item(CART_KEY).unwrap().is_none());
        assert!(CartStore::load(storage).is_empty());
    }

    #[test]
    fn test_malformed_cart_starts_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set_item(CART_KEY, "{oops").unwrap();

        let cart = CartStore::load(storage.clone());
        assert!(cart.is_empty());
        assert!(storage.get_item(CART_KEY).unwrap().is_none());
    }
}
