//! Sales and checkout models.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "procesando")]
    Processing,
    #[serde(rename = "completada")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
    #[serde(rename = "reembolsada")]
    Refunded,
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,

    #[serde(rename = "usuario_id")]
    pub user_id: i64,

    #[serde(rename = "producto_id")]
    pub product_id: i64,

    #[serde(rename = "cantidad")]
    pub quantity: u32,

    #[serde(rename = "precio_unitario")]
    pub unit_price: f64,

    #[serde(rename = "precio_total")]
    pub total_price: f64,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub size: Option<String>,

    #[serde(rename = "estado")]
    pub status: SaleStatus,

    #[serde(rename = "direccion_envio", default)]
    pub shipping_address: Option<String>,

    #[serde(rename = "telefono_contacto", default)]
    pub contact_phone: Option<String>,

    #[serde(rename = "notas", default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(rename = "producto_nombre", default)]
    pub product_name: Option<String>,

    #[serde(rename = "usuario_email", default)]
    pub user_email: Option<String>,
}

/// Payload for `POST /sales`, one per cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSale {
    #[serde(rename = "producto_id")]
    pub product_id: i64,

    #[serde(rename = "cantidad")]
    pub quantity: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(rename = "direccion_envio")]
    pub shipping_address: String,

    #[serde(rename = "telefono_contacto")]
    pub contact_phone: String,

    #[serde(rename = "notas", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Shipping details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub shipping_address: String,
    pub contact_phone: String,
    pub notes: Option<String>,
}

impl CheckoutDetails {
    pub const MIN_ADDRESS_LEN: usize = 10;
    pub const MIN_PHONE_LEN: usize = 8;

    /// Check the minimum lengths the backend enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.shipping_address.trim().chars().count() < Self::MIN_ADDRESS_LEN {
            return Err(format!(
                "shipping address must be at least {} characters",
                Self::MIN_ADDRESS_LEN
            ));
        }
        if self.contact_phone.trim().chars().count() < Self::MIN_PHONE_LEN {
            return Err(format!(
                "contact phone must be at least {} characters",
                Self::MIN_PHONE_LEN
            ));
        }
        Ok(())
    }

    pub(crate) fn trimmed_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
