//! Backend data models.

pub mod audit;
pub mod cart;
pub mod catalog;
pub mod common;
pub mod sale;
pub mod user;

pub use audit::{AuditAction, AuditFilter, AuditLog};
pub use cart::CartItem;
pub use catalog::{Category, CategoryInput, Product, ProductInput};
pub use common::{Page, Pagination};
pub use sale::{CheckoutDetails, NewSale, Sale, SaleStatus};
pub use user::{AdminUser, Credentials, Registration, Role, SessionIdentity};
