//! The storefront state object.
//!
//! `Storefront` is built once at startup and shared by reference. It owns
//! the API client, both resource caches, the session store and the cart,
//! and keeps the caches consistent with the mutations it performs.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use crate::api::ApiClient;
use crate::cache::{CacheConfig, CacheRegistry, ResourceCache};
use crate::cart::CartStore;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Category, CategoryInput, CheckoutDetails, NewSale, Product, ProductInput};
use crate::session::{SessionConfig, SessionStore};
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Everything a storefront client needs, wired together.
pub struct Storefront {
    api: Arc<ApiClient>,
    products: ResourceCache<Product>,
    categories: ResourceCache<Category>,
    session: SessionStore,
    cart: CartStore,
}

impl Storefront {
    /// Build from configuration with the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config.api_url, &config.http)?);
        let storage: Arc<dyn Storage> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::new(
            api,
            storage,
            Arc::new(SystemClock),
            config.products_cache.clone(),
            config.categories_cache.clone(),
            config.session.clone(),
        )
    }

    /// Build from explicit parts.
    pub fn new(
        api: Arc<ApiClient>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        products_cache: CacheConfig,
        categories_cache: CacheConfig,
        session: SessionConfig,
    ) -> Result<Self> {
        let registry = CacheRegistry::new();
        let products: ResourceCache<Product> = ResourceCache::new(
            &registry,
            products_cache,
            storage.clone(),
            api.clone(),
            clock.clone(),
        )?;
        let categories: ResourceCache<Category> = ResourceCache::new(
            &registry,
            categories_cache,
            storage.clone(),
            api.clone(),
            clock.clone(),
        )?;
        let session = SessionStore::new(api.clone(), clock, session);
        let cart = CartStore::load(storage);

        info!("Storefront ready for {}", api.base_url());
        Ok(Self {
            api,
            products,
            categories,
            session,
            cart,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn products(&self) -> &ResourceCache<Product> {
        &self.products
    }

    pub fn categories(&self) -> &ResourceCache<Category> {
        &self.categories
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Create or update a product, then invalidate the product cache.
    pub async fn save_product(&self, id: Option<i64>, input: &ProductInput) -> Result<()> {
        match id {
            Some(id) => self.api.update_product(id, input).await?,
            None => self.api.create_product(input).await?,
        }
        self.products.invalidate();
        Ok(())
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.api.delete_product(id).await?;
        self.products.invalidate();
        Ok(())
    }

    /// Create or update a category, then invalidate the category cache.
    pub async fn save_category(&self, id: Option<i64>, input: &CategoryInput) -> Result<()> {
        match id {
            Some(id) => self.api.update_category(id, input).await?,
            None => self.api.create_category(input).await?,
        }
        self.categories.invalidate();
        Ok(())
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.api.delete_category(id).await?;
        self.categories.invalidate();
        Ok(())
    }

    /// Place one sale per cart line.
    ///
    /// On success the cart is cleared and the product cache invalidated,
    /// since stock changed. On failure the cart is kept.
    pub async fn checkout(&self, details: &CheckoutDetails) -> Result<usize> {
        if !self.session.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        let items = self.cart.items();
        if items.is_empty() {
            return Err(Error::InvalidCheckout("cart is empty".into()));
        }
        details.validate().map_err(Error::InvalidCheckout)?;

        let address = details.shipping_address.trim().to_string();
        let phone = details.contact_phone.trim().to_string();
        let notes = details.trimmed_notes();
        let sales: Vec<NewSale> = items
            .iter()
            .map(|item| NewSale {
                product_id: item.product.id,
                quantity: item.quantity,
                color: Some(item.selected_color.clone()).filter(|c| !c.is_empty()),
                size: Some(item.selected_size.clone()).filter(|s| !s.is_empty()),
                shipping_address: address.clone(),
                contact_phone: phone.clone(),
                notes: notes.clone(),
            })
            .collect();

        try_join_all(sales.iter().map(|sale| self.api.create_sale(sale))).await?;

        self.cart.clear();
        self.products.invalidate();
        info!("Checkout placed {} sales", sales.len());
        Ok(sales.len())
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.api.base_url().as_str())
            .field("products", &self.products)
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::HttpClientConfig;
    use crate::clock::ManualClock;
    use crate::models::{Role, SessionIdentity};

    struct Fixture {
        server: MockServer,
        storefront: Storefront,
        clock: Arc<ManualClock>,
        storage: Arc<MemoryStorage>,
    }

    async fn fixture() -> Fixture {
        let server = MockServer::start().await;
        let api = Arc::new(ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap());
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let storage = Arc::new(MemoryStorage::new());
        let storefront = Storefront::new(
            api,
            storage.clone(),
            clock.clone(),
            CacheConfig::products(),
            CacheConfig::categories(),
            SessionConfig::default(),
        )
        .unwrap();
        Fixture {
            server,
            storefront,
            clock,
            storage,
        }
    }

    fn verified(user: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"authenticated": true, "user": user}))
    }

    fn customer() -> serde_json::Value {
        json!({"id": 5, "email": "leo@example.com", "rol": "usuario", "nombre": "Leo"})
    }

    #[tokio::test]
    async fn test_category_mutation_invalidates_cache() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1, "name": "Gorras", "description": ""}])),
            )
            .expect(2)
            .mount(&f.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&f.server)
            .await;

        f.storefront.categories().read().await.unwrap();
        f.storefront.categories().read().await.unwrap();

        let input = CategoryInput {
            name: "Poleras".into(),
            description: String::new(),
        };
        f.storefront.save_category(None, &input).await.unwrap();
        assert!(f.storage.get_item("cached_categories").unwrap().is_none());

        f.storefront.categories().read().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Tee", "price": 10.0}
            ])))
            .expect(1)
            .mount(&f.server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/products/1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden"})))
            .mount(&f.server)
            .await;

        f.storefront.products().read().await.unwrap();
        assert!(f.storefront.delete_product(1).await.is_err());
        assert!(f.storefront.products().peek().is_some());
    }

    #[tokio::test]
    async fn test_listing_with_null_fields_is_cached() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Tee", "price": 10.0, "description": null,
                 "colors": null, "sizes": null, "images": null, "category_id": null},
                {"id": 2, "name": "Cap", "price": 5.0, "colors": ["rojo"]}
            ])))
            .expect(1)
            .mount(&f.server)
            .await;

        let listing = f.storefront.products().read().await.unwrap();
        assert_eq!(listing.items.len(), 2);
        assert!(listing.items[0].colors.is_empty());
        assert_eq!(listing.items[0].description, "");

        let cap = f.storefront.products().read_one(2).await.unwrap().unwrap();
        assert_eq!(cap.colors, vec!["rojo".to_string()]);
    }

    #[tokio::test]
    async fn test_product_cache_expires_after_ttl() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&f.server)
            .await;

        f.storefront.products().read().await.unwrap();
        f.clock.advance(Duration::from_secs(599));
        f.storefront.products().read().await.unwrap();
        f.clock.advance(Duration::from_secs(1));
        f.storefront.products().read().await.unwrap();
    }

    #[tokio::test]
    async fn test_checkout_requires_session() {
        let f = fixture().await;
        let details = CheckoutDetails {
            shipping_address: "Av. Siempre Viva 742".into(),
            contact_phone: "555123456".into(),
            notes: None,
        };
        assert!(matches!(
            f.storefront.checkout(&details).await,
            Err(Error::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_checkout_posts_each_line_and_clears_cart() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .respond_with(verified(customer()))
            .mount(&f.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sales"))
            .and(body_partial_json(json!({"direccion_envio": "Av. Siempre Viva 742"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&f.server)
            .await;

        let identity: SessionIdentity = serde_json::from_value(customer()).unwrap();
        assert_eq!(identity.role, Role::Customer);
        f.storefront.session().login(identity).await;

        let tee: Product =
            serde_json::from_value(json!({"id": 1, "name": "Tee", "price": 10.0})).unwrap();
        let cap: Product =
            serde_json::from_value(json!({"id": 2, "name": "Cap", "price": 5.0})).unwrap();
        f.storefront.cart().add(&tee, "red", "M");
        f.storefront.cart().add(&cap, "", "");

        let details = CheckoutDetails {
            shipping_address: "  Av. Siempre Viva 742 ".into(),
            contact_phone: "555123456".into(),
            notes: Some("   ".into()),
        };
        assert_eq!(f.storefront.checkout(&details).await.unwrap(), 2);
        assert!(f.storefront.cart().is_empty());
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() {
        let f = fixture().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .respond_with(verified(customer()))
            .mount(&f.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sales"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Stock insuficiente"})),
            )
            .mount(&f.server)
            .await;

        f.storefront
            .session()
            .login(serde_json::from_value(customer()).unwrap())
            .await;
        let tee: Product =
            serde_json::from_value(json!({"id": 1, "name": "Tee", "price": 10.0})).unwrap();
        f.storefront.cart().add(&tee, "red", "M");

        let details = CheckoutDetails {
            shipping_address: "Av. Siempre Viva 742".into(),
            contact_phone: "555123456".into(),
            notes: None,
        };
        let err = f.storefront.checkout(&details).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(f.storefront.cart().total_items(), 1);
    }
}
