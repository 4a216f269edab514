//! Product and category endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::cache::ResourceSource;
use crate::error::Result;
use crate::models::{Category, CategoryInput, Product, ProductInput};

impl ApiClient {
    /// `GET /products`
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.get_json(&["products"]).await
    }

    /// `GET /products/:id`
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.get_json(&["products", &id.to_string()]).await
    }

    /// `GET /products/search?query=`
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        self.get_json_query(&["products", "search"], &[("query", query.trim().to_string())])
            .await
    }

    /// Products in the same category, excluding `exclude_id`.
    pub async fn related_products(&self, category_id: i64, exclude_id: i64) -> Result<Vec<Product>> {
        self.get_json_query(
            &["products"],
            &[
                ("category_id", category_id.to_string()),
                ("exclude_id", exclude_id.to_string()),
            ],
        )
        .await
    }

    /// `POST /products`
    pub async fn create_product(&self, input: &ProductInput) -> Result<()> {
        let builder = self
            .request(Method::POST, &["products"])?
            .json(&input.normalized());
        self.send(builder).await
    }

    /// `PUT /products/:id`
    pub async fn update_product(&self, id: i64, input: &ProductInput) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["products", &id.to_string()])?
            .json(&input.normalized());
        self.send(builder).await
    }

    /// `DELETE /products/:id`
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let builder = self.request(Method::DELETE, &["products", &id.to_string()])?;
        self.send(builder).await
    }

    /// `GET /categories`
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.get_json(&["categories"]).await
    }

    /// `GET /categories/:id`
    pub async fn get_category(&self, id: i64) -> Result<Category> {
        self.get_json(&["categories", &id.to_string()]).await
    }

    /// `POST /categories`
    pub async fn create_category(&self, input: &CategoryInput) -> Result<()> {
        let builder = self.request(Method::POST, &["categories"])?.json(input);
        self.send(builder).await
    }

    /// `PUT /categories/:id`
    pub async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["categories", &id.to_string()])?
            .json(input);
        self.send(builder).await
    }

    /// `DELETE /categories/:id`
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let builder = self.request(Method::DELETE, &["categories", &id.to_string()])?;
        self.send(builder).await
    }
}

#[async_trait]
impl ResourceSource<Product> for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<Product>> {
        self.list_products().await
    }

    async fn fetch_one(&self, id: i64) -> Result<Product> {
        self.get_product(id).await
    }
}

#[async_trait]
impl ResourceSource<Category> for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        self.list_categories().await
    }

    async fn fetch_one(&self, id: i64) -> Result<Category> {
        self.get_category(id).await
    }
}
