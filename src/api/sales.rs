//! Sales endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::Result;
use crate::models::{NewSale, Page, Pagination, Sale, SaleStatus};

#[derive(Debug, Deserialize)]
struct SalesEnvelope {
    #[serde(default)]
    sales: Vec<Sale>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    #[serde(rename = "estado")]
    status: SaleStatus,
}

impl ApiClient {
    /// `POST /sales` for one cart line.
    pub async fn create_sale(&self, sale: &NewSale) -> Result<()> {
        let builder = self.request(Method::POST, &["sales"])?.json(sale);
        self.send(builder).await
    }

    /// `GET /admin/sales?page=&limit=`
    pub async fn admin_sales(&self, page: u32, limit: u32) -> Result<Page<Sale>> {
        let envelope: SalesEnvelope = self
            .get_json_query(
                &["admin", "sales"],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(Page::new(envelope.sales, page, envelope.pagination))
    }

    /// `GET /operator/sales?page=&limit=`
    pub async fn operator_sales(&self, page: u32, limit: u32) -> Result<Page<Sale>> {
        let envelope: SalesEnvelope = self
            .get_json_query(
                &["operator", "sales"],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(Page::new(envelope.sales, page, envelope.pagination))
    }

    /// `PUT /operator/sales/:id/status`
    pub async fn update_sale_status(&self, id: i64, status: SaleStatus) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["operator", "sales", &id.to_string(), "status"])?
            .json(&StatusUpdate { status });
        self.send(builder).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::HttpClientConfig;

    #[tokio::test]
    async fn test_admin_sales_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/sales"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sales": [{
                    "id": 10, "usuario_id": 1, "producto_id": 4, "cantidad": 2,
                    "precio_unitario": 5.0, "precio_total": 10.0, "estado": "pendiente"
                }],
                "pagination": {"totalPages": 3}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap();
        let page = client.admin_sales(2, 20).await.unwrap();
        assert_eq!(page.items[0].status, SaleStatus::Pending);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_update_sale_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/operator/sales/10/status"))
            .and(body_json(json!({"estado": "completada"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap();
        client
            .update_sale_status(10, SaleStatus::Completed)
            .await
            .unwrap();
    }
}
