//! Authentication endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, check};
use crate::error::{Error, Result};
use crate::models::{Credentials, Registration, SessionIdentity};
use crate::session::{AuthBackend, VerifyResponse};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: Option<SessionIdentity>,
}

impl ApiClient {
    /// `POST /auth/login`. The session cookie is kept by the client.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity> {
        let response = self
            .request(Method::POST, &["auth", "login"])?
            .json(credentials)
            .send()
            .await?;
        let body: LoginResponse = check(response).await?.json().await?;
        body.user.ok_or_else(|| Error::Status {
            status: 200,
            message: "login response did not include a user".into(),
        })
    }

    /// `POST /auth/logout`
    pub async fn logout(&self) -> Result<()> {
        let builder = self.request(Method::POST, &["auth", "logout"])?;
        self.send(builder).await
    }

    /// `GET /auth/verify`
    pub async fn verify_session(&self) -> Result<VerifyResponse> {
        self.get_json(&["auth", "verify"]).await
    }

    /// `POST /auth/register`
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let builder = self
            .request(Method::POST, &["auth", "register"])?
            .json(&registration.normalized());
        self.send(builder).await
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn verify(&self) -> Result<VerifyResponse> {
        self.verify_session().await
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity> {
        ApiClient::login(self, credentials).await
    }

    async fn logout(&self) -> Result<()> {
        ApiClient::logout(self).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::HttpClientConfig;
    use crate::models::Role;

    #[tokio::test]
    async fn test_login_keeps_session_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "ana@example.com", "password": "s3cret!"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "token=abc; Path=/")
                    .set_body_json(json!({
                        "user": {"id": 1, "email": "ana@example.com", "rol": "auditor", "nombre": "Ana"}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .and(header("cookie", "token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authenticated": true,
                "user": {"id": 1, "email": "ana@example.com", "rol": "auditor", "nombre": "Ana"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap();
        let identity = ApiClient::login(&client, &Credentials::new("ana@example.com", "s3cret!"))
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Auditor);

        let verified = client.verify_session().await.unwrap();
        assert!(verified.authenticated);
        assert_eq!(verified.user, Some(identity));
    }

    #[tokio::test]
    async fn test_rejected_login_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Credenciales inválidas"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap();
        let err = ApiClient::login(&client, &Credentials::new("ana@example.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend returned 401: Credenciales inválidas");
    }

    #[tokio::test]
    async fn test_unauthenticated_verify_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"authenticated": false})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), &HttpClientConfig::default()).unwrap();
        let verified = client.verify_session().await.unwrap();
        assert!(!verified.authenticated);
        assert_eq!(verified.user, None);
    }
}
