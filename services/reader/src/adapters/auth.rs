//! services/reader/src/adapters/auth.rs
//!
//! This module contains the adapter for the backend's account endpoints.
//! It implements the `AuthService` port from the `core` crate.

use async_trait::async_trait;
use auraread_core::domain::{AuthSession, Credentials, Registration, User};
use auraread_core::ports::{AuthService, PortResult};
use reqwest::Method;

use crate::adapters::api_client::{ApiClient, AuthScheme};
use crate::adapters::records::{AuthResponseRecord, LoginRequest, RegisterRequest, UserRecord};

/// An adapter that implements the `AuthService` port over the REST API.
#[derive(Clone)]
pub struct HttpAuthAdapter {
    client: ApiClient,
}

impl HttpAuthAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthSession> {
        let body = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let record: AuthResponseRecord = self
            .client
            .write_json(Method::POST, "login/", AuthScheme::Anonymous, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn register(&self, registration: &Registration) -> PortResult<AuthSession> {
        let body = RegisterRequest {
            username: &registration.username,
            password: &registration.password,
            email: registration.email.as_deref(),
        };
        let record: AuthResponseRecord = self
            .client
            .write_json(Method::POST, "register/", AuthScheme::Anonymous, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn logout(&self) -> PortResult<()> {
        self.client.send_empty(Method::POST, "logout/").await
    }

    async fn current_user(&self) -> PortResult<User> {
        let record: UserRecord = self.client.get_json("users/me/").await?;
        Ok(record.to_domain())
    }
}
