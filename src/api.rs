//! Client side of the portal HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::err::Error;
use crate::models::{
    AvailabilityStatus, History, NewUser, PrescribeReply, PrescribeRequest, ThisWeek, UserProfile,
    UserRecord,
};
use crate::storage::TokenStore;
use crate::Payload;

/// Every remote operation the two pages use.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn check_availability(&self) -> Result<AvailabilityStatus, Error>;

    async fn this_week(&self) -> Result<ThisWeek, Error>;

    async fn history(&self) -> Result<History, Error>;

    async fn prescribe(&self, request: &PrescribeRequest) -> Result<PrescribeReply, Error>;

    async fn user_profile(&self) -> Payload<UserProfile>;

    async fn list_users(&self) -> Payload<Vec<UserRecord>>;

    async fn create_user(&self, user: &NewUser) -> Payload<Value>;

    async fn toggle_user_status(&self, user_id: &str, is_active: bool) -> Payload<Value>;

    async fn reset_password(&self, user_id: &str, new_password: &str) -> Payload<Value>;

    async fn delete_user(&self, user_id: &str) -> Payload<Value>;
}

/// Reqwest-backed [`PortalApi`]. Response bodies are decoded whatever the
/// HTTP status, the envelope carries the outcome.
pub struct HttpApi {
    client: Client,
    base: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApi {
    pub fn new(base: Url, tokens: Arc<dyn TokenStore>) -> Result<Self, Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base,
            tokens,
        })
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InternalError {
                kind: "UrlError",
                message: format!("`{}` cannot be used as an API base", self.base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(path)?;
        log::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match self.tokens.token().await {
            Some(token) => builder.bearer_auth(token),
            None => {
                log::debug!("No bearer token stored, sending anonymous request");
                builder
            }
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, Error> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            log::debug!("API answered with status {}", status);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, Error> {
        let builder = self.request(Method::GET, path).await?;
        self.send(builder).await
    }

    async fn with_body<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let builder = self.request(method, path).await?.json(body);
        self.send(builder).await
    }
}

#[async_trait]
impl PortalApi for HttpApi {
    async fn check_availability(&self) -> Result<AvailabilityStatus, Error> {
        self.get(&["ai-prescriptions", "check-availability"]).await
    }

    async fn this_week(&self) -> Result<ThisWeek, Error> {
        self.get(&["ai-prescriptions", "this-week"]).await
    }

    async fn history(&self) -> Result<History, Error> {
        self.get(&["ai-prescriptions", "history"]).await
    }

    async fn prescribe(&self, request: &PrescribeRequest) -> Result<PrescribeReply, Error> {
        let value: Value = self
            .with_body(Method::POST, &["ai-prescriptions", "prescribe"], request)
            .await?;
        Ok(PrescribeReply::from_value(value)?)
    }

    async fn user_profile(&self) -> Payload<UserProfile> {
        self.get(&["users", "profile"]).await
    }

    async fn list_users(&self) -> Payload<Vec<UserRecord>> {
        self.get(&["users"]).await
    }

    async fn create_user(&self, user: &NewUser) -> Payload<Value> {
        self.with_body(Method::POST, &["users"], user).await
    }

    async fn toggle_user_status(&self, user_id: &str, is_active: bool) -> Payload<Value> {
        let path = ["users", user_id, "status"];
        self.with_body(Method::PATCH, &path, &json!({ "isActive": is_active }))
            .await
    }

    async fn reset_password(&self, user_id: &str, new_password: &str) -> Payload<Value> {
        let path = ["users", user_id, "reset-password"];
        self.with_body(Method::POST, &path, &json!({ "newPassword": new_password }))
            .await
    }

    async fn delete_user(&self, user_id: &str) -> Payload<Value> {
        let builder = self.request(Method::DELETE, &["users", user_id]).await?;
        self.send(builder).await
    }
}
