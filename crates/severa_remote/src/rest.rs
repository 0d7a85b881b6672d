//! Blocking HTTP implementation of [`RemoteStore`].
//!
//! Speaks the backend's REST dialect: `/rest/v1/<table>` with filter
//! parameters for table CRUD, `/rest/v1/rpc/...` for transactional
//! procedures, and `/functions/v1/...` for the privileged member RPCs.

use crate::error::{RemoteError, RemoteResult};
use crate::RemoteStore;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use severa_model::{
    MemberStatus, MembershipRow, MembershipWithPantry, NewMembershipRow, NewPantryRow,
    NewProductRow, NewPurchaseRow, PantryItemRow, PantryItemUpsert, RemoteId, UserId,
};
use std::time::Duration;

/// Connection settings for the REST backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL, e.g. `https://project.example.co`.
    pub base_url: String,
    /// Public API key sent on every request.
    pub api_key: String,
    /// The session's bearer access token.
    pub access_token: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl RestConfig {
    /// Creates a config with the default 30 second timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Wire shape of a roster row: the member email arrives nested under the
/// users join and is flattened into [`MembershipRow`] at this boundary.
#[derive(Debug, Deserialize)]
struct WireMemberRow {
    id: RemoteId,
    pantry_id: RemoteId,
    user_id: UserId,
    status: MemberStatus,
    users: Option<WireUserJoin>,
}

#[derive(Debug, Deserialize)]
struct WireUserJoin {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionError {
    error: String,
}

#[derive(Debug, Deserialize)]
struct WireFunctionMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireInsertedId {
    id: RemoteId,
}

/// [`RemoteStore`] over authenticated HTTPS.
pub struct RestRemote {
    config: RestConfig,
    client: Client,
}

impl RestRemote {
    /// Creates a client from the given connection settings.
    pub fn new(config: RestConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::transport_fatal(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.config.base_url, procedure)
    }

    fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.config.base_url, function)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.access_token)
    }

    fn send(&self, builder: RequestBuilder) -> RemoteResult<Response> {
        let response = self
            .authed(builder)
            .send()
            .map_err(|e| RemoteError::transport_retryable(e.to_string()))?;
        tracing::trace!(status = %response.status(), url = %response.url(), "remote response");
        Self::check_status(response)
    }

    fn check_status(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RemoteError::Unauthorized(body))
            }
            StatusCode::CONFLICT => Err(RemoteError::Conflict(body)),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(body)),
            _ if status.is_server_error() => Err(RemoteError::Server(body)),
            _ => Err(RemoteError::Protocol(format!("{status}: {body}"))),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(response: Response) -> RemoteResult<T> {
        response
            .json::<T>()
            .map_err(|e| RemoteError::Protocol(e.to_string()))
    }

    /// Invokes a privileged function, mapping its error strings back onto
    /// the typed variants.
    fn invoke_function(&self, function: &str, body: serde_json::Value) -> RemoteResult<String> {
        let response = self
            .authed(self.client.post(self.function_url(function)))
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport_retryable(e.to_string()))?;

        if response.status().is_success() {
            let message: WireFunctionMessage = Self::decode(response)?;
            return Ok(message.message);
        }
        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<WireFunctionError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        tracing::debug!(function, error = %message, "function call rejected");
        Err(Self::classify_function_error(message))
    }

    fn classify_function_error(message: String) -> RemoteError {
        if message.starts_with("Usuario no encontrado") {
            RemoteError::UserNotFound
        } else if message.starts_with("Este usuario ya es miembro") {
            RemoteError::AlreadyMember
        } else if message.starts_with("Solo el dueño") {
            RemoteError::NotPantryOwner
        } else if message.starts_with("No puedes eliminar al dueño") {
            RemoteError::CannotRemoveOwner
        } else {
            RemoteError::Server(message)
        }
    }
}

impl RemoteStore for RestRemote {
    fn insert_pantry(&self, pantry: &NewPantryRow) -> RemoteResult<RemoteId> {
        let response = self.send(
            self.client
                .post(self.table_url("pantries"))
                .header("Prefer", "return=representation")
                .json(&vec![pantry]),
        )?;
        let rows: Vec<WireInsertedId> = Self::decode(response)?;
        rows.first()
            .map(|row| row.id)
            .ok_or_else(|| RemoteError::Protocol("insert returned no row".into()))
    }

    fn insert_membership(&self, membership: &NewMembershipRow) -> RemoteResult<()> {
        self.send(
            self.client
                .post(self.table_url("pantry_members"))
                .header("Prefer", "return=minimal")
                .json(&vec![membership]),
        )?;
        Ok(())
    }

    fn upsert_pantry_item(&self, item: &PantryItemUpsert) -> RemoteResult<()> {
        self.send(
            self.client
                .post(self.table_url("pantry_items"))
                .query(&[("on_conflict", "pantry_id,name")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&vec![item]),
        )?;
        Ok(())
    }

    fn insert_purchase(
        &self,
        purchase: &NewPurchaseRow,
        products: &[NewProductRow],
    ) -> RemoteResult<RemoteId> {
        let body = serde_json::json!({
            "purchase": purchase,
            "products": products,
        });
        let response = self.send(self.client.post(self.rpc_url("insert_purchase")).json(&body))?;
        let inserted: WireInsertedId = Self::decode(response)?;
        Ok(inserted.id)
    }

    fn fetch_memberships(&self) -> RemoteResult<Vec<MembershipWithPantry>> {
        // The aggregate visible-state query runs server-side so row-level
        // rules apply to the pantry join as well.
        let response = self.send(
            self.client
                .post(self.function_url("get-my-data"))
                .json(&serde_json::json!({})),
        )?;
        Self::decode(response)
    }

    fn fetch_pantry_members(&self, pantry_id: RemoteId) -> RemoteResult<Vec<MembershipRow>> {
        let response = self.send(self.client.get(self.table_url("pantry_members")).query(&[
            ("select", "id,pantry_id,user_id,status,users(email)".to_string()),
            ("pantry_id", format!("eq.{pantry_id}")),
        ]))?;
        let rows: Vec<WireMemberRow> = Self::decode(response)?;
        Ok(rows
            .into_iter()
            .map(|row| MembershipRow {
                id: row.id,
                pantry_id: row.pantry_id,
                user_id: row.user_id,
                status: row.status,
                email: row.users.and_then(|u| u.email),
            })
            .collect())
    }

    fn fetch_pantry_items(&self, pantry_id: RemoteId) -> RemoteResult<Vec<PantryItemRow>> {
        let response = self.send(self.client.get(self.table_url("pantry_items")).query(&[
            ("select", "*".to_string()),
            ("pantry_id", format!("eq.{pantry_id}")),
            ("order", "name.asc".to_string()),
        ]))?;
        Self::decode(response)
    }

    fn accept_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.send(
            self.client
                .patch(self.table_url("pantry_members"))
                .query(&[("id", format!("eq.{membership_id}"))])
                .header("Prefer", "return=minimal")
                .json(&serde_json::json!({ "status": "accepted" })),
        )?;
        Ok(())
    }

    fn decline_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.send(
            self.client
                .delete(self.table_url("pantry_members"))
                .query(&[("id", format!("eq.{membership_id}"))]),
        )?;
        Ok(())
    }

    fn invite_member(&self, pantry_id: RemoteId, invitee_email: &str) -> RemoteResult<String> {
        self.invoke_function(
            "invite-user",
            serde_json::json!({
                "pantry_id": pantry_id,
                "invitee_email": invitee_email,
            }),
        )
    }

    fn remove_member(&self, pantry_id: RemoteId, user_id: &UserId) -> RemoteResult<String> {
        self.invoke_function(
            "remove-member",
            serde_json::json!({
                "pantry_id": pantry_id,
                "user_id_to_remove": user_id,
            }),
        )
    }
}
