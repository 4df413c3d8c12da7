use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::config::BillingConfig;
use crate::error::BillingError;

/// Where to send the buyer to complete a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: String,
}

/// Provider view of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSessionStatus {
    pub id: String,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub mode: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
}

impl CheckoutSessionStatus {
    /// Completed and either paid or free of charge.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        checkout_paid(self.status.as_deref(), self.payment_status.as_deref())
    }
}

/// The rule behind [`CheckoutSessionStatus::is_paid`], for raw event fields.
#[must_use]
pub fn checkout_paid(status: Option<&str>, payment_status: Option<&str>) -> bool {
    status == Some("complete") && matches!(payment_status, Some("paid" | "no_payment_required"))
}

/// Hosted checkout for the monthly subscription.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Open a checkout session and return its redirect.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` when billing is disabled, the provider rejects
    /// the request, or no redirect URL comes back.
    async fn create_checkout(&self) -> Result<CheckoutRedirect, BillingError>;

    /// Look up a checkout session by id.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::MissingSessionId` for a blank id,
    /// `BillingError::InvalidSessionId` for one with characters outside
    /// `[A-Za-z0-9_]`, otherwise any transport or provider failure.
    async fn retrieve_checkout(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, BillingError>;
}

//
// ─── STRIPE ────────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct StripeCheckout {
    client: Client,
    config: Option<BillingConfig>,
}

impl StripeCheckout {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(BillingConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<BillingConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn config(&self) -> Option<&BillingConfig> {
        self.config.as_ref()
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_checkout(&self) -> Result<CheckoutRedirect, BillingError> {
        let config = self.config.as_ref().ok_or(BillingError::Disabled)?;
        let url = config.api_base.join("v1/checkout/sessions")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.secret_key)
            .form(&checkout_form(config))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BillingError::HttpStatus(response.status()));
        }

        let session: SessionObject = response.json().await?;
        let url = session.url.ok_or(BillingError::MissingRedirect)?;
        info!(session_id = %session.id, "checkout session created");
        Ok(CheckoutRedirect {
            session_id: session.id,
            url,
        })
    }

    async fn retrieve_checkout(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, BillingError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(BillingError::MissingSessionId);
        }
        if !is_session_id(session_id) {
            return Err(BillingError::InvalidSessionId(session_id.to_string()));
        }
        let config = self.config.as_ref().ok_or(BillingError::Disabled)?;
        let url = session_url(&config.api_base, session_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&config.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BillingError::HttpStatus(response.status()));
        }

        let session: SessionObject = response.json().await?;
        Ok(session.into_status())
    }
}

/// Provider ids are `[A-Za-z0-9_]` only.
fn is_session_id(id: &str) -> bool {
    id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn session_url(api_base: &Url, session_id: &str) -> Result<Url, BillingError> {
    let mut endpoint = api_base.join("v1/checkout/sessions")?;
    endpoint
        .path_segments_mut()
        .map_err(|()| BillingError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .push(session_id);
    Ok(endpoint)
}

fn checkout_form(config: &BillingConfig) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".into()),
        ("line_items[0][price]", config.price_id.clone()),
        ("line_items[0][quantity]", "1".into()),
        ("success_url", config.success_url()),
        ("cancel_url", config.cancel_url()),
    ]
}

/// Either a bare id or the expanded object carrying one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expandable {
    Id(String),
    Object { id: String },
}

impl Expandable {
    fn into_id(self) -> String {
        match self {
            Expandable::Id(id) | Expandable::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    customer: Option<Expandable>,
    #[serde(default)]
    subscription: Option<Expandable>,
}

impl SessionObject {
    fn into_status(self) -> CheckoutSessionStatus {
        CheckoutSessionStatus {
            id: self.id,
            status: self.status,
            payment_status: self.payment_status,
            mode: self.mode,
            customer: self.customer.map(Expandable::into_id),
            subscription: self.subscription.map(Expandable::into_id),
        }
    }
}
