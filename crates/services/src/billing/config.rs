use std::env;

use url::Url;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Subscription checkout settings read from the environment.
#[derive(Clone, Debug)]
pub struct BillingConfig {
    pub secret_key: String,
    pub price_id: String,
    pub app_url: Url,
    pub webhook_secret: Option<String>,
    pub api_base: Url,
}

impl BillingConfig {
    /// Read `STRIPE_SECRET_KEY`, `STRIPE_PRICE_ID`, `APP_URL` and the optional
    /// `STRIPE_WEBHOOK_SECRET` / `STRIPE_API_BASE`. Returns `None` when billing
    /// is not configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BillingConfig::from_env`] over an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = non_empty("STRIPE_SECRET_KEY")?;
        let price_id = non_empty("STRIPE_PRICE_ID")?;
        let app_url = Url::parse(non_empty("APP_URL")?.trim_end_matches('/')).ok()?;
        let api_base = non_empty("STRIPE_API_BASE")
            .and_then(|v| Url::parse(&v).ok())
            .or_else(|| Url::parse(DEFAULT_API_BASE).ok())?;

        Some(Self {
            secret_key,
            price_id,
            app_url,
            webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET"),
            api_base,
        })
    }

    /// Where the provider sends the buyer after paying. The provider fills in
    /// `{CHECKOUT_SESSION_ID}`.
    #[must_use]
    pub fn success_url(&self) -> String {
        format!(
            "{}/?success=true&session_id={{CHECKOUT_SESSION_ID}}",
            self.app_root()
        )
    }

    #[must_use]
    pub fn cancel_url(&self) -> String {
        format!("{}/?canceled=true", self.app_root())
    }

    fn app_root(&self) -> &str {
        self.app_url.as_str().trim_end_matches('/')
    }
}
