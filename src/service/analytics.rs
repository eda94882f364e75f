//! Analytics & contact client
//!
//! The remote service the site reports page views and contact requests to,
//! and reads its dashboard from. Injected everywhere as a
//! [`SharedAnalyticsClient`], so tests and deployments without analytics can
//! swap in a different implementation.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

mod http;
#[cfg(test)]
mod in_memory;
pub use self::http::*;
#[cfg(test)]
pub use self::in_memory::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: String,
    pub user_agent: String,
    pub referrer: String,
}

/// Missing fields deserialize as empty and are caught by [`ContactForm::validate`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub role: String,
    pub use_case: String,
    pub monthly_calls: String,
    pub message: String,
    #[serde(with = "yes_no")]
    pub consent: bool,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContactFormError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("consent is required")]
    ConsentRequired,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactFormError> {
        if self.name.trim().is_empty() {
            return Err(ContactFormError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ContactFormError::MissingEmail);
        }
        if !email.contains('@') {
            return Err(ContactFormError::InvalidEmail);
        }
        if !self.consent {
            return Err(ContactFormError::ConsentRequired);
        }
        Ok(())
    }
}

/// Consent goes over the wire as `"yes"`/`"no"`
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(consent: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *consent { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Consent {
            Flag(bool),
            Text(String),
        }

        Ok(match Consent::deserialize(d)? {
            Consent::Flag(flag) => flag,
            Consent::Text(text) => text == "yes",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    pub page: String,
    pub visits: u64,
    pub unique_visitors: u64,
    pub last_visit: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub page_stats: Vec<PageStats>,
    pub recent_contacts: Vec<ContactSubmission>,
    pub total_visits: u64,
    pub total_unique_visitors: u64,
}

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("analytics are disabled")]
    Disabled,
    #[error("api key is required")]
    MissingApiKey,
    #[error("invalid contact form: {0}")]
    InvalidForm(#[from] ContactFormError),
    /// The service turned the request down; `status` is the one it answered with
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("analytics service returned {0}")]
    Status(u16),
    #[error("request to analytics service failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait AnalyticsClient {
    async fn track_page_view(&self, view: &PageView) -> Result<(), AnalyticsError>;
    async fn submit_contact(&self, form: &ContactForm) -> Result<ContactResponse, AnalyticsError>;
    async fn fetch_dashboard(&self, api_key: &str) -> Result<DashboardData, AnalyticsError>;
}

pub type SharedAnalyticsClient = Arc<dyn AnalyticsClient + Send + Sync + 'static>;

/// Used when analytics are turned off
#[derive(Clone, Debug, Default)]
pub struct NoopAnalyticsClient;

impl NoopAnalyticsClient {
    pub fn new_shared() -> SharedAnalyticsClient {
        Arc::new(Self)
    }
}

#[async_trait]
impl AnalyticsClient for NoopAnalyticsClient {
    async fn track_page_view(&self, view: &PageView) -> Result<(), AnalyticsError> {
        debug!(page = %view.page, "analytics disabled, dropping page view");
        Ok(())
    }

    async fn submit_contact(&self, _form: &ContactForm) -> Result<ContactResponse, AnalyticsError> {
        Err(AnalyticsError::Disabled)
    }

    async fn fetch_dashboard(&self, _api_key: &str) -> Result<DashboardData, AnalyticsError> {
        Err(AnalyticsError::Disabled)
    }
}
