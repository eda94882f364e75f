use super::*;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

/// Talks to the real analytics service over HTTP
#[derive(Clone, Debug)]
pub struct HttpAnalyticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyticsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn new_shared(base_url: &str, timeout: Duration) -> Result<SharedAnalyticsClient, AnalyticsError> {
        Ok(Arc::new(Self::new(base_url, timeout)?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AnalyticsClient for HttpAnalyticsClient {
    async fn track_page_view(&self, view: &PageView) -> Result<(), AnalyticsError> {
        debug!(page = %view.page, "sending page view");
        let response = self
            .client
            .post(self.url("/analytics/pageview"))
            .json(view)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn submit_contact(&self, form: &ContactForm) -> Result<ContactResponse, AnalyticsError> {
        form.validate()?;

        debug!(email = %form.email, "submitting contact form");
        let response = self
            .client
            .post(self.url("/contact"))
            .json(form)
            .send()
            .await?;

        let status = response.status();
        // the service explains rejections in the body; fall back to a generic message
        let body: ContactResponse = response.json().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AnalyticsError::Rejected {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| "Failed to submit form".to_owned()),
            });
        }
        if !body.success {
            return Err(AnalyticsError::Rejected {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| "Submission failed".to_owned()),
            });
        }
        Ok(body)
    }

    async fn fetch_dashboard(&self, api_key: &str) -> Result<DashboardData, AnalyticsError> {
        if api_key.is_empty() {
            return Err(AnalyticsError::MissingApiKey);
        }

        let response = self
            .client
            .get(self.url("/analytics/dashboard"))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
