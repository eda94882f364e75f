use super::*;
use parking_lot::Mutex;

/// Fake analytics service that keeps everything it is sent.
///
/// Useful for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsClient {
    page_views: Mutex<Vec<PageView>>,
    contacts: Mutex<Vec<ContactForm>>,
    dashboard: DashboardData,
    api_key: String,
}

impl InMemoryAnalyticsClient {
    /// Serve `dashboard` to callers presenting `api_key`
    pub fn with_dashboard(api_key: &str, dashboard: DashboardData) -> Self {
        Self {
            dashboard,
            api_key: api_key.to_owned(),
            ..Self::default()
        }
    }

    pub fn page_views(&self) -> Vec<PageView> {
        self.page_views.lock().clone()
    }

    pub fn contacts(&self) -> Vec<ContactForm> {
        self.contacts.lock().clone()
    }
}

#[async_trait]
impl AnalyticsClient for InMemoryAnalyticsClient {
    async fn track_page_view(&self, view: &PageView) -> Result<(), AnalyticsError> {
        self.page_views.lock().push(view.clone());
        Ok(())
    }

    async fn submit_contact(&self, form: &ContactForm) -> Result<ContactResponse, AnalyticsError> {
        form.validate()?;
        self.contacts.lock().push(form.clone());
        Ok(ContactResponse {
            success: true,
            error: None,
        })
    }

    async fn fetch_dashboard(&self, api_key: &str) -> Result<DashboardData, AnalyticsError> {
        if api_key.is_empty() {
            return Err(AnalyticsError::MissingApiKey);
        }
        if api_key != self.api_key {
            return Err(AnalyticsError::Status(401));
        }
        Ok(self.dashboard.clone())
    }
}
