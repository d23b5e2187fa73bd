use std::time::Duration;

use async_trait::async_trait;
use leadwatch_core::snapshot::{CampaignSnapshot, LeadSnapshot};
use leadwatch_core::source::{FetchError, SnapshotSource};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::LemlistConfig;
use crate::models::{CampaignPage, LeadExport};

/// Give up with [`FetchError::Truncated`] if the API still returns a full
/// page after this many.
const MAX_CAMPAIGN_PAGES: u32 = 50;

/// Read-only Lemlist API client.
#[derive(Clone)]
pub struct LemlistClient {
    client: Client,
    config: LemlistConfig,
}

impl LemlistClient {
    pub fn new(config: LemlistConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("leadwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch all campaigns with the configured status, page by page.
    pub async fn fetch_all_campaigns(&self) -> Result<Vec<CampaignSnapshot>, FetchError> {
        let url = format!("{}/campaigns", self.config.base_url);
        let page_size = self.config.page_size.max(1);
        let mut campaigns = Vec::new();

        for page in 1..=MAX_CAMPAIGN_PAGES {
            let query = [
                ("version", "v2".to_string()),
                ("status", self.config.campaign_status.clone()),
                ("limit", page_size.to_string()),
                ("page", page.to_string()),
                ("sortBy", "createdAt".to_string()),
                ("sortOrder", "desc".to_string()),
            ];
            let body: CampaignPage = self.get_json(&url, "campaigns", &query).await?;
            let page_len = body.campaigns.len();
            campaigns.extend(body.campaigns.into_iter().map(|c| c.into_snapshot()));

            if page_len < page_size as usize {
                break;
            }
            if page == MAX_CAMPAIGN_PAGES {
                return Err(FetchError::Truncated {
                    resource: "campaigns".to_string(),
                    pages: MAX_CAMPAIGN_PAGES,
                });
            }
        }

        tracing::debug!(count = campaigns.len(), "Fetched Lemlist campaigns");
        Ok(campaigns)
    }

    /// Export every lead of a campaign regardless of state.
    pub async fn fetch_campaign_leads(&self, campaign_id: &str) -> Result<Vec<LeadSnapshot>, FetchError> {
        let url = format!("{}/campaigns/{campaign_id}/export/leads", self.config.base_url);
        let resource = format!("campaign:{campaign_id}/leads");
        let query = [("state", "all".to_string()), ("format", "json".to_string())];

        let export: LeadExport = self.get_json(&url, &resource, &query).await?;
        let leads: Vec<LeadSnapshot> = export
            .into_leads()
            .into_iter()
            .map(|lead| lead.into_snapshot(campaign_id))
            .collect();

        tracing::debug!(campaign_id = %campaign_id, count = leads.len(), "Fetched Lemlist leads");
        Ok(leads)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .basic_auth("", Some(&self.config.api_key))
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                resource: resource.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| FetchError::Decode {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SnapshotSource for LemlistClient {
    fn source_name(&self) -> &str {
        "lemlist"
    }

    async fn fetch_campaigns(&self) -> Result<Vec<CampaignSnapshot>, FetchError> {
        self.fetch_all_campaigns().await
    }

    async fn fetch_leads(&self, campaign_id: &str) -> Result<Vec<LeadSnapshot>, FetchError> {
        self.fetch_campaign_leads(campaign_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> LemlistConfig {
        LemlistConfig {
            api_key: "secret".to_string(),
            base_url: "http://localhost".to_string(),
            campaign_status: "running".to_string(),
            page_size: 2,
            timeout_secs: 5,
        }
    }

    async fn client_for(server: &MockServer) -> LemlistClient {
        LemlistClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn campaigns_are_paged_until_short_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .and(query_param("page", "1"))
            .and(query_param("status", "running"))
            .and(query_param("version", "v2"))
            // Basic auth with an empty user and the API key as password.
            .and(header("authorization", "Basic OnNlY3JldA=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "campaigns": [
                    {"_id": "c1", "name": "One", "status": "running"},
                    {"_id": "c2", "name": "Two", "status": "running"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "campaigns": [{"_id": "c3", "name": "Three", "status": "running"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let campaigns = client_for(&server).await.fetch_campaigns().await.unwrap();
        let ids: Vec<_> = campaigns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn endless_full_pages_fail_at_the_page_cap() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "campaigns": [
                    {"_id": "c1", "name": "One", "status": "running"},
                    {"_id": "c2", "name": "Two", "status": "running"}
                ]
            })))
            .expect(u64::from(MAX_CAMPAIGN_PAGES))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_campaigns().await.unwrap_err();
        match err {
            FetchError::Truncated { resource, pages } => {
                assert_eq!(resource, "campaigns");
                assert_eq!(pages, MAX_CAMPAIGN_PAGES);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn lead_without_id_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/c1/export/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"_id": "l1", "companyName": "Acme"},
                {"companyName": "Beta"}
            ])))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_leads("c1").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert_eq!(err.resource(), "campaign:c1/leads");
    }

    #[tokio::test]
    async fn null_export_means_no_leads() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/c1/export/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let leads = client_for(&server).await.fetch_leads("c1").await.unwrap();
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn leads_export_is_mapped_to_snapshots() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/c1/export/leads"))
            .and(query_param("state", "all"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "leads": [
                    {"_id": "l1", "email": "ada@acme.io", "companyName": "Acme"},
                    {"_id": "l2", "companyName": "Beta", "stateSystem": "emailsSent"}
                ]
            })))
            .mount(&server)
            .await;

        let leads = client_for(&server).await.fetch_leads("c1").await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].campaign_id, "c1");
        assert_eq!(leads[0].company_name.as_deref(), Some("Acme"));
        assert_eq!(leads[1].state_system.as_deref(), Some("emailsSent"));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_resource() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/c9/export/leads"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_leads("c9").await.unwrap_err();
        match err {
            FetchError::Status { resource, status } => {
                assert_eq!(resource, "campaign:c9/leads");
                assert_eq!(status, 503);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_campaigns().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert_eq!(err.resource(), "campaigns");
    }
}
