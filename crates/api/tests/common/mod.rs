//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use leadwatch_core::notify::{CompanyNotifier, CompanyPush, NotifyError};
use leadwatch_core::snapshot::{CampaignSnapshot, LeadSnapshot};
use leadwatch_core::source::{FetchError, SnapshotSource};
use sqlx::PgPool;
use tower::ServiceExt;

use leadwatch_api::config::ServerConfig;
use leadwatch_api::router::build_app_router;
use leadwatch_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Handles to the collaborators behind a test app.
pub struct TestApp {
    pub router: Router,
    pub source: Arc<MockSource>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an empty mock source and a
/// recording notifier.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, RecordingNotifier::default())
}

pub fn build_test_app_with(pool: PgPool, notifier: RecordingNotifier) -> TestApp {
    let config = test_config();
    let source = Arc::new(MockSource::default());
    let notifier = Arc::new(notifier);
    let state = AppState::new(pool, config.clone(), source.clone(), notifier.clone());
    TestApp {
        router: build_app_router(state, &config),
        source,
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

pub fn campaign(id: &str, name: &str) -> CampaignSnapshot {
    CampaignSnapshot {
        id: id.to_string(),
        name: name.to_string(),
        status: "running".to_string(),
    }
}

pub fn lead(id: &str, company: Option<&str>) -> LeadSnapshot {
    LeadSnapshot {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        company_name: company.map(str::to_string),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct MockSource {
    campaigns: Mutex<Vec<CampaignSnapshot>>,
    leads: Mutex<HashMap<String, Vec<LeadSnapshot>>>,
    unavailable: AtomicBool,
}

impl MockSource {
    pub fn set_campaign(&self, campaign: CampaignSnapshot, leads: Vec<LeadSnapshot>) {
        let mut campaigns = self.campaigns.lock().unwrap();
        campaigns.retain(|c| c.id != campaign.id);
        self.leads.lock().unwrap().insert(campaign.id.clone(), leads);
        campaigns.push(campaign);
    }

    /// Make every campaign list fetch fail with a 503.
    pub fn go_down(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSource for MockSource {
    fn source_name(&self) -> &str {
        "mock"
    }

    async fn fetch_campaigns(&self) -> Result<Vec<CampaignSnapshot>, FetchError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                resource: "campaigns".to_string(),
                status: 503,
            });
        }
        Ok(self.campaigns.lock().unwrap().clone())
    }

    async fn fetch_leads(&self, campaign_id: &str) -> Result<Vec<LeadSnapshot>, FetchError> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .get(campaign_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<CompanyPush>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl CompanyNotifier for RecordingNotifier {
    async fn notify(&self, push: &CompanyPush) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::HttpStatus(500));
        }
        self.sent.lock().unwrap().push(push.clone());
        Ok(())
    }
}
