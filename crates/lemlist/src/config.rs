/// Default Lemlist API root.
pub const DEFAULT_BASE_URL: &str = "https://api.lemlist.com/api";

#[derive(Debug, Clone)]
pub struct LemlistConfig {
    pub api_key: String,
    pub base_url: String,
    /// Campaign statuses to fetch. The source only reports running
    /// campaigns by default.
    pub campaign_status: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl LemlistConfig {
    /// Load Lemlist config from environment.
    ///
    /// Returns `None` if `LEMLIST_API_KEY` is not set.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `LEMLIST_API_KEY`          | (required)                     |
    /// | `LEMLIST_BASE_URL`         | `https://api.lemlist.com/api`  |
    /// | `LEMLIST_CAMPAIGN_STATUS`  | `running`                      |
    /// | `LEMLIST_PAGE_SIZE`        | `100`                          |
    /// | `LEMLIST_TIMEOUT_SECS`     | `30`                           |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LEMLIST_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())?;

        let base_url = std::env::var("LEMLIST_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let campaign_status =
            std::env::var("LEMLIST_CAMPAIGN_STATUS").unwrap_or_else(|_| "running".to_string());
        let page_size = std::env::var("LEMLIST_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let timeout_secs = std::env::var("LEMLIST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Some(Self {
            api_key,
            base_url,
            campaign_status,
            page_size,
            timeout_secs,
        })
    }
}
