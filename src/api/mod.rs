//! Contract between the tracker and the backend. [ActivityClient] is the only way activity
//! leaves the process; [http::HttpActivityClient] is the production implementation.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{resolve_page_label, APP_LABEL};

pub const ACTIVITY_LOG_PATH: &str = "/activity/log";
pub const ACTIVITY_CATEGORY: &str = "productivity";

/// Body of a single activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPayload {
    pub app_name: String,
    pub window_title: String,
    pub url: String,
    pub category: String,
    pub duration_seconds: u64,
}

impl ActivityPayload {
    /// Builds a record for `seconds` of activity on the page at `path`. Seconds are rounded to
    /// the nearest whole second.
    pub fn for_page(path: &str, seconds: f64) -> Self {
        Self {
            app_name: APP_LABEL.into(),
            window_title: resolve_page_label(path).into(),
            url: path.into(),
            category: ACTIVITY_CATEGORY.into(),
            duration_seconds: seconds.max(0.).round() as u64,
        }
    }
}

/// Delivery of an activity record didn't complete. Always recoverable: the caller keeps the
/// seconds and tries again on the next flush.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend responded with status {0}")]
    Status(u16),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityClient: Send + Sync {
    async fn post_activity(&self, payload: ActivityPayload) -> Result<(), DeliveryError>;
}
