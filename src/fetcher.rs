use std::sync::Arc;

use tracing::info;

use crate::catalog::ProposalRecord;
use crate::config::{MEETING_LIST_PATH, MEETING_PAGE_PATH};
use crate::error::FetchError;
use crate::meeting::MeetingInfo;
use crate::net::Transport;
use crate::parser::proposals::{parse_meeting_list, parse_proposals};

/// Fetches and parses meeting pages from the document site. Cheap to clone.
#[derive(Clone)]
pub struct MeetingFetcher {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl MeetingFetcher {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn meeting_url(&self, ordinal: u32) -> String {
        format!(
            "{}{}?id_meeting={}&search_id_group=1&search_sub_group=1",
            self.base_url, MEETING_PAGE_PATH, ordinal
        )
    }

    pub fn meeting_list_url(&self) -> String {
        format!("{}{}", self.base_url, MEETING_LIST_PATH)
    }

    /// All archive-backed proposals listed for one meeting, in page order.
    pub async fn fetch_proposals(&self, ordinal: u32) -> Result<Vec<ProposalRecord>, FetchError> {
        let html = self.transport.get_text(&self.meeting_url(ordinal)).await?;
        parse_proposals(&html, &self.base_url)
    }

    pub async fn fetch_meeting_list(&self) -> Result<Vec<MeetingInfo>, FetchError> {
        let url = self.meeting_list_url();
        info!("Fetching meeting list: {}", url);
        let html = self.transport.get_text(&url).await?;
        parse_meeting_list(&html)
    }
}

// ── Tests ──
