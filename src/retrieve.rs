use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::catalog::ProposalRecord;
use crate::net::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Success,
    /// A file with the target name was already present; nothing was requested.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub record: ProposalRecord,
    pub status: DownloadStatus,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalStats {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RetrievalStats {
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        let mut stats = Self::default();
        for o in outcomes {
            match o.status {
                DownloadStatus::Success => stats.succeeded += 1,
                DownloadStatus::Skipped => stats.skipped += 1,
                DownloadStatus::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}

/// Final path segment of a download URL, without query or fragment.
pub fn file_name_for(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Download each record's archive into `dest`, one at a time, in order.
///
/// Files already present under their target name are skipped without a
/// request, so re-running over the same matches is a no-op. Bodies are
/// buffered in full and written through a `.part` file that is renamed on
/// success; a failed item never leaves a file behind and never stops the loop.
pub async fn retrieve(transport: &dyn Transport, records: &[ProposalRecord], dest: &Path) -> Result<Vec<DownloadOutcome>> {
    tokio::fs::create_dir_all(dest)
        .await
        .with_context(|| format!("Failed to create download directory {}", dest.display()))?;

    let total = records.len();
    let mut outcomes = Vec::with_capacity(total);

    for (i, record) in records.iter().enumerate() {
        let progress = format!("({}/{})", i + 1, total);
        let status = download_one(transport, record, dest).await;
        match &status {
            DownloadStatus::Success => info!("{} Downloaded {}", progress, record.jvet_number),
            DownloadStatus::Skipped => info!("{} {} already present", progress, record.jvet_number),
            DownloadStatus::Failed(reason) => error!("{} {} failed: {}", progress, record.jvet_number, reason),
        }
        outcomes.push(DownloadOutcome {
            record: record.clone(),
            status,
        });
    }

    Ok(outcomes)
}

async fn download_one(transport: &dyn Transport, record: &ProposalRecord, dest: &Path) -> DownloadStatus {
    let Some(name) = file_name_for(&record.download_link) else {
        return DownloadStatus::Failed(format!("no file name in {}", record.download_link));
    };
    let target = dest.join(name);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return DownloadStatus::Skipped;
    }

    let body = match transport.get_bytes(&record.download_link).await {
        Ok(body) => body,
        Err(e) => return DownloadStatus::Failed(e.to_string()),
    };

    let part = dest.join(format!("{}.part", name));
    let written = async {
        tokio::fs::write(&part, &body).await?;
        tokio::fs::rename(&part, &target).await
    }
    .await;

    match written {
        Ok(()) => DownloadStatus::Success,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            DownloadStatus::Failed(format!("write {}: {}", target.display(), e))
        }
    }
}

// ── Tests ──
