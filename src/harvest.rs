use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::catalog::ProposalRecord;
use crate::fetcher::MeetingFetcher;
use crate::meeting::{ordinal_to_code, MeetingRange};

/// Harvest result: records in meeting order plus per-meeting tallies.
pub struct HarvestReport {
    pub records: Vec<ProposalRecord>,
    pub meetings: usize,
    pub ok: usize,
    pub failed: Vec<u32>,
    pub elapsed: Duration,
}

/// Fetch every meeting in `range` concurrently and merge the results.
///
/// Each meeting task owns one slot of a pre-sized buffer, indexed by its
/// position in the range, so the merged output is ordered by meeting ordinal
/// and then page order regardless of which task finishes first. A failed
/// meeting is logged and leaves its slot empty. `concurrency == 0` runs every
/// meeting at once.
pub async fn harvest(fetcher: &MeetingFetcher, range: MeetingRange, concurrency: usize) -> Result<HarvestReport> {
    let t0 = Instant::now();
    let total = range.len();
    let slots: Arc<Mutex<Vec<Option<Vec<ProposalRecord>>>>> = Arc::new(Mutex::new(vec![None; total]));
    let semaphore = (concurrency > 0).then(|| Arc::new(Semaphore::new(concurrency)));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} meetings ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    info!("Harvesting meetings {}", range);

    let mut tasks = JoinSet::new();
    for ordinal in range.ordinals() {
        let fetcher = fetcher.clone();
        let slots = Arc::clone(&slots);
        let semaphore = semaphore.clone();
        let pb = pb.clone();

        tasks.spawn(async move {
            let _permit = match semaphore {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            let code = ordinal_to_code(ordinal);
            let fetched = fetcher.fetch_proposals(ordinal).await;
            pb.inc(1);
            match fetched {
                Ok(records) => {
                    info!("Meeting {} ({}): {} proposals", code, ordinal, records.len());
                    let mut guard = slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard[range.slot(ordinal)] = Some(records);
                    (ordinal, true)
                }
                Err(e) => {
                    error!("Meeting {} ({}) failed: {}", code, ordinal, e);
                    (ordinal, false)
                }
            }
        });
    }

    let mut ok = 0usize;
    let mut failed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, true)) => ok += 1,
            Ok((ordinal, false)) => failed.push(ordinal),
            Err(e) => warn!("Meeting task aborted: {}", e),
        }
    }
    pb.finish_and_clear();
    failed.sort_unstable();

    // Every task has joined; this lock is uncontended.
    let slots = std::mem::take(&mut *slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
    let records: Vec<ProposalRecord> = slots.into_iter().flatten().flatten().collect();

    let elapsed = t0.elapsed();
    info!(
        "Harvested {} proposals from {} meetings ({} ok, {} failed) in {:.2}s",
        records.len(),
        total,
        ok,
        failed.len(),
        elapsed.as_secs_f64()
    );

    Ok(HarvestReport {
        records,
        meetings: total,
        ok,
        failed,
        elapsed,
    })
}

// ── Tests ──
