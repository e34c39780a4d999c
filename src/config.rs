use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL: &str = "https://jvet-experts.org";
pub const MEETING_LIST_PATH: &str = "/doc_end_user/all_meeting.php";
pub const MEETING_PAGE_PATH: &str = "/doc_end_user/current_meeting.php";

/// Ordinal the site assigns to the meeting just before the first tracked one.
/// Meeting `MEETING_ORDINAL_OFFSET + 1` is code "A".
pub const MEETING_ORDINAL_OFFSET: u32 = 164;

pub const ARCHIVE_SUFFIX: &str = ".zip";
pub const DOCUMENT_SUFFIX: &str = ".docx";

pub const DEFAULT_CATALOG_PATH: &str = "data/proposals.csv";
pub const DEFAULT_DOWNLOAD_DIR: &str = "download";

/// Harvest fan-out cap. 0 spawns every meeting at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

pub const USER_AGENT: &str = concat!("jvet_proposals/", env!("CARGO_PKG_VERSION"));

/// Runtime settings resolved from the global CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub download_dir: PathBuf,
    pub base_url: String,
}
