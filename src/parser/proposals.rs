use crate::catalog::ProposalRecord;
use crate::config::ARCHIVE_SUFFIX;
use crate::error::FetchError;
use crate::meeting::MeetingInfo;

use super::classify::ProposalType;
use super::table::{extract_table, TableRow};

/// Table 0 of a meeting page is navigation; proposals are in table 1.
const PROPOSAL_TABLE: usize = 1;
const PROPOSAL_COLUMNS: usize = 7;

const MEETING_LIST_TABLE: usize = 0;
const MEETING_LIST_COLUMNS: usize = 5;

/// Parse a meeting page into catalog records, in table order.
/// Rows without an archive link are dropped.
pub fn parse_proposals(html: &str, base_url: &str) -> Result<Vec<ProposalRecord>, FetchError> {
    let rows = extract_table(html, PROPOSAL_TABLE, PROPOSAL_COLUMNS)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| to_record(row, base_url))
        .collect())
}

fn to_record(row: TableRow, base_url: &str) -> Option<ProposalRecord> {
    let href = row.links.iter().find(|l| l.ends_with(ARCHIVE_SUFFIX))?;
    let download_link = resolve_link(href, base_url);

    let mut cells = row.cells.into_iter();
    let mut next = || cells.next().unwrap_or_default();
    let jvet_number = next();
    let mpeg_number = next();
    let created = next();
    let first_upload = next();
    let last_upload = next();
    let title = next();
    let source = next();
    let category = ProposalType::from_title(&title);

    Some(ProposalRecord {
        jvet_number,
        mpeg_number,
        created,
        first_upload,
        last_upload,
        title,
        source,
        download_link,
        category,
    })
}

/// Turn a relative href such as `../doc_end_user/documents/x.zip` into an absolute URL.
pub fn resolve_link(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let path = href.replace("..", "");
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Parse the all-meetings page.
pub fn parse_meeting_list(html: &str) -> Result<Vec<MeetingInfo>, FetchError> {
    let rows = extract_table(html, MEETING_LIST_TABLE, MEETING_LIST_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut cells = row.cells.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            MeetingInfo {
                number: next(),
                name: next(),
                start_date: next(),
                end_date: next(),
                usl: next(),
            }
        })
        .collect())
}

// ── Tests ──
