use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::FetchError;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A body row of an HTML table: trimmed cell text plus every anchor href in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub links: Vec<String>,
}

/// Extract the body rows of the `index`-th table (0-based) in `html`.
///
/// The header row is skipped. Rows with fewer than `min_columns` cells or an
/// empty first cell are dropped. A document with fewer than `index + 1`
/// tables is a parse error rather than an empty result.
pub fn extract_table(html: &str, index: usize, min_columns: usize) -> Result<Vec<TableRow>, FetchError> {
    let document = Html::parse_document(html);
    let tables: Vec<ElementRef> = document.select(&TABLE).collect();
    let table = tables.get(index).ok_or_else(|| {
        FetchError::Parse(format!(
            "expected at least {} tables, found {}",
            index + 1,
            tables.len()
        ))
    })?;

    let rows = table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
            if cells.len() < min_columns || cells.first().map_or(true, |c| c.is_empty()) {
                return None;
            }
            let links = row
                .select(&ANCHOR)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string)
                .collect();
            Some(TableRow { cells, links })
        })
        .collect();

    Ok(rows)
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

// ── Tests ──
