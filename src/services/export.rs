//! Comma-separated export of scan results.
//!
//! Output is UTF-8 with a byte-order mark so spreadsheet tools detect the
//! encoding; floats are written with two decimals.

use chrono::{DateTime, TimeZone};

use crate::error::ScanError;
use crate::models::ScoredStock;

const BOM: char = '\u{feff}';

pub const CSV_HEADERS: [&str; 14] = [
    "ticker",
    "company",
    "price",
    "change_pct",
    "sector",
    "news_count",
    "sentiment",
    "confidence",
    "catalysts",
    "keywords",
    "latest_news",
    "score",
    "risk_level",
    "recommendation",
];

pub fn to_csv(stocks: &[ScoredStock]) -> String {
    let mut out = String::new();
    out.push(BOM);
    push_row(&mut out, CSV_HEADERS.iter().map(|h| h.to_string()));

    for s in stocks {
        push_row(
            &mut out,
            [
                s.ticker.to_string(),
                s.company.clone(),
                format!("{:.2}", s.price),
                format!("{:.2}", s.change_pct),
                s.sector.to_string(),
                s.news_count.to_string(),
                s.sentiment.to_string(),
                format!("{:.2}", s.confidence as f64),
                s.catalysts.clone(),
                s.keywords.clone(),
                s.latest_news.clone(),
                format!("{:.2}", s.score as f64),
                s.risk_level.to_string(),
                s.recommendation.to_string(),
            ]
            .into_iter(),
        );
    }

    out
}

/// `scan_YYYYMMDD_HHMM.csv`
pub fn csv_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("scan_{}.csv", at.format("%Y%m%d_%H%M"))
}

/// Parse an export back into rows (header first). Accepts the BOM, quoted
/// fields, doubled quotes and CRLF line endings.
pub fn parse_csv(input: &str) -> Result<Vec<Vec<String>>, ScanError> {
    let input = input.strip_prefix(BOM).unwrap_or(input);

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ScanError::InvalidRequest("unterminated quoted CSV field".to_string()));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields.map(|f| escape(&f)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
