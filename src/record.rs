//! Complaint records and sheet-row normalization.
//!
//! The external sheet stores everything as text. This module turns the raw
//! `Vec<Vec<String>>` page into typed [`ComplaintRecord`]s exactly once, at
//! load time, so the query layer never re-checks field presence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Canonical sheet header, in column order. The first row of the sheet must
/// match this (case-insensitively) or the whole load fails.
pub const HEADER: [&str; 7] = [
    "Author",
    "Content",
    "Latitude",
    "Longitude",
    "Date",
    "Category",
    "Attachment",
];

/// A point picked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }
}

/// Fixed complaint categories. Sheet cells with labels outside this set
/// fold into `Other`; an empty cell means no category was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Road,
    Environment,
    Safety,
    Noise,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Road,
        Category::Environment,
        Category::Safety,
        Category::Noise,
        Category::Other,
    ];

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(match label.to_lowercase().as_str() {
            "road" => Category::Road,
            "environment" => Category::Environment,
            "safety" => Category::Safety,
            "noise" => Category::Noise,
            _ => Category::Other,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Road => "Road",
            Category::Environment => "Environment",
            Category::Safety => "Safety",
            Category::Noise => "Noise",
            Category::Other => "Other",
        }
    }
}

/// One citizen-submitted complaint, as stored in the sheet.
///
/// Immutable after creation: the store is append-only and offers no
/// update or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub author: String,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Submission date as stored. Kept textual; parse with [`Self::date`].
    pub date: String,
    pub category: Option<Category>,
    /// Usable attachment link, already quote-trimmed and scheme-checked.
    pub attachment: Option<String>,
}

impl ComplaintRecord {
    /// Parse the stored date cell as a calendar date.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Serialize into a sheet row in canonical column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.author.clone(),
            self.content.clone(),
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.date.clone(),
            self.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            self.attachment.clone().unwrap_or_default(),
        ]
    }
}

/// Quote characters stripped from attachment cells. Sheets edited by hand
/// pick up both ASCII quotes and the typographic variants that word
/// processors substitute.
const QUOTE_CHARS: [char; 8] = ['\'', '"', '`', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', ' '];

/// Trim stray quotes/whitespace off a stored attachment cell and accept it
/// as a link only if what remains starts with `http`.
pub fn attachment_link(cell: &str) -> Option<String> {
    let trimmed = cell.trim_matches(&QUOTE_CHARS[..]);
    if trimmed.starts_with("http") {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Convert a raw sheet page (header row first) into typed records.
///
/// An empty page, or a page holding only the header, yields an empty record
/// set: brand-new sheets are a normal state, not an error. A header that
/// does not match [`HEADER`], or any non-numeric latitude/longitude cell,
/// fails the whole load.
///
/// # Arguments
/// * `rows` - All rows of the sheet as text, header row first
///
/// # Returns
/// * `Result<Vec<ComplaintRecord>>` - One record per data row, in sheet order
///
/// # Examples
/// ```
/// use minwon::record::normalize;
///
/// // A brand-new sheet normalizes to an empty record set.
/// let records = normalize(&[]).unwrap();
/// assert!(records.is_empty());
/// ```
pub fn normalize(rows: &[Vec<String>]) -> Result<Vec<ComplaintRecord>> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    check_header(header)?;

    let mut records = Vec::with_capacity(data.len());
    for (i, raw) in data.iter().enumerate() {
        // Sheet rows are 1-based and the header occupies row one.
        records.push(normalize_row(raw, i + 2)?);
    }
    Ok(records)
}

fn check_header(header: &[String]) -> Result<()> {
    let matches = header.len() == HEADER.len()
        && header
            .iter()
            .zip(HEADER.iter())
            .all(|(got, want)| got.trim().eq_ignore_ascii_case(want));
    if matches {
        Ok(())
    } else {
        Err(AppError::StoreFormat {
            row: 1,
            column: "header".to_string(),
            message: format!("expected columns {:?}, got {:?}", HEADER, header),
        })
    }
}

fn normalize_row(raw: &[String], sheet_row: usize) -> Result<ComplaintRecord> {
    // The values API drops trailing empty cells; treat a short row as
    // padded with empties rather than malformed.
    let cell = |i: usize| raw.get(i).map(String::as_str).unwrap_or("");

    let latitude = parse_coord(cell(2), sheet_row, "Latitude")?;
    let longitude = parse_coord(cell(3), sheet_row, "Longitude")?;

    Ok(ComplaintRecord {
        author: cell(0).to_string(),
        content: cell(1).to_string(),
        latitude,
        longitude,
        date: cell(4).trim().to_string(),
        category: Category::parse(cell(5)),
        attachment: attachment_link(cell(6)),
    })
}

fn parse_coord(value: &str, sheet_row: usize, column: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| AppError::StoreFormat {
        row: sheet_row,
        column: column.to_string(),
        message: format!("'{value}' is not numeric"),
    })
}
