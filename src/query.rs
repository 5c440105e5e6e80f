//! Pure view queries over the normalized record set.
//!
//! Nothing here mutates or fetches; each function takes the record slice a
//! handler already pulled from the cache and shapes it for one of the three
//! read views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::ComplaintRecord;

/// One row of the chronological list view: a one-line summary for the
/// collapsed state plus the record it expands into.
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry<'a> {
    pub summary: String,
    pub record: &'a ComplaintRecord,
}

fn summary_line(record: &ComplaintRecord) -> String {
    let category = record.category.map(|c| c.as_str()).unwrap_or("-");
    format!("{} / {} / {}", record.date, category, record.author)
}

/// Full listing, stably sorted by submission date ascending.
///
/// Ties, and records whose date cell does not parse, keep their original
/// sheet order; unparseable dates sort before everything else.
pub fn chronological(records: &[ComplaintRecord]) -> Vec<ListingEntry<'_>> {
    let mut entries: Vec<&ComplaintRecord> = records.iter().collect();
    entries.sort_by_key(|r| r.date());
    entries
        .into_iter()
        .map(|record| ListingEntry {
            summary: summary_line(record),
            record,
        })
        .collect()
}

/// Case-insensitive substring search on the author field, preserving the
/// original sheet order.
pub fn search_by_author<'a>(
    records: &'a [ComplaintRecord],
    needle: &str,
) -> Vec<&'a ComplaintRecord> {
    let needle = needle.to_lowercase();
    records
        .iter()
        .filter(|r| r.author.to_lowercase().contains(&needle))
        .collect()
}

/// Per-day complaint counts, densified to a gapless series.
///
/// Records whose date cell fails to parse are skipped (unlike the
/// fail-fast numeric columns at load time). The result covers every
/// calendar day from the earliest to the latest observed date inclusive,
/// with zero counts for days without complaints, so a bar chart gets a
/// contiguous axis.
pub fn daily_counts(records: &[ComplaintRecord]) -> Vec<(NaiveDate, usize)> {
    let mut observed: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            *observed.entry(date).or_insert(0) += 1;
        }
    }

    let (Some((&first, _)), Some((&last, _))) =
        (observed.first_key_value(), observed.last_key_value())
    else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut day = first;
    while day <= last {
        series.push((day, observed.get(&day).copied().unwrap_or(0)));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;

    fn record(author: &str, date: &str) -> ComplaintRecord {
        ComplaintRecord {
            author: author.to_string(),
            content: format!("complaint by {author}"),
            latitude: 37.5,
            longitude: 126.9,
            date: date.to_string(),
            category: Some(Category::Road),
            attachment: None,
        }
    }

    #[test]
    fn chronological_is_stable_on_ties() {
        let records = vec![
            record("b", "2024-01-02"),
            record("a1", "2024-01-01"),
            record("a2", "2024-01-01"),
        ];
        let listing = chronological(&records);
        let authors: Vec<&str> = listing.iter().map(|e| e.record.author.as_str()).collect();
        assert_eq!(authors, vec!["a1", "a2", "b"]);
        assert_eq!(listing[0].summary, "2024-01-01 / Road / a1");
    }

    #[test]
    fn chronological_keeps_unparseable_dates() {
        let records = vec![record("ok", "2024-01-01"), record("odd", "eventually")];
        assert_eq!(chronological(&records).len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = vec![
            record("Kim Jisoo", "2024-01-01"),
            record("Lee Minho", "2024-01-02"),
            record("KIMBERLY", "2024-01-03"),
        ];
        let hits = search_by_author(&records, "kim");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].author, "Kim Jisoo");
        assert_eq!(hits[1].author, "KIMBERLY");
        assert!(search_by_author(&records, "park").is_empty());
    }

    #[test]
    fn histogram_densifies_the_gap() {
        let records = vec![record("a", "2024-01-01"), record("b", "2024-01-03")];
        let series = daily_counts(&records);
        let counts: Vec<usize> = series.iter().map(|&(_, n)| n).collect();
        assert_eq!(series.len(), 3);
        assert_eq!(counts, vec![1, 0, 1]);
        assert_eq!(
            series[1].0,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn histogram_skips_bad_dates_softly() {
        let records = vec![record("a", "2024-01-01"), record("b", "01/03/2024")];
        let series = daily_counts(&records);
        assert_eq!(series, vec![(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1)]);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(daily_counts(&[]).is_empty());
        assert!(daily_counts(&[record("a", "not a date")]).is_empty());
    }
}
