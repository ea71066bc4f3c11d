//! Hash-based grouping of accumulated search records.
//!
//! The grouped pipeline collapses every record sharing a content hash into
//! one [`GroupSummary`]: identical file bytes that appear on dozens of
//! shovelware CDs become a single row with the filename variants, the date
//! range, and the full entry list behind it.
//!
//! Grouping is a single pass over the records in arrival order. Several
//! output attributes depend on that order: `size`, `ext`, `family`,
//! `formatid` and the description are seeded from the *first* record seen
//! for a hash and never revisited, even if later records disagree. That is
//! deliberate fidelity to how the result set has always been presented,
//! not an invariant the upstream data is known to satisfy.

use std::collections::HashMap;

use crate::catalog::DescriptionCatalog;
use crate::models::{GroupSummary, RawRecord};
use crate::normalize::normalize_record;

/// Post-grouping sort order. Every key sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest `firstDate` first.
    Timestamp,
    /// Largest first.
    Size,
    /// Reverse lexicographic hash.
    Hash,
}

impl SortKey {
    /// Parse a query-string sort value. Unrecognized values are `None`,
    /// which leaves first-appearance order untouched.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ts" => Some(SortKey::Timestamp),
            "size" => Some(SortKey::Size),
            "hash" => Some(SortKey::Hash),
            _ => None,
        }
    }
}

/// Group records by content hash, preserving first-appearance order.
///
/// Filenames are lower-cased before insertion and de-duplicated, keeping
/// first-seen order. Timestamps feed the group's `first_date`/`last_date`
/// via min/max. Each record is normalized exactly once on its way into
/// the group's entry list.
pub fn group_records(
    records: &[RawRecord],
    catalog: &DescriptionCatalog,
    origin: &str,
) -> Vec<GroupSummary> {
    let mut groups: Vec<GroupSummary> = Vec::new();
    let mut index_by_hash: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let normalized = normalize_record(record, catalog, origin);
        let filename = record.filename.to_lowercase();

        match index_by_hash.get(record.hash.as_str()) {
            None => {
                index_by_hash.insert(record.hash.as_str(), groups.len());
                groups.push(GroupSummary {
                    filenames: vec![filename],
                    family: record.family.clone(),
                    formatid: record.formatid.clone(),
                    hash: record.hash.clone(),
                    ext: record.ext.clone(),
                    size: record.size,
                    first_date: record.ts,
                    last_date: record.ts,
                    entries: vec![normalized],
                    description: catalog.lookup(&record.hash).map(str::to_string),
                });
            }
            Some(&index) => {
                let group = &mut groups[index];
                group.entries.push(normalized);
                if !group.filenames.contains(&filename) {
                    group.filenames.push(filename);
                }
                group.first_date = group.first_date.min(record.ts);
                group.last_date = group.last_date.max(record.ts);
            }
        }
    }

    groups
}

/// Stable post-pass sort of the grouped projection.
pub fn sort_groups(groups: &mut [GroupSummary], key: SortKey) {
    match key {
        SortKey::Timestamp => groups.sort_by(|a, b| b.first_date.cmp(&a.first_date)),
        SortKey::Size => groups.sort_by(|a, b| b.size.cmp(&a.size)),
        SortKey::Hash => groups.sort_by(|a, b| b.hash.cmp(&a.hash)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://discmaster.textfiles.com";

    fn record(hash: &str, filename: &str, size: i64, ts: i64) -> RawRecord {
        RawRecord {
            ext: "exe".to_string(),
            family: "executable".to_string(),
            filename: filename.to_string(),
            formatid: "exeMz".to_string(),
            hash: hash.to_string(),
            href: format!("/file/1/cd.iso/{}", filename),
            itemid: 1,
            size,
            ts,
            description: None,
        }
    }

    #[test]
    fn test_one_group_per_distinct_hash() {
        let records = vec![
            record("aa", "setup.exe", 100, 10),
            record("bb", "install.exe", 200, 20),
            record("aa", "setup.exe", 100, 30),
            record("cc", "readme.exe", 300, 40),
            record("bb", "install.exe", 200, 50),
        ];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        assert_eq!(groups.len(), 3);
        let total_entries: usize = groups.iter().map(|g| g.entries.len()).sum();
        assert_eq!(total_entries, records.len());
    }

    #[test]
    fn test_projection_keeps_first_appearance_order() {
        let records = vec![
            record("zz", "z.exe", 1, 1),
            record("aa", "a.exe", 2, 2),
            record("mm", "m.exe", 3, 3),
            record("aa", "a.exe", 2, 4),
        ];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        let hashes: Vec<&str> = groups.iter().map(|g| g.hash.as_str()).collect();
        assert_eq!(hashes, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn test_date_range_is_min_max_of_entries() {
        let records = vec![
            record("aa", "app.exe", 100, 500),
            record("aa", "app.exe", 100, 200),
            record("aa", "app.exe", 100, 900),
        ];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first_date, 200);
        assert_eq!(groups[0].last_date, 900);
        assert!(groups[0].first_date <= groups[0].last_date);

        let min_ts = groups[0].entries.iter().map(|e| e.ts).min().unwrap();
        let max_ts = groups[0].entries.iter().map(|e| e.ts).max().unwrap();
        assert_eq!(groups[0].first_date, min_ts);
        assert_eq!(groups[0].last_date, max_ts);
    }

    #[test]
    fn test_size_seeded_from_first_record_only() {
        // Same hash reporting different sizes: the first one sticks
        let records = vec![
            record("aa", "app.exe", 4096, 10),
            record("aa", "app.exe", 9999, 20),
        ];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        assert_eq!(groups[0].size, 4096);
    }

    #[test]
    fn test_filenames_lowercased_and_deduplicated() {
        let records = vec![
            record("aa", "README.TXT", 10, 1),
            record("aa", "readme.txt", 10, 2),
            record("aa", "Readme.Txt", 10, 3),
            record("aa", "LISEZMOI.TXT", 10, 4),
        ];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        assert_eq!(
            groups[0].filenames,
            vec!["readme.txt".to_string(), "lisezmoi.txt".to_string()]
        );
        assert_eq!(groups[0].entries.len(), 4);
    }

    #[test]
    fn test_description_resolved_once_per_group() {
        let catalog = DescriptionCatalog::from_entries(vec![(
            "aa".to_string(),
            "Wolfenstein 3D shareware episode".to_string(),
        )]);
        let records = vec![
            record("aa", "wolf3d.exe", 10, 1),
            record("bb", "other.exe", 10, 2),
        ];
        let groups = group_records(&records, &catalog, ORIGIN);

        assert_eq!(
            groups[0].description.as_deref(),
            Some("Wolfenstein 3D shareware episode")
        );
        assert!(groups[1].description.is_none());
    }

    #[test]
    fn test_entries_are_normalized() {
        let records = vec![record("aa", "app.exe", 10, 1)];
        let catalog = DescriptionCatalog::default();
        let groups = group_records(&records, &catalog, ORIGIN);

        let entry = &groups[0].entries[0];
        assert!(entry.href.starts_with(ORIGIN));
        assert_eq!(entry.parent, "cd.iso");
    }

    #[test]
    fn test_sort_by_timestamp_descending() {
        let records = vec![
            record("aa", "a.exe", 1, 100),
            record("bb", "b.exe", 2, 300),
            record("cc", "c.exe", 3, 200),
        ];
        let catalog = DescriptionCatalog::default();
        let mut groups = group_records(&records, &catalog, ORIGIN);
        sort_groups(&mut groups, SortKey::Timestamp);

        let dates: Vec<i64> = groups.iter().map(|g| g.first_date).collect();
        assert_eq!(dates, vec![300, 200, 100]);
    }

    #[test]
    fn test_sort_by_size_descending() {
        let records = vec![
            record("aa", "a.exe", 10, 1),
            record("bb", "b.exe", 30, 2),
            record("cc", "c.exe", 20, 3),
        ];
        let catalog = DescriptionCatalog::default();
        let mut groups = group_records(&records, &catalog, ORIGIN);
        sort_groups(&mut groups, SortKey::Size);

        let sizes: Vec<i64> = groups.iter().map(|g| g.size).collect();
        assert_eq!(sizes, vec![30, 20, 10]);
    }

    #[test]
    fn test_sort_by_hash_reverse_lexicographic() {
        let records = vec![
            record("0a1b", "a.exe", 1, 1),
            record("ff00", "b.exe", 2, 2),
            record("77aa", "c.exe", 3, 3),
        ];
        let catalog = DescriptionCatalog::default();
        let mut groups = group_records(&records, &catalog, ORIGIN);
        sort_groups(&mut groups, SortKey::Hash);

        let hashes: Vec<&str> = groups.iter().map(|g| g.hash.as_str()).collect();
        assert_eq!(hashes, vec!["ff00", "77aa", "0a1b"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(SortKey::parse("ts"), Some(SortKey::Timestamp));
        assert_eq!(SortKey::parse("size"), Some(SortKey::Size));
        assert_eq!(SortKey::parse("hash"), Some(SortKey::Hash));
        assert_eq!(SortKey::parse("name"), None);
        assert_eq!(SortKey::parse(""), None);
    }

    #[test]
    fn test_empty_input_yields_empty_projection() {
        let catalog = DescriptionCatalog::default();
        assert!(group_records(&[], &catalog, ORIGIN).is_empty());
    }
}
