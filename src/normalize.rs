//! Per-record normalization of upstream search hits.
//!
//! Turns one [`RawRecord`] into a [`NormalizedRecord`]: the relative link
//! becomes absolute, the containing folder is derived from the link path,
//! and the catalog description for the record's hash is attached. Pure
//! shape transformation: nothing here can fail, and absent values
//! (unknown hash, malformed link) come out as empty or `None` rather than
//! errors.

use percent_encoding::percent_decode_str;

use crate::catalog::DescriptionCatalog;
use crate::models::{NormalizedRecord, RawRecord};

/// Normalize a single upstream record.
///
/// `origin` must not carry a trailing slash (config loading guarantees
/// this) so the absolute link is `origin` + relative `href`.
pub fn normalize_record(
    record: &RawRecord,
    catalog: &DescriptionCatalog,
    origin: &str,
) -> NormalizedRecord {
    NormalizedRecord {
        ext: record.ext.clone(),
        family: record.family.clone(),
        filename: record.filename.clone(),
        formatid: record.formatid.clone(),
        hash: record.hash.clone(),
        href: format!("{}{}", origin, record.href),
        itemid: record.itemid,
        size: record.size,
        ts: record.ts,
        parent: parent_label(&record.href),
        description: catalog.lookup(&record.hash).map(str::to_string),
    }
}

/// Derive the parent-folder label from a relative link.
///
/// The second-to-last path segment is percent-decoded; a segment with no
/// `.` in it is taken to be a directory and gets a trailing `/`. Archive
/// members live under their container file (e.g. `disk.img`), which keeps
/// its dot; plain directories do not.
pub fn parent_label(href: &str) -> String {
    let segments: Vec<&str> = href.split('/').collect();
    let raw = if segments.len() >= 2 {
        segments[segments.len() - 2]
    } else {
        ""
    };

    let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();
    if decoded.contains('.') {
        decoded
    } else {
        format!("{}/", decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_href(href: &str) -> RawRecord {
        RawRecord {
            ext: "txt".to_string(),
            family: "text".to_string(),
            filename: "README.TXT".to_string(),
            formatid: "textPlain".to_string(),
            hash: "cafe0123".to_string(),
            href: href.to_string(),
            itemid: 42,
            size: 1_024,
            ts: 694_224_000_000,
            description: None,
        }
    }

    #[test]
    fn test_parent_from_container_file_keeps_name() {
        assert_eq!(parent_label("/file/1/archive.zip/file.txt"), "archive.zip");
    }

    #[test]
    fn test_parent_directory_gets_trailing_slash() {
        assert_eq!(parent_label("/file/1/SomeFolder/file.txt"), "SomeFolder/");
    }

    #[test]
    fn test_parent_is_percent_decoded() {
        assert_eq!(
            parent_label("/file/1/My%20Disk%20Images/boot.img"),
            "My Disk Images/"
        );
        assert_eq!(parent_label("/file/1/v1%2E0/boot.img"), "v1.0");
    }

    #[test]
    fn test_parent_of_bare_filename_is_slash() {
        // No containing segment at all: decodes to empty, rendered as a
        // bare directory separator
        assert_eq!(parent_label("file.txt"), "/");
        assert_eq!(parent_label("/file.txt"), "/");
    }

    #[test]
    fn test_absolute_link_prefixes_origin() {
        let record = record_with_href("/file/1/disk.iso/readme.txt");
        let catalog = DescriptionCatalog::default();
        let normalized = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        assert_eq!(
            normalized.href,
            "https://discmaster.textfiles.com/file/1/disk.iso/readme.txt"
        );
    }

    #[test]
    fn test_description_attached_from_catalog() {
        let record = record_with_href("/file/1/disk.iso/readme.txt");
        let catalog = DescriptionCatalog::from_entries(vec![(
            "cafe0123".to_string(),
            "Shareware registration form".to_string(),
        )]);
        let normalized = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        assert_eq!(
            normalized.description.as_deref(),
            Some("Shareware registration form")
        );
    }

    #[test]
    fn test_unknown_hash_has_no_description() {
        let record = record_with_href("/file/1/disk.iso/readme.txt");
        let catalog = DescriptionCatalog::default();
        let normalized = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        assert!(normalized.description.is_none());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let record = record_with_href("/file/1/Apps%20Disk/install.exe");
        let catalog =
            DescriptionCatalog::from_entries(vec![("cafe0123".to_string(), "Installer".to_string())]);
        let first = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        let second = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        assert_eq!(first, second);
    }

    #[test]
    fn test_raw_fields_carried_through() {
        let record = record_with_href("/file/1/disk.iso/readme.txt");
        let catalog = DescriptionCatalog::default();
        let normalized = normalize_record(&record, &catalog, "https://discmaster.textfiles.com");
        assert_eq!(normalized.filename, record.filename);
        assert_eq!(normalized.hash, record.hash);
        assert_eq!(normalized.itemid, record.itemid);
        assert_eq!(normalized.size, record.size);
        assert_eq!(normalized.ts, record.ts);
    }
}
