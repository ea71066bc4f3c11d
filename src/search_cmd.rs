use anyhow::{bail, Result};

use crate::catalog::DescriptionCatalog;
use crate::config::Config;
use crate::count::extract_total;
use crate::group::{group_records, sort_groups, SortKey};
use crate::models::GroupSummary;
use crate::normalize::normalize_record;
use crate::upstream::{collect_pages, UpstreamClient, GROUP_PAGE_LIMIT};

/// Options for a command-line search.
pub struct SearchOptions {
    pub grouped: bool,
    pub sort: Option<String>,
    pub limit: u32,
    pub page: u32,
    pub ts_min: Option<String>,
    pub ts_max: Option<String>,
}

pub async fn run_search(
    config: &Config,
    catalog: &DescriptionCatalog,
    query: &str,
    options: &SearchOptions,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let sort_key = match options.sort.as_deref() {
        Some(value) => match SortKey::parse(value) {
            Some(key) => Some(key),
            None => bail!("Unknown sort key: {}. Use ts, size, or hash.", value),
        },
        None => None,
    };

    let mut params: Vec<(String, String)> = vec![("q".to_string(), query.to_string())];
    if let Some(min) = options.ts_min.as_deref() {
        params.push(("tsMin".to_string(), min.to_string()));
    }
    if let Some(max) = options.ts_max.as_deref() {
        params.push(("tsMax".to_string(), max.to_string()));
    }
    if let Some(value) = options.sort.as_deref() {
        params.push(("sortBy".to_string(), value.to_string()));
    }

    let upstream = UpstreamClient::new(&config.upstream)?;
    let origin = config.upstream.origin.as_str();

    if options.grouped {
        grouped_search(&upstream, catalog, origin, &params, sort_key).await
    } else {
        params.push(("limit".to_string(), options.limit.to_string()));
        params.push(("pageNum".to_string(), options.page.to_string()));
        single_search(&upstream, catalog, origin, &params).await
    }
}

async fn grouped_search(
    upstream: &UpstreamClient,
    catalog: &DescriptionCatalog,
    origin: &str,
    params: &[(String, String)],
    sort_key: Option<SortKey>,
) -> Result<()> {
    let source = upstream.pages(params, GROUP_PAGE_LIMIT);
    let paged = collect_pages(&source).await?;

    let mut groups = group_records(&paged.records, catalog, origin);
    if let Some(key) = sort_key {
        sort_groups(&mut groups, key);
    }

    if groups.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} groups from {} records across {} pages",
        groups.len(),
        paged.records.len(),
        paged.pages_fetched
    );
    if paged.truncated {
        println!("Hit the page cap; counts are a lower bound.");
    }
    println!();

    for (i, group) in groups.iter().enumerate() {
        print_group(i + 1, group);
    }

    Ok(())
}

fn print_group(index: usize, group: &GroupSummary) {
    let first = format_day(group.first_date);
    let last = format_day(group.last_date);
    let seen = if first == last {
        first
    } else {
        format!("{} to {}", first, last)
    };

    println!(
        "{}. [{}] {} ({})",
        index,
        short_hash(&group.hash),
        group.filenames.join(", "),
        group.formatid
    );
    println!(
        "    {} cop{}, {}, seen {}",
        group.entries.len(),
        if group.entries.len() == 1 { "y" } else { "ies" },
        format_bytes(group.size),
        seen
    );
    if let Some(ref description) = group.description {
        println!("    note: {}", description);
    }
    println!();
}

async fn single_search(
    upstream: &UpstreamClient,
    catalog: &DescriptionCatalog,
    origin: &str,
    params: &[(String, String)],
) -> Result<()> {
    let (records, html) = tokio::try_join!(
        upstream.fetch_results(params),
        upstream.fetch_html(params),
    )?;

    if records.is_empty() {
        println!("No results.");
        return Ok(());
    }

    match extract_total(&html) {
        Some(total) => println!("{} results shown ({} total matches)", records.len(), total),
        None => println!("{} results shown (total unknown)", records.len()),
    }
    println!();

    for (i, record) in records.iter().enumerate() {
        let normalized = normalize_record(record, catalog, origin);
        println!(
            "{}. [{}] {} ({}, {})",
            i + 1,
            short_hash(&normalized.hash),
            normalized.filename,
            normalized.family,
            format_bytes(normalized.size)
        );
        println!("    in: {}", normalized.parent);
        println!("    date: {}", format_day(normalized.ts));
        println!("    url: {}", normalized.href);
        if let Some(ref description) = normalized.description {
            println!("    note: {}", description);
        }
        println!();
    }

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: i64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format an epoch-milliseconds timestamp as a calendar day.
fn format_day(ts_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts_millis.to_string())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
