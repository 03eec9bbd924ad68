use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::slug::{slug_from_url, SlugOverrides};

pub const LEETCODE_ALL_PROBLEMS_URL: &str = "https://leetcode.com/api/problems/all/";

/// Rendered into CSV cells when no variant matches.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct AllProblems {
    stat_status_pairs: Vec<StatStatusPair>,
}

#[derive(Debug, Deserialize)]
struct StatStatusPair {
    stat: Stat,
}

#[derive(Debug, Deserialize)]
struct Stat {
    #[serde(rename = "question__title_slug")]
    title_slug: String,
    total_submitted: i64,
}

/// Fetch the slug -> total-submissions map. Any failure (network, non-2xx,
/// bad JSON) degrades to an empty map with a warning; enrichment is
/// best-effort and never fails the run.
pub fn fetch_popularity_map(url: &str) -> HashMap<String, i64> {
    match try_fetch(url) {
        Ok(map) => {
            log::info!("fetched submission counts for {} problems", map.len());
            map
        }
        Err(e) => {
            log::warn!("popularity fetch failed, continuing without it: {:#}", e);
            HashMap::new()
        }
    }
}

fn try_fetch(url: &str) -> anyhow::Result<HashMap<String, i64>> {
    let body: AllProblems = reqwest::blocking::get(url)
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .json()
        .context("invalid problems payload")?;
    Ok(body
        .stat_status_pairs
        .into_iter()
        .map(|p| (p.stat.title_slug, p.stat.total_submitted))
        .collect())
}

fn hyphens_removed(s: &str) -> String {
    s.replace('-', "")
}

fn hyphens_to_underscores(s: &str) -> String {
    s.replace('-', "_")
}

fn lowercased(s: &str) -> String {
    s.to_ascii_lowercase()
}

fn roman_two_to_digit(s: &str) -> String {
    s.replace("ii", "2")
}

fn digit_to_roman_two(s: &str) -> String {
    s.replace('2', "ii")
}

/// Fallback spellings tried after an exact match misses, in this order.
/// First hit wins; this is a best-effort heuristic, not a guaranteed-correct
/// match, and the ordering is part of the contract.
const VARIANTS: &[fn(&str) -> String] = &[
    hyphens_removed,
    hyphens_to_underscores,
    lowercased,
    roman_two_to_digit,
    digit_to_roman_two,
];

/// Resolve a slug against the popularity map: exact match, then each
/// variant in order, then None.
pub fn lookup(slug: &str, map: &HashMap<String, i64>) -> Option<i64> {
    if slug.is_empty() {
        return None;
    }
    if let Some(v) = map.get(slug) {
        return Some(*v);
    }
    for variant in VARIANTS {
        if let Some(v) = map.get(variant(slug).as_str()) {
            return Some(*v);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichSummary {
    pub rows: usize,
    pub matched: usize,
    pub not_available: usize,
    pub short_rows: usize,
}

/// Read a master CSV carrying a `LeetCode Link` column and write it back out
/// with a `popularity` column inserted directly after the link column.
/// Rows too short to carry a link are kept, padded with empty fields and the
/// `N/A` sentinel; enrichment never shrinks the dataset.
pub fn enrich_csv(
    input: &Path,
    output: &Path,
    map: &HashMap<String, i64>,
    overrides: &SlugOverrides,
) -> anyhow::Result<EnrichSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;

    let headers = rdr.headers().context("failed to read csv header")?.clone();
    let link_idx = headers
        .iter()
        .position(|h| h == "LeetCode Link")
        .ok_or_else(|| anyhow::anyhow!("input csv has no 'LeetCode Link' column"))?;

    let mut wtr = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut out_header: Vec<&str> = Vec::with_capacity(headers.len() + 1);
    for (i, h) in headers.iter().enumerate() {
        out_header.push(h);
        if i == link_idx {
            out_header.push("popularity");
        }
    }
    wtr.write_record(&out_header)?;

    let mut summary = EnrichSummary::default();
    for (row_no, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("failed to read row {}", row_no + 1))?;
        if rec.len() < headers.len() {
            log::warn!(
                "row {} has {} of {} fields; padding",
                row_no + 1,
                rec.len(),
                headers.len()
            );
            summary.short_rows += 1;
        }

        let slug = slug_from_url(rec.get(link_idx).unwrap_or(""), overrides);
        let popularity = lookup(&slug, map);
        match popularity {
            Some(_) => summary.matched += 1,
            None => summary.not_available += 1,
        }
        let popularity = popularity
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let mut out_row: Vec<&str> = Vec::with_capacity(headers.len() + 1);
        for i in 0..headers.len() {
            out_row.push(rec.get(i).unwrap_or(""));
            if i == link_idx {
                out_row.push(&popularity);
            }
        }
        wtr.write_record(&out_row)?;
        summary.rows += 1;
    }

    wtr.flush().context("failed to flush output csv")?;
    Ok(summary)
}
