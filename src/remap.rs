//! Positional column surgery on fixed-order records, for reshaping legacy
//! dump rows to a target schema.

/// Positions of the per-user and bookkeeping columns in the legacy
/// `problems` order: id, solved, notes, created_at, updated_at,
/// similar_problems. Dropping them leaves the catalog columns the new
/// `problems` table keeps.
pub const CATALOG_DROP_COLUMNS: &[usize] = &[0, 7, 8, 11, 12, 13];

#[derive(Debug, Clone, Copy, Default)]
pub struct RemapSummary {
    pub kept: usize,
    pub skipped: usize,
}

/// Remove the given positions from a record, preserving the relative order
/// of everything else.
pub fn drop_columns<T: Clone>(fields: &[T], drop: &[usize]) -> Vec<T> {
    fields
        .iter()
        .enumerate()
        .filter(|(i, _)| !drop.contains(i))
        .map(|(_, f)| f.clone())
        .collect()
}

/// Remap a batch of raw tab-delimited lines. Records narrower than
/// `expected_width` are skipped and counted, never indexed into.
pub fn remap_rows(
    rows: &[String],
    expected_width: usize,
    drop: &[usize],
) -> (Vec<Vec<String>>, RemapSummary) {
    let mut out: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    let mut summary = RemapSummary::default();

    for (i, row) in rows.iter().enumerate() {
        let fields: Vec<String> = row.split('\t').map(str::to_string).collect();
        if fields.len() < expected_width {
            log::warn!(
                "skipping record {}: {} fields, expected at least {}",
                i + 1,
                fields.len(),
                expected_width
            );
            summary.skipped += 1;
            continue;
        }
        out.push(drop_columns(&fields, drop));
        summary.kept += 1;
    }

    (out, summary)
}
