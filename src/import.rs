use anyhow::Context;
use chrono::Utc;
use rusqlite::{Connection, Transaction};

use crate::dump::LegacyProblemRow;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportSummary {
    pub problems: usize,
    pub progress: usize,
    pub solved: usize,
    pub with_notes: usize,
}

/// Import parsed legacy rows for one target user: upsert every problem into
/// the catalog, then upsert progress for each row that is solved or carries
/// notes. The whole batch is one transaction; any failure rolls back every
/// write and surfaces the error verbatim.
pub fn import_legacy_rows(
    conn: &Connection,
    rows: &[LegacyProblemRow],
    user_id: i64,
) -> anyhow::Result<ImportSummary> {
    let tx = conn.unchecked_transaction()?;
    let summary = match run(&tx, rows, user_id) {
        Ok(s) => s,
        Err(e) => {
            let _ = tx.rollback();
            return Err(e);
        }
    };
    tx.commit().context("failed to commit import transaction")?;
    Ok(summary)
}

fn run(tx: &Transaction, rows: &[LegacyProblemRow], user_id: i64) -> anyhow::Result<ImportSummary> {
    let mut upsert_problem = tx.prepare(
        "INSERT INTO problems(problem_id, title, concept, difficulty, acceptance_rate,
                              popularity, leetcode_link, solution, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(problem_id) DO UPDATE SET
           title = excluded.title,
           concept = excluded.concept,
           difficulty = excluded.difficulty,
           acceptance_rate = excluded.acceptance_rate,
           popularity = excluded.popularity,
           leetcode_link = excluded.leetcode_link,
           solution = excluded.solution,
           updated_at = excluded.updated_at
         RETURNING id",
    )?;
    let mut upsert_progress = tx.prepare(
        "INSERT INTO user_progress(user_id, problem_id, solved, solved_at, notes, created_at, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(user_id, problem_id) DO UPDATE SET
           solved = excluded.solved,
           solved_at = excluded.solved_at,
           notes = excluded.notes,
           updated_at = excluded.updated_at",
    )?;

    let now = Utc::now().to_rfc3339();
    let mut summary = ImportSummary::default();

    for row in rows {
        let db_id: i64 = upsert_problem.query_row(
            rusqlite::params![
                row.problem_id,
                row.title,
                row.concept,
                row.difficulty,
                row.acceptance_rate,
                row.popularity,
                row.leetcode_link,
                row.solution,
                now,
                now
            ],
            |r| r.get(0),
        )?;
        summary.problems += 1;

        let notes = normalize_notes(row.notes.as_deref());
        if !row.solved && notes.is_none() {
            // No solve, no notes: the row carries no per-user signal.
            continue;
        }

        // solved_at is the import time, not the legacy timestamp. The old
        // schema's solve time was never authoritative.
        let solved_at = if row.solved { Some(now.as_str()) } else { None };

        upsert_progress.execute(rusqlite::params![
            user_id, db_id, row.solved, solved_at, notes, now, now
        ])?;
        summary.progress += 1;
        if row.solved {
            summary.solved += 1;
        }
        if notes.is_some() {
            summary.with_notes += 1;
        }
    }

    Ok(summary)
}

/// Notes are typically a JSON-encoded rich-text document. Values that look
/// like JSON are validated and re-encoded compactly; anything else passes
/// through as-is with a warning. Empty notes are no notes.
fn normalize_notes(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if s.starts_with('{') || s.starts_with('[') {
        match serde_json::from_str::<serde_json::Value>(s) {
            Ok(v) => return Some(v.to_string()),
            Err(e) => log::warn!("notes look like JSON but do not parse ({}); keeping raw text", e),
        }
    }
    Some(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_notes_are_none() {
        assert_eq!(normalize_notes(None), None);
        assert_eq!(normalize_notes(Some("")), None);
        assert_eq!(normalize_notes(Some("   ")), None);
    }

    #[test]
    fn json_notes_are_reencoded() {
        let out = normalize_notes(Some("{\"a\": 1}")).expect("notes");
        assert_eq!(out, "{\"a\":1}");
    }

    #[test]
    fn plain_text_notes_pass_through() {
        assert_eq!(
            normalize_notes(Some("remember the edge case")),
            Some("remember the edge case".to_string())
        );
    }

    #[test]
    fn broken_json_is_kept_raw() {
        assert_eq!(
            normalize_notes(Some("{not json")),
            Some("{not json".to_string())
        );
    }
}
