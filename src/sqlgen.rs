//! Idempotent SQL generation for the multi-user schema, plus the escaping
//! policy for values lifted out of a textual dump.

use std::collections::BTreeSet;

use crate::dump::LegacyProblemRow;
use crate::merge::{ComprehensiveRow, DEFAULT_CONCEPTS};

/// Quote a string for a PostgreSQL literal. Single quotes are doubled;
/// backslashes are doubled and the literal switches to the `E''` form so
/// the stored value keeps them verbatim. Notes lifted from a dump carry
/// JSON with embedded `\n` sequences, and under-escaping those corrupts the
/// JSON once it lands in the new schema.
pub fn sql_string_literal(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "''");
    if s.contains('\\') {
        format!("E'{}'", escaped)
    } else {
        format!("'{}'", escaped)
    }
}

fn sql_opt_text(v: Option<&str>) -> String {
    match v {
        Some(s) => sql_string_literal(s),
        None => "NULL".to_string(),
    }
}

fn sql_opt_display<T: std::fmt::Display>(v: Option<T>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "NULL".to_string(),
    }
}

/// Seed the concepts reference table from the merged catalog plus the
/// built-in defaults. Duplicate concept_ids resolve at insert time via the
/// conflict clause.
pub fn concepts_seed_sql(rows: &[ComprehensiveRow]) -> String {
    let mut concepts: BTreeSet<(String, String)> = rows
        .iter()
        .filter(|r| !r.concept_id.is_empty() && !r.concept.is_empty())
        .map(|r| (r.concept_id.clone(), r.concept.clone()))
        .collect();
    for (id, name) in DEFAULT_CONCEPTS {
        concepts.insert((id.to_string(), name.to_string()));
    }

    let mut sql = String::from("-- Insert concepts\n");
    sql.push_str("INSERT INTO concepts (concept_id, name) VALUES\n");
    let values: Vec<String> = concepts
        .iter()
        .map(|(id, name)| {
            format!(
                "    ({}, {})",
                sql_string_literal(id),
                sql_string_literal(name)
            )
        })
        .collect();
    sql.push_str(&values.join(",\n"));
    sql.push_str("\nON CONFLICT (concept_id) DO NOTHING;\n\n");
    sql
}

const TECHNIQUES: &[(&str, &str)] = &[
    ("Fast and Slow Pointers", "Use two pointers moving at different speeds"),
    ("Left and Right Pointers", "Use pointers from both ends moving towards center"),
    ("Sliding Window Fixed Size", "Maintain a window of fixed size"),
    ("Sliding Window Variable Size", "Expand and contract window based on conditions"),
    ("Binary Search on Answer", "Use binary search to find optimal value"),
    ("Memoization", "Cache results of expensive function calls"),
    ("Tabulation", "Build up solution using iterative approach"),
    ("DFS Recursive", "Depth-first search using recursion"),
    ("BFS Iterative", "Breadth-first search using queue"),
    ("Backtrack with Pruning", "Backtracking with early termination"),
    ("Hash Map", "Use hash map for O(1) lookups"),
    ("Sorting", "Sort the input to simplify the problem"),
    ("Greedy", "Make locally optimal choices"),
    ("Union Find", "Use disjoint set data structure"),
    ("Monotonic Stack", "Maintain stack with monotonic property"),
    ("Prefix Sum", "Use prefix sums for range queries"),
    ("Two Heaps", "Use two heaps for median finding"),
    ("Topological Sort", "Sort nodes in DAG"),
];

const GOALS: &[(&str, &str)] = &[
    ("Find Target", "Locate a specific element or value"),
    ("Optimize Path", "Find shortest or optimal path"),
    ("Count Occurrences", "Count number of valid solutions"),
    ("Minimize Cost", "Find solution with minimum cost"),
    ("Maximize Profit", "Find solution with maximum benefit"),
    ("Detect Cycle", "Identify cycles in data structure"),
    ("Validate Structure", "Check if structure meets criteria"),
    ("Transform Data", "Convert data from one form to another"),
    ("Partition Elements", "Divide elements based on criteria"),
    ("Generate Combinations", "Create all valid combinations"),
    ("Merge Intervals", "Merge overlapping intervals"),
    ("Find Duplicates", "Identify duplicate elements"),
    ("Check Palindrome", "Verify if string/array is palindrome"),
    ("Find Peak", "Find peak element in array"),
    ("Validate Parentheses", "Check if parentheses are balanced"),
    ("Find Intersection", "Find intersection of arrays/lists"),
];

const TEMPLATES: &[(&str, &str)] = &[
    (
        "Two Pointers Template",
        "def two_pointers(arr):\n    left, right = 0, len(arr) - 1\n    while left < right:\n        if condition:\n            left += 1\n        else:\n            right -= 1\n    return result",
    ),
    (
        "Binary Search Template",
        "def binary_search(arr, target):\n    left, right = 0, len(arr) - 1\n    while left <= right:\n        mid = (left + right) // 2\n        if arr[mid] == target:\n            return mid\n        elif arr[mid] < target:\n            left = mid + 1\n        else:\n            right = mid - 1\n    return -1",
    ),
    (
        "DFS Template",
        "def dfs(node, visited):\n    if not node or node in visited:\n        return\n    visited.add(node)\n    for neighbor in node.neighbors:\n        dfs(neighbor, visited)",
    ),
    (
        "Hash Map Template",
        "def hash_map_solution(arr):\n    count_map = {}\n    for num in arr:\n        count_map[num] = count_map.get(num, 0) + 1\n    return result",
    ),
];

fn named_pairs_seed_sql(comment: &str, table: &str, columns: &str, pairs: &[(&str, &str)], conflict: &str) -> String {
    let mut sql = format!("-- {}\n", comment);
    sql.push_str(&format!("INSERT INTO {} ({}) VALUES\n", table, columns));
    let values: Vec<String> = pairs
        .iter()
        .map(|(a, b)| format!("    ({}, {})", sql_string_literal(a), sql_string_literal(b)))
        .collect();
    sql.push_str(&values.join(",\n"));
    sql.push_str(&format!("\n{};\n\n", conflict));
    sql
}

pub fn techniques_seed_sql() -> String {
    named_pairs_seed_sql(
        "Insert techniques",
        "techniques",
        "name, description",
        TECHNIQUES,
        "ON CONFLICT (name) DO NOTHING",
    )
}

pub fn goals_seed_sql() -> String {
    named_pairs_seed_sql(
        "Insert goals",
        "goals",
        "name, description",
        GOALS,
        "ON CONFLICT (name) DO NOTHING",
    )
}

pub fn templates_seed_sql() -> String {
    named_pairs_seed_sql(
        "Insert template basics",
        "template_basics",
        "description, template_code",
        TEMPLATES,
        "ON CONFLICT DO NOTHING",
    )
}

/// Seed the problems catalog from the merged CSV. Fan-out rows share a
/// problem_id; the conflict clause keeps the first and drops the rest.
pub fn problems_seed_sql(rows: &[ComprehensiveRow]) -> String {
    let mut sql = String::from("-- Insert problems\n");
    if rows.is_empty() {
        return sql;
    }
    sql.push_str(
        "INSERT INTO problems (problem_id, title, concept, difficulty, acceptance_rate, popularity, leetcode_link) VALUES\n",
    );
    let values: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "    ({}, {}, {}, {}, {}, {}, {})",
                r.problem_id,
                sql_string_literal(&r.title),
                sql_opt_text(non_empty(&r.concept)),
                sql_string_literal(&r.difficulty),
                sql_opt_display(r.acceptance_rate),
                sql_opt_display(r.popularity),
                sql_opt_text(non_empty(&r.leetcode_link)),
            )
        })
        .collect();
    sql.push_str(&values.join(",\n"));
    sql.push_str("\nON CONFLICT (problem_id) DO NOTHING;\n\n");
    sql
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Everything `seed-sql` writes: concepts, techniques, goals, templates,
/// and the problems catalog, all safe to re-run.
pub fn reference_data_sql(rows: &[ComprehensiveRow]) -> String {
    let mut sql = String::from(
        "-- Reference data for the multi-user schema.\n-- Generated by lcmigrate; safe to apply repeatedly.\n\n",
    );
    sql.push_str(&concepts_seed_sql(rows));
    sql.push_str(&techniques_seed_sql());
    sql.push_str(&goals_seed_sql());
    sql.push_str(&templates_seed_sql());
    sql.push_str(&problems_seed_sql(rows));
    sql
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressScriptSummary {
    pub emitted: usize,
    pub solved: usize,
    pub omitted: usize,
}

/// Build the per-user progress upsert script from parsed legacy rows. Only
/// rows that are solved or carry notes are emitted; the rest hold no signal.
/// The script resolves the target user by email at apply time and re-running
/// it reproduces the same end state.
pub fn progress_upsert_script(
    rows: &[LegacyProblemRow],
    user_email: &str,
) -> (String, ProgressScriptSummary) {
    let email_like = format!("'%{}%'", user_email.replace('\'', "''"));

    let mut sql = String::new();
    sql.push_str(&format!("-- Import user progress for user: {}\n", user_email));
    sql.push_str("DO $$\n");
    sql.push_str("DECLARE\n");
    sql.push_str("  target_user_id BIGINT;\n");
    sql.push_str("BEGIN\n");
    sql.push_str(&format!(
        "  SELECT id INTO target_user_id FROM users WHERE email LIKE {} LIMIT 1;\n\n",
        email_like
    ));
    sql.push_str("  IF target_user_id IS NULL THEN\n");
    sql.push_str(&format!(
        "    RAISE EXCEPTION 'User with email containing {} not found';\n",
        user_email.replace('\'', "''")
    ));
    sql.push_str("  END IF;\n\n");

    let mut summary = ProgressScriptSummary::default();
    for row in rows {
        let notes = row.notes.as_deref().filter(|n| !n.is_empty());
        if !row.solved && notes.is_none() {
            summary.omitted += 1;
            continue;
        }

        let solved_literal = if row.solved { "TRUE" } else { "FALSE" };
        // solved_at is set at import time, deliberately not carried over
        // from the legacy timestamps.
        let solved_at = if row.solved { "CURRENT_TIMESTAMP" } else { "NULL" };

        sql.push_str(&format!("  -- Problem ID: {}\n", row.problem_id));
        sql.push_str(
            "  INSERT INTO user_progress (user_id, problem_id, solved, notes, solved_at, updated_at)\n",
        );
        sql.push_str(&format!(
            "  VALUES (target_user_id, {}, {}, {}, {}, CURRENT_TIMESTAMP)\n",
            row.problem_id,
            solved_literal,
            sql_opt_text(notes),
            solved_at
        ));
        sql.push_str("  ON CONFLICT (user_id, problem_id) DO UPDATE\n");
        sql.push_str("    SET solved = EXCLUDED.solved,\n");
        sql.push_str("        notes = EXCLUDED.notes,\n");
        sql.push_str("        solved_at = EXCLUDED.solved_at,\n");
        sql.push_str("        updated_at = CURRENT_TIMESTAMP;\n\n");

        summary.emitted += 1;
        if row.solved {
            summary.solved += 1;
        }
    }

    sql.push_str("END $$;\n");
    (sql, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_row(problem_id: i64, solved: bool, notes: Option<&str>) -> LegacyProblemRow {
        LegacyProblemRow {
            problem_id,
            title: format!("Problem {}", problem_id),
            concept: None,
            difficulty: None,
            acceptance_rate: None,
            popularity: None,
            solved,
            notes: notes.map(str::to_string),
            leetcode_link: None,
            solution: None,
        }
    }

    #[test]
    fn plain_strings_double_quotes_only() {
        assert_eq!(sql_string_literal("it's"), "'it''s'");
        assert_eq!(sql_string_literal("plain"), "'plain'");
    }

    #[test]
    fn backslashes_switch_to_escape_literal_and_double() {
        // Two source characters: backslash, n. The literal must keep both.
        assert_eq!(sql_string_literal("a\\nb"), "E'a\\\\nb'");
        // Both hazards at once, the case that corrupted embedded JSON.
        assert_eq!(
            sql_string_literal("{\"text\":\"it's\\nfine\"}"),
            "E'{\"text\":\"it''s\\\\nfine\"}'"
        );
    }

    #[test]
    fn progress_script_emits_only_signal_rows() {
        let rows = vec![
            legacy_row(1, true, None),
            legacy_row(2, false, Some("{\"blocks\":[]}")),
            legacy_row(3, false, None),
            legacy_row(4, false, Some("")),
        ];
        let (sql, summary) = progress_upsert_script(&rows, "someone");
        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.solved, 1);
        assert_eq!(summary.omitted, 2);

        assert!(sql.contains("ON CONFLICT (user_id, problem_id) DO UPDATE"));
        assert!(sql.contains("VALUES (target_user_id, 1, TRUE, NULL, CURRENT_TIMESTAMP"));
        assert!(sql.contains("VALUES (target_user_id, 2, FALSE, '{\"blocks\":[]}', NULL"));
        assert!(!sql.contains("target_user_id, 3"));
    }

    #[test]
    fn progress_script_escapes_notes_with_backslashes() {
        let rows = vec![legacy_row(7, true, Some("line one\\nline two"))];
        let (sql, _) = progress_upsert_script(&rows, "someone");
        assert!(sql.contains("E'line one\\\\nline two'"));
    }

    #[test]
    fn concepts_seed_includes_defaults_and_is_idempotent() {
        let sql = concepts_seed_sql(&[]);
        assert!(sql.contains("('hash-table', 'Hash Table')"));
        assert!(sql.contains("ON CONFLICT (concept_id) DO NOTHING;"));
    }

    #[test]
    fn problems_seed_handles_missing_fields() {
        let rows = vec![ComprehensiveRow {
            problem_id: 1,
            title: "Two Sum".to_string(),
            concept: String::new(),
            concept_id: String::new(),
            difficulty: "easy".to_string(),
            acceptance_rate: None,
            popularity: Some(8_000_000),
            leetcode_link: "https://leetcode.com/problems/two-sum/".to_string(),
        }];
        let sql = problems_seed_sql(&rows);
        assert!(sql.contains("(1, 'Two Sum', NULL, 'easy', NULL, 8000000, 'https://leetcode.com/problems/two-sum/')"));
        assert!(sql.contains("ON CONFLICT (problem_id) DO NOTHING;"));
    }
}
