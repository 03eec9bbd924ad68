use lcmigrate::dump::{find_copy_block, parse_problem_rows, DumpError};
use lcmigrate::sqlgen::{progress_upsert_script, sql_string_literal};

const DUMP: &str = "\
COPY public.problems (id, problem_id, title, concept, difficulty, acceptance_rate, popularity, solved, notes, leetcode_link, solution, created_at, updated_at, similar_problems) FROM stdin;
1\t1\tTwo Sum\tHash Table\teasy\t49.1\t8000000\tt\t{\"text\":\"it's\\ndone\"}\thttps://leetcode.com/problems/two-sum/\t\\N\t2023-01-01\t2023-01-02\t\\N
2\t2\tAdd Two Numbers\tLinked List\tmedium\t38.5\t\\N\tf\t\\N\thttps://leetcode.com/problems/add-two-numbers/\t\\N\t2023-01-01\t2023-01-02\t\\N
\\.
";

#[test]
fn missing_table_and_empty_table_are_distinguishable() {
    // No user_progress block anywhere: a hard "table not found".
    match find_copy_block(DUMP, "user_progress") {
        Err(DumpError::TableNotFound(t)) => assert_eq!(t, "user_progress"),
        other => panic!("expected TableNotFound, got {:?}", other),
    }

    // A present-but-empty block is a valid zero-row result.
    let empty_dump = "COPY public.user_progress (id) FROM stdin;\n\\.\n";
    let block = find_copy_block(empty_dump, "user_progress").expect("empty block");
    assert_eq!(block.rows.len(), 0);
}

#[test]
fn dump_rows_become_an_idempotent_upsert_script() {
    let block = find_copy_block(DUMP, "problems").expect("block");
    let (rows, _) = parse_problem_rows(&block);

    let (sql, summary) = progress_upsert_script(&rows, "quanglam");
    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.solved, 1);
    assert_eq!(summary.omitted, 1);

    assert!(sql.contains("WHERE email LIKE '%quanglam%'"));
    assert!(sql.contains("ON CONFLICT (user_id, problem_id) DO UPDATE"));
    // The notes JSON keeps its quote and its backslash escape intact.
    assert!(sql.contains("E'{\"text\":\"it''s\\\\ndone\"}'"));
}

/// Inverse of the PostgreSQL escape-string literal: what the server stores
/// after parsing `E'...'` (or `'...'`). Used to round-trip the policy.
fn decode_literal(lit: &str) -> String {
    let inner = lit
        .strip_prefix("E'")
        .or_else(|| lit.strip_prefix('\''))
        .and_then(|s| s.strip_suffix('\''))
        .expect("quoted literal");
    let escaped = lit.starts_with("E'");

    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\\' if escaped && chars.peek() == Some(&'\\') => {
                chars.next();
                out.push('\\');
            }
            c => out.push(c),
        }
    }
    out
}

#[test]
fn escaping_round_trips_quotes_and_backslashes() {
    // Both hazards at once: a quote and a backslash-escaped newline, as seen
    // in JSON-encoded notes lifted from a dump.
    let original = "{\"text\":\"it's\\nfine\"}";
    let literal = sql_string_literal(original);
    assert_eq!(decode_literal(&literal), original);

    let plain = "no hazards here";
    assert_eq!(decode_literal(&sql_string_literal(plain)), plain);

    let quotes_only = "it's a 'quote'";
    assert_eq!(decode_literal(&sql_string_literal(quotes_only)), quotes_only);
}
