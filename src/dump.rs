use thiserror::Error;

/// Null sentinel used by PostgreSQL textual COPY data.
pub const NULL_SENTINEL: &str = "\\N";

/// Column order of the old single-user `problems` table:
/// id, problem_id, title, concept, difficulty, acceptance_rate, popularity,
/// solved, notes, leetcode_link, solution, created_at, updated_at,
/// similar_problems.
pub const LEGACY_PROBLEM_WIDTH: usize = 14;

/// A missing table and an empty table are different failure domains: the
/// first aborts the run, the second is a valid zero-row migration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DumpError {
    #[error("no COPY block for table '{0}' in dump")]
    TableNotFound(String),
    #[error("COPY block for table '{0}' has no terminating \\. line")]
    UnterminatedBlock(String),
}

#[derive(Debug)]
pub struct CopyBlock {
    pub table: String,
    pub columns: Vec<String>,
    /// Raw tab-delimited data lines, terminator excluded.
    pub rows: Vec<String>,
}

/// Locate the `COPY public.<table> (...) FROM stdin;` header in a textual
/// dump and collect the data lines up to the lone `\.` terminator.
pub fn find_copy_block(dump: &str, table: &str) -> Result<CopyBlock, DumpError> {
    let header_prefix = format!("COPY public.{} (", table);

    let mut lines = dump.lines();
    let mut columns: Vec<String> = Vec::new();
    let mut found = false;
    for line in lines.by_ref() {
        if let Some(rest) = line.strip_prefix(header_prefix.as_str()) {
            let col_list = rest.split(')').next().unwrap_or("");
            columns = col_list
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            found = true;
            break;
        }
    }
    if !found {
        return Err(DumpError::TableNotFound(table.to_string()));
    }

    let mut rows: Vec<String> = Vec::new();
    for line in lines {
        if line == "\\." {
            return Ok(CopyBlock {
                table: table.to_string(),
                columns,
                rows,
            });
        }
        rows.push(line.to_string());
    }
    Err(DumpError::UnterminatedBlock(table.to_string()))
}

/// Split one COPY data line into fields, mapping the `\N` sentinel to None.
/// COPY escape sequences inside values are kept verbatim; downstream SQL
/// generation is responsible for re-escaping them.
pub fn split_fields(line: &str) -> Vec<Option<String>> {
    line.split('\t')
        .map(|f| {
            if f == NULL_SENTINEL {
                None
            } else {
                Some(f.to_string())
            }
        })
        .collect()
}

/// One row of the old `problems` table, typed. The old table mixed the
/// catalog columns with per-user state (solved, notes); both halves are kept
/// here and pulled apart by the importer and the remapper.
#[derive(Debug, Clone)]
pub struct LegacyProblemRow {
    pub problem_id: i64,
    pub title: String,
    pub concept: Option<String>,
    pub difficulty: Option<String>,
    pub acceptance_rate: Option<f64>,
    pub popularity: Option<i64>,
    pub solved: bool,
    pub notes: Option<String>,
    pub leetcode_link: Option<String>,
    pub solution: Option<String>,
}

/// Decode the rows of a `problems` COPY block. Lines narrower than the
/// legacy schema (or with an unparseable problem_id) are counted and
/// skipped; they never abort the run.
pub fn parse_problem_rows(block: &CopyBlock) -> (Vec<LegacyProblemRow>, usize) {
    let mut out: Vec<LegacyProblemRow> = Vec::with_capacity(block.rows.len());
    let mut skipped = 0usize;

    for (i, line) in block.rows.iter().enumerate() {
        let fields = split_fields(line);
        if fields.len() < LEGACY_PROBLEM_WIDTH {
            log::warn!(
                "skipping line {}: {} fields, expected {}",
                i + 1,
                fields.len(),
                LEGACY_PROBLEM_WIDTH
            );
            skipped += 1;
            continue;
        }

        let problem_id = match fields[1].as_deref().and_then(|s| s.parse::<i64>().ok()) {
            Some(v) => v,
            None => {
                log::warn!("skipping line {}: bad problem_id", i + 1);
                skipped += 1;
                continue;
            }
        };

        out.push(LegacyProblemRow {
            problem_id,
            title: fields[2].clone().unwrap_or_default(),
            concept: fields[3].clone(),
            difficulty: fields[4].clone(),
            acceptance_rate: fields[5].as_deref().and_then(|s| s.parse().ok()),
            popularity: fields[6].as_deref().and_then(|s| s.parse().ok()),
            solved: fields[7].as_deref() == Some("t"),
            notes: fields[8].clone(),
            leetcode_link: fields[9].clone(),
            solution: fields[10].clone(),
        });
    }

    (out, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
-- PostgreSQL database dump
COPY public.users (id, email) FROM stdin;
1\tsomeone@example.com
\\.

COPY public.problems (id, problem_id, title, concept, difficulty, acceptance_rate, popularity, solved, notes, leetcode_link, solution, created_at, updated_at, similar_problems) FROM stdin;
1\t1\tTwo Sum\tHash Table\teasy\t49.1\t8000000\tt\t{\"blocks\":[]}\thttps://leetcode.com/problems/two-sum/\t\\N\t2023-01-01\t2023-01-02\t\\N
2\t2\tAdd Two Numbers\tLinked List\tmedium\t\\N\t\\N\tf\t\\N\thttps://leetcode.com/problems/add-two-numbers/\t\\N\t2023-01-01\t2023-01-02\t\\N
short\tline
\\.
";

    #[test]
    fn finds_block_and_columns() {
        let block = find_copy_block(DUMP, "problems").expect("block");
        assert_eq!(block.columns.len(), LEGACY_PROBLEM_WIDTH);
        assert_eq!(block.columns[1], "problem_id");
        assert_eq!(block.rows.len(), 3);
    }

    #[test]
    fn missing_table_is_not_an_empty_table() {
        let err = find_copy_block(DUMP, "user_progress").unwrap_err();
        assert_eq!(err, DumpError::TableNotFound("user_progress".to_string()));

        let empty = "COPY public.problems (id) FROM stdin;\n\\.\n";
        let block = find_copy_block(empty, "problems").expect("empty block is ok");
        assert!(block.rows.is_empty());
    }

    #[test]
    fn unterminated_block_is_reported() {
        let bad = "COPY public.problems (id) FROM stdin;\n1\n2\n";
        let err = find_copy_block(bad, "problems").unwrap_err();
        assert_eq!(err, DumpError::UnterminatedBlock("problems".to_string()));
    }

    #[test]
    fn split_fields_maps_null_sentinel() {
        let fields = split_fields("a\t\\N\t\tb");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].as_deref(), Some("a"));
        assert_eq!(fields[1], None);
        assert_eq!(fields[2].as_deref(), Some(""));
    }

    #[test]
    fn parse_skips_short_lines_without_aborting() {
        let block = find_copy_block(DUMP, "problems").expect("block");
        let (rows, skipped) = parse_problem_rows(&block);
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 1);

        assert_eq!(rows[0].problem_id, 1);
        assert!(rows[0].solved);
        assert_eq!(rows[0].notes.as_deref(), Some("{\"blocks\":[]}"));
        assert_eq!(rows[0].acceptance_rate, Some(49.1));

        assert!(!rows[1].solved);
        assert_eq!(rows[1].notes, None);
        assert_eq!(rows[1].acceptance_rate, None);
    }
}
