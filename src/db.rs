use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the migration target: a canonical `problems` catalog
/// and per-user `user_progress`, related by the catalog's row id.
pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS problems(
            id INTEGER PRIMARY KEY,
            problem_id INTEGER NOT NULL UNIQUE,
            title TEXT NOT NULL,
            concept TEXT,
            difficulty TEXT,
            acceptance_rate REAL,
            popularity INTEGER,
            leetcode_link TEXT,
            solution TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_problems_title ON problems(title)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_progress(
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            problem_id INTEGER NOT NULL,
            solved INTEGER NOT NULL DEFAULT 0,
            solved_at TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, problem_id),
            FOREIGN KEY(problem_id) REFERENCES problems(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_progress_user ON user_progress(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_progress_problem ON user_progress(problem_id)",
        [],
    )?;

    Ok(conn)
}
