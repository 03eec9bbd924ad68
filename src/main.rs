use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use lcmigrate::merge::{merge_csvs, read_comprehensive_csv, ConceptMap, MergeInputs};
use lcmigrate::slug::SlugOverrides;
use lcmigrate::{db, dump, import, popularity, remap, sqlgen};

#[derive(Parser)]
#[command(
    name = "lcmigrate",
    version,
    about = "CSV cleanup and schema-migration tools for the LeetCode practice tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join the concepts, questions and links CSVs into the comprehensive catalog CSV
    Merge {
        /// CSV with Title and Concept columns; anchors the join and the problem_id order
        #[arg(long)]
        concepts: PathBuf,
        /// CSV with Title, Difficulty and Acceptance columns
        #[arg(long)]
        questions: PathBuf,
        /// CSV with Title and LeetCode Link columns
        #[arg(long)]
        links: PathBuf,
        /// Optional CSV with Title and popularity columns; a missing file degrades to null popularity
        #[arg(long)]
        popularity: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Add a popularity column from the live submission-count API
    Enrich {
        /// Master CSV carrying a LeetCode Link column
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = popularity::LEETCODE_ALL_PROBLEMS_URL)]
        api_url: String,
        /// JSON object of extra slug corrections ({"bad-slug": "good-slug"})
        #[arg(long)]
        overrides: Option<PathBuf>,
    },
    /// Generate idempotent reference-table seed SQL from a comprehensive CSV
    SeedSql {
        #[arg(long)]
        merged: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate the per-user progress upsert script from a legacy dump
    ProgressSql {
        #[arg(long)]
        dump: PathBuf,
        #[arg(long)]
        user_email: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Import problems and one user's progress from a legacy dump into a SQLite database
    Import {
        #[arg(long)]
        dump: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        user_id: i64,
    },
    /// Strip the user-specific columns from a dump's problems rows (catalog-only TSV)
    StripUserColumns {
        #[arg(long)]
        dump: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge {
            concepts,
            questions,
            links,
            popularity,
            out,
        } => {
            let inputs = MergeInputs {
                concepts: &concepts,
                questions: &questions,
                links: &links,
                popularity: popularity.as_deref(),
            };
            let summary = merge_csvs(&inputs, &ConceptMap::builtin(), &out)?;
            log::info!(
                "merged {} titles into {} rows ({} missing metadata, {} missing links) -> {}",
                summary.titles,
                summary.rows_written,
                summary.missing_metadata,
                summary.missing_links,
                out.display()
            );
        }
        Command::Enrich {
            input,
            out,
            api_url,
            overrides,
        } => {
            let mut slug_overrides = SlugOverrides::builtin();
            if let Some(path) = overrides {
                slug_overrides.extend(load_override_file(&path)?);
            }
            log::info!("{} slug corrections active", slug_overrides.len());
            let map = popularity::fetch_popularity_map(&api_url);
            let summary = popularity::enrich_csv(&input, &out, &map, &slug_overrides)?;
            log::info!(
                "enriched {} rows: {} matched, {} not available, {} short rows padded -> {}",
                summary.rows,
                summary.matched,
                summary.not_available,
                summary.short_rows,
                out.display()
            );
        }
        Command::SeedSql { merged, out } => {
            let rows = read_comprehensive_csv(&merged)?;
            let sql = sqlgen::reference_data_sql(&rows);
            std::fs::write(&out, sql)
                .with_context(|| format!("failed to write {}", out.display()))?;
            log::info!("wrote seed SQL for {} catalog rows -> {}", rows.len(), out.display());
        }
        Command::ProgressSql {
            dump: dump_path,
            user_email,
            out,
        } => {
            let rows = load_problem_rows(&dump_path)?;
            let (sql, summary) = sqlgen::progress_upsert_script(&rows, &user_email);
            std::fs::write(&out, sql)
                .with_context(|| format!("failed to write {}", out.display()))?;
            log::info!(
                "emitted {} upserts ({} solved, {} rows without signal omitted) -> {}",
                summary.emitted,
                summary.solved,
                summary.omitted,
                out.display()
            );
        }
        Command::Import {
            dump: dump_path,
            db: db_path,
            user_id,
        } => {
            let rows = load_problem_rows(&dump_path)?;
            let conn = db::open_db(&db_path)?;
            let summary = import::import_legacy_rows(&conn, &rows, user_id)?;
            log::info!(
                "imported {} problems; {} progress rows for user {} ({} solved, {} with notes)",
                summary.problems,
                summary.progress,
                user_id,
                summary.solved,
                summary.with_notes
            );
        }
        Command::StripUserColumns {
            dump: dump_path,
            out,
        } => {
            let text = read_dump(&dump_path)?;
            let block = dump::find_copy_block(&text, "problems")?;
            let (rows, summary) = remap::remap_rows(
                &block.rows,
                dump::LEGACY_PROBLEM_WIDTH,
                remap::CATALOG_DROP_COLUMNS,
            );

            let header = remap::drop_columns(&block.columns, remap::CATALOG_DROP_COLUMNS);
            let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);
            lines.push(header.join("\t"));
            lines.extend(rows.iter().map(|r| r.join("\t")));
            std::fs::write(&out, lines.join("\n") + "\n")
                .with_context(|| format!("failed to write {}", out.display()))?;
            log::info!(
                "remapped {} rows ({} skipped) -> {}",
                summary.kept,
                summary.skipped,
                out.display()
            );
        }
    }
    Ok(())
}

fn read_dump(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dump {}", path.display()))
}

fn load_problem_rows(path: &Path) -> anyhow::Result<Vec<dump::LegacyProblemRow>> {
    let text = read_dump(path)?;
    let block = dump::find_copy_block(&text, "problems")?;
    let (rows, skipped) = dump::parse_problem_rows(&block);
    if skipped > 0 {
        log::warn!("{} malformed dump lines skipped", skipped);
    }
    Ok(rows)
}

fn load_override_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read overrides {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of slug corrections", path.display()))
}
