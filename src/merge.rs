use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::slug::slug_from_title;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Lenient parse covering the spellings seen across the source CSVs.
    /// Anything unrecognized falls back to Easy rather than failing the row.
    pub fn parse_lenient(s: &str) -> Difficulty {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" | "1" => Difficulty::Easy,
            "medium" | "m" | "2" => Difficulty::Medium,
            "hard" | "h" | "3" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Strip the `%` suffix and parse. Empty or unparseable cells become None.
pub fn clean_acceptance(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('%', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Concept display name -> concept_id for the reference table. Names not in
/// the map fall back to a slug derived from the name itself.
pub struct ConceptMap {
    map: HashMap<String, String>,
}

pub const DEFAULT_CONCEPTS: &[(&str, &str)] = &[
    ("two-pointers", "Two Pointers"),
    ("sliding-window", "Sliding Window"),
    ("binary-search", "Binary Search"),
    ("dynamic-programming", "Dynamic Programming"),
    ("backtracking", "Backtracking"),
    ("graph-traversal", "Graph Traversal"),
    ("tree-traversal", "Tree Traversal"),
    ("greedy", "Greedy Algorithm"),
    ("divide-conquer", "Divide and Conquer"),
    ("hash-table", "Hash Table"),
    ("linked-list", "Linked List"),
    ("stack", "Stack"),
    ("queue", "Queue"),
    ("heap", "Heap / Priority Queue"),
    ("trie", "Trie"),
    ("union-find", "Union Find"),
    ("math", "Math & Geometry"),
    ("bit-manipulation", "Bit Manipulation"),
    ("intervals", "Intervals"),
    ("misc", "Miscellaneous"),
];

impl ConceptMap {
    pub fn builtin() -> Self {
        let mut map: HashMap<String, String> = DEFAULT_CONCEPTS
            .iter()
            .map(|(id, name)| (name.to_string(), id.to_string()))
            .collect();
        // Aliases used inconsistently across the source sheets.
        map.insert("Arrays & Hashing".to_string(), "hash-table".to_string());
        map.insert("Misc".to_string(), "misc".to_string());
        ConceptMap { map }
    }

    pub fn resolve(&self, concept: &str) -> String {
        match self.map.get(concept) {
            Some(id) => id.clone(),
            None => slug_from_title(concept),
        }
    }
}

/// One row of the comprehensive catalog CSV. Field order is the output
/// column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveRow {
    pub problem_id: i64,
    pub title: String,
    pub concept: String,
    pub concept_id: String,
    pub difficulty: String,
    pub acceptance_rate: Option<f64>,
    pub popularity: Option<i64>,
    pub leetcode_link: String,
}

pub struct MergeInputs<'a> {
    pub concepts: &'a Path,
    pub questions: &'a Path,
    pub links: &'a Path,
    /// Optional; a missing file degrades to null popularity with a warning.
    pub popularity: Option<&'a Path>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSummary {
    pub titles: usize,
    pub rows_written: usize,
    pub missing_metadata: usize,
    pub missing_links: usize,
}

struct QuestionMeta {
    difficulty: Difficulty,
    acceptance_rate: Option<f64>,
}

/// Join the three source tables into the comprehensive catalog, anchored on
/// the concept table's title set. Every concept-tagged title appears in the
/// output; missing metadata or links produce empty fields, not dropped rows.
/// Multi-concept titles fan out to one row per (title, concept) pair, all
/// sharing the title's problem_id.
pub fn merge_csvs(
    inputs: &MergeInputs,
    concept_map: &ConceptMap,
    out_path: &Path,
) -> anyhow::Result<MergeSummary> {
    let (titles, concepts_by_title) = load_concepts(inputs.concepts)?;
    let question_meta = load_questions(inputs.questions)?;
    let links = load_keyed_column(inputs.links, "LeetCode Link")?;

    let popularity: HashMap<String, i64> = match inputs.popularity {
        Some(path) if path.is_file() => load_keyed_column(path, "popularity")?
            .into_iter()
            .filter_map(|(title, raw)| raw.trim().parse::<i64>().ok().map(|v| (title, v)))
            .collect(),
        Some(path) => {
            log::warn!(
                "popularity file {} not found; popularity will be null",
                path.display()
            );
            HashMap::new()
        }
        None => HashMap::new(),
    };

    let mut wtr = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;

    let mut summary = MergeSummary {
        titles: titles.len(),
        ..MergeSummary::default()
    };

    for (i, title) in titles.iter().enumerate() {
        let problem_id = (i + 1) as i64;
        let meta = question_meta.get(title);
        if meta.is_none() {
            summary.missing_metadata += 1;
        }
        let link = match links.get(title) {
            Some(l) => l.clone(),
            None => {
                summary.missing_links += 1;
                String::new()
            }
        };

        let concept_field = concepts_by_title.get(title).map(String::as_str).unwrap_or("");
        let mut concepts: Vec<&str> = concept_field
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if concepts.is_empty() {
            concepts.push("");
        }

        for concept in concepts {
            let concept_id = if concept.is_empty() {
                String::new()
            } else {
                concept_map.resolve(concept)
            };
            wtr.serialize(ComprehensiveRow {
                problem_id,
                title: title.clone(),
                concept: concept.to_string(),
                concept_id,
                difficulty: meta
                    .map(|m| m.difficulty.as_str().to_string())
                    .unwrap_or_default(),
                acceptance_rate: meta.and_then(|m| m.acceptance_rate),
                popularity: popularity.get(title).copied(),
                leetcode_link: link.clone(),
            })?;
            summary.rows_written += 1;
        }
    }

    wtr.flush().context("failed to flush merged csv")?;
    Ok(summary)
}

/// Read a comprehensive CSV back in (used by SQL seed generation).
pub fn read_comprehensive_csv(path: &Path) -> anyhow::Result<Vec<ComprehensiveRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for rec in rdr.deserialize() {
        rows.push(rec.context("bad comprehensive csv row")?);
    }
    Ok(rows)
}

/// Concepts table: title order is preserved (it drives problem_id
/// assignment); a repeated title keeps its first position but the latest
/// concept value wins.
fn load_concepts(path: &Path) -> anyhow::Result<(Vec<String>, HashMap<String, String>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = rdr.headers().context("failed to read csv header")?.clone();
    let title_idx = column_index(&headers, "Title", path)?;
    let concept_idx = column_index(&headers, "Concept", path)?;

    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, String> = HashMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let title = rec.get(title_idx).unwrap_or("").trim().to_string();
        if title.is_empty() {
            continue;
        }
        let concept = rec.get(concept_idx).unwrap_or("").trim().to_string();
        if !map.contains_key(&title) {
            order.push(title.clone());
        }
        map.insert(title, concept);
    }
    Ok((order, map))
}

fn load_questions(path: &Path) -> anyhow::Result<HashMap<String, QuestionMeta>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = rdr.headers().context("failed to read csv header")?.clone();
    let title_idx = column_index(&headers, "Title", path)?;
    let difficulty_idx = column_index(&headers, "Difficulty", path)?;
    let acceptance_idx = column_index(&headers, "Acceptance", path)?;

    let mut map = HashMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let title = rec.get(title_idx).unwrap_or("").trim().to_string();
        if title.is_empty() {
            continue;
        }
        map.insert(
            title,
            QuestionMeta {
                difficulty: Difficulty::parse_lenient(rec.get(difficulty_idx).unwrap_or("")),
                acceptance_rate: clean_acceptance(rec.get(acceptance_idx).unwrap_or("")),
            },
        );
    }
    Ok(map)
}

/// Generic Title -> <column> loader for the single-value side tables.
fn load_keyed_column(path: &Path, column: &str) -> anyhow::Result<HashMap<String, String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = rdr.headers().context("failed to read csv header")?.clone();
    let title_idx = column_index(&headers, "Title", path)?;
    let value_idx = column_index(&headers, column, path)?;

    let mut map = HashMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let title = rec.get(title_idx).unwrap_or("").trim().to_string();
        if title.is_empty() {
            continue;
        }
        map.insert(title, rec.get(value_idx).unwrap_or("").trim().to_string());
    }
    Ok(map)
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow::anyhow!("{} has no '{}' column", path.display(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_all_source_spellings() {
        assert_eq!(Difficulty::parse_lenient("Easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse_lenient("MEDIUM"), Difficulty::Medium);
        assert_eq!(Difficulty::parse_lenient("h"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_lenient("2"), Difficulty::Medium);
        assert_eq!(Difficulty::parse_lenient("unknown"), Difficulty::Easy);
    }

    #[test]
    fn acceptance_cleaning() {
        assert_eq!(clean_acceptance("49.1%"), Some(49.1));
        assert_eq!(clean_acceptance(" 49.1 "), Some(49.1));
        assert_eq!(clean_acceptance(""), None);
        assert_eq!(clean_acceptance("n/a"), None);
    }

    #[test]
    fn concept_map_resolves_known_names_and_falls_back() {
        let map = ConceptMap::builtin();
        assert_eq!(map.resolve("Hash Table"), "hash-table");
        assert_eq!(map.resolve("Arrays & Hashing"), "hash-table");
        assert_eq!(map.resolve("Heap / Priority Queue"), "heap");
        assert_eq!(map.resolve("Segment Trees"), "segment-trees");
    }
}
