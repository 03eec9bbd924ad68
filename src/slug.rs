use std::collections::HashMap;

/// Manual corrections for slugs whose title-derived form does not match the
/// slug the LeetCode API uses (renamed problems, roman-numeral suffixes,
/// pluralization quirks). Built once and passed into whatever needs it.
pub struct SlugOverrides {
    map: HashMap<String, String>,
}

impl SlugOverrides {
    pub fn empty() -> Self {
        SlugOverrides {
            map: HashMap::new(),
        }
    }

    /// The corrections accumulated while matching the master CSV against the
    /// live API. Keys are slugs as produced by `slug_from_url`.
    pub fn builtin() -> Self {
        let pairs = [
            ("longest-arithmetic-sequence", "longest-arithmetic-subsequence"),
            ("array-partition-i", "array-partition"),
            ("coin-change-2", "coin-change-ii"),
            ("top-travellersnew", "top-travellers"),
        ];
        SlugOverrides {
            map: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Extend with entries loaded from an operator-supplied JSON object
    /// (`{"bad-slug": "good-slug", ...}`). Later entries win.
    pub fn extend(&mut self, extra: HashMap<String, String>) {
        self.map.extend(extra);
    }

    pub fn apply<'a>(&'a self, slug: &'a str) -> &'a str {
        self.map.get(slug).map(String::as_str).unwrap_or(slug)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Canonical slug from a problem URL: last non-empty path segment,
/// lowercased, with everything outside `[a-z0-9_-]` stripped, then the
/// override table applied. Malformed input yields an empty string.
pub fn slug_from_url(url: &str, overrides: &SlugOverrides) -> String {
    let trimmed = url.trim().trim_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or("");
    let slug: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();
    overrides.apply(&slug).to_string()
}

/// Slug from a display title: lowercase, spaces and slashes become hyphens,
/// ampersands vanish, runs of hyphens collapse. Used for concept ids and
/// for deriving links from titles.
pub fn slug_from_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.trim().to_ascii_lowercase().chars() {
        match c {
            ' ' | '/' => {
                if !out.ends_with('-') {
                    out.push('-');
                }
            }
            '&' => {}
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => {
                if c == '-' && out.ends_with('-') {
                    continue;
                }
                out.push(c);
            }
            _ => {}
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_url_takes_last_segment() {
        let ov = SlugOverrides::empty();
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/two-sum/", &ov),
            "two-sum"
        );
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/two-sum", &ov),
            "two-sum"
        );
    }

    #[test]
    fn slug_from_url_strips_special_characters() {
        let ov = SlugOverrides::empty();
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/all-o`one-data-structure/", &ov),
            "all-oone-data-structure"
        );
    }

    #[test]
    fn slug_from_url_never_fails_on_malformed_input() {
        let ov = SlugOverrides::empty();
        assert_eq!(slug_from_url("", &ov), "");
        assert_eq!(slug_from_url("///", &ov), "");
    }

    #[test]
    fn slug_from_url_applies_overrides() {
        let ov = SlugOverrides::builtin();
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/coin-change-2/", &ov),
            "coin-change-ii"
        );
    }

    #[test]
    fn slug_from_title_handles_punctuation() {
        assert_eq!(slug_from_title("Hash Table"), "hash-table");
        assert_eq!(slug_from_title("Two Pointers"), "two-pointers");
        assert_eq!(slug_from_title("Heap / Priority Queue"), "heap-priority-queue");
        assert_eq!(slug_from_title("Math & Geometry"), "math-geometry");
        assert_eq!(slug_from_title(""), "");
    }
}
