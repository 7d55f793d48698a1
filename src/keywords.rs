// src/keywords.rs
//! Keyword lists as accepted by the analysis service

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordKind {
    Word,
    Phrase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSpec {
    pub term: String,
    pub kind: KeywordKind,
}

impl KeywordSpec {
    /// Normalize a raw term. Returns `None` when nothing is left after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let term = raw.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }

        let kind = if term.chars().any(char::is_whitespace) {
            KeywordKind::Phrase
        } else {
            KeywordKind::Word
        };

        Some(Self { term, kind })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobKeywords {
    pub required: Vec<KeywordSpec>,
    #[serde(default)]
    pub preferred: Vec<KeywordSpec>,
}

impl JobKeywords {
    pub fn from_lists(required: &str, preferred: &str) -> Self {
        Self {
            required: parse_keyword_list(required),
            preferred: parse_keyword_list(preferred),
        }
    }
}

/// Split a free-text list on commas, semicolons and newlines.
///
/// Duplicates are kept; the service is responsible for collapsing them.
pub fn parse_keyword_list(raw: &str) -> Vec<KeywordSpec> {
    raw.split([',', ';', '\n'])
        .filter_map(KeywordSpec::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_list_classifies_terms() {
        let specs = parse_keyword_list("Rust; Distributed Systems,\nSQL");
        assert_eq!(
            specs,
            vec![
                KeywordSpec {
                    term: "rust".to_string(),
                    kind: KeywordKind::Word
                },
                KeywordSpec {
                    term: "distributed systems".to_string(),
                    kind: KeywordKind::Phrase
                },
                KeywordSpec {
                    term: "sql".to_string(),
                    kind: KeywordKind::Word
                },
            ]
        );
    }

    #[test]
    fn test_parse_keyword_list_drops_empty_terms_keeps_duplicates() {
        let specs = parse_keyword_list(" ,go;;  go \r\n,");
        let terms: Vec<_> = specs.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, vec!["go", "go"]);
    }

    #[test]
    fn test_keyword_spec_wire_format() {
        let keywords = JobKeywords::from_lists("machine learning", "");
        let json = serde_json::to_value(&keywords).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "required": [{"term": "machine learning", "kind": "phrase"}],
                "preferred": []
            })
        );
    }

    #[test]
    fn test_preferred_defaults_to_empty() {
        let keywords: JobKeywords =
            serde_json::from_str(r#"{"required": [{"term": "go", "kind": "word"}]}"#).unwrap();
        assert!(keywords.preferred.is_empty());
    }
}
