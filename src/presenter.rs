// src/presenter.rs
//! Flattens an analysis result into display tags

use serde::Serialize;

use crate::types::AnalysisResult;

pub const PASS_BANNER: &str = "PASS: All required keywords present";
pub const FAIL_BANNER: &str = "Missing required keywords";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Required,
    Preferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStatus {
    Matched,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub text: String,
    #[serde(rename = "type")]
    pub tag_type: TagType,
    pub status: TagStatus,
}

/// Matched-required, missing-required, matched-preferred, missing-preferred.
pub fn to_tags(result: &AnalysisResult) -> Vec<Tag> {
    let groups = [
        (&result.matched_required, TagType::Required, TagStatus::Matched),
        (&result.missing_required, TagType::Required, TagStatus::Missing),
        (&result.matched_preferred, TagType::Preferred, TagStatus::Matched),
        (&result.missing_preferred, TagType::Preferred, TagStatus::Missing),
    ];

    groups
        .into_iter()
        .flat_map(|(terms, tag_type, status)| {
            terms.iter().map(move |text| Tag {
                text: text.clone(),
                tag_type,
                status,
            })
        })
        .collect()
}

/// A completed analysis together with its tags, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub tags: Vec<Tag>,
}

impl AnalysisView {
    pub fn from_result(result: AnalysisResult) -> Self {
        let tags = to_tags(&result);
        Self { result, tags }
    }

    pub fn passes(&self) -> bool {
        self.result.missing_required.is_empty()
    }

    pub fn banner(&self) -> &'static str {
        if self.passes() {
            PASS_BANNER
        } else {
            FAIL_BANNER
        }
    }

    pub fn tags_of(&self, tag_type: TagType) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(move |t| t.tag_type == tag_type)
    }

    pub fn required_header(&self) -> String {
        format!(
            "Required ({}/{})",
            self.result.matched_required.len(),
            self.result.required_total()
        )
    }

    pub fn preferred_header(&self) -> String {
        format!(
            "Preferred ({}/{})",
            self.result.matched_preferred.len(),
            self.result.preferred_total()
        )
    }

    /// Plain-text rendering used by the CLI
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            self.banner().to_string(),
            format!("Score: {}%", self.result.match_score),
            String::new(),
            self.required_header(),
        ];
        lines.extend(self.tags_of(TagType::Required).map(render_tag));
        lines.push(String::new());
        lines.push(self.preferred_header());
        lines.extend(self.tags_of(TagType::Preferred).map(render_tag));
        lines.join("\n")
    }
}

fn render_tag(tag: &Tag) -> String {
    let marker = match tag.status {
        TagStatus::Matched => "+",
        TagStatus::Missing => "-",
    };
    format!("  [{}] {}", marker, tag.text)
}
