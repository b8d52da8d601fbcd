//! Result types returned by a scrape run.

use crate::error::ImageError;
use crate::model::Document;
use crate::pipeline::references::ReferenceSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOutput {
    /// The extracted article.
    pub document: Document,

    /// Which strategy produced `document.references`.
    pub reference_source: ReferenceSource,

    /// The condensed text written to the CSV.
    pub summary: String,

    pub pdf_path: PathBuf,
    pub csv_path: PathBuf,

    pub render: RenderStats,

    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
}

impl ScrapeOutput {
    /// Section headings with two spaces of indent per level below the top.
    pub fn outline(&self) -> Vec<String> {
        self.document
            .sections
            .iter()
            .map(|s| {
                let indent = "  ".repeat(usize::from(s.level.saturating_sub(1)));
                format!("{indent}{}", s.heading)
            })
            .collect()
    }
}

/// Outcome of PDF rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Pages in the written PDF.
    pub pages: usize,

    /// Images placed in the image block.
    pub images_embedded: usize,

    /// Images skipped, in the order they failed.
    pub failures: Vec<ImageError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, INTRODUCTION};

    #[test]
    fn outline_indents_by_level() {
        let output = ScrapeOutput {
            document: Document {
                title: "Cat".into(),
                url: "u".into(),
                sections: vec![
                    Section::new(1, INTRODUCTION, &["a".into()]),
                    Section::new(2, "History", &["b".into()]),
                    Section::new(3, "Egypt", &["c".into()]),
                ],
                references: vec![],
                images: vec![],
            },
            reference_source: ReferenceSource::None,
            summary: String::new(),
            pdf_path: "Cat_enhanced_wikipedia.pdf".into(),
            csv_path: "Cat_wikipedia_summary.csv".into(),
            render: RenderStats::default(),
            total_duration_ms: 0,
        };
        assert_eq!(output.outline(), vec!["Introduction", "  History", "    Egypt"]);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["reference_source"], "none");
        assert_eq!(json["render"]["images_embedded"], 0);
    }
}
