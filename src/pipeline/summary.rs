//! Summary projection: a condensed text view of the document, exported as CSV.

use crate::error::ScrapeError;
use crate::model::Document;
use std::path::Path;
use tracing::info;

const EXCERPT_MAX_CHARS: usize = 100;
const EXCERPT_KEEP_CHARS: usize = 97;

/// Build the condensed text: title, URL, the first paragraph of the
/// introduction, then an indented outline of every other section with its
/// first sentence.
pub fn project_summary(doc: &Document) -> String {
    let intro = doc
        .introduction()
        .and_then(|s| s.content.split("\n\n").next())
        .unwrap_or("");

    let mut summary = format!(
        "Title: {}\n\nURL: {}\n\n{}\n\nSections:\n",
        doc.title, doc.url, intro
    );

    for section in doc.sections.iter().filter(|s| !s.is_introduction()) {
        let indent = "  ".repeat(usize::from(section.level.saturating_sub(1)));
        summary.push_str(&format!("{indent}- {}\n", section.heading));
        if !section.content.is_empty() {
            summary.push_str(&format!("{indent}  {}\n", excerpt(&section.content)));
        }
    }

    summary
}

/// First sentence of `content` (text up to the first `.`, plus the `.`),
/// shortened to 97 characters and `...` when longer than 100.
pub fn excerpt(content: &str) -> String {
    let head = content.split('.').next().unwrap_or("");
    let sentence = format!("{head}.");
    if sentence.chars().count() > EXCERPT_MAX_CHARS {
        let kept: String = sentence.chars().take(EXCERPT_KEEP_CHARS).collect();
        format!("{kept}...")
    } else {
        sentence
    }
}

/// Write the one-row summary CSV (`Topic`, `Content`).
pub fn write_summary_csv(topic: &str, summary: &str, path: &Path) -> Result<(), ScrapeError> {
    let csv_err = |detail: String| ScrapeError::CsvWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_err(e.to_string()))?;
    writer
        .write_record(["Topic", "Content"])
        .map_err(|e| csv_err(e.to_string()))?;
    writer
        .write_record([topic, summary])
        .map_err(|e| csv_err(e.to_string()))?;
    writer.flush().map_err(|e| csv_err(e.to_string()))?;

    info!("Summarized CSV saved to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, INTRODUCTION};

    fn doc(sections: Vec<Section>) -> Document {
        Document {
            title: "Cat".into(),
            url: "https://en.wikipedia.org/wiki/Cat".into(),
            sections,
            references: vec![],
            images: vec![],
        }
    }

    #[test]
    fn excerpt_is_first_sentence() {
        assert_eq!(
            excerpt("X happened in 1900. It mattered a lot."),
            "X happened in 1900."
        );
    }

    #[test]
    fn excerpt_without_period_gets_one() {
        assert_eq!(excerpt("No full stop here"), "No full stop here.");
    }

    #[test]
    fn long_excerpt_truncated_to_100() {
        let long = format!("{} end. Next.", "w".repeat(150));
        let out = excerpt(&long);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..97], &"w".repeat(97));
    }

    #[test]
    fn exactly_100_chars_kept() {
        let s = format!("{}.", "a".repeat(99));
        assert_eq!(excerpt(&s), s);
    }

    #[test]
    fn summary_layout() {
        let d = doc(vec![
            Section::new(1, INTRODUCTION, &["Cats purr.".into(), "Second para.".into()]),
            Section::new(2, "History", &["X happened in 1900. It mattered a lot.".into()]),
            Section::new(3, "Egypt", &["Revered. Mummified.".into()]),
        ]);
        let expected = "Title: Cat\n\n\
                        URL: https://en.wikipedia.org/wiki/Cat\n\n\
                        Cats purr.\n\n\
                        Sections:\n\
                        \x20\x20- History\n\
                        \x20\x20\x20\x20X happened in 1900.\n\
                        \x20\x20\x20\x20- Egypt\n\
                        \x20\x20\x20\x20\x20\x20Revered.\n";
        assert_eq!(project_summary(&d), expected);
    }

    #[test]
    fn no_introduction_leaves_blank_slot() {
        let d = doc(vec![Section::new(2, "Diet", &["Meat.".into()])]);
        let s = project_summary(&d);
        assert!(s.starts_with(
            "Title: Cat\n\nURL: https://en.wikipedia.org/wiki/Cat\n\n\n\nSections:\n"
        ));
        assert!(s.ends_with("  - Diet\n    Meat.\n"));
    }

    #[test]
    fn csv_has_header_and_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cat_wikipedia_summary.csv");
        write_summary_csv("Cat", "Title: Cat\n\nline, with comma \"quoted\"", &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(headers, vec!["Topic", "Content"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Cat");
        assert_eq!(&rows[0][1], "Title: Cat\n\nline, with comma \"quoted\"");
    }
}
