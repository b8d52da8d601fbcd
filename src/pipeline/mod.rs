//! Extraction stages: article page → [`crate::model::Document`] → summary.
//!
//! Each submodule implements one step and can be tested on its own against
//! literal HTML.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ markup ──▶ extract ─┬─▶ sections   ─┐
//! (HTTP)    (parse)    (title,  ├─▶ references ─┼─▶ Document ──▶ summary
//!                       content)└─▶ images     ─┘                (CSV)
//! ```
//!
//! 1. [`fetch`]      — the [`fetch::Fetcher`] seam; the only stage with
//!    network I/O
//! 2. [`markup`]     — the [`markup::MarkupNode`] view over parsed HTML
//! 3. [`extract`]    — locate title and content area, run the three passes
//! 4. [`sections`]   — sibling scan plus heading-container scan
//! 5. [`references`] — reference list, falling back to inline citations
//! 6. [`images`]     — thumbnails, infobox, wide images; ordered de-dup
//! 7. [`sanitize`]   — strip citation markers and `[edit]` labels
//! 8. [`summary`]    — condensed text and the one-row CSV

pub mod extract;
pub mod fetch;
pub mod images;
pub mod markup;
pub mod references;
pub mod sanitize;
pub mod sections;
pub mod summary;
