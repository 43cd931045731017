//! Setup-page normalization.
//!
//! Every lesson ships a standalone `setup.md` written as its own page: a
//! Jekyll front-matter block and top-level `#` headings. The workshop site
//! embeds all of them in one page, so each imported copy is rewritten in
//! place:
//!
//! 1. **Front matter**: when a `---` line appears within the first five lines
//!    and a second `---` line follows, everything up to and including the
//!    second marker is dropped. A lone marker leaves the document untouched.
//! 2. **Headings**: every line starting with `#` is pushed down by
//!    [`HeadingsConfig::offset`] levels, clamped at
//!    [`HeadingsConfig::max_depth`]. Only the leading run of `#` sets the
//!    depth, so `# Using C# today` becomes `### Using C# today`. A `#`
//!    inside the heading text is not counted; counting every `#` on the line
//!    would have produced `####` here.
//!
//! ```text
//! ---
//! title: Setup                ## Software
//! ---                  →      ...
//! # Software                  ### Python
//! ...
//! ## Python
//! ```

use crate::config::{HeadingsConfig, Settings};
use crate::workshop::Workshop;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FRONT_MATTER_MARKER: &str = "---";
/// Lines inspected for an opening front-matter marker.
const HEAD_LINES: usize = 5;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What happened to one lesson's setup page.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupReport {
    pub lesson: String,
    pub path: PathBuf,
    pub front_matter_removed: bool,
    pub headings_shifted: usize,
}

/// Lines after a front-matter block, or `None` when there is no complete
/// block opening in the head window.
pub fn strip_front_matter<'a>(lines: &'a [&'a str]) -> Option<&'a [&'a str]> {
    let is_marker = |line: &&str| line.starts_with(FRONT_MATTER_MARKER);
    let open = lines.iter().take(HEAD_LINES).position(is_marker)?;
    let close = open + 1 + lines[open + 1..].iter().position(is_marker)?;
    Some(&lines[close + 1..])
}

/// Rewrite a heading line to its new depth, or `None` for non-heading lines.
pub fn shift_heading(line: &str, headings: HeadingsConfig) -> Option<String> {
    if !line.starts_with('#') {
        return None;
    }
    let without_closing = line.trim_end_matches('#');
    let depth = without_closing.len() - without_closing.trim_start_matches('#').len();
    let text = without_closing.trim_start_matches('#').trim();
    let depth = (depth + headings.offset).min(headings.max_depth);
    let marks = "#".repeat(depth);
    Some(if text.is_empty() {
        marks
    } else {
        format!("{marks} {text}")
    })
}

/// Normalize a whole setup document.
pub fn normalize_setup(content: &str, headings: HeadingsConfig) -> (String, SetupStats) {
    let lines: Vec<&str> = content.lines().collect();
    let (body, front_matter_removed) = match strip_front_matter(&lines) {
        Some(rest) => (rest, true),
        None => (lines.as_slice(), false),
    };

    let mut headings_shifted = 0;
    let rewritten: Vec<String> = body
        .iter()
        .map(|line| match shift_heading(line, headings) {
            Some(heading) => {
                headings_shifted += 1;
                heading
            }
            None => line.to_string(),
        })
        .collect();

    (
        rewritten.join("\n"),
        SetupStats {
            front_matter_removed,
            headings_shifted,
        },
    )
}

/// Counters from [`normalize_setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupStats {
    pub front_matter_removed: bool,
    pub headings_shifted: usize,
}

/// Normalize every lesson's imported `setup.md`, in configuration order.
///
/// A missing setup page aborts the run; pages already rewritten stay
/// rewritten.
pub fn normalize_setup_pages(
    root: &Path,
    settings: &Settings,
    workshop: &Workshop,
) -> Result<Vec<SetupReport>, SetupError> {
    let mut reports = Vec::new();
    for lesson in &workshop.lessons {
        let path = settings
            .paths
            .lesson_includes(root, &lesson.name)
            .join("setup.md");
        let content = fs::read_to_string(&path).map_err(|source| SetupError::Io {
            path: path.clone(),
            source,
        })?;
        let (normalized, stats) = normalize_setup(&content, settings.headings);
        fs::write(&path, normalized).map_err(|source| SetupError::Io {
            path: path.clone(),
            source,
        })?;
        reports.push(SetupReport {
            lesson: lesson.name.clone(),
            path,
            front_matter_removed: stats.front_matter_removed,
            headings_shifted: stats.headings_shifted,
        });
    }
    Ok(reports)
}
