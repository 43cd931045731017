//! CLI output formatting for all stages.
//!
//! Output is lesson-centric: each lesson leads with its positional index and
//! title, with file paths and details as indented context lines. Warnings are
//! prefixed `warning:` so they stand out in CI logs.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Lessons
//! 001 Introduction to Python
//!     Source: python-novice (episode, branch gh-pages)
//!     Day 1: Monday 13th May 2024 at 10:00
//! ```
//!
//! ## Import
//!
//! ```text
//! python-novice (branch gh-pages) → _episodes
//!     Copied 2 files: submodules/python-novice/_episodes → collections/_episodes/python-novice-lesson
//!     warning: collections/_episodes/python-novice-lesson/setup.R: cannot be found/moved
//! ```
//!
//! ## Schedule
//!
//! ```text
//! 001 Introduction to Python (+60 min)
//!     Monday 13th May 2024: 10:00-13:00, 5 sessions
//!     Landing page: collections/_episodes/python-novice-lesson/00-schedule.md
//! Schedule → _includes/rsg/schedule.html
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::import::{ImportEvent, ImportReport};
use crate::schedule::{ScheduleBlock, ScheduleReport};
use crate::setup::SetupReport;
use crate::types::ContentType;
use crate::workshop::Workshop;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn content_type_label(content_type: Option<ContentType>) -> &'static str {
    match content_type {
        Some(ContentType::Episode) => "episode",
        Some(ContentType::EpisodeR) => "episode_r",
        Some(ContentType::Other) => "not imported",
        None => "untyped",
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the lesson inventory of a workshop.
pub fn format_check_output(workshop: &Workshop) -> Vec<String> {
    let mut lines = vec!["Lessons".to_string()];
    for (i, lesson) in workshop.lessons.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), lesson.title));
        lines.push(format!(
            "{}Source: {} ({}, branch {})",
            indent(1),
            lesson.name,
            content_type_label(lesson.content_type),
            lesson.branch
        ));
        let days = lesson.dates.len().max(lesson.start_times.len());
        for day in 0..days {
            let date = lesson.dates.get(day).map_or("?", String::as_str);
            let start = lesson
                .start_times
                .get(day)
                .map_or_else(|| "?".to_string(), ToString::to_string);
            lines.push(format!("{}Day {}: {} at {}", indent(1), day + 1, date, start));
        }
    }
    lines
}

pub fn print_check_output(workshop: &Workshop) {
    for line in format_check_output(workshop) {
        println!("{}", line);
    }
}

// ============================================================================
// Import
// ============================================================================

/// Format one import event. Lesson headers are flush left, everything else
/// is indented under the current lesson.
pub fn format_import_event(event: &ImportEvent, root: &Path) -> Vec<String> {
    let p = |path: &Path| display_path(path, root);
    match event {
        ImportEvent::Reset { dirs } => {
            let names: Vec<String> = dirs.iter().map(|d| p(d)).collect();
            vec![format!("Reset {}", names.join(", "))]
        }
        ImportEvent::LessonStarted {
            lesson,
            branch,
            directory,
        } => vec![format!("{lesson} (branch {branch}) → {directory}")],
        ImportEvent::CommandFailed { command, reason } => {
            vec![format!("{}warning: `{command}` {reason}", indent(1))]
        }
        ImportEvent::Copied { from, to, files } => {
            let noun = if *files == 1 { "file" } else { "files" };
            vec![format!(
                "{}Copied {files} {noun}: {} → {}",
                indent(1),
                p(from),
                p(to)
            )]
        }
        ImportEvent::CopyFailed { from, to, reason } => vec![format!(
            "{}warning: cannot copy {} → {}: {reason}",
            indent(1),
            p(from),
            p(to)
        )],
        ImportEvent::OptionalMissing { path } => vec![format!(
            "{}warning: {}: cannot be found/moved",
            indent(1),
            p(path)
        )],
        ImportEvent::RevealPinned { revision } => vec![format!("reveal.js pinned at {revision}")],
        ImportEvent::SlidesAssembled { lesson, files } => {
            vec![format!("{}Slides for {lesson}: {files} files", indent(1))]
        }
    }
}

pub fn print_import_event(event: &ImportEvent, root: &Path) {
    for line in format_import_event(event, root) {
        println!("{}", line);
    }
}

/// One-line import summary.
pub fn format_import_summary(report: &ImportReport) -> String {
    format!(
        "Imported {} lessons ({} commands, {} warnings)",
        report.lessons.len(),
        report.commands,
        report.warnings
    )
}

// ============================================================================
// Setup
// ============================================================================

pub fn format_setup_output(reports: &[SetupReport], root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, report) in reports.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), report.lesson));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            display_path(&report.path, root)
        ));
        let front_matter = if report.front_matter_removed {
            "removed"
        } else {
            "none"
        };
        lines.push(format!(
            "{}Front matter: {front_matter}, headings shifted: {}",
            indent(1),
            report.headings_shifted
        ));
    }
    lines
}

pub fn print_setup_output(reports: &[SetupReport], root: &Path) {
    for line in format_setup_output(reports, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Schedule
// ============================================================================

fn block_line(block: &ScheduleBlock) -> String {
    let span = match (block.rows.first(), block.rows.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first.time, last.time),
        _ => "empty".to_string(),
    };
    let sessions = block.rows.len();
    let noun = if sessions == 1 { "session" } else { "sessions" };
    format!("{}{}: {span}, {sessions} {noun}", indent(1), block.date)
}

pub fn format_schedule_output(report: &ScheduleReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut index = 0;
    for lesson in &report.lessons {
        for block in &lesson.blocks {
            index += 1;
            lines.push(format!(
                "{} {} ({:+} min)",
                format_index(index),
                block.heading,
                block.delta_minutes
            ));
            lines.push(block_line(block));
            if block.permalink.is_none() {
                lines.push(format!("{}warning: no permalink for this table", indent(1)));
            }
        }
        lines.push(format!(
            "{}Landing page: {}",
            indent(1),
            display_path(&lesson.landing_page, root)
        ));
    }
    lines.push(format!("Schedule → {}", display_path(&report.output, root)));
    lines
}

pub fn print_schedule_output(report: &ScheduleReport, root: &Path) {
    for line in format_schedule_output(report, root) {
        println!("{}", line);
    }
}
