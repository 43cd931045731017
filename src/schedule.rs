//! Combined workshop schedule generation.
//!
//! Each lesson repository carries its own schedule fragment
//! (`_includes/rsg/schedule.html`) written against the lesson's default
//! start time. This stage re-times every fragment to the workshop's
//! configured start times and stitches them into one schedule.
//!
//! ## Per Lesson
//!
//! 1. Parse every `<table>` in `<includes>/<lesson>-lesson/schedule.html`.
//!    Column one is the time, column two the session; header rows are skipped.
//! 2. Pair table *i* with day *i* of the lesson's `date` and `start-time`.
//! 3. Shift every row by the minutes between the configured start and the
//!    table's first row.
//! 4. Renumber the lesson's episodes from `01` and write `00-schedule.md`,
//!    the landing page Jekyll renders with `syllabus.html`.
//!
//! ## Output
//!
//! ```text
//! <div class="row">
//!  <div class="col-md-6">
//!   <a href="python-novice-schedule">
//!    <h3>
//!     Introduction to Python
//!    </h3>
//!   </a>
//!   <h4>
//!    Monday 13th May 2024
//!   </h4>
//!   <table class="table table-striped">
//!    ...
//! ```
//!
//! Lessons spanning several days get one block per day, headed
//! `Day N: <title>`.
//!
//! ## Permalinks
//!
//! Table *i* is assumed to belong to the *i*-th `<a href>` of the fragment.
//! Nothing checks that pairing; the permalink is recorded on the parsed table
//! for reporting only and the rendered heading always links to the lesson's
//! landing page.

use crate::clock::{self, ClockError};
use crate::config::Settings;
use crate::naming;
use crate::workshop::{Lesson, Workshop};
use maud::{Markup, html};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the generated landing page, sorted ahead of every episode.
pub const LANDING_PAGE: &str = "00-schedule.md";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("lesson {lesson}: {source}")]
    Clock {
        lesson: String,
        #[source]
        source: ClockError,
    },
    #[error("lesson {lesson}: schedule table for day {day} has no {field} configured")]
    MissingDay {
        lesson: String,
        day: usize,
        field: &'static str,
    },
    #[error("lesson {lesson}: schedule table for day {day} has no rows")]
    EmptyTable { lesson: String, day: usize },
}

/// One `(time, session)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub time: String,
    pub session: String,
}

/// A table parsed from a lesson's schedule fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTable {
    pub rows: Vec<ScheduleRow>,
    /// The positionally paired `<a href>`, if the fragment has enough links.
    pub permalink: Option<String>,
}

/// One rendered day of a lesson, rows already shifted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleBlock {
    pub heading: String,
    pub date: String,
    /// Landing page the heading links to.
    pub link: String,
    pub permalink: Option<String>,
    pub delta_minutes: i64,
    pub rows: Vec<ScheduleRow>,
}

/// Everything built for one lesson.
#[derive(Debug, Clone)]
pub struct LessonSchedule {
    pub lesson: String,
    pub blocks: Vec<ScheduleBlock>,
    /// First configured start time, minutes since midnight.
    pub start_minutes: u32,
    pub landing_page: PathBuf,
    /// `(old, new)` episode file names.
    pub renamed: Vec<(String, String)>,
}

/// Result of a schedule build.
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    pub lessons: Vec<LessonSchedule>,
    pub output: PathBuf,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn in_thead(row: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(|n| n.value().as_element())
        .any(|e| e.name() == "thead")
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse every table of a schedule fragment, in document order.
///
/// Rows inside `<thead>`, and leading rows made only of `<th>` cells, are
/// headers. A row with a single cell gets an empty session.
pub fn parse_schedule_tables(fragment: &str) -> Vec<ScheduleTable> {
    let document = Html::parse_document(fragment);
    let permalinks: Vec<String> = document
        .select(&selector("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    let tr = selector("tr");
    document
        .select(&selector("table"))
        .enumerate()
        .map(|(i, table)| {
            let mut rows = Vec::new();
            for row in table.select(&tr) {
                if in_thead(row) {
                    continue;
                }
                let cells: Vec<ElementRef<'_>> = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| matches!(c.value().name(), "td" | "th"))
                    .collect();
                if cells.is_empty() {
                    continue;
                }
                if rows.is_empty() && cells.iter().all(|c| c.value().name() == "th") {
                    continue;
                }
                rows.push(ScheduleRow {
                    time: cell_text(cells[0]),
                    session: cells.get(1).map(|c| cell_text(*c)).unwrap_or_default(),
                });
            }
            ScheduleTable {
                rows,
                permalink: permalinks.get(i).cloned(),
            }
        })
        .collect()
}

// ============================================================================
// Time shifting
// ============================================================================

/// Re-time a lesson's tables to its configured days.
pub fn build_lesson_blocks(
    lesson: &Lesson,
    tables: Vec<ScheduleTable>,
) -> Result<Vec<ScheduleBlock>, ScheduleError> {
    let multi_day = tables.len() > 1;
    let clock_err = |source| ScheduleError::Clock {
        lesson: lesson.name.clone(),
        source,
    };

    let mut blocks = Vec::with_capacity(tables.len());
    for (i, table) in tables.into_iter().enumerate() {
        let day = i + 1;
        let missing = |field| ScheduleError::MissingDay {
            lesson: lesson.name.clone(),
            day,
            field,
        };
        let start = lesson.start_times.get(i).ok_or_else(|| missing("start-time"))?;
        let date = lesson.dates.get(i).ok_or_else(|| missing("date"))?;
        let first = table.rows.first().ok_or_else(|| ScheduleError::EmptyTable {
            lesson: lesson.name.clone(),
            day,
        })?;

        let configured = clock::parse_start_time(start).map_err(clock_err)?;
        let original = clock::parse_clock_text(&first.time).map_err(clock_err)?;
        let delta = clock::delta_minutes(configured, original);

        let rows = table
            .rows
            .iter()
            .map(|row| {
                let time = clock::parse_row_time(&row.time).map_err(clock_err)?;
                Ok(ScheduleRow {
                    time: clock::format_hhmm(clock::shift(time, delta)),
                    session: row.session.clone(),
                })
            })
            .collect::<Result<Vec<_>, ScheduleError>>()?;

        let heading = if multi_day {
            format!("Day {day}: {}", lesson.title)
        } else {
            lesson.title.clone()
        };

        blocks.push(ScheduleBlock {
            heading,
            date: date.clone(),
            link: format!("{}-schedule", lesson.name),
            permalink: table.permalink,
            delta_minutes: delta,
            rows,
        });
    }
    Ok(blocks)
}

// ============================================================================
// Rendering
// ============================================================================

/// Render one day block.
pub fn render_block(block: &ScheduleBlock) -> Markup {
    html! {
        div class="col-md-6" {
            a href=(block.link) {
                h3 { (block.heading) }
            }
            h4 { (block.date) }
            table.table.table-striped {
                @for row in &block.rows {
                    tr {
                        td { (row.time) }
                        td { (row.session) }
                    }
                }
            }
        }
    }
}

/// Render the combined schedule: every block, wrapped in a row, pretty-printed.
pub fn render_schedule<'a>(blocks: impl IntoIterator<Item = &'a ScheduleBlock>) -> String {
    let markup = html! {
        div.row {
            @for block in blocks {
                (render_block(block))
            }
        }
    };
    prettify(&markup.into_string())
}

/// Put every tag and text node on its own line, indented one space per level.
///
/// Only meant for markup this module renders: attribute values must not
/// contain a raw `>`, which maud's escaping guarantees.
pub fn prettify(html: &str) -> String {
    let mut out = String::with_capacity(html.len() * 2);
    let mut depth = 0usize;
    let mut rest = html;

    while !rest.is_empty() {
        if rest.starts_with('<') {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            let tag = &rest[..end];
            rest = &rest[end..];
            if tag.starts_with("</") {
                depth = depth.saturating_sub(1);
                push_line(&mut out, depth, tag);
            } else {
                push_line(&mut out, depth, tag);
                if opens_scope(tag) {
                    depth += 1;
                }
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let text = rest[..end].trim();
            if !text.is_empty() {
                push_line(&mut out, depth, text);
            }
            rest = &rest[end..];
        }
    }
    out
}

fn opens_scope(tag: &str) -> bool {
    if tag.starts_with("<!") || tag.ends_with("/>") {
        return false;
    }
    let name: String = tag[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    !VOID_ELEMENTS.contains(&name.as_str())
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    out.push_str(&" ".repeat(depth));
    out.push_str(content);
    out.push('\n');
}

// ============================================================================
// Landing pages
// ============================================================================

/// Markdown of a lesson's schedule landing page.
pub fn landing_page_markdown(lesson: &str, start_minutes: u32) -> String {
    format!(
        "---\n\
         title: Lesson Schedule\n\
         slug: {lesson}-schedule\n\
         layout: schedule\n\
         ---\n\
         {{% include syllabus.html  name=\"{lesson}\" start_time={start_minutes} %}}"
    )
}

/// Renumber a lesson's episodes from `01` and write its landing page.
///
/// Returns the `(old, new)` names of episodes that moved. A landing page
/// left by an earlier run is overwritten rather than renumbered.
pub fn write_landing_page(
    dir: &Path,
    lesson: &str,
    start_minutes: u32,
) -> Result<Vec<(String, String)>, ScheduleError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ScheduleError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let names: Vec<String> = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name != LANDING_PAGE)
        .collect();

    let mut renamed = naming::plan_renumbering(&names);
    renamed.retain(|(old, new)| old != new);
    // Two passes: a new name may still be held by an episode not yet moved
    let staged: Vec<PathBuf> = (0..renamed.len())
        .map(|i| dir.join(format!(".renumber-{i}.tmp")))
        .collect();
    for ((old, _), tmp) in renamed.iter().zip(&staged) {
        let from = dir.join(old);
        fs::rename(&from, tmp).map_err(io_err(&from))?;
    }
    for ((_, new), tmp) in renamed.iter().zip(&staged) {
        fs::rename(tmp, dir.join(new)).map_err(io_err(tmp))?;
    }

    let page = dir.join(LANDING_PAGE);
    fs::write(&page, landing_page_markdown(lesson, start_minutes)).map_err(io_err(&page))?;
    Ok(renamed)
}

// ============================================================================
// Stage entry point
// ============================================================================

/// Build one lesson's schedule blocks and landing page.
pub fn build_lesson_schedule(
    root: &Path,
    settings: &Settings,
    lesson: &Lesson,
) -> Result<LessonSchedule, ScheduleError> {
    let fragment_path = settings
        .paths
        .lesson_includes(root, &lesson.name)
        .join("schedule.html");
    let fragment = fs::read_to_string(&fragment_path).map_err(|source| ScheduleError::Io {
        path: fragment_path.clone(),
        source,
    })?;

    let blocks = build_lesson_blocks(lesson, parse_schedule_tables(&fragment))?;

    let first_start = lesson
        .start_times
        .first()
        .ok_or_else(|| ScheduleError::MissingDay {
            lesson: lesson.name.clone(),
            day: 1,
            field: "start-time",
        })?;
    let start = clock::parse_start_time(first_start).map_err(|source| ScheduleError::Clock {
        lesson: lesson.name.clone(),
        source,
    })?;
    let start_minutes = clock::minutes_since_midnight(start);

    let dir = settings
        .paths
        .lesson_collection(root, lesson.content_dir(), &lesson.name);
    let renamed = write_landing_page(&dir, &lesson.name, start_minutes)?;

    Ok(LessonSchedule {
        lesson: lesson.name.clone(),
        blocks,
        start_minutes,
        landing_page: dir.join(LANDING_PAGE),
        renamed,
    })
}

/// Build every lesson's schedule in configuration order, then write the
/// combined schedule, replacing any previous one.
pub fn build_schedule(
    root: &Path,
    settings: &Settings,
    workshop: &Workshop,
) -> Result<ScheduleReport, ScheduleError> {
    let lessons = workshop
        .lessons
        .iter()
        .map(|lesson| build_lesson_schedule(root, settings, lesson))
        .collect::<Result<Vec<_>, _>>()?;

    let html = render_schedule(lessons.iter().flat_map(|l| &l.blocks));
    let output = root.join(&settings.paths.schedule);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| ScheduleError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&output, html).map_err(|source| ScheduleError::Io {
        path: output.clone(),
        source,
    })?;

    Ok(ScheduleReport { lessons, output })
}
