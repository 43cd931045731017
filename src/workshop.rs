//! Workshop description loaded from the Jekyll `_config.yml`.
//!
//! Only the `lessons` key is read; everything else in the file belongs to
//! Jekyll. Each entry looks like:
//!
//! ```yaml
//! lessons:
//!   - gh-name: python-novice
//!     title: Introduction to Python
//!     date: [2024-05-01, 2024-05-02]
//!     start-time: ["9:30 am", "13:00"]
//!     branch: main            # optional, settings default otherwise
//!     type: episode           # optional: episode | episode_r
//! ```
//!
//! `gh-name`, `title`, `date` and `start-time` are required for every
//! lesson. A missing field fails the whole load, so no stage ever writes a
//! file for a half-valid workshop.

use crate::config::Settings;
use crate::types::{ContentType, OneOrMany, StartTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkshopError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(
        "lesson #{index} is missing {}: gh-name, date, title, and start-time are required for each lesson",
        missing.join(", ")
    )]
    MissingFields {
        index: usize,
        missing: Vec<&'static str>,
    },
}

/// A `lessons` entry as written, before validation.
#[derive(Debug, Deserialize)]
struct RawLesson {
    #[serde(rename = "gh-name")]
    gh_name: Option<String>,
    title: Option<String>,
    date: Option<OneOrMany<String>>,
    #[serde(rename = "start-time")]
    start_time: Option<OneOrMany<StartTime>>,
    branch: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<ContentType>,
}

#[derive(Debug, Deserialize)]
struct RawSiteConfig {
    lessons: Vec<RawLesson>,
}

/// A validated lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    /// Repository name, also the directory stem (`<name>-lesson`).
    pub name: String,
    pub title: String,
    /// One date label per day.
    pub dates: Vec<String>,
    /// One start time per day.
    pub start_times: Vec<StartTime>,
    pub branch: String,
    /// `None` when the entry had no `type`.
    pub content_type: Option<ContentType>,
}

impl Lesson {
    /// Collection directory the lesson's episodes live in.
    pub fn content_dir(&self) -> &'static str {
        self.content_type
            .map(ContentType::directory)
            .unwrap_or(ContentType::Episode.directory())
    }

    /// Whether the importer vendors this lesson.
    pub fn is_imported(&self) -> bool {
        self.content_type.is_some_and(ContentType::is_imported)
    }
}

/// The ordered lesson list of a workshop.
#[derive(Debug, Clone, Serialize)]
pub struct Workshop {
    pub lessons: Vec<Lesson>,
}

impl Workshop {
    /// Lessons the importer vendors, in configuration order.
    pub fn imported_lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter().filter(|l| l.is_imported())
    }
}

/// Parse and validate a workshop from YAML text.
pub fn parse_workshop(yaml: &str, default_branch: &str) -> Result<Workshop, WorkshopError> {
    let raw: RawSiteConfig = serde_yaml::from_str(yaml)?;
    let lessons = raw
        .lessons
        .into_iter()
        .enumerate()
        .map(|(i, lesson)| validate_lesson(i + 1, lesson, default_branch))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Workshop { lessons })
}

/// Load the workshop from the site config named in the settings.
pub fn load_workshop(root: &Path, settings: &Settings) -> Result<Workshop, WorkshopError> {
    let path = root.join(&settings.site_config);
    let content = fs::read_to_string(&path).map_err(|source| WorkshopError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_workshop(&content, &settings.sources.default_branch)
}

fn validate_lesson(
    index: usize,
    raw: RawLesson,
    default_branch: &str,
) -> Result<Lesson, WorkshopError> {
    // An empty list is as missing as an absent key
    let dates = raw.date.map(OneOrMany::into_vec).filter(|d| !d.is_empty());
    let start_times = raw
        .start_time
        .map(OneOrMany::into_vec)
        .filter(|s| !s.is_empty());

    let mut missing = Vec::new();
    if raw.gh_name.is_none() {
        missing.push("gh-name");
    }
    if dates.is_none() {
        missing.push("date");
    }
    if raw.title.is_none() {
        missing.push("title");
    }
    if start_times.is_none() {
        missing.push("start-time");
    }

    match (raw.gh_name, raw.title, dates, start_times) {
        (Some(name), Some(title), Some(dates), Some(start_times)) => Ok(Lesson {
            name,
            title,
            dates,
            start_times,
            branch: raw.branch.unwrap_or_else(|| default_branch.to_string()),
            content_type: raw.content_type,
        }),
        _ => Err(WorkshopError::MissingFields { index, missing }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    const TWO_LESSONS: &str = r#"
title: RSG Training Workshop
lessons:
  - gh-name: python-novice
    title: Introduction to Python
    date: 2024-05-01
    start-time: "10:00"
    type: episode
  - gh-name: r-novice
    title: Programming with R
    date: [2024-05-02, 2024-05-03]
    start-time: ["9:30 am", 780]
    branch: main
    type: episode_r
"#;

    #[test]
    fn parses_lessons_in_order() {
        let workshop = parse_workshop(TWO_LESSONS, "gh-pages").unwrap();
        let names: Vec<&str> = workshop.lessons.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["python-novice", "r-novice"]);
    }

    #[test]
    fn scalar_date_and_start_are_wrapped() {
        let workshop = parse_workshop(TWO_LESSONS, "gh-pages").unwrap();
        let lesson = &workshop.lessons[0];
        assert_eq!(lesson.dates, vec!["2024-05-01".to_string()]);
        assert_eq!(lesson.start_times, vec![StartTime::Text("10:00".into())]);
    }

    #[test]
    fn list_fields_keep_per_day_values() {
        let workshop = parse_workshop(TWO_LESSONS, "gh-pages").unwrap();
        let lesson = &workshop.lessons[1];
        assert_eq!(lesson.dates.len(), 2);
        assert_eq!(
            lesson.start_times,
            vec![StartTime::Text("9:30 am".into()), StartTime::Minutes(780)]
        );
    }

    #[test]
    fn branch_defaults_from_settings() {
        let workshop = parse_workshop(TWO_LESSONS, "gh-pages").unwrap();
        assert_eq!(workshop.lessons[0].branch, "gh-pages");
        assert_eq!(workshop.lessons[1].branch, "main");
    }

    #[test]
    fn content_type_drives_directory() {
        let workshop = parse_workshop(TWO_LESSONS, "gh-pages").unwrap();
        assert_eq!(workshop.lessons[0].content_dir(), "_episodes");
        assert_eq!(workshop.lessons[1].content_dir(), "_episodes_rmd");
    }

    #[test]
    fn untyped_lesson_is_not_imported() {
        let yaml = r#"
lessons:
  - gh-name: intro
    title: Welcome
    date: 2024-05-01
    start-time: "09:00"
  - gh-name: extra
    title: Extra
    date: 2024-05-01
    start-time: "11:00"
    type: breakout
"#;
        let workshop = parse_workshop(yaml, "gh-pages").unwrap();
        assert_eq!(workshop.imported_lessons().count(), 0);
        assert_eq!(workshop.lessons[0].content_type, None);
        assert_eq!(workshop.lessons[1].content_type, Some(ContentType::Other));
    }

    #[test]
    fn missing_start_time_fails_whole_load() {
        let yaml = r#"
lessons:
  - gh-name: fine
    title: Fine
    date: 2024-05-01
    start-time: "09:00"
  - gh-name: broken
    title: Broken
    date: 2024-05-01
"#;
        let err = parse_workshop(yaml, "gh-pages").unwrap_err();
        match &err {
            WorkshopError::MissingFields { index, missing } => {
                assert_eq!(*index, 2);
                assert_eq!(missing, &vec!["start-time"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("required for each lesson"));
    }

    #[test]
    fn every_required_field_is_checked() {
        let yaml = "lessons:\n  - branch: main\n";
        let err = parse_workshop(yaml, "gh-pages").unwrap_err();
        let WorkshopError::MissingFields { missing, .. } = err else {
            panic!("expected MissingFields");
        };
        assert_eq!(missing, vec!["gh-name", "date", "title", "start-time"]);
    }

    #[test]
    fn empty_date_and_start_lists_are_missing() {
        let yaml = r#"
lessons:
  - gh-name: x
    title: X
    date: []
    start-time: []
"#;
        let err = parse_workshop(yaml, "gh-pages").unwrap_err();
        let WorkshopError::MissingFields { index, missing } = err else {
            panic!("expected MissingFields");
        };
        assert_eq!(index, 1);
        assert_eq!(missing, vec!["date", "start-time"]);
    }

    #[test]
    fn null_field_counts_as_missing() {
        let yaml = r#"
lessons:
  - gh-name: x
    title:
    date: 2024-05-01
    start-time: "09:00"
"#;
        assert!(matches!(
            parse_workshop(yaml, "gh-pages"),
            Err(WorkshopError::MissingFields { .. })
        ));
    }

    #[test]
    fn missing_lessons_key_is_error() {
        assert!(matches!(
            parse_workshop("title: nothing here\n", "gh-pages"),
            Err(WorkshopError::Yaml(_))
        ));
    }

    #[test]
    fn load_workshop_reads_site_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("_config.yml"), TWO_LESSONS).unwrap();
        let workshop = load_workshop(tmp.path(), &Settings::default()).unwrap();
        assert_eq!(workshop.lessons.len(), 2);
    }

    #[test]
    fn fixture_site_loads() {
        let site = setup_fixtures();
        let (_, workshop) = load_fixture_workshop(site.path());
        let project = find_lesson(&workshop, "project-novice");
        assert_eq!(project.branch, "main");
        assert_eq!(project.dates.len(), project.start_times.len());
        assert_eq!(workshop.imported_lessons().count(), 2);
    }

    #[test]
    fn load_workshop_missing_file_names_path() {
        let tmp = TempDir::new().unwrap();
        let err = load_workshop(tmp.path(), &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("_config.yml"));
    }
}
