//! Shared test utilities for the workshop-builder test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = setup_fixtures();
//! let (settings, workshop) = load_fixture_workshop(site.path());
//! let setup = read_lesson_include(site.path(), "python-novice", "setup.md");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::{self, Settings};
use crate::workshop::{self, Lesson, Workshop};

// =========================================================================
// Fixture setup
// =========================================================================

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_tree(&fixtures_dir().join("site"), tmp.path());
    tmp
}

/// Path of the fake lesson repository the fake git "clones".
pub fn lesson_repo_fixture() -> PathBuf {
    fixtures_dir().join("lesson-repo")
}

/// Path of the fake reveal.js checkout.
pub fn reveal_fixture() -> PathBuf {
    fixtures_dir().join("reveal.js")
}

/// Recursively copy `src` into `dst`, creating directories as needed.
pub fn copy_tree(src: &Path, dst: &Path) {
    for entry in WalkDir::new(src) {
        let entry = entry.unwrap();
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// Load settings and workshop from a fixture site.
pub fn load_fixture_workshop(root: &Path) -> (Settings, Workshop) {
    let settings = config::load_settings(root).unwrap();
    let workshop = workshop::load_workshop(root, &settings).unwrap();
    (settings, workshop)
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a lesson by name. Panics if not found.
pub fn find_lesson<'a>(workshop: &'a Workshop, name: &str) -> &'a Lesson {
    workshop
        .lessons
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = workshop.lessons.iter().map(|l| l.name.as_str()).collect();
            panic!("lesson '{name}' not found. Available: {names:?}")
        })
}

/// Read a file from a lesson's includes directory.
pub fn read_lesson_include(root: &Path, lesson: &str, file: &str) -> String {
    let path = root
        .join("_includes/rsg")
        .join(format!("{lesson}-lesson"))
        .join(file);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()))
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
