//! Lesson import via git submodules.
//!
//! Vendors every `episode`/`episode_r` lesson into the site tree:
//!
//! ```text
//! submodules/<lesson>/                      ← git submodule add
//! ├── setup.md                 → _includes/rsg/<lesson>-lesson/setup.md
//! ├── _includes/rsg/schedule.html → _includes/rsg/<lesson>-lesson/schedule.html
//! ├── _episodes/ (or _episodes_rmd/)
//! │   └── *                    → collections/_episodes/<lesson>-lesson/
//! ├── reference.md, setup.R, renv.lock (optional, same destination)
//! ├── fig/*                    → fig/
//! └── slides/*                 → slides/<lesson>-lesson/
//!     └── reveal.js/           ← replaced by the pinned submodules/reveal.js
//! ```
//!
//! `submodules/`, `collections/` and `slides/` are deleted up front, so an
//! import always starts from a clean tree.
//!
//! ## Failure Model
//!
//! git is fire-and-forget: a failed or unspawnable command becomes an
//! [`ImportEvent::CommandFailed`] and the import carries on. Copies behave
//! the same way, through [`ImportEvent::CopyFailed`] for required content and
//! [`ImportEvent::OptionalMissing`] for the optional files. Only local
//! directory setup (deleting and creating the output directories) aborts.
//!
//! Commands go through [`CommandRunner`] so tests can record them instead of
//! touching a real repository.

use crate::config::Settings;
use crate::workshop::{Lesson, Workshop};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use walkdir::WalkDir;

/// Files copied from a lesson root only when present.
const OPTIONAL_FILES: &[&str] = &["reference.md", "setup.R", "renv.lock"];
const REVEAL_DIR: &str = "reveal.js";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// An external command to run from a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ShellCommand {
    /// A `git` invocation.
    pub fn git<I, S>(cwd: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: "git".to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands.
pub trait CommandRunner {
    /// Run to completion. `Ok(false)` is a non-zero exit.
    fn run(&mut self, command: &ShellCommand) -> io::Result<bool>;
}

/// Runs commands as child processes, inheriting stdout/stderr.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &ShellCommand) -> io::Result<bool> {
        Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()
            .map(|status| status.success())
    }
}

/// Progress reported while importing.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// Output directories deleted and recreated.
    Reset { dirs: Vec<PathBuf> },
    LessonStarted {
        lesson: String,
        branch: String,
        directory: &'static str,
    },
    CommandFailed { command: String, reason: String },
    Copied {
        from: PathBuf,
        to: PathBuf,
        files: usize,
    },
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    /// An optional lesson file could not be copied.
    OptionalMissing { path: PathBuf },
    RevealPinned { revision: String },
    SlidesAssembled { lesson: String, files: usize },
}

impl ImportEvent {
    /// Whether the event reports something that went wrong.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ImportEvent::CommandFailed { .. }
                | ImportEvent::CopyFailed { .. }
                | ImportEvent::OptionalMissing { .. }
        )
    }
}

/// Summary of an import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Imported lessons, in configuration order.
    pub lessons: Vec<String>,
    pub commands: usize,
    pub warnings: usize,
}

// ============================================================================
// Copy helpers
// ============================================================================

/// Copy a single file into `dst_dir`, keeping its file name.
pub fn copy_file_into(src: &Path, dst_dir: &Path) -> io::Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let target = dst_dir.join(name);
    fs::copy(src, &target)?;
    Ok(target)
}

/// Copy everything inside `src` into `dst` (like `cp -r src/. dst/`).
///
/// Returns the number of files copied. Fails if `src` does not exist.
pub fn copy_dir_contents(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut files = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// ============================================================================
// Importer
// ============================================================================

struct Importer<'a> {
    root: &'a Path,
    settings: &'a Settings,
    runner: &'a mut dyn CommandRunner,
    on_event: &'a mut dyn FnMut(&ImportEvent),
    report: ImportReport,
}

impl Importer<'_> {
    fn emit(&mut self, event: ImportEvent) {
        if event.is_warning() {
            self.report.warnings += 1;
        }
        (self.on_event)(&event);
    }

    fn run(&mut self, command: ShellCommand) {
        self.report.commands += 1;
        let reason = match self.runner.run(&command) {
            Ok(true) => return,
            Ok(false) => "exited with non-zero status".to_string(),
            Err(e) => e.to_string(),
        };
        self.emit(ImportEvent::CommandFailed {
            command: command.to_string(),
            reason,
        });
    }

    fn copy_file(&mut self, src: PathBuf, dst_dir: &Path) {
        let event = match copy_file_into(&src, dst_dir) {
            Ok(to) => ImportEvent::Copied {
                from: src,
                to,
                files: 1,
            },
            Err(e) => ImportEvent::CopyFailed {
                from: src,
                to: dst_dir.to_path_buf(),
                reason: e.to_string(),
            },
        };
        self.emit(event);
    }

    fn copy_contents(&mut self, src: PathBuf, dst: PathBuf) -> usize {
        match copy_dir_contents(&src, &dst) {
            Ok(files) => {
                self.emit(ImportEvent::Copied {
                    from: src,
                    to: dst,
                    files,
                });
                files
            }
            Err(e) => {
                self.emit(ImportEvent::CopyFailed {
                    from: src,
                    to: dst,
                    reason: e.to_string(),
                });
                0
            }
        }
    }

    fn create_dir(&self, path: &Path) -> Result<(), ImportError> {
        fs::create_dir_all(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn submodule(&self, name: &str) -> PathBuf {
        self.root.join(&self.settings.paths.submodules).join(name)
    }

    fn reset_output_dirs(&mut self) -> Result<(), ImportError> {
        let paths = &self.settings.paths;
        let root = self.root;
        let dirs: Vec<PathBuf> = [&paths.submodules, &paths.collections, &paths.slides]
            .into_iter()
            .map(|d| root.join(d))
            .collect();
        for dir in &dirs {
            remove_dir_if_exists(dir).map_err(|source| ImportError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        self.create_dir(&self.root.join(&paths.submodules))?;
        self.emit(ImportEvent::Reset { dirs });
        Ok(())
    }

    fn import_lesson(&mut self, lesson: &Lesson) -> Result<(), ImportError> {
        let directory = lesson.content_dir();
        self.emit(ImportEvent::LessonStarted {
            lesson: lesson.name.clone(),
            branch: lesson.branch.clone(),
            directory,
        });

        let settings = self.settings;
        let submodule_arg = format!("{}/{}", settings.paths.submodules, lesson.name);
        self.run(ShellCommand::git(
            self.root,
            [
                "submodule".to_string(),
                "add".to_string(),
                "--force".to_string(),
                "-b".to_string(),
                lesson.branch.clone(),
                settings.sources.lesson_url(&lesson.name),
                submodule_arg,
            ],
        ));
        self.run(ShellCommand::git(
            self.root,
            ["submodule", "update", "--remote", "--merge"],
        ));

        let submodule = self.submodule(&lesson.name);

        let includes = settings.paths.lesson_includes(self.root, &lesson.name);
        self.create_dir(&includes)?;
        self.copy_file(submodule.join("setup.md"), &includes);
        self.copy_file(submodule.join("_includes/rsg/schedule.html"), &includes);

        let collection = settings
            .paths
            .lesson_collection(self.root, directory, &lesson.name);
        self.create_dir(&collection)?;
        self.copy_contents(submodule.join(directory), collection.clone());

        for file in OPTIONAL_FILES {
            let src = submodule.join(file);
            let event = match copy_file_into(&src, &collection) {
                Ok(to) => ImportEvent::Copied {
                    from: src,
                    to,
                    files: 1,
                },
                Err(_) => ImportEvent::OptionalMissing {
                    path: collection.join(file),
                },
            };
            self.emit(event);
        }

        let figures = self.root.join(&settings.paths.figures);
        self.copy_contents(submodule.join("fig"), figures);
        self.report.lessons.push(lesson.name.clone());
        Ok(())
    }

    fn pin_reveal(&mut self) {
        let settings = self.settings;
        let revision = settings.sources.reveal_revision.clone();
        let reveal_arg = format!("{}/{REVEAL_DIR}", settings.paths.submodules);
        self.run(ShellCommand::git(
            self.root,
            [
                "submodule".to_string(),
                "add".to_string(),
                "--force".to_string(),
                settings.sources.reveal_url.clone(),
                reveal_arg,
            ],
        ));
        self.run(ShellCommand::git(
            &self.submodule(REVEAL_DIR),
            ["checkout".to_string(), revision.clone()],
        ));
        self.emit(ImportEvent::RevealPinned { revision });
    }

    fn assemble_slides(&mut self, lesson: &Lesson) -> Result<(), ImportError> {
        let deck = self
            .root
            .join(&self.settings.paths.slides)
            .join(format!("{}-lesson", lesson.name));
        self.create_dir(&deck)?;
        let mut files = self.copy_contents(self.submodule(&lesson.name).join("slides"), deck.clone());

        // The lesson's own reveal.js is an uninitialized submodule
        let nested = deck.join(REVEAL_DIR);
        if let Err(e) = remove_dir_if_exists(&nested) {
            self.emit(ImportEvent::CopyFailed {
                from: nested.clone(),
                to: nested.clone(),
                reason: e.to_string(),
            });
        }
        files += self.copy_contents(self.submodule(REVEAL_DIR), nested);

        self.emit(ImportEvent::SlidesAssembled {
            lesson: lesson.name.clone(),
            files,
        });
        Ok(())
    }
}

/// Import every `episode`/`episode_r` lesson, then pin reveal.js and
/// assemble slide decks.
///
/// Events are delivered to `on_event` as they happen, in order.
pub fn import_lessons(
    root: &Path,
    settings: &Settings,
    workshop: &Workshop,
    runner: &mut dyn CommandRunner,
    on_event: &mut dyn FnMut(&ImportEvent),
) -> Result<ImportReport, ImportError> {
    let mut importer = Importer {
        root,
        settings,
        runner,
        on_event,
        report: ImportReport::default(),
    };

    importer.reset_output_dirs()?;
    for lesson in workshop.imported_lessons() {
        importer.import_lesson(lesson)?;
    }

    // reveal.js is added after the lesson loop so the pinned checkout is not
    // moved by `git submodule update --remote`
    importer.pin_reveal();
    for lesson in workshop.imported_lessons() {
        importer.assemble_slides(lesson)?;
    }

    Ok(importer.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    /// Records commands and materializes fixture repositories on
    /// `submodule add`, the way a real clone would.
    #[derive(Default)]
    struct FakeGit {
        commands: Vec<ShellCommand>,
        fail_all: bool,
    }

    impl CommandRunner for FakeGit {
        fn run(&mut self, command: &ShellCommand) -> io::Result<bool> {
            self.commands.push(command.clone());
            if self.fail_all {
                return Ok(false);
            }
            if command.args.first().map(String::as_str) == Some("submodule")
                && command.args.get(1).map(String::as_str) == Some("add")
            {
                let target = command.cwd.join(command.args.last().unwrap());
                let fixture = if target.ends_with(REVEAL_DIR) {
                    reveal_fixture()
                } else {
                    lesson_repo_fixture()
                };
                copy_tree(&fixture, &target);
            }
            Ok(true)
        }
    }

    fn run_import(site: &Path, git: &mut FakeGit) -> (ImportReport, Vec<ImportEvent>) {
        let (settings, workshop) = load_fixture_workshop(site);
        let mut events = Vec::new();
        let report =
            import_lessons(site, &settings, &workshop, git, &mut |e: &ImportEvent| {
                events.push(e.clone())
            })
            .unwrap();
        (report, events)
    }

    fn command_lines(git: &FakeGit) -> Vec<String> {
        git.commands.iter().map(ToString::to_string).collect()
    }

    // =========================================================================
    // Copy helpers
    // =========================================================================

    #[test]
    fn copy_dir_contents_is_recursive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.md"), "a").unwrap();
        fs::write(src.join("nested/b.md"), "b").unwrap();

        let dst = tmp.path().join("dst");
        assert_eq!(copy_dir_contents(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("nested/b.md")).unwrap(), "b");
    }

    #[test]
    fn copy_dir_contents_missing_source_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(copy_dir_contents(&tmp.path().join("nope"), &tmp.path().join("dst")).is_err());
    }

    #[test]
    fn copy_file_into_keeps_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("deep/schedule.html");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "<table/>").unwrap();
        let target = copy_file_into(&src, tmp.path()).unwrap();
        assert_eq!(target, tmp.path().join("schedule.html"));
    }

    #[test]
    fn shell_command_display() {
        let cmd = ShellCommand::git(Path::new("."), ["submodule", "update", "--remote"]);
        assert_eq!(cmd.to_string(), "git submodule update --remote");
    }

    // =========================================================================
    // Full import
    // =========================================================================

    #[test]
    fn issues_git_commands_in_order() {
        let site = setup_fixtures();
        let mut git = FakeGit::default();
        run_import(site.path(), &mut git);

        assert_eq!(
            command_lines(&git),
            [
                "git submodule add --force -b gh-pages https://github.com/Southampton-RSG-Training/python-novice.git submodules/python-novice",
                "git submodule update --remote --merge",
                "git submodule add --force -b main https://github.com/Southampton-RSG-Training/project-novice.git submodules/project-novice",
                "git submodule update --remote --merge",
                "git submodule add --force https://github.com/hakimel/reveal.js.git submodules/reveal.js",
                "git checkout 8a54118f43",
            ]
        );
        assert_eq!(
            git.commands.last().unwrap().cwd,
            site.path().join("submodules/reveal.js")
        );
    }

    #[test]
    fn only_episode_lessons_are_imported() {
        let site = setup_fixtures();
        let config = site.path().join("_config.yml");
        let mut yaml = fs::read_to_string(&config).unwrap();
        yaml.push_str(
            "  - gh-name: welcome\n    title: Welcome\n    date: Monday\n    start-time: \"09:00\"\n",
        );
        fs::write(&config, yaml).unwrap();

        let mut git = FakeGit::default();
        let (report, _) = run_import(site.path(), &mut git);
        assert_eq!(report.lessons, ["python-novice", "project-novice"]);
        assert!(!command_lines(&git).iter().any(|c| c.contains("welcome")));
    }

    #[test]
    fn output_dirs_are_reset() {
        let site = setup_fixtures();
        let stale = site.path().join("collections/_episodes/python-novice-lesson/03-loops.md");
        assert!(stale.exists());

        run_import(site.path(), &mut FakeGit::default());
        assert!(!stale.exists());
    }

    #[test]
    fn lesson_content_lands_in_fixed_layout() {
        let site = setup_fixtures();
        run_import(site.path(), &mut FakeGit::default());
        let root = site.path();

        assert!(read_lesson_include(root, "python-novice", "setup.md").contains("# Setup"));
        assert!(read_lesson_include(root, "python-novice", "schedule.html").contains("<table"));
        assert_eq!(
            file_names(&root.join("collections/_episodes/python-novice-lesson")),
            ["01-intro.md", "02-data.md", "reference.md"]
        );
        assert!(root.join("fig/plot.png").is_file());
    }

    #[test]
    fn missing_optional_files_are_warnings() {
        let site = setup_fixtures();
        let (report, events) = run_import(site.path(), &mut FakeGit::default());

        let optional: Vec<&PathBuf> = events
            .iter()
            .filter_map(|e| match e {
                ImportEvent::OptionalMissing { path } => Some(path),
                _ => None,
            })
            .collect();
        // setup.R and renv.lock for both lessons
        assert_eq!(optional.len(), 4);
        assert!(optional[0].ends_with("python-novice-lesson/setup.R"));
        assert!(report.warnings >= 4);
    }

    #[test]
    fn present_optional_files_are_reported_as_copied() {
        let site = setup_fixtures();
        let (_, events) = run_import(site.path(), &mut FakeGit::default());

        let reference = site
            .path()
            .join("collections/_episodes/python-novice-lesson/reference.md");
        assert!(reference.is_file());
        assert!(events.iter().any(|e| matches!(
            e,
            ImportEvent::Copied { to, files: 1, .. } if *to == reference
        )));
    }

    #[test]
    fn missing_episode_directory_is_reported_not_fatal() {
        let site = setup_fixtures();
        let (report, events) = run_import(site.path(), &mut FakeGit::default());

        // The fixture repository has no _episodes_rmd/
        assert!(events.iter().any(|e| matches!(
            e,
            ImportEvent::CopyFailed { from, .. } if from.ends_with("project-novice/_episodes_rmd")
        )));
        assert_eq!(report.lessons.len(), 2);
    }

    #[test]
    fn slides_get_pinned_reveal() {
        let site = setup_fixtures();
        let (_, events) = run_import(site.path(), &mut FakeGit::default());

        let deck = site.path().join("slides/python-novice-lesson");
        assert!(deck.join("index.html").is_file());
        assert!(deck.join("assets/theme.css").is_file());
        assert!(!deck.join("reveal.js/.keep").exists());
        assert!(deck.join("reveal.js/dist/reveal.js").is_file());
        assert!(events.contains(&ImportEvent::RevealPinned {
            revision: "8a54118f43".to_string()
        }));
    }

    #[test]
    fn failing_git_never_aborts() {
        let site = setup_fixtures();
        let mut git = FakeGit {
            fail_all: true,
            ..FakeGit::default()
        };
        let (report, events) = run_import(site.path(), &mut git);

        let failed = events
            .iter()
            .filter(|e| matches!(e, ImportEvent::CommandFailed { .. }))
            .count();
        assert_eq!(failed, 6);
        assert_eq!(report.commands, 6);
        assert_eq!(report.lessons.len(), 2);
        assert!(site.path().join("submodules").is_dir());
    }
}
