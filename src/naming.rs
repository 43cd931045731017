//! Filename handling for the `NN-name.md` episode convention.
//!
//! Lesson repositories number their episodes (`01-setup.md`, `02-data.md`).
//! The schedule builder inserts its own `00-schedule.md` landing page in
//! front, so the existing episodes are renumbered from `01` by their sorted
//! position. The new number replaces every leading digit of the old stem:
//!
//! - `03-intro.md` at position 1 → `01-intro.md`
//! - `10.md` at position 2 → `02.md`
//! - `7a-extra.md` at position 3 → `03a-extra.md`

/// Whether a file name matches `[0-9]*.md`.
pub fn is_numbered_markdown(file_name: &str) -> bool {
    file_name.starts_with(|c: char| c.is_ascii_digit()) && file_name.ends_with(".md")
}

/// The stem with its leading digits removed (`"03-intro"` → `"-intro"`).
pub fn strip_number_prefix(stem: &str) -> &str {
    stem.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// New file name for the episode at 1-based `position`.
pub fn renumbered_name(position: usize, stem: &str) -> String {
    format!("{position:02}{}.md", strip_number_prefix(stem))
}

/// Plan a renumbering: sort names lexicographically and pair each with its
/// new name. Names that do not match `[0-9]*.md` are ignored.
pub fn plan_renumbering<S: AsRef<str>>(names: &[S]) -> Vec<(String, String)> {
    let mut numbered: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| is_numbered_markdown(n))
        .collect();
    numbered.sort_unstable();
    numbered
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let stem = name.strip_suffix(".md").unwrap_or(name);
            (name.to_string(), renumbered_name(i + 1, stem))
        })
        .collect()
}
