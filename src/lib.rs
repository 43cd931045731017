//! # Workshop Builder
//!
//! Build-time tooling for a workshop website assembled from several
//! independently maintained lesson repositories. The site's `_config.yml`
//! lists the lessons; this crate vendors them, adapts their setup pages for
//! embedding, and produces one combined schedule shifted to the workshop's
//! own start times.
//!
//! # Architecture: Three Independent Stages
//!
//! ```text
//! 1. Import    _config.yml  →  submodules/ + _includes/rsg/ + collections/ + slides/
//! 2. Setup     _includes/rsg/<lesson>-lesson/setup.md   (rewritten in place)
//! 3. Schedule  _includes/rsg/<lesson>-lesson/schedule.html  →  _includes/rsg/schedule.html
//! ```
//!
//! The stages never call each other; each reads the files the previous one
//! left behind. `build` runs them in order. Keeping them separate means a
//! maintainer can re-run just the schedule after editing a start time,
//! without touching git.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`import`] | Stage 1: git submodules, file copies, reveal.js pinning, slide assembly |
//! | [`setup`] | Stage 2: front-matter removal and heading demotion for `setup.md` |
//! | [`schedule`] | Stage 3: table parsing, time shifting, HTML rendering, landing pages |
//! | [`workshop`] | `_config.yml` loading and lesson validation |
//! | [`config`] | `workshop.toml` tool settings: stock defaults, merging, validation |
//! | [`clock`] | Start-time parsing and minute arithmetic on wall-clock times |
//! | [`naming`] | `NN-name.md` episode renumbering |
//! | [`types`] | Shared YAML value shapes (`ContentType`, `StartTime`) |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Git Behind a Trait
//!
//! The importer never spawns processes directly. Every `git` invocation goes
//! through [`import::CommandRunner`], so tests substitute a fake that records
//! the command sequence and materializes fixture repositories instead of
//! cloning from the network.
//!
//! ## Maud for the Schedule
//!
//! The combined schedule is built with [Maud](https://maud.lambda.xyz/), the
//! same as every other piece of HTML this project emits. Interpolated session
//! text is escaped automatically; the markup structure is checked at compile
//! time.
//!
//! ## Wall-Clock Arithmetic
//!
//! Schedule times are times of day, not instants. Shifting `23:30` by an hour
//! yields `00:30`; there is no date to roll over. [`clock`] uses
//! `chrono::NaiveTime`, whose wrapping addition has exactly this behavior.

pub mod clock;
pub mod config;
pub mod import;
pub mod naming;
pub mod output;
pub mod schedule;
pub mod setup;
pub mod types;
pub mod workshop;

#[cfg(test)]
pub(crate) mod test_helpers;
