use clap::{Parser, Subcommand};
use std::path::Path;
use std::path::PathBuf;
use workshop_builder::import::{self, SystemRunner};
use workshop_builder::{clock, config, output, schedule, setup, workshop};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "workshop-builder")]
#[command(about = "Build tooling for multi-lesson workshop sites")]
#[command(long_about = "\
Build tooling for multi-lesson workshop sites

The site's _config.yml lists the lessons. Each lesson is an external
repository that is vendored as a git submodule, its setup page adapted for
embedding, and its schedule shifted to the workshop's start time.

Site structure:

  site/
  ├── _config.yml                  # lessons: gh-name, title, date, start-time, type
  ├── workshop.toml                # Tool settings (optional)
  ├── submodules/                  # git submodules, one per lesson
  ├── _includes/rsg/
  │   ├── <lesson>-lesson/         # setup.md, schedule.html per lesson
  │   └── schedule.html            # Combined, time-shifted schedule
  ├── collections/
  │   ├── _episodes/<lesson>-lesson/       # 00-schedule.md, 01-..., 02-...
  │   └── _episodes_rmd/<lesson>-lesson/
  └── slides/<lesson>/             # Slide decks sharing submodules/reveal.js

Start times accept \"9:30 am\", \"09:30\", or minutes since midnight (570).

Run 'workshop-builder gen-config' to generate a documented workshop.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root (where _config.yml lives)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Vendor lesson repositories as git submodules and copy their content
    Import,
    /// Strip front matter and demote headings in imported setup pages
    Setup,
    /// Build the combined schedule and per-lesson landing pages
    Schedule,
    /// Run all stages: import → setup → schedule
    Build,
    /// Validate settings and _config.yml without touching any files
    Check {
        /// Print the validated lessons as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock workshop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let root = cli.root.as_path();

    match cli.command {
        Command::Import => {
            let (settings, workshop) = load(root)?;
            run_import(root, &settings, &workshop)?;
        }
        Command::Setup => {
            let (settings, workshop) = load(root)?;
            let reports = setup::normalize_setup_pages(root, &settings, &workshop)?;
            output::print_setup_output(&reports, root);
        }
        Command::Schedule => {
            let (settings, workshop) = load(root)?;
            let report = schedule::build_schedule(root, &settings, &workshop)?;
            output::print_schedule_output(&report, root);
        }
        Command::Build => {
            let (settings, workshop) = load(root)?;

            println!("==> Stage 1: Importing lessons");
            run_import(root, &settings, &workshop)?;

            println!("==> Stage 2: Normalizing setup pages");
            let reports = setup::normalize_setup_pages(root, &settings, &workshop)?;
            output::print_setup_output(&reports, root);

            println!("==> Stage 3: Building schedule");
            let report = schedule::build_schedule(root, &settings, &workshop)?;
            output::print_schedule_output(&report, root);

            println!("==> Build complete: {}", root.display());
        }
        Command::Check { json } => {
            let (_, workshop) = load(root)?;
            for lesson in &workshop.lessons {
                for start in &lesson.start_times {
                    clock::parse_start_time(start)
                        .map_err(|e| format!("lesson '{}': {e}", lesson.name))?;
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&workshop)?);
            } else {
                println!("==> Checking {}", root.display());
                output::print_check_output(&workshop);
                println!("==> Configuration is valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load(
    root: &Path,
) -> Result<(config::Settings, workshop::Workshop), Box<dyn std::error::Error>> {
    let settings = config::load_settings(root)?;
    let workshop = workshop::load_workshop(root, &settings)?;
    Ok((settings, workshop))
}

fn run_import(
    root: &Path,
    settings: &config::Settings,
    workshop: &workshop::Workshop,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = import::import_lessons(
        root,
        settings,
        workshop,
        &mut SystemRunner,
        &mut |event: &import::ImportEvent| output::print_import_event(event, root),
    )?;
    println!("{}", output::format_import_summary(&report));
    Ok(())
}
