//! menuedit - menu page editor
//!
//! A CLI tool that finds the menu items in static restaurant menu pages,
//! lets them be edited, and writes the pages back with every other part of
//! the markup left as it was.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(dead_code)]

mod args;
mod cli;
mod dom;
mod edit_model;
mod edit_script;
mod listing;
mod loader;
mod locator;
mod offers;
mod page_model;
mod session;
mod sink;
mod site_config;

// Load, scan and write stages
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ListFormat, OffersCommand};
use args::OffersEdit;
use edit_model::EditCommand;
use edit_script::EditScript;
use loader::DirSource;
use session::Session;
use sink::{DirSink, StdoutSink};
use site_config::SiteConfig;
use std::path::{Path, PathBuf};

/// Main entry point for the menuedit CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging if verbose
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    let config = SiteConfig::resolve(&cli.site, cli.config.as_deref())
        .context("Failed to load site configuration")?;
    let mut session = Session::new(config, DirSource::new(&cli.site));

    let result = dispatch(cli.command, &cli.site, &mut session);

    if session.has_unsaved_changes() {
        log::warn!(
            "Unsaved changes discarded: {}",
            session.unsaved().join(", ")
        );
    }

    result
}

/// Run one subcommand against the session
fn dispatch(command: Commands, site: &Path, session: &mut Session<DirSource>) -> Result<()> {
    match command {
        Commands::Pages => handle_pages_command(session.config()),

        Commands::Show { page, format } => {
            handle_show_command(session, &page, format)?;
        }

        Commands::Edit {
            page,
            sets,
            adds,
            toggles,
            script,
            output,
        } => {
            let commands = collect_edit_commands(script.as_deref(), &adds, &sets, &toggles)?;
            handle_edit_command(session, &page, commands, output)?;
        }

        Commands::Check => {
            handle_check_command(site, session.config())?;
        }

        Commands::Offers { action } => match action {
            OffersCommand::Show => {
                let offers = session
                    .open_offers()
                    .context("Failed to load the offers document")?;
                print!("{}", listing::render_offers(offers.data()));
            }
            OffersCommand::Edit {
                titles,
                add_lines,
                set_lines,
                delete_lines,
                output,
            } => {
                let edits = args::collect_offers_edits(&titles, &add_lines, &set_lines, &delete_lines)?;
                handle_offers_edit_command(session, edits, output)?;
            }
        },
    }

    Ok(())
}

/// Handle the pages command
fn handle_pages_command(config: &SiteConfig) {
    println!("Configured pages:\n");
    for page in &config.pages {
        println!("  {:<10} {:<28} {}", page.id, page.label, page.file);
    }
    println!("\nOffers: {}", config.offers_file);
}

/// Handle the show command
fn handle_show_command(
    session: &mut Session<DirSource>,
    page: &str,
    format: ListFormat,
) -> Result<()> {
    let model = session
        .open(page)
        .with_context(|| format!("Failed to open page '{}'", page))?;

    match format {
        ListFormat::Table => print!("{}", listing::render_table(model.page())),
        ListFormat::Csv => listing::write_csv(model.page(), std::io::stdout().lock())
            .context("Failed to write CSV")?,
    }

    Ok(())
}

/// Handle the edit command
fn handle_edit_command(
    session: &mut Session<DirSource>,
    page: &str,
    commands: Vec<EditCommand>,
    output: Option<PathBuf>,
) -> Result<()> {
    session
        .open(page)
        .with_context(|| format!("Failed to open page '{}'", page))?;

    let count = commands.len();
    for (index, command) in commands.into_iter().enumerate() {
        let description = format!("{:?}", command);
        session
            .apply_edit(page, command)
            .with_context(|| format!("Edit {} of {} failed: {}", index + 1, count, description))?;
    }
    log::info!("Applied {} edit(s) to {}", count, page);

    match output {
        Some(dir) => {
            let mut sink = DirSink::new(&dir);
            session
                .save(page, &mut sink)
                .with_context(|| format!("Failed to save '{}' to {}", page, dir.display()))?;
            eprintln!("✓ Wrote {} ({} edit(s))", dir.display(), count);
        }
        None => {
            let mut sink = StdoutSink;
            session.copy(page, &mut sink).context("Failed to print page")?;
        }
    }

    Ok(())
}

/// Handle the check command
fn handle_check_command(site: &Path, config: &SiteConfig) -> Result<()> {
    let profiles = config.profiles().context("Invalid page configuration")?;
    let source = DirSource::new(site);

    println!("Checking {} page(s) in {}...", profiles.len(), site.display());
    let results = pipeline::check_pages(&source, &profiles);

    let mut failures = 0;
    for (profile, result) in profiles.iter().zip(results) {
        match result {
            Ok(report) if report.is_ok() => println!(
                "✓ {:<10} {} section(s), {} item(s)",
                report.page_id, report.sections, report.items
            ),
            Ok(report) => {
                failures += 1;
                println!("✗ {:<10} {} mismatch(es)", report.page_id, report.mismatches.len());
                for mismatch in &report.mismatches {
                    println!("    {}", mismatch);
                }
            }
            Err(e) => {
                failures += 1;
                println!("✗ {:<10} {}", profile.id, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} page(s) failed the round-trip check", failures);
    }
    println!("\n✓ All pages round-trip cleanly");
    Ok(())
}

/// Build the command list for an edit: script first, then adds, sets and toggles
fn collect_edit_commands(
    script: Option<&Path>,
    adds: &[usize],
    sets: &[String],
    toggles: &[String],
) -> Result<Vec<EditCommand>> {
    let mut commands = match script {
        Some(path) => EditScript::load(path)
            .and_then(|s| s.commands())
            .with_context(|| format!("Failed to read edit script {}", path.display()))?,
        None => Vec::new(),
    };

    commands.extend(adds.iter().map(|&section| EditCommand::AddItem { section }));
    for arg in sets {
        commands.push(args::parse_set(arg).with_context(|| format!("Invalid --set '{}'", arg))?);
    }
    for arg in toggles {
        commands.push(args::parse_toggle(arg).with_context(|| format!("Invalid --toggle '{}'", arg))?);
    }

    Ok(commands)
}

/// Handle the offers edit command
fn handle_offers_edit_command(
    session: &mut Session<DirSource>,
    edits: Vec<OffersEdit>,
    output: Option<PathBuf>,
) -> Result<()> {
    let offers = session
        .open_offers()
        .context("Failed to load the offers document")?;

    let count = edits.len();
    for edit in edits {
        edit.apply(offers)
            .with_context(|| format!("Offers edit failed: {:?}", edit))?;
    }
    log::info!("Applied {} offers edit(s)", count);

    match output {
        Some(dir) => {
            let mut sink = DirSink::new(&dir);
            session
                .save_offers(&mut sink)
                .with_context(|| format!("Failed to save offers to {}", dir.display()))?;
            eprintln!("✓ Wrote {} ({} edit(s))", dir.display(), count);
        }
        None => {
            let mut sink = StdoutSink;
            session.copy_offers(&mut sink).context("Failed to print offers")?;
        }
    }

    Ok(())
}
