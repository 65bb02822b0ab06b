//! Command-line interface definitions for menuedit

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the show command
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ListFormat {
    /// Indented text listing
    #[default]
    Table,
    /// One CSV row per item
    Csv,
}

/// CLI structure for the menuedit application
#[derive(Parser)]
#[command(name = "menuedit")]
#[command(version)]
#[command(about = "Edit menu items in static restaurant menu pages", long_about = None)]
pub struct Cli {
    /// Site directory holding the menu pages
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub site: PathBuf,

    /// Site configuration file (defaults to <site>/menuedit.toml, then the built-in layout)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for menuedit
#[derive(Subcommand)]
pub enum Commands {
    /// List configured pages
    Pages,

    /// Show the sections and items of a page
    Show {
        /// Page identifier
        page: String,

        /// Listing format
        #[arg(short, long, value_enum, default_value = "table")]
        format: ListFormat,
    },

    /// Edit a page and write the regenerated document
    Edit {
        /// Page identifier
        page: String,

        /// Set a field: SECTION:ITEM:FIELD=VALUE (FIELD is name, description, price or price:N)
        #[arg(long = "set", value_name = "S:I:FIELD=VALUE")]
        sets: Vec<String>,

        /// Append a blank item to a section
        #[arg(long = "add", value_name = "SECTION")]
        adds: Vec<usize>,

        /// Toggle the removed flag of an item: SECTION:ITEM
        #[arg(long = "toggle", value_name = "S:I")]
        toggles: Vec<String>,

        /// TOML edit script applied before the other flags
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Directory to write the page into (prints to stdout when omitted)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Regenerate every page without edits and compare the items read back
    Check,

    /// Show or edit the weekly offers
    Offers {
        #[command(subcommand)]
        action: OffersCommand,
    },
}

/// Offers subcommands
#[derive(Subcommand)]
pub enum OffersCommand {
    /// List offers by day
    Show,

    /// Edit offers and write the document
    Edit {
        /// Set a day's title: DAY=TEXT
        #[arg(long = "title", value_name = "DAY=TEXT")]
        titles: Vec<String>,

        /// Append a line to a day: DAY=TEXT
        #[arg(long = "add-line", value_name = "DAY=TEXT")]
        add_lines: Vec<String>,

        /// Replace a line: DAY:INDEX=TEXT
        #[arg(long = "set-line", value_name = "DAY:INDEX=TEXT")]
        set_lines: Vec<String>,

        /// Delete a line: DAY:INDEX
        #[arg(long = "delete-line", value_name = "DAY:INDEX")]
        delete_lines: Vec<String>,

        /// Directory to write the document into (prints to stdout when omitted)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}
