use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::page_range::{Selection, SelectionError};

#[derive(Parser)]
#[command(name = "pdfops")]
#[command(about = "PDF page manipulation: extract, merge, split, rotate, encrypt and more")]
#[command(version)]
pub struct Cli {
    /// Increase log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Page selection flags shared by every page-based command.
#[derive(Args, Debug, Default, Clone)]
pub struct SelectArgs {
    /// Pages to select (e.g., "1,3-5,7")
    #[arg(short = 'p', long = "select-pages")]
    pub pages: Option<String>,

    /// Single page number (legacy syntax, repeatable)
    #[arg(short = 'i', long = "select-index")]
    pub index: Vec<String>,

    /// Inclusive page range given as a pair (legacy syntax, e.g. "[2,5]", repeatable)
    #[arg(short = 'r', long = "select-range")]
    pub range: Vec<String>,

    /// Explicit list of pages (legacy syntax, e.g. "[1,4,9]", repeatable)
    #[arg(short = 'l', long = "select-list")]
    pub list: Vec<String>,
}

impl SelectArgs {
    /// Combine the current and legacy flags into one selection.
    pub fn selection(&self, all: bool) -> Result<Selection, SelectionError> {
        let mut selection = match &self.pages {
            Some(expression) => Selection::parse(expression)?,
            None => Selection::default(),
        };
        for value in &self.index {
            selection = selection.union(Selection::parse_legacy_index(value)?);
        }
        for value in &self.range {
            selection = selection.union(Selection::parse_legacy_range(value)?);
        }
        for value in &self.list {
            selection = selection.union(Selection::parse_legacy_list(value)?);
        }
        if all {
            selection = selection.union(Selection::all());
        }
        Ok(selection)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove password protection from a PDF
    Decrypt {
        /// PDF file to decrypt
        path: PathBuf,

        /// The user or owner password
        #[arg(long)]
        password: String,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Password-protect a PDF
    Encrypt {
        /// PDF file to encrypt
        path: PathBuf,

        /// Password required to open the document
        #[arg(long)]
        user_password: String,

        /// Password granting full access (defaults to the user password)
        #[arg(long)]
        owner_password: Option<String>,

        /// Use 40-bit instead of 128-bit RC4 encryption
        #[arg(long = "use-40bit")]
        use_40bit: bool,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the selected pages
    Delete {
        /// PDF file to delete pages from
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep only the selected pages
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert the pages of a second PDF before a page of the first
    Insert {
        /// PDF file to insert into
        path: PathBuf,

        /// PDF file whose pages are inserted
        insert: PathBuf,

        /// Page number the inserted pages start at
        #[arg(
            short = 'p',
            long = "select-pages",
            visible_alias = "select-index",
            short_alias = 'i'
        )]
        page: String,

        /// Output file (defaults to overwriting the first input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine multiple PDFs into one, in argument order
    Merge {
        /// PDF files to merge
        inputs: Vec<PathBuf>,

        /// Merge every PDF in the current directory
        #[arg(short, long)]
        all: bool,

        /// Output file (defaults to overwriting the first input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Strip images, links or text from every page
    Remove {
        /// PDF file to clean
        path: PathBuf,

        /// Remove images
        #[arg(long)]
        images: bool,

        /// Remove link annotations
        #[arg(long)]
        links: bool,

        /// Remove text
        #[arg(long)]
        text: bool,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reverse the page order
    Reverse {
        /// PDF file to reverse
        path: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rotate pages clockwise
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Select every page
        #[arg(short, long)]
        all: bool,

        /// Clockwise angle in degrees, a multiple of 90
        #[arg(long, allow_negative_numbers = true)]
        angle: i64,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scale pages by a factor or to a fixed size
    Scale {
        /// PDF file to scale
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Select every page
        #[arg(short, long)]
        all: bool,

        /// Horizontal factor, or width in points with --scale-to
        #[arg(long)]
        horizontal: f32,

        /// Vertical factor, or height in points with --scale-to
        #[arg(long)]
        vertical: f32,

        /// Treat --horizontal/--vertical as absolute page dimensions
        #[arg(long)]
        scale_to: bool,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a PDF after each selected page
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Split after every page
        #[arg(short, long)]
        all: bool,

        /// Base name of the numbered outputs (<base>_1.pdf, <base>_2.pdf, ...)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
