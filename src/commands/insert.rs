use crate::output;
use crate::page_range::Selection;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Insert every page of `insert` before page `page` (1-based) of `input`
pub fn run(input: &Path, insert: &Path, page: &str, output: Option<&Path>) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    output::require_pdf(insert)?;

    let mut doc = PdfDocument::open(input)?;
    let other = PdfDocument::open(insert)?;
    let inserted = other.page_count();

    let index = Selection::parse_legacy_index(page)?
        .resolve(doc.page_count())?
        .iter()
        .next()
        .context("No insertion page given")?;
    info!(index, inserted, "inserting pages");

    doc.insert(index, other)?;
    doc.save(&target)?;

    println!(
        "Inserted {} page(s) from {} at page {} into {}",
        inserted,
        insert.display(),
        index + 1,
        target.display()
    );

    Ok(())
}
