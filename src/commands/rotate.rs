use crate::output;
use crate::page_range::Selection;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run(input: &Path, selection: &Selection, angle: i64, output: Option<&Path>) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open(input)?;
    let pages = selection.resolve(doc.page_count())?;
    info!(selected = pages.len(), angle, "rotating pages");

    doc.rotate_pages(pages.as_slice(), angle)?;
    doc.save(&target)?;

    println!(
        "Rotated {} page(s) by {} degrees into {}",
        pages.len(),
        angle,
        target.display()
    );

    Ok(())
}
