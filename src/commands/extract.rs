use crate::output;
use crate::page_range::Selection;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run(input: &Path, selection: &Selection, output: Option<&Path>) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open(input)?;
    let total_pages = doc.page_count();

    let pages = selection.resolve(total_pages)?;
    info!(selected = pages.len(), total_pages, "extracting pages");
    if pages.len() == total_pages as usize {
        anyhow::bail!(
            "Cannot extract all {} pages; nothing would change",
            total_pages
        );
    }

    doc.retain_pages(pages.as_slice())?;
    doc.save(&target)?;

    println!("Extracted {} page(s) to {}", pages.len(), target.display());

    Ok(())
}
