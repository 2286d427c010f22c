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
    let keep = pages.complement(total_pages as usize);
    info!(selected = pages.len(), total_pages, "deleting pages");
    if keep.is_empty() {
        anyhow::bail!("Cannot delete all {} pages", total_pages);
    }

    doc.retain_pages(&keep)?;
    doc.save(&target)?;

    println!(
        "Deleted {} page(s), {} left in {}",
        pages.len(),
        keep.len(),
        target.display()
    );

    Ok(())
}
