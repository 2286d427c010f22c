use crate::output;
use crate::page_range::Selection;
use crate::pdf::{PdfDocument, ScaleMode};
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run(
    input: &Path,
    selection: &Selection,
    mode: ScaleMode,
    output: Option<&Path>,
) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open(input)?;
    let pages = selection.resolve(doc.page_count())?;
    info!(selected = pages.len(), ?mode, "scaling pages");

    doc.scale_pages(pages.as_slice(), mode)?;
    doc.save(&target)?;

    let how = match mode {
        ScaleMode::By {
            horizontal,
            vertical,
        } => format!("by {} x {}", horizontal, vertical),
        ScaleMode::To { width, height } => format!("to {} x {} pt", width, height),
    };
    println!(
        "Scaled {} page(s) {} into {}",
        pages.len(),
        how,
        target.display()
    );

    Ok(())
}
