use crate::output;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run(input: &Path, output: Option<&Path>) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open(input)?;

    doc.reverse_pages()?;
    doc.save(&target)?;

    println!(
        "Reversed {} page(s) into {}",
        doc.page_count(),
        target.display()
    );

    Ok(())
}
