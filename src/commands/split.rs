use crate::output::{self, StagedOutput};
use crate::page_range::Selection;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

/// Split after every selected page. Parts are staged first and only moved
/// into place once all of them were written.
pub fn run(input: &Path, selection: &Selection, output: Option<&Path>) -> Result<()> {
    output::require_pdf(input)?;
    let doc = PdfDocument::open(input)?;
    let total_pages = doc.page_count();
    if total_pages < 2 {
        anyhow::bail!("Cannot split a file with less than two pages");
    }

    // Splitting after the last page would leave an empty part
    let points = selection.resolve_within(total_pages - 1)?;
    let parts = partition(points.as_slice(), total_pages as usize);
    let targets = output::split_targets(input, output, parts.len())?;
    info!(parts = parts.len(), total_pages, "splitting");

    let mut staged = Vec::with_capacity(parts.len());
    for (pages, target) in parts.iter().zip(&targets) {
        let mut part = PdfDocument::from_document(doc.doc.clone(), &doc.path);
        part.retain_pages(pages)?;
        let staged_part = StagedOutput::write(&mut part.doc, target)?;
        debug!(target = %staged_part.target().display(), pages = pages.len(), "staged split part");
        staged.push(staged_part);
    }
    let written = output::commit_all(staged)?;

    println!("Split {} pages into {} files:", total_pages, written.len());
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Zero-based page runs, cutting after each zero-based split point
fn partition(points: &[usize], total_pages: usize) -> Vec<Vec<usize>> {
    let mut parts = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &point in points {
        parts.push((start..=point).collect());
        start = point + 1;
    }
    parts.push((start..total_pages).collect());
    parts
}
