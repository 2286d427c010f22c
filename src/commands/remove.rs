use crate::output;
use crate::pdf::{ContentKinds, PdfDocument};
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run(input: &Path, kinds: ContentKinds, output: Option<&Path>) -> Result<()> {
    if kinds.is_empty() {
        anyhow::bail!("Nothing to remove; pass --images, --links or --text");
    }
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open(input)?;
    info!(?kinds, "removing content");

    doc.remove_content(kinds)?;
    doc.save(&target)?;

    let removed: Vec<&str> = [
        (kinds.images, "images"),
        (kinds.links, "links"),
        (kinds.text, "text"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    println!(
        "Removed {} from {} page(s) into {}",
        removed.join(", "),
        doc.page_count(),
        target.display()
    );

    Ok(())
}
