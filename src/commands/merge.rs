use crate::output;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub fn run(inputs: &[PathBuf], all: bool, output: Option<&Path>) -> Result<()> {
    let inputs = if all || inputs.is_empty() {
        let Some(target) = output else {
            anyhow::bail!("Merging a whole directory needs an explicit --output");
        };
        let mut files = pdfs_in(Path::new("."))?;
        // A previous result in the same directory is not an input
        if let Ok(target) = fs::canonicalize(target) {
            files.retain(|file| fs::canonicalize(file).map_or(true, |file| file != target));
        }
        files
    } else {
        inputs.to_vec()
    };

    if inputs.len() < 2 {
        anyhow::bail!("Cannot merge less than two files (got {})", inputs.len());
    }
    let target = output::resolve_output(&inputs[0], output)?;
    info!(files = inputs.len(), target = %target.display(), "merging");
    for input in &inputs[1..] {
        output::require_pdf(input)?;
    }

    // Load everything up front so a bad input never leaves a partial result
    let mut documents = inputs
        .iter()
        .map(PdfDocument::open)
        .collect::<Result<Vec<_>>>()?;
    let mut merged = documents.remove(0);
    for doc in documents {
        merged.append(doc)?;
    }
    merged.save(&target)?;

    println!(
        "Merged {} files ({} pages) into {}",
        inputs.len(),
        merged.page_count(),
        target.display()
    );

    Ok(())
}

/// Every `.pdf` file directly inside `dir`, sorted by name
fn pdfs_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        if entry.file_type().is_file() && output::is_pdf(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdfs_in_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = pdfs_in(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);
    }
}
