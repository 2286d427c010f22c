use crate::output;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run(input: &Path, password: &str, output: Option<&Path>) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::open_encrypted(input, password)?;
    doc.save(&target)?;

    println!("Decrypted {} into {}", input.display(), target.display());

    Ok(())
}
