use crate::output;
use crate::pdf::{KeyLength, PdfDocument};
use anyhow::Result;
use std::path::Path;

pub fn run(
    input: &Path,
    user_password: &str,
    owner_password: Option<&str>,
    key_length: KeyLength,
    output: Option<&Path>,
) -> Result<()> {
    let target = output::resolve_output(input, output)?;
    let mut doc = PdfDocument::load(input)?;

    doc.encrypt(
        user_password,
        owner_password.unwrap_or(user_password),
        key_length,
    )?;
    doc.save(&target)?;

    let bits = match key_length {
        KeyLength::Bits40 => 40,
        KeyLength::Bits128 => 128,
    };
    println!(
        "Encrypted {} with {}-bit RC4 into {}",
        input.display(),
        bits,
        target.display()
    );

    Ok(())
}
