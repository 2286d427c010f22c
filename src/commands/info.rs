use crate::output;
use crate::pdf::{PdfDocument, PdfInfo};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct InfoReport<'a> {
    file: String,
    #[serde(flatten)]
    info: &'a PdfInfo,
}

pub fn run(path: &Path, json: bool) -> Result<()> {
    output::require_pdf(path)?;
    // Encrypted files still report their structure
    let doc = PdfDocument::load(path)?;
    let info = doc.get_info();

    if json {
        let report = InfoReport {
            file: path.display().to_string(),
            info: &info,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("Version: {}", info.version);
    println!("Pages: {}", info.page_count);
    println!("Encrypted: {}", if info.encrypted { "yes" } else { "no" });

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Keywords", &info.keywords),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }
    if let Some(creation_date) = &info.creation_date {
        println!("Created: {}", format_pdf_date(creation_date));
    }
    if let Some(mod_date) = &info.mod_date {
        println!("Modified: {}", format_pdf_date(mod_date));
    }

    Ok(())
}

/// `D:YYYYMMDDHHmmSS...` as `YYYY-MM-DD HH:mm:SS`; anything else unchanged
fn format_pdf_date(date: &str) -> String {
    let Some(d) = date.strip_prefix("D:") else {
        return date.to_string();
    };
    if d.len() < 8 || !d.is_char_boundary(8) || !d[..8].bytes().all(|b| b.is_ascii_digit()) {
        return date.to_string();
    }

    let time = match d.get(8..14) {
        Some(t) if t.bytes().all(|b| b.is_ascii_digit()) => {
            format!(" {}:{}:{}", &t[0..2], &t[2..4], &t[4..6])
        }
        _ => String::new(),
    };
    format!("{}-{}-{}{}", &d[0..4], &d[4..6], &d[6..8], time)
}
