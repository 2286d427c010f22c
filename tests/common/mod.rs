#![allow(dead_code)]

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub fn pdfops() -> Command {
    Command::cargo_bin("pdfops").unwrap()
}

/// Write a PDF with `pages` Letter pages; page `N` draws `(pageN)`
pub fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|number| {
            let content = format!("BT /F1 12 Tf 72 720 Td (page{}) Tj ET", number);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Fixture"),
        "Author" => Object::string_literal("pdfops tests"),
    });
    doc.trailer.set("Info", info_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

pub fn load(path: &Path) -> Document {
    Document::load(path).unwrap()
}

/// The `N` of each page's `(pageN)` marker, 0 when a page has none
pub fn markers(path: &Path) -> Vec<u32> {
    let doc = load(path);
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).unwrap_or_default();
            let text = String::from_utf8_lossy(&content);
            text.split("(page")
                .nth(1)
                .and_then(|rest| rest.split(')').next())
                .and_then(|n| n.parse().ok())
                .unwrap_or(0)
        })
        .collect()
}

/// The `/Rotate` of each page, 0 when unset
pub fn rotations(path: &Path) -> Vec<i64> {
    let doc = load(path);
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            doc.get_dictionary(page_id)
                .unwrap()
                .get(b"Rotate")
                .and_then(|rotate| rotate.as_i64())
                .unwrap_or(0)
        })
        .collect()
}

/// Width and height of each page's `/MediaBox`
pub fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let doc = load(path);
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let media_box = doc
                .get_dictionary(page_id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap();
            let n: Vec<f32> = media_box.iter().map(number).collect();
            (n[2] - n[0], n[3] - n[1])
        })
        .collect()
}

fn number(object: &Object) -> f32 {
    match object {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {:?}", other),
    }
}

/// File names in `dir`, sorted
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
