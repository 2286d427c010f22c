//! In-memory documents for unit tests. Each page draws `(pageN)` so tests
//! can tell pages apart after reordering.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

fn font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    })
}

fn page_content(doc: &mut Document, number: u32) -> ObjectId {
    let content = format!("BT /F1 12 Tf 72 720 Td (page{}) Tj ET", number);
    doc.add_object(Stream::new(dictionary! {}, content.into_bytes()))
}

fn finish(doc: &mut Document, pages_id: ObjectId, pages: Object) {
    doc.objects.insert(pages_id, pages);
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}

/// A flat page tree with `count` Letter-sized pages
pub fn numbered_pages(count: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let kids: Vec<Object> = (1..=count)
        .map(|number| {
            let content_id = page_content(&mut doc, number);
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

    finish(
        &mut doc,
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );
    doc
}

/// Three pages under an intermediate node that carries `MediaBox`, `Rotate`
/// and `Resources` for its children
pub fn nested_pages() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let middle_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let page = |doc: &mut Document, number: u32, parent: ObjectId| -> Object {
        let content_id = page_content(doc, number);
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => content_id,
        })
        .into()
    };

    let first = page(&mut doc, 1, pages_id);
    let second = page(&mut doc, 2, middle_id);
    let third = page(&mut doc, 3, middle_id);

    doc.objects.insert(
        middle_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => pages_id,
            "Kids" => vec![second, third],
            "Count" => 2,
        }),
    );
    finish(
        &mut doc,
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![first, Object::Reference(middle_id)],
            "Count" => 3,
            "Rotate" => 90,
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    doc
}

/// One page that draws text, an image XObject and a form XObject, and
/// carries a link annotation and a text annotation
pub fn decorated_page() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0x80],
    ));
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        },
        b"0 0 10 10 re f".to_vec(),
    ));

    let content = b"BT /F1 12 Tf 72 720 Td (page1) Tj 14 TL (second) ' \
1 2 (third) \" [(fou) -20 (rth)] TJ ET \
q 50 0 0 50 72 600 cm /Im1 Do Q q /Fm1 Do Q"
        .to_vec();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let link_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
    });
    let note_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![20.into(), 20.into(), 30.into(), 30.into()],
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id, "Fm1" => form_id },
        },
        "Annots" => vec![Object::Reference(link_id), Object::Reference(note_id)],
    });

    finish(
        &mut doc,
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    doc
}

/// The `N` of every page's `(pageN)` marker, in page order
pub fn markers(doc: &Document) -> Vec<u32> {
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
