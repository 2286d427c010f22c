use anyhow::{bail, Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::collections::HashSet;
use tracing::debug;

use super::PdfDocument;

/// Page boxes rescaled together with the content.
const PAGE_BOXES: [&[u8]; 5] = [b"MediaBox", b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// Multiply width and height by the factors
    By { horizontal: f32, vertical: f32 },
    /// Resize to an absolute width and height in points
    To { width: f32, height: f32 },
}

impl ScaleMode {
    fn values(&self) -> (f32, f32) {
        match *self {
            ScaleMode::By {
                horizontal,
                vertical,
            } => (horizontal, vertical),
            ScaleMode::To { width, height } => (width, height),
        }
    }
}

/// Which kinds of content `remove_content` strips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentKinds {
    pub images: bool,
    pub links: bool,
    pub text: bool,
}

impl ContentKinds {
    pub fn is_empty(&self) -> bool {
        !(self.images || self.links || self.text)
    }
}

impl PdfDocument {
    /// Rotate the given zero-based pages clockwise by `angle` degrees
    pub fn rotate_pages(&mut self, pages: &[usize], angle: i64) -> Result<()> {
        if angle % 90 != 0 {
            bail!("Rotation angle must be a multiple of 90, got {}", angle);
        }

        let page_ids = self.page_ids_at(pages)?;
        for page_id in page_ids {
            let current = self
                .inherited_attribute(page_id, b"Rotate")
                .and_then(|rotate| rotate.as_i64().ok())
                .unwrap_or(0);
            let rotation = (current + angle).rem_euclid(360);
            self.doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Missing page object {:?}", page_id))?
                .set("Rotate", rotation);
            debug!(?page_id, from = current, to = rotation, "rotated page");
        }
        Ok(())
    }

    /// Scale the given zero-based pages, boxes and content alike
    pub fn scale_pages(&mut self, pages: &[usize], mode: ScaleMode) -> Result<()> {
        let (x, y) = mode.values();
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            bail!("Scale values must be positive, got {} x {}", x, y);
        }

        for page_id in self.page_ids_at(pages)? {
            let media_box = self
                .page_box(page_id, b"MediaBox")
                .with_context(|| format!("Page {:?} has no usable MediaBox", page_id))?;
            let (sx, sy) = match mode {
                ScaleMode::By {
                    horizontal,
                    vertical,
                } => (horizontal, vertical),
                ScaleMode::To { width, height } => {
                    let current_width = media_box[2] - media_box[0];
                    let current_height = media_box[3] - media_box[1];
                    if current_width == 0.0 || current_height == 0.0 {
                        bail!("Page {:?} has an empty MediaBox", page_id);
                    }
                    (width / current_width, height / current_height)
                }
            };

            let boxes: Vec<(&[u8], [f32; 4])> = PAGE_BOXES
                .iter()
                .filter_map(|&key| Some((key, self.page_box(page_id, key)?)))
                .collect();
            let page = self
                .doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Missing page object {:?}", page_id))?;
            for (key, [x0, y0, x1, y1]) in boxes {
                page.set(
                    key,
                    vec![
                        Object::Real(x0 * sx),
                        Object::Real(y0 * sy),
                        Object::Real(x1 * sx),
                        Object::Real(y1 * sy),
                    ],
                );
            }
            let has_contents = page.has(b"Contents");

            if has_contents {
                let content = self
                    .doc
                    .get_page_content(page_id)
                    .with_context(|| format!("Failed to read content of page {:?}", page_id))?;
                let mut scaled = format!("q {} 0 0 {} 0 0 cm\n", sx, sy).into_bytes();
                scaled.extend_from_slice(&content);
                scaled.extend_from_slice(b"\nQ\n");
                self.replace_page_content(page_id, scaled);
            }
            debug!(?page_id, sx, sy, "scaled page");
        }

        self.doc.prune_objects();
        Ok(())
    }

    /// Strip the selected kinds of content from every page
    pub fn remove_content(&mut self, kinds: ContentKinds) -> Result<()> {
        if kinds.is_empty() {
            return Ok(());
        }
        self.flatten_page_tree()?;

        for page_id in self.page_ids() {
            if kinds.links {
                let removed = self.remove_links(page_id)?;
                debug!(?page_id, removed, "removed link annotations");
            }
            if (kinds.images || kinds.text) && self.has_contents(page_id) {
                self.filter_operations(page_id, kinds)?;
            }
        }

        self.doc.prune_objects();
        Ok(())
    }

    fn page_ids_at(&self, pages: &[usize]) -> Result<Vec<ObjectId>> {
        let page_ids = self.page_ids();
        pages
            .iter()
            .map(|&index| {
                page_ids.get(index).copied().with_context(|| {
                    format!("Page {} is out of range (1-{})", index + 1, page_ids.len())
                })
            })
            .collect()
    }

    fn has_contents(&self, page_id: ObjectId) -> bool {
        self.doc
            .get_dictionary(page_id)
            .is_ok_and(|page| page.has(b"Contents"))
    }

    /// A page box as `[x0, y0, x1, y1]`, inherited boxes included
    fn page_box(&self, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
        let value = self.inherited_attribute(page_id, key)?;
        let values = self.resolve(&value).as_array().ok()?;
        if values.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, value) in rect.iter_mut().zip(values) {
            *slot = self.resolve(value).as_float().ok()?;
        }
        Some(rect)
    }

    /// Point the page at a fresh, single content stream
    fn replace_page_content(&mut self, page_id: ObjectId, content: Vec<u8>) {
        let stream_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content));
        if let Ok(page) = self.doc.get_dictionary_mut(page_id) {
            page.set("Contents", stream_id);
        }
    }

    fn remove_links(&mut self, page_id: ObjectId) -> Result<usize> {
        let annots = match self.doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(annots) => annots.clone(),
            Err(_) => return Ok(0),
        };
        let annots = match self.resolve(&annots).as_array() {
            Ok(annots) => annots.clone(),
            Err(_) => return Ok(0),
        };

        let before = annots.len();
        let kept: Vec<Object> = annots
            .into_iter()
            .filter(|annot| !self.is_link(annot))
            .collect();
        let removed = before - kept.len();

        let page = self.doc.get_dictionary_mut(page_id)?;
        if kept.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", kept);
        }
        Ok(removed)
    }

    fn is_link(&self, annot: &Object) -> bool {
        self.resolve(annot)
            .as_dict()
            .and_then(|dict| dict.get(b"Subtype"))
            .and_then(Object::as_name)
            .is_ok_and(|subtype| subtype == b"Link")
    }

    /// Names under `/Resources /XObject` that refer to images
    fn image_names(&self, page_id: ObjectId) -> HashSet<Vec<u8>> {
        let Some(resources) = self.inherited_attribute(page_id, b"Resources") else {
            return HashSet::new();
        };
        let Ok(xobjects) = self
            .resolve(&resources)
            .as_dict()
            .and_then(|resources| resources.get(b"XObject"))
        else {
            return HashSet::new();
        };
        let Ok(xobjects) = self.resolve(xobjects).as_dict() else {
            return HashSet::new();
        };

        xobjects
            .iter()
            .filter(|(_, xobject)| match self.resolve(xobject) {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|subtype| subtype == b"Image"),
                _ => false,
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn filter_operations(&mut self, page_id: ObjectId, kinds: ContentKinds) -> Result<()> {
        let images = if kinds.images {
            self.image_names(page_id)
        } else {
            HashSet::new()
        };
        let bytes = self
            .doc
            .get_page_content(page_id)
            .with_context(|| format!("Failed to read content of page {:?}", page_id))?;
        let content = Content::decode(&bytes)
            .with_context(|| format!("Failed to parse content of page {:?}", page_id))?;

        let mut operations = Vec::with_capacity(content.operations.len());
        for operation in content.operations {
            match operation.operator.as_str() {
                "Tj" | "TJ" if kinds.text => {}
                // ' and " also move to the next line; keep that part
                "'" if kinds.text => operations.push(Operation::new("T*", vec![])),
                "\"" if kinds.text => {
                    let mut operands = operation.operands.into_iter();
                    if let (Some(word_spacing), Some(char_spacing)) =
                        (operands.next(), operands.next())
                    {
                        operations.push(Operation::new("Tw", vec![word_spacing]));
                        operations.push(Operation::new("Tc", vec![char_spacing]));
                    }
                    operations.push(Operation::new("T*", vec![]));
                }
                "BI" | "ID" | "EI" if kinds.images => {}
                "Do" if kinds.images && draws_image(&operation, &images) => {}
                _ => operations.push(operation),
            }
        }

        let encoded = Content { operations }
            .encode()
            .with_context(|| format!("Failed to write content of page {:?}", page_id))?;
        self.replace_page_content(page_id, encoded);
        Ok(())
    }
}

fn draws_image(operation: &Operation, images: &HashSet<Vec<u8>>) -> bool {
    operation
        .operands
        .first()
        .and_then(|name| name.as_name().ok())
        .is_some_and(|name| images.contains(name))
}
