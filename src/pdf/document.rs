use anyhow::{bail, Context, Result};
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::output;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against `/Parent` cycles in damaged files.
const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug)]
pub struct PdfDocument {
    pub doc: Document,
    pub path: PathBuf,
}

impl PdfDocument {
    /// Load a PDF as-is, encrypted or not
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        debug!(
            path = %path.display(),
            pages = doc.get_pages().len(),
            encrypted = doc.is_encrypted(),
            "opened document"
        );
        Ok(PdfDocument {
            doc,
            path: path.to_path_buf(),
        })
    }

    /// Load a PDF whose content is readable without a password
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let document = Self::load(path)?;
        if document.is_encrypted() {
            bail!(
                "{} is encrypted; decrypt it first with `pdfops decrypt`",
                document.path.display()
            );
        }
        Ok(document)
    }

    pub fn from_document<P: AsRef<Path>>(doc: Document, path: P) -> Self {
        PdfDocument {
            doc,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in document order; position `i` is zero-based page `i`
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo {
            version: self.doc.version.clone(),
            encrypted: self.is_encrypted(),
            page_count: self.page_count(),
            ..Default::default()
        };

        // Strings of an encrypted file are ciphertext
        if info.encrypted {
            return info;
        }

        let dict = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(info_ref)) => self.doc.get_dictionary(*info_ref).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        if let Some(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.mod_date = get_string_from_dict(dict, b"ModDate");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.keywords = get_string_from_dict(dict, b"Keywords");
        }

        info
    }

    /// Rebuild the page list from zero-based indices, in the given order.
    /// Pages not named are dropped.
    pub fn reorder_pages(&mut self, order: &[usize]) -> Result<()> {
        let page_ids = self.page_ids();
        let total = page_ids.len();
        let ordered = order
            .iter()
            .map(|&index| {
                page_ids.get(index).copied().with_context(|| {
                    format!("Page {} is out of range (1-{})", index + 1, total)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_page_order(&ordered)
    }

    /// Keep only the given zero-based pages, preserving their relative order
    pub fn retain_pages(&mut self, keep: &[usize]) -> Result<()> {
        let mut keep = keep.to_vec();
        keep.sort_unstable();
        keep.dedup();
        self.reorder_pages(&keep)
    }

    pub fn reverse_pages(&mut self) -> Result<()> {
        let order: Vec<usize> = (0..self.page_count() as usize).rev().collect();
        self.reorder_pages(&order)
    }

    /// Append every page of `other` after the last page of this document.
    /// Returns the object IDs of the appended pages.
    pub fn append(&mut self, mut other: PdfDocument) -> Result<Vec<ObjectId>> {
        other
            .flatten_page_tree()
            .with_context(|| format!("Failed to read page tree: {}", other.path.display()))?;

        // Move the other document's object IDs past ours
        other.doc.renumber_objects_with(self.doc.max_id + 1);
        let appended = other.page_ids();

        let root = self.flatten_page_tree()?;
        self.doc.max_id = self.doc.max_id.max(other.doc.max_id);
        self.doc.objects.extend(other.doc.objects);
        for &page_id in &appended {
            self.doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Missing page object {:?}", page_id))?
                .set("Parent", root);
        }

        let mut order = self.page_ids();
        order.extend(appended.iter().copied());
        self.set_page_order(&order)?;

        debug!(
            from = %other.path.display(),
            pages = appended.len(),
            total = self.page_count(),
            "appended document"
        );
        Ok(appended)
    }

    /// Insert every page of `other` so that its first page lands at zero-based `index`
    pub fn insert(&mut self, index: usize, other: PdfDocument) -> Result<()> {
        let original = self.page_ids();
        if index >= original.len() {
            bail!("Page {} is out of range (1-{})", index + 1, original.len());
        }

        let inserted = self.append(other)?;
        let mut order = Vec::with_capacity(original.len() + inserted.len());
        order.extend_from_slice(&original[..index]);
        order.extend_from_slice(&inserted);
        order.extend_from_slice(&original[index..]);
        self.set_page_order(&order)
    }

    /// Write to `path` through a temporary file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf> {
        output::write_document(&mut self.doc, path.as_ref())
    }

    /// Object ID of the root `/Pages` node
    pub(super) fn pages_root(&self) -> Result<ObjectId> {
        self.doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .with_context(|| format!("No page tree in {}", self.path.display()))
    }

    /// Look up `key` on the page itself, then on its ancestors.
    pub(super) fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = Some(page_id);
        let mut depth = 0;
        while let Some(id) = current {
            if depth > MAX_TREE_DEPTH {
                break;
            }
            let dict = self.doc.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
        None
    }

    /// Follow one level of indirection
    pub(super) fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(object),
            _ => object,
        }
    }

    /// Hang every page directly off the root `/Pages` node, copying inherited
    /// attributes onto the pages so they survive the move.
    pub(super) fn flatten_page_tree(&mut self) -> Result<ObjectId> {
        let root = self.pages_root()?;
        let page_ids = self.page_ids();

        for &page_id in &page_ids {
            let inherited: Vec<(&[u8], Object)> = INHERITABLE
                .iter()
                .filter_map(|&key| Some((key, self.inherited_attribute(page_id, key)?)))
                .collect();

            let page = self
                .doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Missing page object {:?}", page_id))?;
            for (key, value) in inherited {
                if !page.has(key) {
                    page.set(key, value);
                }
            }
            page.set("Parent", root);
        }

        self.set_kids(root, &page_ids)?;
        Ok(root)
    }

    fn set_kids(&mut self, root: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
        let pages = self
            .doc
            .get_dictionary_mut(root)
            .with_context(|| format!("No page tree in {}", self.path.display()))?;
        pages.set(
            "Kids",
            page_ids
                .iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<_>>(),
        );
        pages.set("Count", page_ids.len() as i64);
        Ok(())
    }

    /// Make `page_ids` the complete page list and drop what became unreachable
    fn set_page_order(&mut self, page_ids: &[ObjectId]) -> Result<()> {
        let root = self.flatten_page_tree()?;
        self.set_kids(root, page_ids)?;
        self.doc.prune_objects();
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PdfInfo {
    pub version: String,
    pub encrypted: bool,
    #[serde(rename = "pages")]
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // Check for UTF-16 BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        // PDFDocEncoding, approximated as Latin-1
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{markers, nested_pages, numbered_pages};
    use lopdf::dictionary;

    fn document(pages: u32) -> PdfDocument {
        PdfDocument::from_document(numbered_pages(pages), "test.pdf")
    }

    #[test]
    fn test_page_count() {
        assert_eq!(document(4).page_count(), 4);
    }

    #[test]
    fn test_retain_keeps_relative_order() {
        let mut doc = document(5);
        doc.retain_pages(&[3, 0, 2]).unwrap();
        assert_eq!(markers(&doc.doc), vec![1, 3, 4]);
    }

    #[test]
    fn test_retain_out_of_range() {
        let mut doc = document(2);
        assert!(doc.retain_pages(&[2]).is_err());
    }

    #[test]
    fn test_delete_and_extract_complement() {
        let selected = [1, 3];
        let mut deleted = document(5);
        deleted.retain_pages(&[0, 2, 4]).unwrap();
        let mut extracted = document(5);
        extracted.retain_pages(&selected).unwrap();

        let mut pages = markers(&deleted.doc);
        pages.extend(markers(&extracted.doc));
        pages.sort_unstable();
        assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_reverse_twice_is_identity() {
        let mut doc = document(4);
        doc.reverse_pages().unwrap();
        assert_eq!(markers(&doc.doc), vec![4, 3, 2, 1]);
        doc.reverse_pages().unwrap();
        assert_eq!(markers(&doc.doc), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_append() {
        let mut first = document(3);
        let second = document(2);
        let appended = first.append(second).unwrap();
        assert_eq!(appended.len(), 2);
        assert_eq!(markers(&first.doc), vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut first = document(3);
        let second = PdfDocument::from_document(numbered_pages(2), "other.pdf");
        first.insert(1, second).unwrap();
        assert_eq!(markers(&first.doc), vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut first = document(3);
        assert!(first.insert(3, document(1)).is_err());
    }

    #[test]
    fn test_flatten_keeps_inherited_attributes() {
        let mut doc = PdfDocument::from_document(nested_pages(), "nested.pdf");
        assert_eq!(doc.page_count(), 3);
        doc.reverse_pages().unwrap();

        assert_eq!(markers(&doc.doc), vec![3, 2, 1]);
        for page_id in doc.page_ids() {
            let page = doc.doc.get_dictionary(page_id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        }
    }

    #[test]
    fn test_info_reads_metadata() {
        let mut raw = numbered_pages(2);
        let info_id = raw.add_object(dictionary! {
            "Title" => Object::string_literal("Quarterly"),
            "Author" => Object::string_literal("Finance"),
        });
        raw.trailer.set("Info", info_id);
        let doc = PdfDocument::from_document(raw, "info.pdf");

        let info = doc.get_info();
        assert_eq!(info.page_count, 2);
        assert_eq!(info.title.as_deref(), Some("Quarterly"));
        assert_eq!(info.author.as_deref(), Some("Finance"));
        assert!(!info.encrypted);
    }

    #[test]
    fn test_decode_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_pdf_string(&bytes).as_deref(), Some("Hi"));
    }
}
