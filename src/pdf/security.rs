use anyhow::{bail, Context, Result};
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::PdfDocument;

/// Stands in for the trailer's `Encrypt` key while loading; same length, so
/// every cross-reference offset stays valid.
const MASKED_ENCRYPT_KEY: &[u8] = b"Encrypz";

/// RC4 key length of the standard security handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLength {
    Bits40,
    Bits128,
}

impl PdfDocument {
    /// Encrypt with the standard security handler, granting every permission
    pub fn encrypt(
        &mut self,
        user_password: &str,
        owner_password: &str,
        key_length: KeyLength,
    ) -> Result<()> {
        if self.is_encrypted() {
            bail!("{} is already encrypted", self.path.display());
        }
        self.ensure_file_id();

        let version = match key_length {
            KeyLength::Bits40 => EncryptionVersion::V1 {
                document: &self.doc,
                owner_password,
                user_password,
                permissions: Permissions::all(),
            },
            KeyLength::Bits128 => EncryptionVersion::V2 {
                document: &self.doc,
                owner_password,
                user_password,
                key_length: 128,
                permissions: Permissions::all(),
            },
        };
        let state = EncryptionState::try_from(version)
            .with_context(|| format!("Failed to set up encryption for {}", self.path.display()))?;
        self.doc
            .encrypt(&state)
            .with_context(|| format!("Failed to encrypt {}", self.path.display()))?;

        debug!(path = %self.path.display(), ?key_length, "encrypted document");
        Ok(())
    }

    /// Load an encrypted PDF and decrypt it with either the user or the owner password.
    ///
    /// `Document::load` only parses the objects of an encrypted file when the
    /// empty password opens it, so the file is read with its trailer's
    /// `/Encrypt` key masked. That yields every object as ciphertext, which
    /// `decrypt` then turns back into plain objects.
    pub fn open_encrypted<P: AsRef<Path>>(path: P, password: &str) -> Result<Self> {
        let path = path.as_ref();
        let current = Self::load(path)?;
        if !current.is_encrypted() {
            bail!("{} is not encrypted", path.display());
        }

        let mut bytes =
            fs::read(path).with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        if !mask_encrypt_key(&mut bytes, current.doc.xref_start) {
            bail!("Cannot find the encryption entry of {}", path.display());
        }
        let mut doc = Document::load_mem(&bytes)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        let encrypt = doc
            .trailer
            .remove(MASKED_ENCRYPT_KEY)
            .with_context(|| format!("Cannot find the encryption entry of {}", path.display()))?;
        doc.trailer.set("Encrypt", encrypt);

        let mut document = PdfDocument::from_document(doc, path);
        document.decrypt(password)?;
        Ok(document)
    }

    /// Decrypt with either the user or the owner password
    pub fn decrypt(&mut self, password: &str) -> Result<()> {
        if !self.is_encrypted() {
            bail!("{} is not encrypted", self.path.display());
        }
        self.doc
            .decrypt(password)
            .with_context(|| format!("Wrong password for {}", self.path.display()))?;

        if self.doc.catalog().is_err() || self.page_count() == 0 {
            bail!(
                "Decrypting {} yielded no pages; its objects could not be read",
                self.path.display()
            );
        }

        debug!(path = %self.path.display(), pages = self.page_count(), "decrypted document");
        Ok(())
    }

    /// The RC4 key is derived from the first file identifier, so make sure there is one
    fn ensure_file_id(&mut self) {
        if self.doc.trailer.has(b"ID") {
            return;
        }

        let mut hasher = DefaultHasher::new();
        self.path.hash(&mut hasher);
        self.doc.objects.len().hash(&mut hasher);
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default()
            .hash(&mut hasher);
        let high = hasher.finish();
        high.hash(&mut hasher);
        let low = hasher.finish();

        let mut id = high.to_be_bytes().to_vec();
        id.extend_from_slice(&low.to_be_bytes());
        self.doc.trailer.set(
            "ID",
            vec![
                Object::String(id.clone(), StringFormat::Hexadecimal),
                Object::String(id, StringFormat::Hexadecimal),
            ],
        );
    }
}

/// Rename the `/Encrypt` key of the trailer that starts at `xref_start` in place
fn mask_encrypt_key(bytes: &mut [u8], xref_start: usize) -> bool {
    // Offsets count from the header, which may follow leading junk
    let start = find(bytes, b"%PDF-").unwrap_or(0) + xref_start;
    let Some(trailer) = bytes.get(start..) else {
        return false;
    };
    // A classic trailer ends at `startxref`, a cross-reference stream's
    // dictionary at `stream`
    let end = [&b"startxref"[..], b"stream"]
        .iter()
        .filter_map(|marker| find(trailer, marker))
        .min()
        .unwrap_or(trailer.len());

    let mut from = 0;
    while let Some(at) = find(&trailer[from..end], b"/Encrypt") {
        let key = from + at + 1;
        let ends_name = trailer
            .get(key + MASKED_ENCRYPT_KEY.len())
            .map_or(true, |next| !next.is_ascii_alphanumeric());
        if ends_name {
            let key = start + key;
            bytes[key..key + MASKED_ENCRYPT_KEY.len()].copy_from_slice(MASKED_ENCRYPT_KEY);
            return true;
        }
        from = key;
    }
    false
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
