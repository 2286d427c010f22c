pub mod document;
pub mod edit;
pub mod security;

#[cfg(test)]
pub mod testing;

pub use document::{PdfDocument, PdfInfo};
pub use edit::{ContentKinds, ScaleMode};
pub use security::KeyLength;
