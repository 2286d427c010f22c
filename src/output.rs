use anyhow::{bail, Context, Result};
use lopdf::Document;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Reject paths that do not carry a `.pdf` extension
pub fn require_pdf<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !is_pdf(path) {
        bail!("Only .pdf files are allowed: {}", path.display());
    }
    Ok(())
}

/// Where a single-output command writes: the explicit output, or the input itself.
pub fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    require_pdf(input)?;
    match output {
        Some(output) => {
            require_pdf(output)?;
            Ok(output.to_path_buf())
        }
        None => Ok(input.to_path_buf()),
    }
}

/// Numbered part names `<base>_<k>.pdf`, `k` zero-padded to the width of `parts`.
pub fn split_targets(input: &Path, output: Option<&Path>, parts: usize) -> Result<Vec<PathBuf>> {
    let base = resolve_output(input, output)?;
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("Invalid output name: {}", base.display()))?;
    let dir = base.parent().unwrap_or_else(|| Path::new(""));
    let width = parts.to_string().len();

    Ok((1..=parts)
        .map(|k| dir.join(format!("{}_{:0width$}.pdf", stem, k, width = width)))
        .collect())
}

/// Directory containing `path`, or `.` when it has no parent component.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// A document written to a temporary file next to its target, not yet visible
/// under the target name. Dropping it removes the temporary file.
pub struct StagedOutput {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedOutput {
    pub fn write(doc: &mut Document, target: &Path) -> Result<Self> {
        let dir = parent_dir(target);
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut file = tempfile::Builder::new()
            .prefix(".pdfops-")
            .suffix(".pdf")
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

        doc.save_to(file.as_file_mut())
            .with_context(|| format!("Failed to save PDF: {}", target.display()))?;
        file.as_file_mut()
            .flush()
            .with_context(|| format!("Failed to save PDF: {}", target.display()))?;

        debug!(target = %target.display(), staged = %file.path().display(), "staged output");
        Ok(StagedOutput {
            file,
            target: target.to_path_buf(),
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the staged file onto its target, keeping the permissions of a file it replaces.
    pub fn commit(self) -> Result<PathBuf> {
        self.copy_permissions()?;
        self.file
            .persist(&self.target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write PDF: {}", self.target.display()))?;
        debug!(target = %self.target.display(), "wrote output");
        Ok(self.target)
    }

    /// Like `commit`, but keep the replaced file aside so the move can be undone.
    fn commit_undoable(self) -> Result<Committed> {
        self.copy_permissions()?;

        let replaced = match fs::symlink_metadata(&self.target) {
            Ok(existing) if existing.is_file() => {
                let backup = tempfile::Builder::new()
                    .prefix(".pdfops-old-")
                    .tempfile_in(parent_dir(&self.target))
                    .with_context(|| {
                        format!(
                            "Failed to create temporary file in {}",
                            parent_dir(&self.target).display()
                        )
                    })?
                    .into_temp_path();
                fs::rename(&self.target, &backup).with_context(|| {
                    format!("Failed to move aside {}", self.target.display())
                })?;
                Some(backup)
            }
            _ => None,
        };

        match self.file.persist(&self.target) {
            Ok(_) => {
                debug!(target = %self.target.display(), "wrote output");
                Ok(Committed {
                    target: self.target,
                    replaced,
                })
            }
            Err(e) => {
                if let Some(backup) = replaced {
                    if let Err(restore) = backup.persist(&self.target) {
                        warn!(
                            target = %self.target.display(),
                            error = %restore.error,
                            "failed to restore replaced file"
                        );
                    }
                }
                Err(e.error)
                    .with_context(|| format!("Failed to write PDF: {}", self.target.display()))
            }
        }
    }

    fn copy_permissions(&self) -> Result<()> {
        match fs::metadata(&self.target) {
            Ok(existing) if existing.is_file() => {
                fs::set_permissions(self.file.path(), existing.permissions()).with_context(|| {
                    format!("Failed to copy permissions of {}", self.target.display())
                })
            }
            _ => Ok(()),
        }
    }
}

/// A target already moved into place, with the file it replaced
struct Committed {
    target: PathBuf,
    replaced: Option<TempPath>,
}

impl Committed {
    fn undo(self) {
        let result = match self.replaced {
            Some(backup) => backup.persist(&self.target).map_err(|e| e.error),
            None => fs::remove_file(&self.target),
        };
        match result {
            Ok(()) => debug!(target = %self.target.display(), "rolled back output"),
            Err(error) => {
                warn!(target = %self.target.display(), %error, "failed to roll back output")
            }
        }
    }
}

/// Write one document to `target` atomically.
pub fn write_document(doc: &mut Document, target: &Path) -> Result<PathBuf> {
    StagedOutput::write(doc, target)?.commit()
}

/// Move every staged output into place. If one of them fails, the ones
/// already moved are undone: new files are removed and replaced files restored.
pub fn commit_all(staged: Vec<StagedOutput>) -> Result<Vec<PathBuf>> {
    let mut committed: Vec<Committed> = Vec::with_capacity(staged.len());
    for output in staged {
        match output.commit_undoable() {
            Ok(done) => committed.push(done),
            Err(err) => {
                for done in committed.into_iter().rev() {
                    done.undo();
                }
                return Err(err);
            }
        }
    }
    // Dropping the backups deletes the replaced contents
    Ok(committed.into_iter().map(|done| done.target).collect())
}
