//! Vault adapter over a directory on disk.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::{ConversionScope, file_name_of};
use crate::domain::errors::ConversionError;
use crate::domain::ports::VaultPort;

const NOTE_EXTENSION: &str = "md";

/// Vault rooted at a directory. Every path crossing the port is relative to
/// the root and uses no `..` components.
pub struct FsVault {
    root: PathBuf,
    attachment_folder: String,
}

impl FsVault {
    /// Creates a vault at `root`.
    ///
    /// `attachment_folder` follows the editor convention: empty for the vault
    /// root, `./sub` for a folder next to the note, anything else relative to
    /// the vault root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, attachment_folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            attachment_folder: attachment_folder.into(),
        }
    }

    fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    async fn is_file(&self, relative: &Path) -> bool {
        fs::metadata(self.absolute(relative))
            .await
            .is_ok_and(|m| m.is_file())
    }

    async fn notes_in(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConversionError> {
        let mut notes = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(self.absolute(&current))
                .await
                .map_err(|e| ConversionError::read(&current, e.to_string()))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| ConversionError::read(&current, e.to_string()))?
            {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }

                let relative = current.join(&name);
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };

                if file_type.is_dir() {
                    if recursive {
                        pending.push(relative);
                    }
                } else if relative
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
                {
                    notes.push(relative);
                }
            }
        }

        notes.sort();
        Ok(notes)
    }

    async fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        let mut matches = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(current) = pending.pop() {
            let Ok(mut entries) = fs::read_dir(self.absolute(&current)).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let file_name = entry.file_name();
                if file_name.to_string_lossy().starts_with('.') {
                    continue;
                }
                let relative = current.join(&file_name);
                match entry.file_type().await {
                    Ok(t) if t.is_dir() => pending.push(relative),
                    Ok(t) if t.is_file() && file_name.to_string_lossy() == name => {
                        matches.push(relative);
                    }
                    _ => {}
                }
            }
        }

        matches.sort_by_key(|p| (p.components().count(), p.clone()));
        matches.into_iter().next()
    }
}

#[async_trait]
impl VaultPort for FsVault {
    async fn read_binary(&self, path: &Path) -> Result<Bytes, ConversionError> {
        let bytes = fs::read(self.absolute(path))
            .await
            .map_err(|e| ConversionError::read(path, e.to_string()))?;
        trace!(path = %path.display(), bytes = bytes.len(), "Read file");
        Ok(Bytes::from(bytes))
    }

    async fn read_text(&self, path: &Path) -> Result<String, ConversionError> {
        fs::read_to_string(self.absolute(path))
            .await
            .map_err(|e| ConversionError::read(path, e.to_string()))
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<(), ConversionError> {
        let target = self.absolute(path);
        let content = content.to_owned();

        tokio::task::spawn_blocking(move || write_atomic(&target, content.as_bytes()))
            .await
            .map_err(|e| ConversionError::write(path, e.to_string()))?
            .map_err(|e| ConversionError::write(path, e.to_string()))?;

        debug!(path = %path.display(), "Saved document");
        Ok(())
    }

    async fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<PathBuf, ConversionError> {
        let target = self.absolute(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConversionError::write(path, e.to_string()))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| ConversionError::write(path, e.to_string()))?;
        file.write_all(bytes)
            .await
            .map_err(|e| ConversionError::write(path, e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ConversionError::write(path, e.to_string()))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Created attachment");
        Ok(path.to_path_buf())
    }

    async fn list_documents(
        &self,
        scope: &ConversionScope,
    ) -> Result<Vec<PathBuf>, ConversionError> {
        match scope {
            ConversionScope::Note(note) => Ok(if self.is_file(note).await {
                vec![note.clone()]
            } else {
                warn!(note = %note.display(), "Note does not exist");
                Vec::new()
            }),
            ConversionScope::Folder(note) => {
                let dir = if fs::metadata(self.absolute(note))
                    .await
                    .is_ok_and(|m| m.is_dir())
                {
                    note.clone()
                } else {
                    note.parent().map(Path::to_path_buf).unwrap_or_default()
                };
                self.notes_in(&dir, false).await
            }
            ConversionScope::Vault => self.notes_in(Path::new(""), true).await,
        }
    }

    async fn resolve_link(&self, reference: &str, from: &Path) -> Option<PathBuf> {
        let reference = reference.split(['#', '|']).next().unwrap_or(reference).trim();
        if reference.is_empty() {
            return None;
        }

        let note_dir = from.parent().unwrap_or(Path::new(""));
        let candidates = [
            normalize(&note_dir.join(reference)),
            normalize(Path::new(reference.trim_start_matches('/'))),
        ];
        for candidate in candidates.into_iter().flatten() {
            if self.is_file(&candidate).await {
                return Some(candidate);
            }
        }

        self.find_by_name(file_name_of(reference)).await
    }

    async fn attachment_path(&self, filename: &str, from: &Path) -> PathBuf {
        let folder = self.attachment_folder.trim().trim_end_matches('/');
        let note_dir = from.parent().unwrap_or(Path::new(""));

        let dir = if folder.is_empty() || folder == "/" {
            PathBuf::new()
        } else if folder == "." {
            note_dir.to_path_buf()
        } else if let Some(sub) = folder.strip_prefix("./") {
            note_dir.join(sub)
        } else {
            PathBuf::from(folder.trim_start_matches('/'))
        };

        normalize(&dir.join(filename)).unwrap_or_else(|| PathBuf::from(filename))
    }

    async fn file_size(&self, path: &Path) -> Option<u64> {
        fs::metadata(self.absolute(path))
            .await
            .ok()
            .filter(std::fs::Metadata::is_file)
            .map(|m| m.len())
    }

    fn generate_link(&self, path: &Path, _from: &Path) -> String {
        let parts: Vec<_> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        format!("![[{}]]", parts.join("/"))
    }
}

/// Resolves `.` and `..` lexically. Returns `None` for paths leaving the root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn write_atomic(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| std::io::Error::other("Invalid path"))?;
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(bytes)?;
    temp_file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn vault_with(files: &[(&str, &str)], attachment_folder: &str) -> (TempDir, FsVault) {
        let dir = tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        let vault = FsVault::new(dir.path(), attachment_folder);
        (dir, vault)
    }

    #[tokio::test]
    async fn test_list_documents_by_scope() {
        let (_dir, vault) = vault_with(
            &[
                ("a/one.md", ""),
                ("a/two.MD", ""),
                ("a/deep/three.md", ""),
                ("a/img.png", ""),
                ("root.md", ""),
                (".obsidian/hidden.md", ""),
            ],
            "",
        );

        let all = vault.list_documents(&ConversionScope::Vault).await.unwrap();
        assert_eq!(
            all,
            vec![
                PathBuf::from("a/deep/three.md"),
                PathBuf::from("a/one.md"),
                PathBuf::from("a/two.MD"),
                PathBuf::from("root.md"),
            ]
        );

        let folder = vault
            .list_documents(&ConversionScope::Folder(PathBuf::from("a/one.md")))
            .await
            .unwrap();
        assert_eq!(folder, vec![PathBuf::from("a/one.md"), PathBuf::from("a/two.MD")]);

        let missing = vault
            .list_documents(&ConversionScope::Note(PathBuf::from("nope.md")))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_link_order() {
        let (_dir, vault) = vault_with(
            &[
                ("notes/pic.png", "near"),
                ("pic.png", "root"),
                ("assets/deep/only.png", "x"),
            ],
            "",
        );

        let near = vault.resolve_link("pic.png", Path::new("notes/n.md")).await;
        assert_eq!(near, Some(PathBuf::from("notes/pic.png")));

        let root = vault.resolve_link("pic.png", Path::new("other/n.md")).await;
        assert_eq!(root, Some(PathBuf::from("pic.png")));

        let by_name = vault.resolve_link("only.png", Path::new("n.md")).await;
        assert_eq!(by_name, Some(PathBuf::from("assets/deep/only.png")));

        assert!(vault.resolve_link("../../etc/passwd.png", Path::new("n.md")).await.is_none());
        assert!(vault.resolve_link("missing.png", Path::new("n.md")).await.is_none());
    }

    #[tokio::test]
    async fn test_attachment_folder_modes() {
        let note = Path::new("notes/daily/today.md");
        let (_d1, root) = vault_with(&[], "");
        let (_d2, relative) = vault_with(&[], "./assets");
        let (_d3, fixed) = vault_with(&[], "attachments/");

        assert_eq!(root.attachment_path("a.png", note).await, PathBuf::from("a.png"));
        assert_eq!(
            relative.attachment_path("a.png", note).await,
            PathBuf::from("notes/daily/assets/a.png")
        );
        assert_eq!(
            fixed.attachment_path("a.png", note).await,
            PathBuf::from("attachments/a.png")
        );
    }

    #[tokio::test]
    async fn test_available_path_is_numbered() {
        let (_dir, vault) = vault_with(&[("a.png", "1"), ("a 1.png", "2")], "");

        let path = vault.available_attachment_path("a.png", Path::new("n.md")).await;
        assert_eq!(path, PathBuf::from("a 2.png"));
        assert_eq!(vault.file_size(Path::new("a.png")).await, Some(1));
        assert_eq!(vault.file_size(Path::new("b.png")).await, None);
    }

    #[tokio::test]
    async fn test_write_binary_never_overwrites() {
        let (dir, vault) = vault_with(&[("a.png", "old")], "");

        let err = vault.write_binary(Path::new("a.png"), b"new").await.unwrap_err();
        assert!(matches!(err, ConversionError::StorageWriteFailure { .. }));

        let created = vault
            .write_binary(Path::new("sub/b.png"), b"new")
            .await
            .unwrap();
        assert_eq!(created, PathBuf::from("sub/b.png"));
        assert_eq!(std::fs::read(dir.path().join("sub/b.png")).unwrap(), b"new");
        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_text_round_trip() {
        let (_dir, vault) = vault_with(&[("n.md", "before")], "");

        vault.write_text(Path::new("n.md"), "after ü").await.unwrap();
        assert_eq!(vault.read_text(Path::new("n.md")).await.unwrap(), "after ü");

        let err = vault.read_text(Path::new("gone.md")).await.unwrap_err();
        assert!(matches!(err, ConversionError::StorageRead { .. }));
    }

    #[test]
    fn test_generate_link_uses_forward_slashes() {
        let vault = FsVault::new("/v", "");
        let path: PathBuf = ["assets", "cat 1.png"].iter().collect();
        assert_eq!(vault.generate_link(&path, Path::new("n.md")), "![[assets/cat 1.png]]");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c.png")), Some(PathBuf::from("a/c.png")));
        assert_eq!(normalize(Path::new("../x.png")), None);
    }
}
