use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use postbatch_ingest::grid::{MIME_CSV, MIME_LEGACY_EXCEL, MIME_NATIVE_SPREADSHEET, MIME_XLSX};
use uuid::Uuid;

use super::{child_id, resolve_id, ROOT_ID};
use crate::error::StoreError;
use crate::ports::{FileStore, Sharing, StoredFile, FOLDER_MIME_TYPE};

/// Sharing state per file id, kept at the storage root.
const SHARING_MANIFEST: &str = ".postbatch-sharing.json";

/// [`FileStore`] over a directory tree.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Opens (creating if needed) the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(root.display(), e))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn describe(&self, id: &str) -> Result<StoredFile, StoreError> {
        let path = resolve_id(&self.root, id)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| StoreError::io(id, e))?;
        let name = path
            .file_name()
            .map_or_else(|| ROOT_ID.to_string(), |n| n.to_string_lossy().into_owned());
        Ok(StoredFile {
            id: normalise_id(id),
            mime_type: mime_for(&name, meta.is_dir()).to_string(),
            name,
        })
    }

    async fn load_manifest(&self) -> Result<BTreeMap<String, Sharing>, StoreError> {
        let path = self.root.join(SHARING_MANIFEST);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::io(path.display(), e)),
        }
    }

    async fn save_manifest(&self, manifest: &BTreeMap<String, Sharing>) -> Result<(), StoreError> {
        let path = self.root.join(SHARING_MANIFEST);
        let bytes = serde_json::to_vec_pretty(manifest)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::io(path.display(), e))
    }

    /// First free path for `name` in `dir`: `name`, then `stem (1).ext`, ...
    async fn free_target(dir: &Path, name: &str) -> PathBuf {
        let candidate = dir.join(name);
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };
        let mut n = 1;
        loop {
            let next = match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let candidate = dir.join(next);
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn get_file(&self, file_id: &str) -> Result<StoredFile, StoreError> {
        self.describe(file_id).await
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<StoredFile>, StoreError> {
        let dir = resolve_id(&self.root, folder_id)?;
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::io(folder_id, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(folder_id, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| StoreError::io(&name, e))?
                .is_dir();
            files.push(StoredFile {
                id: child_id(folder_id, &name),
                mime_type: mime_for(&name, is_dir).to_string(),
                name,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Option<StoredFile>, StoreError> {
        if name.starts_with('.') {
            return Ok(None);
        }
        match self.describe(&child_id(folder_id, name)).await {
            Ok(file) => Ok(Some(file)),
            Err(StoreError::NotFound(_) | StoreError::InvalidId(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn ensure_folder(&self, parent_id: &str, name: &str) -> Result<StoredFile, StoreError> {
        let id = child_id(parent_id, name);
        let path = resolve_id(&self.root, &id)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| StoreError::io(&id, e))?;
        self.describe(&id).await
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<StoredFile, StoreError> {
        let file = self.describe(file_id).await?;
        let source = resolve_id(&self.root, file_id)?;
        let dir = resolve_id(&self.root, folder_id)?;
        let target = Self::free_target(&dir, &file.name).await;
        tokio::fs::rename(&source, &target)
            .await
            .map_err(|e| StoreError::io(file_id, e))?;

        let new_name = target
            .file_name()
            .map_or_else(|| file.name.clone(), |n| n.to_string_lossy().into_owned());
        let new_id = child_id(folder_id, &new_name);

        let mut manifest = self.load_manifest().await?;
        if let Some(sharing) = manifest.remove(&file.id) {
            manifest.insert(new_id.clone(), sharing);
            self.save_manifest(&manifest).await?;
        }

        self.describe(&new_id).await
    }

    async fn sharing(&self, file_id: &str) -> Result<Sharing, StoreError> {
        let file = self.describe(file_id).await?;
        let manifest = self.load_manifest().await?;
        Ok(manifest.get(&file.id).copied().unwrap_or_default())
    }

    async fn set_sharing(&self, file_id: &str, sharing: Sharing) -> Result<(), StoreError> {
        let file = self.describe(file_id).await?;
        let mut manifest = self.load_manifest().await?;
        if sharing == Sharing::default() {
            manifest.remove(&file.id);
        } else {
            manifest.insert(file.id, sharing);
        }
        self.save_manifest(&manifest).await
    }

    async fn read_text(&self, file_id: &str, encoding: &str) -> Result<String, StoreError> {
        if !matches!(encoding.trim().to_ascii_lowercase().as_str(), "utf-8" | "utf8") {
            return Err(StoreError::UnsupportedEncoding(encoding.to_string()));
        }
        let path = resolve_id(&self.root, file_id)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(file_id, e))?;
        String::from_utf8(bytes)
            .map_err(|_| StoreError::Backend(format!("'{file_id}' is not valid UTF-8")))
    }

    /// Workbooks are read natively by [`super::LocalSheets`], so conversion
    /// is a hidden sibling copy the caller deletes afterwards.
    async fn convert_to_native(&self, file_id: &str) -> Result<StoredFile, StoreError> {
        let file = self.describe(file_id).await?;
        let source = resolve_id(&self.root, file_id)?;
        let ext = file.name.rsplit_once('.').map_or("xls", |(_, ext)| ext);
        let copy_name = format!(".converted-{}.{ext}", Uuid::new_v4().simple());

        let parent_id = match normalise_id(file_id).rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => ROOT_ID.to_string(),
        };
        let copy_id = child_id(&parent_id, &copy_name);
        let target = resolve_id(&self.root, &copy_id)?;

        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| StoreError::io(file_id, e))?;

        Ok(StoredFile {
            id: copy_id,
            name: copy_name,
            mime_type: MIME_NATIVE_SPREADSHEET.to_string(),
        })
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError> {
        let path = resolve_id(&self.root, file_id)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::io(file_id, e))?;

        let mut manifest = self.load_manifest().await?;
        if manifest.remove(&normalise_id(file_id)).is_some() {
            self.save_manifest(&manifest).await?;
        }
        Ok(())
    }

    fn root_folder_id(&self) -> String {
        ROOT_ID.to_string()
    }
}

fn normalise_id(id: &str) -> String {
    let trimmed = id.trim().trim_matches('/');
    if trimmed.is_empty() {
        ROOT_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

fn mime_for(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return FOLDER_MIME_TYPE;
    }
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => MIME_CSV,
        "xlsx" => MIME_XLSX,
        "xls" => MIME_LEGACY_EXCEL,
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
