//! Media library bookkeeping and draft asset resolution.

use crate::model::{Collection, EntryKey, MediaFile};
use serde::Serialize;
use std::collections::BTreeMap;

/// A media file known to the media library.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryFile {
    pub file: MediaFile,
    /// Draft files belong to an unpublished entry only.
    pub draft: bool,
}

/// Media library contents plus the draft media of each open entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaLibrary {
    files: Vec<LibraryFile>,
    draft_entry_media: BTreeMap<EntryKey, Vec<MediaFile>>,
}

impl MediaLibrary {
    /// Registers files, replacing any previous record with the same id.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = MediaFile>, draft: bool) {
        for file in files {
            match self.files.iter_mut().find(|f| f.file.id == file.id) {
                Some(existing) => {
                    existing.file = file;
                    existing.draft = draft;
                }
                None => self.files.push(LibraryFile { file, draft }),
            }
        }
    }

    pub fn file(&self, id: &str) -> Option<&LibraryFile> {
        self.files.iter().find(|f| f.file.id == id)
    }

    pub fn files(&self) -> &[LibraryFile] {
        &self.files
    }

    pub fn set_draft_entry_media(&mut self, key: EntryKey, files: Vec<MediaFile>) {
        self.draft_entry_media.insert(key, files);
    }

    pub fn draft_entry_media(&self, key: &EntryKey) -> &[MediaFile] {
        self.draft_entry_media
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn clear_draft_entry_media(&mut self, key: &EntryKey) {
        self.draft_entry_media.remove(key);
    }
}

/// Media payload sent along with a persist call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetDescriptor {
    /// Repository path the asset is written to.
    pub path: String,
    /// Path of the entry referencing the asset.
    pub entry_path: String,
    /// Local content reference to upload.
    pub file: String,
}

/// Resolves the media files of a draft into upload descriptors.
pub trait AssetResolver: Send + Sync {
    fn resolve(
        &self,
        collection: &Collection,
        entry_path: &str,
        media_files: &[MediaFile],
    ) -> Vec<AssetDescriptor>;
}

/// Uploads every media file that still holds local content.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalAssetResolver;

impl AssetResolver for LocalAssetResolver {
    fn resolve(
        &self,
        _collection: &Collection,
        entry_path: &str,
        media_files: &[MediaFile],
    ) -> Vec<AssetDescriptor> {
        media_files
            .iter()
            .filter_map(|media| {
                media.file.as_ref().map(|file| AssetDescriptor {
                    path: media.path.clone(),
                    entry_path: entry_path.to_string(),
                    file: file.clone(),
                })
            })
            .collect()
    }
}
