//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use postbatch_directory::{
    Account, CreateMediaRequest, DirectoryApi, DirectoryError, LocalPost, LocalPostRequest,
    Location, LocationsPage, MediaItem,
};
use postbatch_ingest::Grid;

use crate::error::StoreError;
use crate::ports::{FileStore, RunLogWriter, SheetEngine, Sharing, StoredFile, FOLDER_MIME_TYPE};
use crate::results::{LogEntry, RunSummary};

const ROOT: &str = "root";

struct MemFile {
    file: StoredFile,
    parent: String,
    text: Option<String>,
    sharing: Sharing,
}

#[derive(Default)]
struct StoreState {
    files: BTreeMap<String, MemFile>,
    sharing_history: HashMap<String, Vec<Sharing>>,
    next_id: usize,
    fail_set_sharing: bool,
    fail_restore_sharing: bool,
    fail_conversion: bool,
    fail_delete: bool,
}

pub(crate) struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        let store = Self {
            state: Mutex::new(StoreState::default()),
        };
        store.insert(ROOT.to_string(), "", "My Drive", FOLDER_MIME_TYPE, None);
        store
    }

    pub(crate) fn root(&self) -> String {
        ROOT.to_string()
    }

    fn insert(&self, id: String, parent: &str, name: &str, mime: &str, text: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        state.files.insert(
            id.clone(),
            MemFile {
                file: StoredFile {
                    id: id.clone(),
                    name: name.to_string(),
                    mime_type: mime.to_string(),
                },
                parent: parent.to_string(),
                text: text.map(str::to_string),
                sharing: Sharing::default(),
            },
        );
        id
    }

    fn fresh_id(&self) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        format!("file-{:04}", state.next_id)
    }

    pub(crate) fn add_folder(&self, parent: &str, name: &str) -> String {
        let id = self.fresh_id();
        self.insert(id, parent, name, FOLDER_MIME_TYPE, None)
    }

    pub(crate) fn add_file(&self, parent: &str, name: &str, mime: &str, text: Option<&str>) -> String {
        let id = self.fresh_id();
        self.insert(id, parent, name, mime, text)
    }

    pub(crate) fn add_file_with_id(&self, id: &str, parent: &str, name: &str, mime: &str) -> String {
        self.insert(id.to_string(), parent, name, mime, None)
    }

    pub(crate) fn sharing_of(&self, id: &str) -> Sharing {
        self.state.lock().unwrap().files[id].sharing
    }

    /// Every sharing value written to `id`, in order.
    pub(crate) fn sharing_history(&self, id: &str) -> Vec<Sharing> {
        self.state
            .lock()
            .unwrap()
            .sharing_history
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn set_initial_sharing(&self, id: &str, sharing: Sharing) {
        self.state.lock().unwrap().files.get_mut(id).unwrap().sharing = sharing;
    }

    pub(crate) fn fail_set_sharing(&self) {
        self.state.lock().unwrap().fail_set_sharing = true;
    }

    /// Refuses every sharing change except elevation to public view, so the
    /// restore after a publish fails.
    pub(crate) fn fail_restore_sharing(&self) {
        self.state.lock().unwrap().fail_restore_sharing = true;
    }

    pub(crate) fn fail_conversion(&self) {
        self.state.lock().unwrap().fail_conversion = true;
    }

    pub(crate) fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    pub(crate) fn exists(&self, id: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(id)
    }

    pub(crate) fn parent_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(id)
            .map(|f| f.parent.clone())
    }

    /// Name of the folder holding `id`.
    pub(crate) fn folder_name_of(&self, id: &str) -> Option<String> {
        let parent = self.parent_of(id)?;
        let state = self.state.lock().unwrap();
        state.files.get(&parent).map(|f| f.file.name.clone())
    }

    pub(crate) fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    fn text_of(&self, id: &str) -> Result<String, StoreError> {
        let state = self.state.lock().unwrap();
        let file = state
            .files
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        file.text
            .clone()
            .ok_or_else(|| StoreError::Backend(format!("{id} has no content")))
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn get_file(&self, file_id: &str) -> Result<StoredFile, StoreError> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(file_id)
            .map(|f| f.file.clone())
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<StoredFile>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .values()
            .filter(|f| f.parent == folder_id)
            .map(|f| f.file.clone())
            .collect())
    }

    async fn find_child(&self, folder_id: &str, name: &str) -> Result<Option<StoredFile>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .values()
            .find(|f| f.parent == folder_id && f.file.name == name)
            .map(|f| f.file.clone()))
    }

    async fn ensure_folder(&self, parent_id: &str, name: &str) -> Result<StoredFile, StoreError> {
        if let Some(existing) = self.find_child(parent_id, name).await? {
            return Ok(existing);
        }
        let id = self.add_folder(parent_id, name);
        self.get_file(&id).await
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<StoredFile, StoreError> {
        let mut state = self.state.lock().unwrap();
        let file = state
            .files
            .get_mut(file_id)
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))?;
        file.parent = folder_id.to_string();
        Ok(file.file.clone())
    }

    async fn sharing(&self, file_id: &str) -> Result<Sharing, StoreError> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(file_id)
            .map(|f| f.sharing)
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }

    async fn set_sharing(&self, file_id: &str, sharing: Sharing) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_set_sharing
            || (state.fail_restore_sharing && sharing != Sharing::PUBLIC_VIEW)
        {
            return Err(StoreError::Backend("sharing change refused".to_string()));
        }
        let file = state
            .files
            .get_mut(file_id)
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))?;
        file.sharing = sharing;
        state
            .sharing_history
            .entry(file_id.to_string())
            .or_default()
            .push(sharing);
        Ok(())
    }

    async fn read_text(&self, file_id: &str, _encoding: &str) -> Result<String, StoreError> {
        self.text_of(file_id)
    }

    async fn convert_to_native(&self, file_id: &str) -> Result<StoredFile, StoreError> {
        if self.state.lock().unwrap().fail_conversion {
            return Err(StoreError::Backend("conversion refused".to_string()));
        }
        let source = self.get_file(file_id).await?;
        let text = self.text_of(file_id).ok();
        let parent = self.parent_of(file_id).unwrap_or_else(|| ROOT.to_string());
        let id = self.add_file(
            &parent,
            &format!("{} (converted)", source.name),
            postbatch_ingest::grid::MIME_NATIVE_SPREADSHEET,
            text.as_deref(),
        );
        self.get_file(&id).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(StoreError::Backend("delete refused".to_string()));
        }
        state
            .files
            .remove(file_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }

    fn root_folder_id(&self) -> String {
        self.root()
    }
}

/// Spreadsheet engine that reads a file's stored text as CSV.
pub(crate) struct FakeSheets {
    store: Arc<MemoryStore>,
    reads: Mutex<Vec<String>>,
}

impl FakeSheets {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            reads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetEngine for FakeSheets {
    async fn read_grid(&self, file_id: &str) -> Result<Grid, StoreError> {
        self.reads.lock().unwrap().push(file_id.to_string());
        let text = self.store.text_of(file_id)?;
        Grid::from_csv_text(&text).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WrittenLog {
    pub folder_id: String,
    pub title: String,
    pub entries: Vec<LogEntry>,
    pub summary: RunSummary,
}

#[derive(Default)]
pub(crate) struct MemoryRunLog {
    logs: Mutex<Vec<WrittenLog>>,
}

impl MemoryRunLog {
    pub(crate) fn logs(&self) -> Vec<WrittenLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunLogWriter for MemoryRunLog {
    async fn write_run_log(
        &self,
        folder_id: &str,
        title: &str,
        entries: &[LogEntry],
        summary: &RunSummary,
    ) -> Result<String, StoreError> {
        let mut logs = self.logs.lock().unwrap();
        logs.push(WrittenLog {
            folder_id: folder_id.to_string(),
            title: title.to_string(),
            entries: entries.to_vec(),
            summary: *summary,
        });
        Ok(format!("log-{}", logs.len()))
    }
}

#[derive(Default)]
struct DirectoryState {
    locations: HashMap<String, Vec<Location>>,
    listing_failure: Option<String>,
    rejected_locations: HashMap<String, String>,
    posts: Vec<(String, LocalPostRequest)>,
    location_calls: usize,
}

/// Directory double serving locations in pages of the requested size.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    state: Mutex<DirectoryState>,
}

impl FakeDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_location(&self, account: &str, store_code: Option<&str>, location_id: &str) {
        let account = format!("accounts/{account}");
        let location = Location {
            name: format!("{account}/locations/{location_id}"),
            store_code: store_code.map(str::to_string),
            location_name: None,
        };
        self.state
            .lock()
            .unwrap()
            .locations
            .entry(account)
            .or_default()
            .push(location);
    }

    pub(crate) fn fail_listing(&self, message: &str) {
        self.state.lock().unwrap().listing_failure = Some(message.to_string());
    }

    pub(crate) fn reject_posts_for(&self, location_name: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_locations
            .insert(location_name.to_string(), message.to_string());
    }

    pub(crate) fn posts(&self) -> Vec<(String, LocalPostRequest)> {
        self.state.lock().unwrap().posts.clone()
    }

    pub(crate) fn location_calls(&self) -> usize {
        self.state.lock().unwrap().location_calls
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .locations
            .keys()
            .map(|name| Account {
                name: name.clone(),
                account_name: None,
                account_type: None,
            })
            .collect())
    }

    async fn list_locations_page(
        &self,
        account_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LocationsPage, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.location_calls += 1;
        if let Some(message) = &state.listing_failure {
            return Err(DirectoryError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let all = state.locations.get(account_id).cloned().unwrap_or_default();
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + page_size as usize).min(all.len());
        Ok(LocationsPage {
            locations: all[start.min(end)..end].to_vec(),
            next_page_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn list_media(&self, _location_name: &str) -> Result<Vec<MediaItem>, DirectoryError> {
        Ok(Vec::new())
    }

    async fn create_local_post(
        &self,
        location_name: &str,
        request: &LocalPostRequest,
    ) -> Result<LocalPost, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.rejected_locations.get(location_name) {
            return Err(DirectoryError::Api {
                status: 400,
                message: message.clone(),
            });
        }
        state
            .posts
            .push((location_name.to_string(), request.clone()));
        Ok(LocalPost {
            name: format!("{location_name}/localPosts/{}", state.posts.len()),
            state: Some("LIVE".to_string()),
            search_url: None,
        })
    }

    async fn create_media(
        &self,
        location_name: &str,
        request: &CreateMediaRequest,
    ) -> Result<MediaItem, DirectoryError> {
        Ok(MediaItem {
            name: format!("{location_name}/media/1"),
            media_format: Some(request.media_format.clone()),
            source_url: Some(request.source_url.clone()),
            google_url: None,
            location_association: Some(request.location_association.clone()),
        })
    }
}
