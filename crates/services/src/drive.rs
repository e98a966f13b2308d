//! Drive resources: attachment resolution, folder reference resolution,
//! and file creation for the embedded `$write` command.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use domains::{
    AppError, BlobStore, DriveFile, DriveFileRepo, DriveFolder, DriveFolderRepo, FolderView,
    Result, User,
};
use futures::future::BoxFuture;
use uuid::Uuid;

/// Default bound on how many parents the resolver will follow. The parent
/// chain is required to be acyclic by contract; the bound turns a violated
/// precondition into an error instead of unbounded recursion.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// A stored reference: either an identifier still to be fetched, or an
/// already-loaded entity.
#[derive(Debug, Clone)]
pub enum FolderRef {
    Id(Uuid),
    Entity(DriveFolder),
}

impl From<Uuid> for FolderRef {
    fn from(id: Uuid) -> Self {
        FolderRef::Id(id)
    }
}

impl From<DriveFolder> for FolderRef {
    fn from(folder: DriveFolder) -> Self {
        FolderRef::Entity(folder)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub include_parent: bool,
    pub max_depth: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            include_parent: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Expands a folder reference into its external view, recursively
/// embedding the parent chain when requested.
pub async fn resolve_folder(
    repo: &dyn DriveFolderRepo,
    target: FolderRef,
    opts: &ResolveOptions,
) -> Result<FolderView> {
    let folder = match target {
        FolderRef::Entity(folder) => folder,
        FolderRef::Id(id) => repo
            .get(id)
            .await
            .map_err(AppError::internal)?
            .ok_or(AppError::NotFound("folder"))?,
    };
    resolve_at(repo, folder, opts, 0).await
}

fn resolve_at<'a>(
    repo: &'a dyn DriveFolderRepo,
    folder: DriveFolder,
    opts: &'a ResolveOptions,
    depth: u32,
) -> BoxFuture<'a, Result<FolderView>> {
    Box::pin(async move {
        let id = folder.id;
        let parent_id = folder.parent_id;
        let mut view = FolderView {
            id,
            name: folder.name,
            user_id: folder.user_id,
            created_at: folder.created_at,
            parent: None,
        };

        if opts.include_parent {
            if let Some(pid) = parent_id {
                if depth >= opts.max_depth {
                    return Err(AppError::Validation(format!(
                        "folder {id} parent chain exceeds depth bound {}",
                        opts.max_depth
                    )));
                }
                let parent = repo
                    .get(pid)
                    .await
                    .map_err(AppError::internal)?
                    .ok_or(AppError::NotFound("folder"))?;
                view.parent = Some(Box::new(resolve_at(repo, parent, opts, depth + 1).await?));
            }
        }

        Ok(view)
    })
}

/// Drive operations needed by the posting pipeline and the folder
/// endpoint.
pub struct DriveService {
    files: Arc<dyn DriveFileRepo>,
    folders: Arc<dyn DriveFolderRepo>,
    blobs: Arc<dyn BlobStore>,
}

impl DriveService {
    pub fn new(
        files: Arc<dyn DriveFileRepo>,
        folders: Arc<dyn DriveFolderRepo>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            files,
            folders,
            blobs,
        }
    }

    /// Resolves a file id into a file owned by `owner`. Missing files and
    /// files owned by someone else are indistinguishable to the caller.
    pub async fn resolve_attachment(&self, owner: Uuid, file_id: Uuid) -> Result<DriveFile> {
        let file = self
            .files
            .get(file_id)
            .await
            .map_err(AppError::internal)?
            .ok_or(AppError::NotFound("file"))?;
        if file.user_id != owner {
            return Err(AppError::NotFound("file"));
        }
        Ok(file)
    }

    /// Creates a plain-text drive file: blob first, record second, so a
    /// record never points at missing content.
    pub async fn create_text_file(
        &self,
        owner: &User,
        name: String,
        data: Bytes,
    ) -> Result<DriveFile> {
        let file = DriveFile {
            id: Uuid::now_v7(),
            user_id: owner.id,
            name,
            content_type: "text/plain".to_string(),
            size: data.len() as u64,
            folder_id: None,
            created_at: Utc::now(),
        };
        self.blobs
            .save(file.id, data)
            .await
            .map_err(AppError::internal)?;
        self.files.insert(&file).await.map_err(AppError::internal)?;
        Ok(file)
    }

    pub async fn show_folder(&self, id: Uuid, include_parent: bool) -> Result<FolderView> {
        let opts = ResolveOptions {
            include_parent,
            ..Default::default()
        };
        resolve_folder(self.folders.as_ref(), id.into(), &opts).await
    }
}
