//! Scoped upload storage.
//!
//! Every upload owns a slot directory `<root>/<upload_id>/` holding exactly one
//! `resume.<ext>` and one `job.txt`. Slots are independent, so concurrent uploads
//! never overwrite each other; stale slots are reclaimed by [`spawn_sweeper`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const JOB_FILE_NAME: &str = "job.txt";
const RESUME_STEM: &str = "resume";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The two files persisted for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub upload_id: Uuid,
    pub resume_path: PathBuf,
    pub job_path: PathBuf,
}

impl StoredUpload {
    pub fn resume_file_name(&self) -> String {
        file_name_of(&self.resume_path)
    }

    pub fn job_file_name(&self) -> String {
        file_name_of(&self.job_path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_dir(&self, upload_id: Uuid) -> PathBuf {
        self.root.join(upload_id.to_string())
    }

    /// Creates `root` if needed and pins it to an absolute path. Slot paths are
    /// handed to the analysis service, which does not share our working directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;
        let root = tokio::fs::canonicalize(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Resets the slot for `upload_id` and writes the resume and job description into it.
    ///
    /// Whatever the slot held before is deleted first, so afterwards it contains exactly
    /// `resume.<ext>` and `job.txt`.
    pub async fn replace_slot(
        &self,
        upload_id: Uuid,
        original_file_name: &str,
        resume: &[u8],
        job_description: &str,
    ) -> Result<StoredUpload, StorageError> {
        let slot = self.slot_dir(upload_id);
        tokio::fs::create_dir_all(&slot)
            .await
            .map_err(|e| StorageError::io(&slot, e))?;

        let removed = clear_dir(&slot).await?;
        if removed > 0 {
            debug!(%upload_id, removed, "Cleared previous slot contents");
        }

        let resume_path = slot.join(resume_file_name(original_file_name));
        tokio::fs::write(&resume_path, resume)
            .await
            .map_err(|e| StorageError::io(&resume_path, e))?;

        let job_path = slot.join(JOB_FILE_NAME);
        tokio::fs::write(&job_path, job_description.as_bytes())
            .await
            .map_err(|e| StorageError::io(&job_path, e))?;

        Ok(StoredUpload {
            upload_id,
            resume_path,
            job_path,
        })
    }

    /// Looks up the files of an existing slot. `None` when the slot or either file is gone.
    pub async fn locate(&self, upload_id: Uuid) -> Result<Option<StoredUpload>, StorageError> {
        let slot = self.slot_dir(upload_id);
        let mut entries = match tokio::fs::read_dir(&slot).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&slot, e)),
        };

        let mut resume_path = None;
        let mut has_job = false;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&slot, e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == JOB_FILE_NAME {
                has_job = true;
            } else if is_resume_file_name(&name) {
                resume_path = Some(entry.path());
            }
        }

        Ok(match (resume_path, has_job) {
            (Some(resume_path), true) => Some(StoredUpload {
                upload_id,
                resume_path,
                job_path: slot.join(JOB_FILE_NAME),
            }),
            _ => None,
        })
    }

    /// Removes slots whose last modification is at least `retention` ago.
    /// Entries in the root that are not upload slots are left alone.
    pub async fn sweep_expired(&self, retention: Duration) -> Result<usize, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::io(&self.root, e)),
        };

        let now = SystemTime::now();
        let mut expired = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.root, e))?
        {
            let name = entry.file_name();
            if Uuid::parse_str(&name.to_string_lossy()).is_err() {
                continue;
            }
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping slot {}: {e}", path.display());
                    continue;
                }
            };
            if !metadata.is_dir() {
                continue;
            }

            // Clock skew can put mtime in the future; treat that as fresh.
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or(Duration::ZERO);
            if age >= retention {
                expired.push(path);
            }
        }

        Ok(remove_slots(&expired).await)
    }
}

/// Removes each slot directory, returning how many were deleted. A slot that
/// cannot be removed is logged and left for the next sweep.
async fn remove_slots(slots: &[PathBuf]) -> usize {
    let mut removed = 0;
    for slot in slots {
        match tokio::fs::remove_dir_all(slot).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove expired slot {}: {e}", slot.display()),
        }
    }
    removed
}

/// Builds `resume.<ext>` from the uploaded file's name.
///
/// The extension is lower-cased and stripped to ASCII alphanumerics; a name with no
/// usable extension yields plain `resume`.
pub fn resume_file_name(original_file_name: &str) -> String {
    let extension = Path::new(original_file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            e.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|e| !e.is_empty());

    match extension {
        Some(ext) => format!("{RESUME_STEM}.{ext}"),
        None => RESUME_STEM.to_string(),
    }
}

fn is_resume_file_name(name: &str) -> bool {
    name == RESUME_STEM
        || name
            .strip_prefix(RESUME_STEM)
            .is_some_and(|rest| rest.starts_with('.'))
}

async fn clear_dir(dir: &Path) -> Result<usize, StorageError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StorageError::io(dir, e))?;
    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::io(dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        }
        .map_err(|e| StorageError::io(&path, e))?;
        removed += 1;
    }
    Ok(removed)
}

/// Spawns the background task that periodically reclaims expired slots.
pub fn spawn_sweeper(
    store: UploadStore,
    interval: Duration,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.sweep_expired(retention).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Swept expired upload slots"),
                Err(e) => warn!("Upload sweep failed: {e}"),
            }
        }
    })
}
