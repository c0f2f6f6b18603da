//! File-backed [`CacheStore`] with write-then-rename persistence.

// std
use std::{
	fs,
	io::{ErrorKind, Write},
	path::Path,
};
// crates.io
use tempfile::{Builder, NamedTempFile};
// self
use crate::{
	_prelude::*,
	document::SpecDocument,
	store::{CacheRecord, CacheStore, StoreError, StoreFuture, WriteOutcome},
};

/// Keeps the cached document in a single file and its metadata in memory.
///
/// A file left by a previous process is adopted on [`open`](Self::open) with its modification
/// time as the commit instant, so a restart can still serve it (fresh or stale).
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	record: Arc<RwLock<Option<CacheRecord>>>,
	write_lock: Arc<Mutex<()>>,
}
impl FileCache {
	/// Opens (or creates) the cache directory and adopts an existing document.
	pub fn open(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, StoreError> {
		let dir = dir.as_ref();

		fs::create_dir_all(dir).map_err(|e| StoreError::Backend {
			message: format!("Failed to create cache directory {}: {e}", dir.display()),
		})?;

		let path = dir.join(file_name);
		let record = Self::adopt_existing(&path)?;

		Ok(Self { path, record: Arc::new(RwLock::new(record)), write_lock: Default::default() })
	}

	fn adopt_existing(path: &Path) -> Result<Option<CacheRecord>, StoreError> {
		let metadata = match path.metadata() {
			Ok(metadata) => metadata,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to inspect {}: {e}", path.display()),
				}),
		};

		if !metadata.is_file() || metadata.len() == 0 {
			return Ok(None);
		}

		let written_at = metadata
			.modified()
			.map(OffsetDateTime::from)
			.unwrap_or(OffsetDateTime::UNIX_EPOCH);

		Ok(Some(CacheRecord { location: path.to_path_buf(), written_at, generation: 0 }))
	}

	fn temp_file(&self) -> Result<NamedTempFile, StoreError> {
		let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
		let name = self.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

		Builder::new().prefix(&format!(".{name}.")).suffix(".tmp").tempfile_in(dir).map_err(|e| {
			StoreError::Backend {
				message: format!("Failed to create temporary file in {}: {e}", dir.display()),
			}
		})
	}

	/// Writes into a uniquely named sibling and renames it over the cache file.
	///
	/// Every writer gets its own temporary file, so caches in other processes or other
	/// instances sharing the directory never write into each other's half-finished file.
	/// A temporary file that is not persisted is removed when dropped.
	fn persist(&self, document: &SpecDocument) -> Result<(), StoreError> {
		let mut tmp = self.temp_file()?;

		tmp.write_all(document.as_str().as_bytes()).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp.path().display()),
		})?;
		tmp.as_file().sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp.path().display()),
		})?;
		tmp.persist(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {}", self.path.display(), e.error),
		})?;

		Ok(())
	}

	fn write_now(&self, document: SpecDocument, generation: u64) -> Result<WriteOutcome, StoreError> {
		let _serialized = self.write_lock.lock();
		let committed = self.record.read().as_ref().map(|r| r.generation);

		if let Some(committed) = committed.filter(|committed| generation <= *committed) {
			return Ok(WriteOutcome::Superseded { committed });
		}

		self.persist(&document)?;

		let record = CacheRecord {
			location: self.path.clone(),
			written_at: OffsetDateTime::now_utc(),
			generation,
		};

		*self.record.write() = Some(record.clone());

		Ok(WriteOutcome::Committed(record))
	}

	fn read_now(&self) -> Result<SpecDocument, StoreError> {
		match fs::read_to_string(&self.path) {
			Ok(content) => Ok(SpecDocument::from(content)),
			Err(e) if e.kind() == ErrorKind::NotFound =>
				Err(StoreError::Missing { location: self.path.display().to_string() }),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to read {}: {e}", self.path.display()),
			}),
		}
	}
}
impl CacheStore for FileCache {
	fn location(&self) -> &Path {
		&self.path
	}

	fn record(&self) -> Option<CacheRecord> {
		self.record.read().clone()
	}

	fn read(&self) -> StoreFuture<'_, SpecDocument> {
		Box::pin(async move { self.read_now() })
	}

	fn write(&self, document: SpecDocument, generation: u64) -> StoreFuture<'_, WriteOutcome> {
		Box::pin(async move { self.write_now(document, generation) })
	}
}
