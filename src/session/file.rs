//! File-backed [`SessionStore`] so CLI and desktop hosts keep their session across restarts.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	session::{SessionError, SessionFuture, SessionStore, SessionToken},
};

/// On-disk representation of the session slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
	/// Bearer token for the session.
	pub token: SessionToken,
	/// Instant the token was written.
	#[serde(with = "time::serde::rfc3339")]
	pub saved_at: OffsetDateTime,
}

/// Persists the session token to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<StoredSession>>>,
}
impl FileSessionStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the file backing this store.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns the persisted record, including when it was saved.
	pub fn stored(&self) -> Option<StoredSession> {
		self.inner.read().clone()
	}

	fn load_snapshot(path: &Path) -> Result<Option<StoredSession>, SessionError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => {
				return Err(SessionError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				});
			},
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| SessionError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), SessionError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| SessionError::Backend {
				message: format!("Failed to create session directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, record: &StoredSession) -> Result<(), SessionError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(record).map_err(|e| SessionError::Serialization {
				message: format!("Failed to serialize session: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| SessionError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| SessionError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| SessionError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| SessionError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn remove_locked(&self) -> Result<(), SessionError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(SessionError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}
}
impl SessionStore for FileSessionStore {
	fn get(&self) -> SessionFuture<'_, Option<SessionToken>> {
		Box::pin(async move { Ok(self.inner.read().as_ref().map(|stored| stored.token.clone())) })
	}

	fn set(&self, token: SessionToken) -> SessionFuture<'_, ()> {
		Box::pin(async move {
			let record = StoredSession { token, saved_at: OffsetDateTime::now_utc() };
			let mut guard = self.inner.write();

			self.persist_locked(&record)?;

			*guard = Some(record);

			Ok(())
		})
	}

	fn clear(&self) -> SessionFuture<'_, Option<SessionToken>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.remove_locked()?;

			Ok(guard.take().map(|stored| stored.token))
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"jsonapi_auth_client_session_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn set_and_reopen_round_trip() {
		let path = temp_path("reopen");
		let store = FileSessionStore::open(&path).expect("Failed to open session file.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for session file test.");

		rt.block_on(store.set(SessionToken::new("token-a")))
			.expect("Failed to save token to session file.");
		drop(store);

		let reopened = FileSessionStore::open(&path).expect("Failed to reopen session file.");
		let fetched = rt
			.block_on(reopened.get())
			.expect("Failed to read token from session file.")
			.expect("Session file lost token after reopen.");

		assert_eq!(fetched.expose(), "token-a");
		assert!(reopened.stored().is_some_and(|s| s.saved_at <= OffsetDateTime::now_utc()));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session file {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_removes_file() {
		let path = temp_path("clear");
		let store = FileSessionStore::open(&path).expect("Failed to open session file.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for session file test.");

		rt.block_on(store.set(SessionToken::new("token-b")))
			.expect("Failed to save token to session file.");

		let previous =
			rt.block_on(store.clear()).expect("Clearing the session file should succeed.");

		assert_eq!(previous.map(|t| t.expose().to_owned()), Some("token-b".into()));
		assert!(!path.exists());
		assert!(rt.block_on(store.get()).expect("Read after clear should succeed.").is_none());
		assert!(
			rt.block_on(store.clear()).expect("Clearing an empty store should succeed.").is_none()
		);
	}

	#[test]
	fn corrupted_file_is_reported() {
		let path = temp_path("corrupt");

		fs::write(&path, b"{not json").expect("Failed to write corrupt fixture.");

		let err = FileSessionStore::open(&path).expect_err("Corrupt session file must not load.");

		assert!(matches!(err, SessionError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session file {}: {e}", path.display())
		});
	}
}
