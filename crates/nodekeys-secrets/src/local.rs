//! File-system backed secret store.
//!
//! Each secret is a plain file under the node's data directory:
//!
//! ```text
//! <base>/consensus/validator.key
//! <base>/libp2p/libp2p.key
//! ```
//!
//! On Unix the directories are created with mode `0700` and secret files with
//! mode `0400`. Nothing is encrypted; file permissions are the only protection.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::Span;
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};
use crate::name::SecretName;
use crate::store::SecretStore;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

#[cfg(unix)]
const FILE_MODE: u32 = 0o400;

/// Emit an event inside the store's span, or nothing when the span is disabled.
macro_rules! store_event {
    ($span:expr, $level:ident, $($arg:tt)+) => {
        if !$span.is_disabled() {
            tracing::$level!(parent: &$span, $($arg)+);
        }
    };
}

/// Where each known secret lives.
#[derive(Debug, Default)]
struct SecretIndex {
    /// Every name registered by `setup`. Fixed once populated.
    paths: HashMap<SecretName, PathBuf>,
    /// Names currently addressable through `get` and `remove`.
    live: HashSet<SecretName>,
}

impl SecretIndex {
    fn lookup(&self, name: SecretName) -> Option<&PathBuf> {
        self.live
            .contains(&name)
            .then(|| self.paths.get(&name))
            .flatten()
    }

    fn registered(&self, name: SecretName) -> Option<&PathBuf> {
        self.paths.get(&name)
    }

    fn take(&mut self, name: SecretName) -> Option<PathBuf> {
        if self.live.remove(&name) {
            self.paths.get(&name).cloned()
        } else {
            None
        }
    }
}

/// Secret store keeping key material in files under a data directory.
///
/// The store assumes it is the only writer of its directory. The index of
/// secret paths is guarded by a reader/writer lock which is never held across
/// file I/O.
///
/// `remove` drops the index entry before deleting the file. If the deletion
/// fails the error is returned, the name reads as not found, and the stale file
/// stays on disk until it is cleaned up by hand; a later `set` for that name
/// reports `AlreadyExists`.
#[derive(Debug)]
pub struct LocalSecretStore {
    base_dir: Option<PathBuf>,
    index: RwLock<SecretIndex>,
    span: Span,
}

impl LocalSecretStore {
    /// Create a store rooted at `base_dir`. No I/O happens until [`setup`].
    ///
    /// An empty path yields a store with persistence disabled, as does
    /// [`LocalSecretStore::disabled`]. Events are emitted inside `span`; pass
    /// [`Span::none()`] for a silent store.
    ///
    /// [`setup`]: SecretStore::setup
    pub fn new(base_dir: impl Into<PathBuf>, span: Span) -> Self {
        let base_dir = base_dir.into();
        Self {
            base_dir: (!base_dir.as_os_str().is_empty()).then_some(base_dir),
            index: RwLock::default(),
            span,
        }
    }

    /// A store that accepts writes without persisting them and holds nothing.
    pub fn disabled(span: Span) -> Self {
        Self::new(PathBuf::new(), span)
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Path registered for `name`, once `setup` has run.
    pub fn secret_path(&self, name: SecretName) -> Option<PathBuf> {
        self.index.read().registered(name).cloned()
    }
}

#[async_trait]
impl SecretStore for LocalSecretStore {
    async fn setup(&self) -> Result<()> {
        let Some(base) = self.base_dir.clone() else {
            store_event!(self.span, debug, "no data directory configured, persistence disabled");
            return Ok(());
        };

        create_private_dir(&base).await?;
        for name in SecretName::ALL {
            create_private_dir(&base.join(name.directory())).await?;
        }

        {
            let mut index = self.index.write();
            for name in SecretName::ALL {
                index.paths.insert(name, name.path_under(&base));
                index.live.insert(name);
            }
        }

        store_event!(self.span, info, data_dir = %base.display(), "local secrets store ready");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let name: SecretName = name.parse()?;
        let path = self
            .index
            .read()
            .lookup(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))?;

        store_event!(self.span, debug, %name, path = %path.display(), "reading secret");
        let result = tokio::fs::read(&path).await;
        result.map_err(|e| SecretError::io(&path, e))
    }

    async fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        if self.base_dir.is_none() {
            store_event!(self.span, debug, name, "persistence disabled, not writing secret");
            return Ok(());
        }

        let name: SecretName = name.parse()?;
        let path = self
            .index
            .read()
            .registered(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))?;

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| SecretError::io(&path, e))?;
        if exists {
            return Err(SecretError::AlreadyExists {
                name: name.to_string(),
                path,
            });
        }

        store_event!(self.span, debug, %name, path = %path.display(), "writing secret");
        let data = Zeroizing::new(value.to_vec());
        let target = path.clone();
        tokio::task::spawn_blocking(move || publish_secret_file(name, &target, &data))
            .await
            .map_err(|e| SecretError::io(&path, io::Error::other(e)))??;

        self.index.write().live.insert(name);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let name: SecretName = name.parse()?;
        let path = self
            .index
            .write()
            .take(name)
            .ok_or_else(|| SecretError::NotFound(name.to_string()))?;

        store_event!(self.span, debug, %name, path = %path.display(), "removing secret");
        if let Err(e) = tokio::fs::remove_file(&path).await {
            store_event!(
                self.span,
                warn,
                %name,
                path = %path.display(),
                error = %e,
                "secret dropped from index but its file could not be removed"
            );
            return Err(SecretError::io(&path, e));
        }

        Ok(())
    }
}

/// Create `dir` and any missing parents owner-only. Existing directories are left as they are.
async fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder
        .create(dir)
        .await
        .map_err(|e| SecretError::io(dir, e))
}

/// Write `data` to a staging file next to `path`, then link it into place
/// only if `path` does not exist yet.
///
/// Readers never observe a partially written secret, and of two racing writers
/// at most one publishes.
fn publish_secret_file(name: SecretName, path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        SecretError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "secret path has no parent directory"),
        )
    })?;

    let mut staged = tempfile::Builder::new()
        .prefix(".staged-")
        .tempfile_in(dir)
        .map_err(|e| SecretError::io(dir, e))?;
    staged
        .write_all(data)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| SecretError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(FILE_MODE))
            .map_err(|e| SecretError::io(path, e))?;
    }

    staged.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            SecretError::AlreadyExists {
                name: name.to_string(),
                path: path.to_path_buf(),
            }
        } else {
            SecretError::io(path, e.error)
        }
    })?;

    Ok(())
}
