use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use secstore_types::{LoginMethod, ResultCode, TaUuid};
use tracing::{debug, warn};

use crate::error::{TeeError, TeeResult};
use crate::operation::Operation;
use crate::service::{self, ObjectTable};
use crate::traits::{TeeContext, TeeDriver, TeeSession};

const OBJECT_EXT: &str = "obj";

/// Directory-backed simulated secure backend.
///
/// Each trusted service gets a subdirectory named after its UUID; each
/// object is one file named by the hex encoding of its id. Writes go to a
/// temporary file that is renamed into place, so a crash never leaves a
/// half-written object behind.
///
/// Nothing here is protected. It exists so the CLI can run on a host
/// without a secure backend.
#[derive(Clone, Debug)]
pub struct FileTee {
    root: PathBuf,
    service: TaUuid,
}

impl FileTee {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            service: TaUuid::SECURE_STORAGE,
        }
    }

    /// Host a service with a different identity.
    pub fn with_service(mut self, service: TaUuid) -> Self {
        self.service = service;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn service_dir(&self) -> PathBuf {
        self.root.join(self.service.to_string())
    }
}

impl TeeDriver for FileTee {
    type Context = FileContext;

    fn initialize_context(&self) -> TeeResult<FileContext> {
        let dir = self.service_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            warn!(path = %dir.display(), error = %e, "cannot prepare backend directory");
            TeeError::api(ResultCode::COMMUNICATION)
        })?;
        Ok(FileContext {
            service: self.service,
            dir,
        })
    }
}

/// Context handed out by [`FileTee`].
#[derive(Debug)]
pub struct FileContext {
    service: TaUuid,
    dir: PathBuf,
}

impl TeeContext for FileContext {
    type Session = FileSession;

    fn open_session(&mut self, uuid: &TaUuid, _login: LoginMethod) -> TeeResult<FileSession> {
        if *uuid != self.service {
            return Err(TeeError::tee(ResultCode::ITEM_NOT_FOUND));
        }
        Ok(FileSession {
            table: FileTable {
                dir: self.dir.clone(),
            },
        })
    }

    fn close_session(&mut self, _session: FileSession) {}

    fn finalize(self) {}
}

/// Session handed out by [`FileContext`].
#[derive(Debug)]
pub struct FileSession {
    table: FileTable,
}

impl TeeSession for FileSession {
    fn invoke_command(&mut self, command: u32, op: &mut Operation<'_>) -> TeeResult<()> {
        service::dispatch(&mut self.table, command, op)
    }
}

#[derive(Debug)]
struct FileTable {
    dir: PathBuf,
}

impl FileTable {
    fn object_path(&self, id: &[u8]) -> PathBuf {
        self.dir.join(format!("{}.{OBJECT_EXT}", hex::encode(id)))
    }
}

impl ObjectTable for FileTable {
    fn load(&self, id: &[u8]) -> TeeResult<Option<Vec<u8>>> {
        match fs::read(self.object_path(id)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &e)),
        }
    }

    fn store(&mut self, id: &[u8], data: &[u8]) -> TeeResult<()> {
        let path = self.object_path(id);
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| storage_error("create", &e))?;
        tmp.write_all(data)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| storage_error("write", &e))?;
        tmp.persist(&path)
            .map_err(|e| storage_error("persist", &e.error))?;
        debug!(path = %path.display(), bytes = data.len(), "object stored");
        Ok(())
    }

    fn remove(&mut self, id: &[u8]) -> TeeResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("remove", &e)),
        }
    }
}

fn storage_error(action: &str, e: &io::Error) -> TeeError {
    warn!(action, error = %e, "simulated storage failure");
    TeeError::trusted_app(ResultCode::GENERIC)
}
