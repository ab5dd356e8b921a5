use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use secstore_types::{LoginMethod, ResultCode, TaUuid};

use crate::error::{TeeError, TeeResult};
use crate::operation::{Operation, ParamType};
use crate::service;
use crate::traits::{TeeContext, TeeDriver, TeeSession};

/// Counters of every backend call made through an [`InMemoryTee`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeeStats {
    pub contexts_initialized: usize,
    pub contexts_finalized: usize,
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    /// Command ids in invocation order.
    pub commands: Vec<u32>,
    pub last_param_types: Option<[ParamType; 4]>,
    pub last_login: Option<LoginMethod>,
}

impl TeeStats {
    pub fn invocations(&self) -> usize {
        self.commands.len()
    }

    /// Every context and session that was opened has been released.
    pub fn is_balanced(&self) -> bool {
        self.contexts_initialized == self.contexts_finalized
            && self.sessions_opened == self.sessions_closed
    }
}

#[derive(Default)]
struct Faults {
    context: Option<ResultCode>,
    open: Option<ResultCode>,
    invoke: Option<ResultCode>,
}

struct Shared {
    service: TaUuid,
    objects: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    stats: Mutex<TeeStats>,
    faults: Mutex<Faults>,
}

/// In-memory simulated secure backend.
///
/// Intended for tests and embedding. Objects live in a `HashMap` behind a
/// `RwLock`; clones share the same objects and counters, so a test can keep
/// a handle while the client owns another. Injected faults stay active until
/// [`InMemoryTee::clear_faults`] is called.
#[derive(Clone)]
pub struct InMemoryTee {
    shared: Arc<Shared>,
}

impl InMemoryTee {
    /// Backend hosting the secure storage service.
    pub fn new() -> Self {
        Self::with_service(TaUuid::SECURE_STORAGE)
    }

    /// Backend hosting a service with a different identity.
    pub fn with_service(service: TaUuid) -> Self {
        Self {
            shared: Arc::new(Shared {
                service,
                objects: RwLock::new(HashMap::new()),
                stats: Mutex::new(TeeStats::default()),
                faults: Mutex::new(Faults::default()),
            }),
        }
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> TeeStats {
        self.shared.stats.lock().expect("lock poisoned").clone()
    }

    /// Make every context initialization fail with `code`.
    pub fn inject_context_failure(&self, code: ResultCode) {
        self.shared.faults.lock().expect("lock poisoned").context = Some(code);
    }

    /// Make every session open fail with `code`.
    pub fn inject_open_failure(&self, code: ResultCode) {
        self.shared.faults.lock().expect("lock poisoned").open = Some(code);
    }

    /// Make every command invocation fail with `code`.
    pub fn inject_invoke_failure(&self, code: ResultCode) {
        self.shared.faults.lock().expect("lock poisoned").invoke = Some(code);
    }

    pub fn clear_faults(&self) {
        *self.shared.faults.lock().expect("lock poisoned") = Faults::default();
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.shared.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.objects.read().expect("lock poisoned").is_empty()
    }

    /// Raw stored bytes for `id`, bypassing any session.
    pub fn raw_object(&self, id: &[u8]) -> Option<Vec<u8>> {
        self.shared
            .objects
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
    }

    /// Store raw bytes for `id`, bypassing any session and its size limits.
    pub fn insert_raw(&self, id: &[u8], data: &[u8]) {
        self.shared
            .objects
            .write()
            .expect("lock poisoned")
            .insert(id.to_vec(), data.to_vec());
    }

    fn record(&self, f: impl FnOnce(&mut TeeStats)) {
        f(&mut self.shared.stats.lock().expect("lock poisoned"));
    }
}

impl Default for InMemoryTee {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTee")
            .field("service", &self.shared.service)
            .field("object_count", &self.len())
            .finish()
    }
}

impl TeeDriver for InMemoryTee {
    type Context = InMemoryContext;

    fn initialize_context(&self) -> TeeResult<InMemoryContext> {
        if let Some(code) = self.shared.faults.lock().expect("lock poisoned").context {
            return Err(TeeError::api(code));
        }
        self.record(|s| s.contexts_initialized += 1);
        Ok(InMemoryContext { tee: self.clone() })
    }
}

/// Context handed out by [`InMemoryTee`].
pub struct InMemoryContext {
    tee: InMemoryTee,
}

impl TeeContext for InMemoryContext {
    type Session = InMemorySession;

    fn open_session(&mut self, uuid: &TaUuid, login: LoginMethod) -> TeeResult<InMemorySession> {
        if let Some(code) = self.tee.shared.faults.lock().expect("lock poisoned").open {
            return Err(TeeError::tee(code));
        }
        if *uuid != self.tee.shared.service {
            return Err(TeeError::tee(ResultCode::ITEM_NOT_FOUND));
        }
        self.tee.record(|s| {
            s.sessions_opened += 1;
            s.last_login = Some(login);
        });
        Ok(InMemorySession {
            tee: self.tee.clone(),
        })
    }

    fn close_session(&mut self, _session: InMemorySession) {
        self.tee.record(|s| s.sessions_closed += 1);
    }

    fn finalize(self) {
        self.tee.record(|s| s.contexts_finalized += 1);
    }
}

/// Session handed out by [`InMemoryContext`].
pub struct InMemorySession {
    tee: InMemoryTee,
}

impl TeeSession for InMemorySession {
    fn invoke_command(&mut self, command: u32, op: &mut Operation<'_>) -> TeeResult<()> {
        self.tee.record(|s| {
            s.commands.push(command);
            s.last_param_types = Some(op.param_types());
        });
        if let Some(code) = self.tee.shared.faults.lock().expect("lock poisoned").invoke {
            return Err(TeeError::tee(code));
        }
        let mut objects = self.tee.shared.objects.write().expect("lock poisoned");
        service::dispatch(&mut *objects, command, op)
    }
}
