use secstore_tee::{FileTee, Operation, Param, Session, SessionManager, TeeDriver, TeeError};
use secstore_types::{Command, ObjectKey, ObjectPayload, ResultCode, OBJECT_CAPACITY};
use tracing::{debug, trace, warn};

use crate::config::{ClientConfig, ShortBufferPolicy};
use crate::error::{ClientError, ClientResult};
use crate::outcome::{Outcome, ReadOutcome};

/// Issues object commands against the trusted storage service.
///
/// Each call is self-contained: it opens a session, invokes one command and
/// closes the session again, also when the command fails. Sessions are
/// never pooled or shared between calls.
#[derive(Debug)]
pub struct ObjectStoreClient<D: TeeDriver> {
    sessions: SessionManager<D>,
    short_buffer_policy: ShortBufferPolicy,
}

impl<D: TeeDriver> ObjectStoreClient<D> {
    /// Client for the default secure storage service.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, &ClientConfig::default())
    }

    pub fn with_config(driver: D, config: &ClientConfig) -> Self {
        Self {
            sessions: SessionManager::new(driver, config.ta_uuid).with_login(config.login),
            short_buffer_policy: config.short_buffer_policy,
        }
    }

    pub fn with_short_buffer_policy(mut self, policy: ShortBufferPolicy) -> Self {
        self.short_buffer_policy = policy;
        self
    }

    pub fn driver(&self) -> &D {
        self.sessions.driver()
    }

    // ---- Front-end operations ----

    /// Read the object stored under `key`.
    pub fn get(&self, key: &str) -> ClientResult<ReadOutcome> {
        let key = checked_key(key)?;
        self.get_object(&key)
    }

    /// Store `data` under `key`, replacing any previous object.
    ///
    /// Both arguments are validated before the backend is contacted.
    pub fn put(&self, key: &str, data: &[u8]) -> ClientResult<()> {
        let key = checked_key(key)?;
        let payload = ObjectPayload::new(data).map_err(|e| {
            warn!(key = %key, error = %e, "rejected payload");
            ClientError::Precondition(e)
        })?;
        self.put_object(&key, &payload)
    }

    /// Delete the object stored under `key`.
    pub fn delete(&self, key: &str) -> ClientResult<Outcome> {
        let key = checked_key(key)?;
        self.delete_object(&key)
    }

    // ---- Typed operations ----

    pub fn get_object(&self, key: &ObjectKey) -> ClientResult<ReadOutcome> {
        self.run(Command::ReadRaw, key, |session| {
            let mut buffer = vec![0u8; OBJECT_CAPACITY];
            let (status, reported) = {
                let mut op = Operation::new(
                    Param::input(key.as_bytes()),
                    Param::output(&mut buffer),
                    Param::None,
                    Param::None,
                );
                trace!(key = %key, "READ_RAW encoded");
                let status = session.invoke(Command::ReadRaw, &mut op);
                (status, op.output_size(1).unwrap_or(OBJECT_CAPACITY))
            };

            match status {
                Ok(()) => {
                    buffer.truncate(reported);
                    Ok(ReadOutcome::Found(ObjectPayload::new(buffer)?))
                }
                Err(e) if e.code == ResultCode::ITEM_NOT_FOUND => Ok(ReadOutcome::NotFound),
                Err(e) if e.code == ResultCode::SHORT_BUFFER => {
                    self.short_buffer(key, buffer, reported)
                }
                Err(e) => Err(fatal(Command::ReadRaw, key, e)),
            }
        })
    }

    pub fn put_object(&self, key: &ObjectKey, payload: &ObjectPayload) -> ClientResult<()> {
        let padded = payload.to_padded();
        self.run(Command::WriteRaw, key, |session| {
            let mut op = Operation::new(
                Param::input(key.as_bytes()),
                Param::input(&padded[..]),
                Param::None,
                Param::None,
            );
            trace!(key = %key, bytes = payload.len(), "WRITE_RAW encoded");
            session
                .invoke(Command::WriteRaw, &mut op)
                .map_err(|e| fatal(Command::WriteRaw, key, e))
        })
    }

    pub fn delete_object(&self, key: &ObjectKey) -> ClientResult<Outcome> {
        self.run(Command::Delete, key, |session| {
            let mut op = Operation::new(
                Param::input(key.as_bytes()),
                Param::None,
                Param::None,
                Param::None,
            );
            trace!(key = %key, "DELETE encoded");
            match session.invoke(Command::Delete, &mut op) {
                Ok(()) => Ok(Outcome::Success),
                Err(e) if e.code == ResultCode::ITEM_NOT_FOUND => Ok(Outcome::NotFound),
                Err(e) => Err(fatal(Command::Delete, key, e)),
            }
        })
    }

    /// Open a session, run one command on it, and close it.
    ///
    /// A session that failed to open has nothing to close; in every other
    /// case the session is closed before the result is returned.
    fn run<T>(
        &self,
        command: Command,
        key: &ObjectKey,
        invoke: impl FnOnce(&mut Session<D::Context>) -> ClientResult<T>,
    ) -> ClientResult<T> {
        let mut session = self.sessions.open().map_err(|e| {
            warn!(
                command = %command,
                key = %key,
                stage = %e.stage,
                code = %e.source.code,
                origin = %e.source.origin,
                "session unavailable"
            );
            ClientError::Session(e)
        })?;
        let result = invoke(&mut session);
        session.close();
        debug!(command = %command, key = %key, ok = result.is_ok(), "command completed");
        result
    }

    fn short_buffer(
        &self,
        key: &ObjectKey,
        buffer: Vec<u8>,
        required: usize,
    ) -> ClientResult<ReadOutcome> {
        warn!(key = %key, required, capacity = OBJECT_CAPACITY, "object larger than read buffer");
        match self.short_buffer_policy {
            ShortBufferPolicy::Report => Ok(ReadOutcome::Truncated {
                partial: ObjectPayload::new(buffer)?,
                required,
            }),
            ShortBufferPolicy::Legacy => Ok(ReadOutcome::Found(ObjectPayload::new(buffer)?)),
            ShortBufferPolicy::Fatal => Err(ClientError::Truncated {
                key: key.clone(),
                required,
                capacity: OBJECT_CAPACITY,
            }),
        }
    }
}

impl ObjectStoreClient<FileTee> {
    /// Client over the file-backed simulated backend at `config.store_dir`.
    pub fn file_backed(config: &ClientConfig) -> Self {
        let driver = FileTee::new(&config.store_dir).with_service(config.ta_uuid);
        Self::with_config(driver, config)
    }
}

fn checked_key(key: &str) -> ClientResult<ObjectKey> {
    ObjectKey::new(key).map_err(|e| {
        warn!(error = %e, "rejected object key");
        ClientError::Precondition(e)
    })
}

fn fatal(command: Command, key: &ObjectKey, e: TeeError) -> ClientError {
    warn!(command = %command, key = %key, code = %e.code, origin = %e.origin, "command failed");
    ClientError::Backend {
        command,
        key: key.clone(),
        code: e.code,
        origin: e.origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use secstore_tee::{InMemoryTee, ParamType, SessionStage};
    use secstore_types::{ErrorOrigin, TypeError};

    fn client() -> (ObjectStoreClient<InMemoryTee>, InMemoryTee) {
        let tee = InMemoryTee::new();
        (ObjectStoreClient::new(tee.clone()), tee)
    }

    fn padded(data: &[u8]) -> Vec<u8> {
        let mut v = data.to_vec();
        v.resize(OBJECT_CAPACITY, 0);
        v
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn cert_lifecycle() {
        let (client, tee) = client();

        client.put("cert-01", b"hello").unwrap();

        let payload = client.get("cert-01").unwrap().found().expect("should exist");
        assert_eq!(payload.len(), OBJECT_CAPACITY);
        assert_eq!(&payload.as_bytes()[..5], b"hello");
        assert!(payload.as_bytes()[5..].iter().all(|&b| b == 0));
        assert_eq!(payload.text_bytes(), b"hello");

        assert_eq!(client.delete("cert-01").unwrap(), Outcome::Success);
        assert_eq!(client.get("cert-01").unwrap(), ReadOutcome::NotFound);

        let stats = tee.stats();
        assert_eq!(stats.sessions_opened, 4);
        assert!(stats.is_balanced());
    }

    #[test]
    fn overlong_key_put_never_reaches_backend() {
        let (client, tee) = client();
        let key = format!("k-too-long-{}", "x".repeat(54));
        assert_eq!(key.len(), 65);

        let err = client.put(&key, b"x").unwrap_err();
        assert!(err.is_precondition());
        assert!(matches!(
            err,
            ClientError::Precondition(TypeError::KeyTooLong { len: 65, max: 64 })
        ));

        let stats = tee.stats();
        assert_eq!(stats.contexts_initialized, 0);
        assert_eq!(stats.invocations(), 0);
    }

    #[test]
    fn overlong_key_rejected_on_read_and_delete_too() {
        let (client, tee) = client();
        let key = "k".repeat(65);
        assert!(client.get(&key).unwrap_err().is_precondition());
        assert!(client.delete(&key).unwrap_err().is_precondition());
        assert_eq!(tee.stats().contexts_initialized, 0);
    }

    #[test]
    fn oversized_payload_rejected_without_truncation() {
        let (client, tee) = client();
        let err = client.put("big", &vec![1u8; OBJECT_CAPACITY + 1]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Precondition(TypeError::PayloadTooLarge { .. })
        ));
        assert_eq!(tee.stats().invocations(), 0);
        assert!(tee.is_empty());
    }

    // -----------------------------------------------------------------------
    // Not-found semantics
    // -----------------------------------------------------------------------

    #[test]
    fn get_never_written_is_not_found() {
        let (client, _) = client();
        assert_eq!(client.get("never").unwrap(), ReadOutcome::NotFound);
    }

    #[test]
    fn delete_never_written_is_not_found() {
        let (client, _) = client();
        assert_eq!(client.delete("never").unwrap(), Outcome::NotFound);
    }

    #[test]
    fn delete_twice() {
        let (client, _) = client();
        client.put("k", b"v").unwrap();
        assert_eq!(client.delete("k").unwrap(), Outcome::Success);
        assert_eq!(client.delete("k").unwrap(), Outcome::NotFound);
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn write_sends_full_capacity_buffer() {
        let (client, tee) = client();
        client.put("k", b"abc").unwrap();
        assert_eq!(tee.raw_object(b"k"), Some(padded(b"abc")));
        assert_eq!(
            tee.stats().last_param_types,
            Some([
                ParamType::MemrefTempInput,
                ParamType::MemrefTempInput,
                ParamType::None,
                ParamType::None
            ])
        );
    }

    #[test]
    fn read_uses_input_and_output_slots() {
        let (client, tee) = client();
        let _ = client.get("k").unwrap();
        let stats = tee.stats();
        assert_eq!(stats.commands, vec![Command::ReadRaw.id()]);
        assert_eq!(
            stats.last_param_types,
            Some([
                ParamType::MemrefTempInput,
                ParamType::MemrefTempOutput,
                ParamType::None,
                ParamType::None
            ])
        );
    }

    #[test]
    fn delete_uses_key_slot_only() {
        let (client, tee) = client();
        let _ = client.delete("k").unwrap();
        let stats = tee.stats();
        assert_eq!(stats.commands, vec![Command::Delete.id()]);
        assert_eq!(
            stats.last_param_types,
            Some([
                ParamType::MemrefTempInput,
                ParamType::None,
                ParamType::None,
                ParamType::None
            ])
        );
    }

    #[test]
    fn read_returns_reported_length() {
        let (client, tee) = client();
        tee.insert_raw(b"short", b"abc");
        let payload = client.get("short").unwrap().found().unwrap();
        assert_eq!(payload.as_bytes(), b"abc");
    }

    #[test]
    fn put_overwrites() {
        let (client, _) = client();
        client.put("k", b"first-value").unwrap();
        client.put("k", b"2nd").unwrap();
        let payload = client.get("k").unwrap().found().unwrap();
        assert_eq!(payload.text_bytes(), b"2nd");
    }

    // -----------------------------------------------------------------------
    // Short buffer policies
    // -----------------------------------------------------------------------

    fn oversized(policy: ShortBufferPolicy) -> (ObjectStoreClient<InMemoryTee>, InMemoryTee) {
        let tee = InMemoryTee::new();
        tee.insert_raw(b"huge", &vec![9u8; OBJECT_CAPACITY + 500]);
        let client = ObjectStoreClient::new(tee.clone()).with_short_buffer_policy(policy);
        (client, tee)
    }

    #[test]
    fn short_buffer_reported_as_truncated() {
        let (client, tee) = oversized(ShortBufferPolicy::Report);
        match client.get("huge").unwrap() {
            ReadOutcome::Truncated { partial, required } => {
                assert_eq!(required, OBJECT_CAPACITY + 500);
                assert_eq!(partial.len(), OBJECT_CAPACITY);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
        assert!(tee.stats().is_balanced());
    }

    #[test]
    fn short_buffer_fatal_policy() {
        let (client, tee) = oversized(ShortBufferPolicy::Fatal);
        let err = client.get("huge").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Truncated {
                required: 2500,
                capacity: OBJECT_CAPACITY,
                ..
            }
        ));
        assert_eq!(err.result_code(), Some(ResultCode::SHORT_BUFFER));
        assert!(tee.stats().is_balanced());
    }

    #[test]
    fn short_buffer_legacy_policy_returns_buffer_as_success() {
        let (client, _) = oversized(ShortBufferPolicy::Legacy);
        let payload = client.get("huge").unwrap().found().unwrap();
        assert_eq!(payload.len(), OBJECT_CAPACITY);
    }

    // -----------------------------------------------------------------------
    // Fatal paths and session discipline
    // -----------------------------------------------------------------------

    #[test]
    fn context_failure_is_fatal_and_skips_invocation() {
        let (client, tee) = client();
        tee.inject_context_failure(ResultCode::COMMUNICATION);
        let err = client.get("k").unwrap_err();
        match &err {
            ClientError::Session(e) => assert_eq!(e.stage, SessionStage::Context),
            other => panic!("expected session error, got {other:?}"),
        }
        assert_eq!(err.result_code(), Some(ResultCode::COMMUNICATION));
        let stats = tee.stats();
        assert_eq!(stats.invocations(), 0);
        assert!(stats.is_balanced());
    }

    #[test]
    fn open_failure_is_fatal_and_releases_context() {
        let (client, tee) = client();
        tee.inject_open_failure(ResultCode::TARGET_DEAD);
        let err = client.put("k", b"v").unwrap_err();
        assert!(matches!(err, ClientError::Session(_)));
        let stats = tee.stats();
        assert_eq!(stats.contexts_initialized, 1);
        assert_eq!(stats.contexts_finalized, 1);
        assert_eq!(stats.invocations(), 0);
    }

    #[test]
    fn unexpected_read_status_is_fatal() {
        let (client, tee) = client();
        tee.inject_invoke_failure(ResultCode::ACCESS_CONFLICT);
        let err = client.get("k").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Backend {
                command: Command::ReadRaw,
                code: ResultCode::ACCESS_CONFLICT,
                origin: ErrorOrigin::Tee,
                ..
            }
        ));
    }

    #[test]
    fn write_has_no_not_found_outcome() {
        let (client, tee) = client();
        tee.inject_invoke_failure(ResultCode::ITEM_NOT_FOUND);
        let err = client.put("k", b"v").unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::ITEM_NOT_FOUND));
        assert!(matches!(err, ClientError::Backend { command: Command::WriteRaw, .. }));
    }

    #[test]
    fn unexpected_delete_status_is_fatal() {
        let (client, tee) = client();
        tee.inject_invoke_failure(ResultCode::STORAGE_NO_SPACE);
        let err = client.delete("k").unwrap_err();
        assert!(matches!(err, ClientError::Backend { command: Command::Delete, .. }));
    }

    #[test]
    fn sessions_balanced_on_every_branch() {
        let (client, tee) = client();

        client.put("k", b"v").unwrap(); // success
        client.get("k").unwrap(); // found
        client.get("missing").unwrap(); // not found
        client.delete("missing").unwrap(); // not found
        tee.inject_invoke_failure(ResultCode::GENERIC);
        let _ = client.get("k"); // fatal
        let _ = client.put("k", b"v"); // fatal
        let _ = client.delete("k"); // fatal

        let stats = tee.stats();
        assert_eq!(stats.sessions_opened, 7);
        assert_eq!(stats.sessions_closed, 7);
        assert_eq!(stats.contexts_initialized, 7);
        assert_eq!(stats.contexts_finalized, 7);
        assert_eq!(stats.invocations(), 7);
    }

    #[test]
    fn configured_service_identity_is_used() {
        let other = "8aaaf200-2450-11e4-abe2-0002a5d5c51b".parse().unwrap();
        let tee = InMemoryTee::new();
        let config = ClientConfig {
            ta_uuid: other,
            ..ClientConfig::default()
        };
        let client = ObjectStoreClient::with_config(tee.clone(), &config);
        let err = client.get("k").unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::ITEM_NOT_FOUND));
        assert!(matches!(err, ClientError::Session(_)));
    }

    #[test]
    fn file_backed_client_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            store_dir: dir.path().to_path_buf(),
            ..ClientConfig::default()
        };
        ObjectStoreClient::file_backed(&config)
            .put("thing/GG_CA", b"-----BEGIN CERTIFICATE-----")
            .unwrap();

        let payload = ObjectStoreClient::file_backed(&config)
            .get("thing/GG_CA")
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(payload.text_bytes(), b"-----BEGIN CERTIFICATE-----");
    }

    #[test]
    fn namespaced_keys_work_end_to_end() {
        let (client, _) = client();
        let key = ObjectKey::namespaced(&"stack".repeat(20), "certs/certificate.private.key").unwrap();
        let payload = ObjectPayload::new(b"private".to_vec()).unwrap();
        client.put_object(&key, &payload).unwrap();
        assert!(client.get_object(&key).unwrap().is_found());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn put_then_get_returns_zero_padded_payload(
            key in "[a-zA-Z0-9/_.-]{1,64}",
            data in proptest::collection::vec(any::<u8>(), 0..=OBJECT_CAPACITY),
        ) {
            let (client, tee) = client();
            client.put(&key, &data).unwrap();
            let payload = client.get(&key).unwrap().found().unwrap();
            prop_assert_eq!(payload.len(), OBJECT_CAPACITY);
            prop_assert_eq!(&payload.as_bytes()[..data.len()], &data[..]);
            prop_assert!(payload.as_bytes()[data.len()..].iter().all(|&b| b == 0));
            prop_assert!(tee.stats().is_balanced());
        }

        #[test]
        fn deleted_keys_read_as_not_found(key in "[a-z0-9-]{1,64}") {
            let (client, _) = client();
            client.put(&key, b"v").unwrap();
            prop_assert_eq!(client.delete(&key).unwrap(), Outcome::Success);
            prop_assert_eq!(client.get(&key).unwrap(), ReadOutcome::NotFound);
        }
    }
}
