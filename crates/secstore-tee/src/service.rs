//! Emulation of the secure storage trusted service's command contract.
//!
//! Used by the simulated drivers only. The behaviour reproduced here is what
//! the host can observe: parameter type checks, object id limits, result
//! codes, and output size reporting.

use std::collections::HashMap;

use secstore_types::{Command, ResultCode, MAX_KEY_LEN};

use crate::error::{TeeError, TeeResult};
use crate::operation::{Operation, Param, ParamType};

/// Largest object id the service accepts.
pub const MAX_OBJECT_ID_LEN: usize = MAX_KEY_LEN;

const READ_PARAMS: [ParamType; 4] = [
    ParamType::MemrefTempInput,
    ParamType::MemrefTempOutput,
    ParamType::None,
    ParamType::None,
];

const WRITE_PARAMS: [ParamType; 4] = [
    ParamType::MemrefTempInput,
    ParamType::MemrefTempInput,
    ParamType::None,
    ParamType::None,
];

const DELETE_PARAMS: [ParamType; 4] = [
    ParamType::MemrefTempInput,
    ParamType::None,
    ParamType::None,
    ParamType::None,
];

/// Persistent object storage behind the emulated service.
pub trait ObjectTable {
    fn load(&self, id: &[u8]) -> TeeResult<Option<Vec<u8>>>;

    /// Create or overwrite the object.
    fn store(&mut self, id: &[u8], data: &[u8]) -> TeeResult<()>;

    /// Returns `true` if the object existed.
    fn remove(&mut self, id: &[u8]) -> TeeResult<bool>;
}

impl ObjectTable for HashMap<Vec<u8>, Vec<u8>> {
    fn load(&self, id: &[u8]) -> TeeResult<Option<Vec<u8>>> {
        Ok(self.get(id).cloned())
    }

    fn store(&mut self, id: &[u8], data: &[u8]) -> TeeResult<()> {
        self.insert(id.to_vec(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, id: &[u8]) -> TeeResult<bool> {
        Ok(HashMap::remove(self, id).is_some())
    }
}

/// Handle one command against `table`.
pub fn dispatch<T>(table: &mut T, command: u32, op: &mut Operation<'_>) -> TeeResult<()>
where
    T: ObjectTable + ?Sized,
{
    let Some(command) = Command::from_id(command) else {
        return Err(bad_parameters());
    };
    match command {
        Command::ReadRaw => read_raw(table, op),
        Command::WriteRaw => write_raw(table, op),
        Command::Delete => delete(table, op),
    }
}

fn read_raw<T: ObjectTable + ?Sized>(table: &T, op: &mut Operation<'_>) -> TeeResult<()> {
    expect_params(op, READ_PARAMS)?;
    let id = object_id(op)?.to_vec();
    let data = table
        .load(&id)?
        .ok_or_else(|| TeeError::trusted_app(ResultCode::ITEM_NOT_FOUND))?;

    let Some(Param::TempOutput { buffer, size }) = op.param_mut(1) else {
        return Err(bad_parameters());
    };
    if data.len() > buffer.len() {
        *size = data.len();
        return Err(TeeError::trusted_app(ResultCode::SHORT_BUFFER));
    }
    buffer[..data.len()].copy_from_slice(&data);
    *size = data.len();
    Ok(())
}

fn write_raw<T: ObjectTable + ?Sized>(table: &mut T, op: &mut Operation<'_>) -> TeeResult<()> {
    expect_params(op, WRITE_PARAMS)?;
    let id = object_id(op)?;
    let data = op.input(1).ok_or_else(bad_parameters)?;
    table.store(id, data)
}

fn delete<T: ObjectTable + ?Sized>(table: &mut T, op: &mut Operation<'_>) -> TeeResult<()> {
    expect_params(op, DELETE_PARAMS)?;
    let id = object_id(op)?;
    if table.remove(id)? {
        Ok(())
    } else {
        Err(TeeError::trusted_app(ResultCode::ITEM_NOT_FOUND))
    }
}

fn expect_params(op: &Operation<'_>, expected: [ParamType; 4]) -> TeeResult<()> {
    if op.param_types() == expected {
        Ok(())
    } else {
        Err(bad_parameters())
    }
}

fn object_id<'o>(op: &'o Operation<'_>) -> TeeResult<&'o [u8]> {
    let id = op.input(0).ok_or_else(bad_parameters)?;
    if id.is_empty() || id.len() > MAX_OBJECT_ID_LEN {
        return Err(bad_parameters());
    }
    Ok(id)
}

fn bad_parameters() -> TeeError {
    TeeError::trusted_app(ResultCode::BAD_PARAMETERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secstore_types::ErrorOrigin;

    fn table() -> HashMap<Vec<u8>, Vec<u8>> {
        HashMap::new()
    }

    fn write(table: &mut HashMap<Vec<u8>, Vec<u8>>, id: &[u8], data: &[u8]) -> TeeResult<()> {
        let mut op = Operation::new(Param::input(id), Param::input(data), Param::None, Param::None);
        dispatch(table, Command::WriteRaw.id(), &mut op)
    }

    #[test]
    fn write_then_read() {
        let mut table = table();
        write(&mut table, b"k", b"value").unwrap();

        let mut buf = [0u8; 16];
        let mut op = Operation::new(Param::input(b"k"), Param::output(&mut buf), Param::None, Param::None);
        dispatch(&mut table, Command::ReadRaw.id(), &mut op).unwrap();
        assert_eq!(op.output_size(1), Some(5));
        drop(op);
        assert_eq!(&buf[..5], b"value");
    }

    #[test]
    fn read_missing_is_item_not_found() {
        let mut table = table();
        let mut buf = [0u8; 4];
        let mut op = Operation::new(Param::input(b"k"), Param::output(&mut buf), Param::None, Param::None);
        let err = dispatch(&mut table, Command::ReadRaw.id(), &mut op).unwrap_err();
        assert_eq!(err.code, ResultCode::ITEM_NOT_FOUND);
        assert_eq!(err.origin, ErrorOrigin::TrustedApp);
    }

    #[test]
    fn read_into_small_buffer_reports_required_size() {
        let mut table = table();
        write(&mut table, b"k", &[7u8; 10]).unwrap();
        let mut buf = [0u8; 4];
        let mut op = Operation::new(Param::input(b"k"), Param::output(&mut buf), Param::None, Param::None);
        let err = dispatch(&mut table, Command::ReadRaw.id(), &mut op).unwrap_err();
        assert_eq!(err.code, ResultCode::SHORT_BUFFER);
        assert_eq!(op.output_size(1), Some(10));
    }

    #[test]
    fn write_overwrites() {
        let mut table = table();
        write(&mut table, b"k", b"one").unwrap();
        write(&mut table, b"k", b"two").unwrap();
        assert_eq!(table.get(&b"k"[..]).map(Vec::as_slice), Some(&b"two"[..]));
    }

    #[test]
    fn delete_present_then_missing() {
        let mut table = table();
        write(&mut table, b"k", b"v").unwrap();
        let mut op = Operation::new(Param::input(b"k"), Param::None, Param::None, Param::None);
        dispatch(&mut table, Command::Delete.id(), &mut op).unwrap();
        let err = dispatch(&mut table, Command::Delete.id(), &mut op).unwrap_err();
        assert_eq!(err.code, ResultCode::ITEM_NOT_FOUND);
    }

    #[test]
    fn wrong_param_types_rejected() {
        let mut table = table();
        let mut op = Operation::new(Param::input(b"k"), Param::None, Param::None, Param::None);
        let err = dispatch(&mut table, Command::WriteRaw.id(), &mut op).unwrap_err();
        assert_eq!(err.code, ResultCode::BAD_PARAMETERS);
    }

    #[test]
    fn overlong_id_rejected() {
        let mut table = table();
        let id = vec![b'k'; MAX_OBJECT_ID_LEN + 1];
        let err = write(&mut table, &id, b"v").unwrap_err();
        assert_eq!(err.code, ResultCode::BAD_PARAMETERS);
        assert!(table.is_empty());
    }

    #[test]
    fn unknown_command_rejected() {
        let mut table = table();
        let mut op = Operation::default();
        let err = dispatch(&mut table, 42, &mut op).unwrap_err();
        assert_eq!(err.code, ResultCode::BAD_PARAMETERS);
    }
}
