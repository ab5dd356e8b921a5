use secstore_types::ObjectPayload;

/// Non-fatal result of a write or delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The key did not exist. Expected, not an error.
    NotFound,
}

/// Non-fatal result of a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The object, cut to the length the trusted service reported.
    Found(ObjectPayload),
    /// The key did not exist.
    NotFound,
    /// The object is larger than the read buffer. `partial` is the buffer
    /// as the backend left it; `required` is the size it asked for.
    Truncated {
        partial: ObjectPayload,
        required: usize,
    },
}

impl ReadOutcome {
    /// The payload, if the read fully succeeded.
    pub fn found(self) -> Option<ObjectPayload> {
        match self {
            Self::Found(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
