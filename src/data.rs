use crate::error::{BasicError, ErrorCode};
use crate::value::Value;

/// Instance-owned append-ordered DATA pool with a movable read cursor. Owned by the
/// interpreter rather than kept as a process-global list, so two interpreters never
/// share DATA state.
#[derive(Debug, Default)]
pub struct DataPool {
    entries: Vec<Value>,
    cursor: usize,
}

impl DataPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn push(&mut self, value: Value) {
        self.entries.push(value);
    }

    pub fn restore(&mut self) {
        self.cursor = 0;
    }

    pub fn read(&mut self) -> Result<Value, BasicError> {
        match self.entries.get(self.cursor) {
            Some(v) => {
                self.cursor += 1;
                Ok(v.clone())
            }
            None => Err(BasicError::new(ErrorCode::OutOfData)),
        }
    }
}
