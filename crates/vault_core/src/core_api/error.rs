use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    EmptyFile,
    WrongSchema,
    NoStores,
    UnknownStore,
    UnknownAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn empty_file() -> Self {
        Self::new(CoreErrorCode::EmptyFile, "The CSV file contains no rows.")
    }

    pub fn wrong_schema() -> Self {
        Self::new(
            CoreErrorCode::WrongSchema,
            "The CSV file is missing one of the required columns: Id, Hash, Tag, Notes.",
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
