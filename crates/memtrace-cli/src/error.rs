use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] memtrace_core::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed trace at line {line}: {reason}")]
    TraceFormat { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const TRACE_FORMAT_ERROR: i32 = 3;
    pub const CORE_FATAL: i32 = 4;
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => exit_code::INVALID_ARGUMENTS,
            Error::TraceFormat { .. } => exit_code::TRACE_FORMAT_ERROR,
            Error::Core(_) => exit_code::CORE_FATAL,
            Error::Io(_) => exit_code::GENERAL_ERROR,
        }
    }
}
