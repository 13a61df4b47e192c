use std::error::Error;
use std::fmt::{self, Display};

/// One-to-one with the reference interpreter's `error_code_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Syntax,
    IllegalQuantity,
    OutOfMemory,
    UndefStatement,
    UndefFunction,
    OutOfData,
    TypeMismatch,
    StringTooLong,
    FormulaTooComplex,
    CantContinue,
    DivisionByZero,
    SubscriptOutOfRange,
    RedimensionedArray,
    ReturnWithoutGosub,
    NextWithoutFor,
}

impl ErrorCode {
    fn default_message(self) -> &'static str {
        use ErrorCode::*;
        match self {
            Syntax => "SYNTAX ERROR",
            IllegalQuantity => "ILLEGAL QUANTITY ERROR",
            OutOfMemory => "OUT OF MEMORY ERROR",
            UndefStatement => "UNDEF'D STATEMENT ERROR",
            UndefFunction => "UNDEF'D FUNCTION ERROR",
            OutOfData => "OUT OF DATA ERROR",
            TypeMismatch => "TYPE MISMATCH ERROR",
            StringTooLong => "STRING TOO LONG ERROR",
            FormulaTooComplex => "FORMULA TOO COMPLEX ERROR",
            CantContinue => "CAN'T CONTINUE ERROR",
            DivisionByZero => "DIVISION BY ZERO ERROR",
            SubscriptOutOfRange => "SUBSCRIPT OUT OF RANGE ERROR",
            RedimensionedArray => "REDIMENSIONED ARRAY ERROR",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB ERROR",
            NextWithoutFor => "NEXT WITHOUT FOR ERROR",
        }
    }
}

/// A single latched interpreter error: a code plus the message that will actually be
/// displayed. `line` is filled in by the runner once it knows which program line was
/// executing; it stays `None` for errors raised against an immediate-mode line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicError {
    pub code: ErrorCode,
    pub message: String,
    pub line: Option<u16>,
}

impl BasicError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_owned(),
            code,
            line: None,
        }
    }

    pub fn with_line(mut self, line: u16) -> Self {
        self.line = Some(line);
        self
    }
}

impl Display for BasicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " IN {line}")?;
        }
        Ok(())
    }
}

impl Error for BasicError {}

pub type BasicResult<T> = Result<T, BasicError>;
