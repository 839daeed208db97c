use std::sync::Arc;

/// Failures raised while turning decoded class-file data into runtime structures,
/// or while linking a native method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("malformed descriptor {descriptor:?}")]
    MalformedDescriptor { descriptor: String },

    #[error("malformed exception table entry #{index} in {method}: {reason}")]
    MalformedExceptionTable {
        method: String,
        index: usize,
        reason: ExceptionTableError,
    },

    #[error("no native binding registered for {class_name}.{name}{descriptor}")]
    MissingNativeBinding {
        class_name: Arc<str>,
        name: Arc<str>,
        descriptor: Arc<str>,
    },

    #[error("{class_name}.{name}{descriptor} is not a native method")]
    NotNativeMethod {
        class_name: Arc<str>,
        name: Arc<str>,
        descriptor: Arc<str>,
    },

    #[error("malformed {attribute} attribute: {message}")]
    MalformedAttribute { attribute: Arc<str>, message: String },

    #[error("constant pool entry #{index} is not a valid {expected}")]
    InvalidConstantPoolIndex { index: u16, expected: &'static str },

    #[error("constant pool entry #{index} is not valid modified UTF-8")]
    InvalidModifiedUtf8 { index: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExceptionTableError {
    #[error("start pc {start_pc} is not before end pc {end_pc}")]
    EmptyRange { start_pc: u16, end_pc: u16 },
    #[error("end pc {end_pc} is beyond code length {code_length}")]
    EndOutOfBounds { end_pc: u16, code_length: usize },
    #[error("handler pc {handler_pc} is beyond code length {code_length}")]
    HandlerOutOfBounds { handler_pc: u16, code_length: usize },
    #[error("catch type #{0} is not a class constant")]
    InvalidCatchType(u16),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
