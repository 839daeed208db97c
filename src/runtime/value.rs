use std::sync::Arc;

use crate::runtime::Class;

pub struct NativeEnv {
    pub args: Vec<NativeVariable>,
    pub class: Arc<Class>,
}

impl NativeEnv {
    pub fn arg(&self, index: usize) -> NativeResult<&NativeVariable> {
        self.args.get(index).ok_or_else(|| {
            Exception::new_vm_msg(
                ILLEGAL_ARGUMENT_EXCEPTION,
                &format!("missing argument #{index}"),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeVariable {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Reference(u32),
}

macro_rules! native_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> NativeResult<$ty> {
            match self {
                NativeVariable::$variant(v) => Ok(*v),
                other => Err(Exception::new_vm_msg(
                    ILLEGAL_ARGUMENT_EXCEPTION,
                    &format!(concat!(stringify!($name), ": invalid type {:?}"), other),
                )),
            }
        }
    };
}

impl NativeVariable {
    native_getter!(get_boolean, Boolean, bool);
    native_getter!(get_byte, Byte, i8);
    native_getter!(get_char, Char, u16);
    native_getter!(get_short, Short, i16);
    native_getter!(get_int, Int, i32);
    native_getter!(get_long, Long, i64);
    native_getter!(get_float, Float, f32);
    native_getter!(get_double, Double, f64);
    native_getter!(get_ref, Reference, u32);
}

const ILLEGAL_ARGUMENT_EXCEPTION: &str = "java/lang/IllegalArgumentException";

/// A Java exception raised by native code.
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    VmException {
        exception_type: Arc<str>,
        message: String,
    },
    UserException(u32),
}

impl Exception {
    pub fn new_vm(exception_type: &str) -> Self {
        Exception::VmException {
            exception_type: Arc::from(exception_type),
            message: Default::default(),
        }
    }

    pub fn new_vm_msg(exception_type: &str, message: &str) -> Self {
        Exception::VmException {
            exception_type: Arc::from(exception_type),
            message: message.to_string(),
        }
    }

    pub fn new(exception: u32) -> Self {
        Exception::UserException(exception)
    }
}

pub type NativeResult<T> = ::std::result::Result<T, Exception>;
