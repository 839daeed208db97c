mod attributes;
mod class;
mod constant_pool;
mod exception_table;
mod field;
pub mod instrument;
mod line_number;
mod member;
mod method;
pub mod native;
mod value;

pub use attributes::LineNumberTableItem;
pub(crate) use attributes::{AttributeInfo, CodeAttribute, ExceptionTableItem, parse_attributes};
pub use class::*;
pub use constant_pool::*;
pub use exception_table::*;
pub use field::*;
pub use line_number::*;
pub use member::*;
pub use method::*;
pub use native::{NATIVE_METHODS, NativeRegistry, register_natives};
pub use value::*;
