//! Privileged operations for instrumentation and bootstrap tooling.
//!
//! Nothing in here is needed to execute bytecode. Callers must guarantee that no thread
//! has an active frame for the method being changed: frames keep executing the code
//! they fetched, while pcs handed out afterwards refer to the new code.

use std::sync::Arc;

use log::warn;

use crate::{
    error::{Error, Result},
    runtime::Method,
};

/// Swaps the bytecode of `method` and returns the code it replaced.
///
/// Native and abstract methods are refused. The existing exception table is checked
/// against the new code length first, and the method is left untouched if any range no
/// longer fits.
pub fn replace_code(method: &Method, code: impl Into<Arc<[u8]>>) -> Result<Option<Arc<[u8]>>> {
    if method.is_bodiless() {
        return Err(Error::MalformedAttribute {
            attribute: Arc::from("Code"),
            message: format!("unexpected on a native or abstract method: {method}"),
        });
    }
    let code = code.into();
    method
        .exception_table()
        .validate(&method.to_string(), code.len())?;

    warn!("replacing code of {method} ({} bytes)", code.len());
    let previous = method.code_lock().write().replace(code);
    Ok(previous)
}
