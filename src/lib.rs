pub mod class;
pub mod consts;
pub mod descriptor;
pub mod error;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_utils;
