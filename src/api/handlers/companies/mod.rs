//! Tenant self-registration surface.

pub(crate) mod code;
pub mod register;
pub(crate) mod storage;
pub mod types;
