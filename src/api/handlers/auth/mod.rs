//! Admin-tier authentication, credential lifecycle, and onboarding.

pub(crate) mod credentials;
pub mod login;
pub mod onboarding;
pub mod password;
pub(crate) mod principal;
pub(crate) mod provision;
pub mod setup;
mod state;
pub(crate) mod storage;
pub(crate) mod tokens;
pub mod types;

pub use state::{AuthConfig, AuthState};

#[cfg(test)]
mod tests;
