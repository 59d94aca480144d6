//! # Dungi (Workforce Identity & Onboarding)
//!
//! `dungi` is the identity and onboarding backend for a multi-tenant HR
//! platform. It covers company self-registration, auto-provisioned admin
//! accounts, credential delivery by email, JWT login for the four role tiers
//! (admin, manager, hr, employee), forced temporary-password rotation, and
//! the first-time company/profile setup wizards.
//!
//! ## Tenant Model (Companies, Principals, Departments)
//!
//! Companies are the tenant boundary. Each company owns its principals and
//! departments.
//!
//! - **Company Codes:** Derived from the display name at registration,
//!   normalized to `UPPERCASE_WITH_UNDERSCORES` (`"Tech Corp"` -> `TECH_CORP`),
//!   globally unique, and immutable once assigned.
//! - **System Login Emails:** Principals sign in with a derived address,
//!   `role@<companycode>.com` (code lowercased, underscores stripped), unique
//!   across the whole system.
//! - **Soft Deactivation:** Companies are never hard-deleted; suspension flips
//!   `registration_status` only.
//!
//! ## Credential Lifecycle
//!
//! Provisioning generates a 16-character temporary secret, stores its Argon2
//! hash with `temp_password_set = true`, and emails the secret to the holder's
//! personal address. The first password change is the only path that clears
//! the flag. Login verifies the Argon2 hash first and falls back to exact
//! plaintext equality for legacy operator-provisioned rows, upgrading them to
//! a hash in place on the first successful match.
//!
//! ## Onboarding Gates
//!
//! Login responses carry `temp_password`, `profile_completed`, and (for
//! admins) `company_setup_completed` so clients can route users into the
//! setup wizards. Both wizard mutations are write-once: a second completion
//! attempt is rejected instead of silently overwriting.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
