//! HTTP handlers grouped by surface.
//!
//! `companies` covers tenant self-registration, `auth` the admin-tier login
//! and onboarding flows, `admin` the dashboard settings endpoints, and
//! `users` the employee-tier account endpoints. Handlers validate input,
//! delegate to their `storage` modules, and map failures through `ApiError`.

pub mod admin;
pub mod auth;
pub mod companies;
pub mod health;
pub mod root;
pub mod users;

#[cfg(test)]
pub(crate) mod test_db;

use regex::Regex;

/// Normalize an email for lookups and uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check on an already-normalized email.
pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Postgres unique violation, the arbiter for every get-or-create path.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
        assert_eq!(normalize_email("admin@techcorp.com"), "admin@techcorp.com");
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("jane@example.com"));
        assert!(valid_email("admin@techcorp.com"));
        assert!(!valid_email("jane@example"));
        assert!(!valid_email("jane example@test.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email(""));
    }

    #[derive(Debug)]
    struct FakeDbError(&'static str);

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "constraint violation ({})", self.0)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_is_unique_violation() {
        let unique = sqlx::Error::Database(Box::new(FakeDbError("23505")));
        let foreign_key = sqlx::Error::Database(Box::new(FakeDbError("23503")));
        assert!(is_unique_violation(&unique));
        assert!(!is_unique_violation(&foreign_key));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
