//! End-to-end lifecycle tests, gated on `DUNGI_TEST_DSN`.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::credentials::hash_password;
use super::login::authenticate;
use super::provision::{self, CompanyRef, HR_SPEC};
use super::state::{AuthConfig, AuthState};
use super::storage::{self, CompanySetupFields};
use crate::api::email::{EmailMessage, EmailSender, SendFuture};
use crate::api::error::ApiError;
use crate::api::handlers::companies::code::derive_code;
use crate::api::handlers::companies::storage::{register_company, NewCompany, RegisteredCompany};
use crate::api::handlers::test_db::{unique, TestDb};
use anyhow::Result;

/// Captures outgoing mail so tests can read the temporary credential the
/// same way a recipient would.
#[derive(Default)]
struct RecordingEmailSender {
    messages: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    fn sent(&self) -> Vec<EmailMessage> {
        self.messages.lock().expect("messages lock").clone()
    }
}

impl EmailSender for RecordingEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move {
            self.messages.lock().expect("messages lock").push(message.clone());
            Ok(())
        })
    }
}

/// Always fails, for exercising the dispatch warning path.
struct FailingEmailSender;

impl EmailSender for FailingEmailSender {
    fn send<'a>(&'a self, _message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move { Err(anyhow::anyhow!("relay unreachable")) })
    }
}

fn auth_state(emailer: Arc<dyn EmailSender>) -> Arc<AuthState> {
    Arc::new(AuthState::new(
        AuthConfig::new("http://localhost:3000".to_string()),
        secrecy::SecretString::from("lifecycle-test-secret"),
        emailer,
    ))
}

async fn register(pool: &PgPool, name: &str, ttl: i64) -> RegisteredCompany {
    let code = derive_code(name).expect("code");
    let new = NewCompany {
        name,
        code: &code,
        email: "contact@example.com",
        phone: None,
        website: None,
        address: None,
        city: None,
        state: None,
        country: Some("India"),
        pincode: None,
        timezone: "Asia/Kolkata",
        currency: "INR",
    };
    register_company(pool, &new, ttl).await.expect("register company")
}

fn temp_password_from(message: &EmailMessage) -> String {
    message
        .text_body
        .lines()
        .find_map(|line| line.strip_prefix("Temporary password: "))
        .expect("temporary password line")
        .to_string()
}

async fn stored_credential(pool: &PgPool, id: Uuid) -> Result<String> {
    let value = sqlx::query(r"SELECT password FROM principals WHERE id = $1")
        .bind(id)
        .map(|row: PgRow| row.get::<String, _>("password"))
        .fetch_one(pool)
        .await?;
    Ok(value)
}

#[tokio::test]
async fn test_first_admin_lifecycle() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let emailer = Arc::new(RecordingEmailSender::default());
    let state = auth_state(emailer.clone());

    let name = unique("Tech Corp");
    let company = register(&db.pool, &name, 604_800).await;
    let token = company.registration_token().to_string();

    let outcome = provision::create_first_admin(
        &db.pool,
        &state,
        &token,
        "Jane Doe",
        "jane@gmail.com",
        Some("+91 98765 43210"),
    )
    .await
    .expect("create admin");

    assert!(outcome.created);
    assert!(outcome.email_warning.is_none());
    let expected_login = provision::derive_login_email(company.code(), "admin");
    assert_eq!(outcome.principal.login_email(), expected_login);
    assert!(outcome.principal.temp_password_set());
    assert!(!outcome.principal.company_setup_completed());

    // Redemption activates the company.
    let status = sqlx::query(r"SELECT registration_status FROM companies WHERE id = $1")
        .bind(company.id())
        .map(|row: PgRow| row.get::<String, _>("registration_status"))
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(status, "active");

    // The token is spent, permanently.
    let replay = provision::create_first_admin(
        &db.pool,
        &state,
        &token,
        "Mallory",
        "mallory@gmail.com",
        None,
    )
    .await;
    assert!(matches!(replay, Err(ApiError::Validation(_))));

    let sent = emailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, "jane@gmail.com");
    let temp_password = temp_password_from(&sent[0]);

    // Temporary credential signs in; flags report the pending rotation.
    let (principal, pair) = authenticate(&db.pool, &state, &expected_login, &temp_password)
        .await
        .expect("temp login");
    assert!(principal.temp_password_set());
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let bad = authenticate(&db.pool, &state, &expected_login, "WrongPass123!").await;
    assert!(matches!(bad, Err(ApiError::InvalidCredentials)));
    let unknown = authenticate(&db.pool, &state, "nobody@techcorp.com", &temp_password).await;
    assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));

    // Rotation clears the flag and retires the temporary secret.
    let new_hash = hash_password("NewPass123!").expect("hash");
    storage::update_password(&db.pool, principal.id(), &new_hash).await?;

    let reloaded = storage::find_principal_by_login_email(&db.pool, &expected_login)
        .await?
        .expect("reload");
    assert!(!reloaded.temp_password_set());

    let (rotated, _) = authenticate(&db.pool, &state, &expected_login, "NewPass123!")
        .await
        .expect("rotated login");
    assert!(!rotated.temp_password_set());

    let stale = authenticate(&db.pool, &state, &expected_login, &temp_password).await;
    assert!(matches!(stale, Err(ApiError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_provision_hr_idempotent() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let emailer = Arc::new(RecordingEmailSender::default());
    let state = auth_state(emailer.clone());

    let name = unique("People First");
    let company = register(&db.pool, &name, 604_800).await;
    let company_ref = CompanyRef {
        id: company.id(),
        name: &name,
        code: company.code(),
    };

    let first = provision::provision_principal(
        &db.pool,
        &state,
        &company_ref,
        HR_SPEC,
        "Asha Rao",
        "asha@gmail.com",
        None,
    )
    .await
    .expect("first provision");
    assert!(first.created);

    let second = provision::provision_principal(
        &db.pool,
        &state,
        &company_ref,
        HR_SPEC,
        "Asha Rao",
        "asha@gmail.com",
        None,
    )
    .await
    .expect("second provision");
    assert!(!second.created);
    assert_eq!(second.principal.id(), first.principal.id());

    // One row, one invitation.
    let count = sqlx::query(r"SELECT COUNT(*) AS n FROM principals WHERE company_id = $1 AND role = 'hr'")
        .bind(company.id())
        .map(|row: PgRow| row.get::<i64, _>("n"))
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(count, 1);
    assert_eq!(emailer.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_expired_token_rejected() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state(Arc::new(RecordingEmailSender::default()));
    let name = unique("Late Riser");
    let company = register(&db.pool, &name, -60).await;

    let result = provision::create_first_admin(
        &db.pool,
        &state,
        company.registration_token(),
        "Jane Doe",
        "jane@gmail.com",
        None,
    )
    .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_token_redemption_single_winner() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state(Arc::new(RecordingEmailSender::default()));
    let name = unique("Race Condition Co");
    let company = register(&db.pool, &name, 604_800).await;
    let token = company.registration_token();

    let (first, second) = tokio::join!(
        provision::create_first_admin(&db.pool, &state, token, "Jane", "jane@gmail.com", None),
        provision::create_first_admin(&db.pool, &state, token, "John", "john@gmail.com", None),
    );

    let successes = usize::from(first.is_ok()) + usize::from(second.is_ok());
    assert_eq!(successes, 1);

    let count = sqlx::query(r"SELECT COUNT(*) AS n FROM principals WHERE company_id = $1 AND role = 'admin'")
        .bind(company.id())
        .map(|row: PgRow| row.get::<i64, _>("n"))
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn test_legacy_credential_upgrade() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state(Arc::new(RecordingEmailSender::default()));
    let name = unique("Old Guard");
    let company = register(&db.pool, &name, 604_800).await;

    let outcome = provision::create_first_admin(
        &db.pool,
        &state,
        company.registration_token(),
        "Op Provisioned",
        "ops@gmail.com",
        None,
    )
    .await
    .expect("create admin");
    let principal_id = outcome.principal.id();
    let login_email = outcome.principal.login_email().to_string();

    // Back-office rows predate hashing.
    sqlx::query(r"UPDATE principals SET password = $2 WHERE id = $1")
        .bind(principal_id)
        .bind("PlainSecret99!")
        .execute(&db.pool)
        .await?;

    // First plaintext login succeeds and upgrades the stored value.
    authenticate(&db.pool, &state, &login_email, "PlainSecret99!")
        .await
        .expect("legacy login");
    let upgraded = stored_credential(&db.pool, principal_id).await?;
    assert!(upgraded.starts_with("$argon2"));

    // Second login with the same plaintext now verifies against the hash.
    authenticate(&db.pool, &state, &login_email, "PlainSecret99!")
        .await
        .expect("post-upgrade login");
    let settled = stored_credential(&db.pool, principal_id).await?;
    assert_eq!(upgraded, settled);

    // The stored hash itself is not a usable password.
    let hash_as_password = authenticate(&db.pool, &state, &login_email, &settled).await;
    assert!(matches!(hash_as_password, Err(ApiError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_company_setup_write_once() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state(Arc::new(RecordingEmailSender::default()));
    let name = unique("Setup Once");
    let company = register(&db.pool, &name, 604_800).await;

    let outcome = provision::create_first_admin(
        &db.pool,
        &state,
        company.registration_token(),
        "Jane Doe",
        "jane@gmail.com",
        None,
    )
    .await
    .expect("create admin");
    let admin = outcome.principal;

    let fields = CompanySetupFields {
        company_name: Some("Setup Once Renamed"),
        company_website: Some("https://setup.example.com"),
        industry: Some("Software"),
        timezone: "IST",
        currency: "INR",
        total_employees: 25,
        working_hours_start: "09:00",
        working_hours_end: "18:00",
        casual_leave_days: 12,
        sick_leave_days: 6,
        personal_leave_days: 2,
    };
    storage::complete_company_setup(&db.pool, admin.id(), admin.company_id(), &fields)
        .await
        .expect("first setup");

    let reloaded = storage::find_principal_by_login_email(&db.pool, admin.login_email())
        .await?
        .expect("reload");
    assert!(reloaded.company_setup_completed());
    assert_eq!(reloaded.company_name(), "Setup Once Renamed");

    // Replay fails and leaves company fields untouched.
    let replay_fields = CompanySetupFields {
        company_name: Some("Should Not Apply"),
        ..fields
    };
    let replay =
        storage::complete_company_setup(&db.pool, admin.id(), admin.company_id(), &replay_fields)
            .await;
    assert!(matches!(replay, Err(ApiError::AlreadyCompleted(_))));

    let company_name = sqlx::query(r"SELECT name FROM companies WHERE id = $1")
        .bind(admin.company_id())
        .map(|row: PgRow| row.get::<String, _>("name"))
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(company_name, "Setup Once Renamed");
    Ok(())
}

#[tokio::test]
async fn test_dispatch_failure_reported_as_warning() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state(Arc::new(FailingEmailSender));
    let name = unique("Dead Letter");
    let company = register(&db.pool, &name, 604_800).await;

    let outcome = provision::create_first_admin(
        &db.pool,
        &state,
        company.registration_token(),
        "Jane Doe",
        "jane@gmail.com",
        None,
    )
    .await
    .expect("create admin");

    // The principal exists even though the email never left.
    assert!(outcome.created);
    assert_eq!(outcome.email_warning, Some(provision::EMAIL_WARNING));
    let found = storage::find_principal_by_login_email(&db.pool, outcome.principal.login_email())
        .await?;
    assert!(found.is_some());
    Ok(())
}
