use sqlx::PgPool;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Applies the profile edits the settings page allows.
///
/// A NULL bind keeps the stored value; an empty string overwrites it, which
/// is how the client clears the phone field.
pub(crate) async fn update_admin_profile(
    pool: &PgPool,
    id: Uuid,
    full_name: Option<&str>,
    phone: Option<&str>,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals
          SET full_name = COALESCE($2, full_name),
              phone = COALESCE($3, phone),
              updated_at = NOW()
          WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

pub(crate) async fn set_avatar_url(
    pool: &PgPool,
    id: Uuid,
    avatar_url: &str,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals SET avatar_url = $2, updated_at = NOW() WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(avatar_url)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

pub(crate) async fn update_timezone(
    pool: &PgPool,
    id: Uuid,
    timezone: &str,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals SET timezone = $2, updated_at = NOW() WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(timezone)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::provision::{provision_principal, CompanyRef, ADMIN_SPEC};
    use crate::api::handlers::auth::storage::find_principal_by_id;
    use crate::api::handlers::auth::{AuthConfig, AuthState};
    use crate::api::handlers::companies::code::derive_code;
    use crate::api::handlers::companies::storage::{register_company, NewCompany};
    use crate::api::handlers::test_db::{unique, TestDb};
    use anyhow::Result;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_profile_edits_round_trip() -> Result<()> {
        let Ok(db) = TestDb::new().await else {
            return Ok(());
        };

        let state = Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:3000".to_string()),
            secrecy::SecretString::from("admin-storage-secret"),
            Arc::new(LogEmailSender),
        ));

        let name = unique("Settings Co");
        let code = derive_code(&name).expect("code");
        let company = register_company(
            &db.pool,
            &NewCompany {
                name: &name,
                code: &code,
                email: "contact@example.com",
                phone: None,
                website: None,
                address: None,
                city: None,
                state: None,
                country: None,
                pincode: None,
                timezone: "Asia/Kolkata",
                currency: "INR",
            },
            604_800,
        )
        .await
        .expect("register");

        let company_ref = CompanyRef {
            id: company.id(),
            name: &name,
            code: company.code(),
        };
        let outcome = provision_principal(
            &db.pool,
            &state,
            &company_ref,
            ADMIN_SPEC,
            "Asha Rao",
            "asha@example.com",
            Some("+91 98765 43210"),
        )
        .await
        .expect("provision admin");
        let admin = outcome.principal;

        update_admin_profile(&db.pool, admin.id(), Some("Asha R. Rao"), None).await?;
        let reloaded = find_principal_by_id(&db.pool, admin.id())
            .await?
            .expect("reload");
        assert_eq!(reloaded.full_name(), "Asha R. Rao");
        // Omitted phone stays untouched.
        assert_eq!(reloaded.phone(), Some("+91 98765 43210"));

        // An empty string clears it.
        update_admin_profile(&db.pool, admin.id(), None, Some("")).await?;
        let cleared = find_principal_by_id(&db.pool, admin.id())
            .await?
            .expect("reload");
        assert_eq!(cleared.phone(), Some(""));
        assert_eq!(cleared.full_name(), "Asha R. Rao");

        set_avatar_url(&db.pool, admin.id(), "/media/avatars/test.png").await?;
        update_timezone(&db.pool, admin.id(), "Europe/Berlin").await?;
        let finished = find_principal_by_id(&db.pool, admin.id())
            .await?
            .expect("reload");
        assert_eq!(finished.avatar_url(), Some("/media/avatars/test.png"));
        assert_eq!(finished.timezone(), Some("Europe/Berlin"));
        Ok(())
    }
}
