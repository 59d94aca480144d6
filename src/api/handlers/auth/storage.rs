//! SQL storage for principals and registration-token consumption.
//!
//! One `principals` table backs every role tier; the `role` column is the
//! discriminator. Lookups join the owning company so handlers never issue a
//! second query for tenant display fields.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::credentials::hash_registration_token;
use crate::api::error::ApiError;
use crate::api::handlers::is_unique_violation;

const PRINCIPAL_SELECT: &str = r"
    SELECT p.id, p.company_id, c.name AS company_name, c.code AS company_code,
           p.role, p.full_name, p.login_email, p.phone, p.password,
           p.temp_password_set, p.profile_completed, p.company_setup_completed,
           p.designation, p.department_id, p.is_active, p.avatar_url, p.timezone
    FROM principals p
    JOIN companies c ON c.id = p.company_id";

/// A principal with its company display fields, the unit every auth flow
/// works on.
#[derive(Clone, Debug)]
pub(crate) struct PrincipalRow {
    id: Uuid,
    company_id: Uuid,
    company_name: String,
    company_code: String,
    role: String,
    full_name: String,
    login_email: String,
    phone: Option<String>,
    credential: String,
    temp_password_set: bool,
    profile_completed: bool,
    company_setup_completed: bool,
    designation: Option<String>,
    department_id: Option<Uuid>,
    is_active: bool,
    avatar_url: Option<String>,
    timezone: Option<String>,
}

impl PrincipalRow {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub(crate) fn company_name(&self) -> &str {
        &self.company_name
    }

    pub(crate) fn company_code(&self) -> &str {
        &self.company_code
    }

    pub(crate) fn role(&self) -> &str {
        &self.role
    }

    pub(crate) fn full_name(&self) -> &str {
        &self.full_name
    }

    pub(crate) fn login_email(&self) -> &str {
        &self.login_email
    }

    pub(crate) fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Stored credential value: an Argon2 PHC string or a legacy plaintext.
    pub(crate) fn credential(&self) -> &str {
        &self.credential
    }

    pub(crate) fn temp_password_set(&self) -> bool {
        self.temp_password_set
    }

    pub(crate) fn profile_completed(&self) -> bool {
        self.profile_completed
    }

    pub(crate) fn company_setup_completed(&self) -> bool {
        self.company_setup_completed
    }

    pub(crate) fn designation(&self) -> Option<&str> {
        self.designation.as_deref()
    }

    pub(crate) fn department_id(&self) -> Option<Uuid> {
        self.department_id
    }

    pub(crate) fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub(crate) fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}

fn principal_from_join_row(row: &PgRow) -> PrincipalRow {
    PrincipalRow {
        id: row.get("id"),
        company_id: row.get("company_id"),
        company_name: row.get("company_name"),
        company_code: row.get("company_code"),
        role: row.get("role"),
        full_name: row.get("full_name"),
        login_email: row.get("login_email"),
        phone: row.get("phone"),
        credential: row.get("password"),
        temp_password_set: row.get("temp_password_set"),
        profile_completed: row.get("profile_completed"),
        company_setup_completed: row.get("company_setup_completed"),
        designation: row.get("designation"),
        department_id: row.get("department_id"),
        is_active: row.get("is_active"),
        avatar_url: row.get("avatar_url"),
        timezone: row.get("timezone"),
    }
}

pub(crate) async fn find_principal_by_login_email(
    pool: &PgPool,
    login_email: &str,
) -> Result<Option<PrincipalRow>, sqlx::Error> {
    let query = format!("{PRINCIPAL_SELECT} WHERE p.login_email = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );

    sqlx::query(&query)
        .bind(login_email)
        .map(|row: PgRow| principal_from_join_row(&row))
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(crate) async fn find_principal_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PrincipalRow>, sqlx::Error> {
    let query = format!("{PRINCIPAL_SELECT} WHERE p.id = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );

    sqlx::query(&query)
        .bind(id)
        .map(|row: PgRow| principal_from_join_row(&row))
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(crate) struct NewPrincipal<'a> {
    pub company_id: Uuid,
    pub company_name: &'a str,
    pub company_code: &'a str,
    pub role: &'a str,
    pub full_name: &'a str,
    pub personal_email: &'a str,
    pub login_email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
}

const PRINCIPAL_INSERT: &str = r"
    INSERT INTO principals
        (company_id, role, full_name, personal_email, login_email, phone, password)
    VALUES ($1, $2, $3, $4, $5, $6, $7)";

fn created_principal(new: &NewPrincipal<'_>, id: Uuid) -> PrincipalRow {
    PrincipalRow {
        id,
        company_id: new.company_id,
        company_name: new.company_name.to_string(),
        company_code: new.company_code.to_string(),
        role: new.role.to_string(),
        full_name: new.full_name.to_string(),
        login_email: new.login_email.to_string(),
        phone: new.phone.map(ToString::to_string),
        credential: new.password_hash.to_string(),
        temp_password_set: true,
        profile_completed: false,
        company_setup_completed: false,
        designation: None,
        department_id: None,
        is_active: true,
        avatar_url: None,
        timezone: None,
    }
}

/// Get-or-create keyed on the derived login email. The unique constraint is
/// the arbiter under concurrent duplicate calls; the loser receives the row
/// the winner created.
pub(crate) async fn get_or_create_principal(
    pool: &PgPool,
    new: &NewPrincipal<'_>,
) -> Result<(PrincipalRow, bool), sqlx::Error> {
    for _ in 0..2 {
        let query = format!("{PRINCIPAL_INSERT} RETURNING id");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let inserted = sqlx::query(&query)
            .bind(new.company_id)
            .bind(new.role)
            .bind(new.full_name)
            .bind(new.personal_email)
            .bind(new.login_email)
            .bind(new.phone)
            .bind(new.password_hash)
            .map(|row: PgRow| row.get::<Uuid, _>("id"))
            .fetch_one(pool)
            .instrument(span)
            .await;

        match inserted {
            Ok(id) => return Ok((created_principal(new, id), true)),
            Err(err) if is_unique_violation(&err) => {
                if let Some(existing) = find_principal_by_login_email(pool, new.login_email).await?
                {
                    return Ok((existing, false));
                }
                // Conflicting row was removed between insert and lookup.
            }
            Err(err) => return Err(err),
        }
    }

    Err(sqlx::Error::RowNotFound)
}

/// Transactional variant. `ON CONFLICT DO NOTHING` keeps the surrounding
/// transaction alive when the row already exists.
pub(crate) async fn get_or_create_principal_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewPrincipal<'_>,
) -> Result<(PrincipalRow, bool), sqlx::Error> {
    let query = format!("{PRINCIPAL_INSERT} ON CONFLICT (login_email) DO NOTHING RETURNING id");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = %query
    );
    let inserted = sqlx::query(&query)
        .bind(new.company_id)
        .bind(new.role)
        .bind(new.full_name)
        .bind(new.personal_email)
        .bind(new.login_email)
        .bind(new.phone)
        .bind(new.password_hash)
        .map(|row: PgRow| row.get::<Uuid, _>("id"))
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await?;

    if let Some(id) = inserted {
        return Ok((created_principal(new, id), true));
    }

    let query = format!("{PRINCIPAL_SELECT} WHERE p.login_email = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let existing = sqlx::query(&query)
        .bind(new.login_email)
        .map(|row: PgRow| principal_from_join_row(&row))
        .fetch_one(&mut **tx)
        .instrument(span)
        .await?;

    Ok((existing, false))
}

/// Replace a legacy plaintext credential with its hash. Leaves every
/// lifecycle flag untouched.
pub(crate) async fn rehash_credential(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals SET password = $2, updated_at = NOW() WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

/// Rotate the credential. The only statement that clears `temp_password_set`.
pub(crate) async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals
          SET password = $2, temp_password_set = FALSE,
              password_changed_at = NOW(), updated_at = NOW()
          WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

pub(crate) async fn stamp_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    let query = r"UPDATE principals SET last_login_at = NOW() WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

/// Company row joined through a registration token, locked for consumption.
#[derive(Debug)]
pub(crate) struct TokenCompanyRow {
    company_id: Uuid,
    company_name: String,
    company_code: String,
}

impl TokenCompanyRow {
    pub(crate) fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub(crate) fn company_name(&self) -> &str {
        &self.company_name
    }

    pub(crate) fn company_code(&self) -> &str {
        &self.company_code
    }
}

/// Row-lock an unused, unexpired token so concurrent redeemers serialize.
/// Matches on the stored digest, callers pass the raw presented token.
pub(crate) async fn lock_valid_registration_token(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> Result<Option<TokenCompanyRow>, sqlx::Error> {
    let query = r"SELECT rt.company_id, c.name AS company_name, c.code AS company_code
          FROM registration_tokens rt
          JOIN companies c ON c.id = rt.company_id
          WHERE rt.token_hash = $1 AND rt.is_used = FALSE AND rt.expires_at > NOW()
          FOR UPDATE OF rt";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(hash_registration_token(token))
        .map(|row: PgRow| TokenCompanyRow {
            company_id: row.get("company_id"),
            company_name: row.get("company_name"),
            company_code: row.get("company_code"),
        })
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
}

/// Mark a token spent. `isValid` is false from here on, permanently.
pub(crate) async fn consume_registration_token(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
    used_by_email: &str,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE registration_tokens
          SET is_used = TRUE, used_at = NOW(), used_by_email = $2
          WHERE token_hash = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(hash_registration_token(token))
        .bind(used_by_email)
        .execute(&mut **tx)
        .instrument(span)
        .await?;
    Ok(())
}

pub(crate) async fn activate_company(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
) -> Result<(), sqlx::Error> {
    let query = r"UPDATE companies
          SET registration_status = 'active', updated_at = NOW()
          WHERE id = $1 AND registration_status = 'pending'";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(company_id)
        .execute(&mut **tx)
        .instrument(span)
        .await?;
    Ok(())
}

pub(crate) struct CompanySetupFields<'a> {
    pub company_name: Option<&'a str>,
    pub company_website: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub timezone: &'a str,
    pub currency: &'a str,
    pub total_employees: i32,
    pub working_hours_start: &'a str,
    pub working_hours_end: &'a str,
    pub casual_leave_days: i32,
    pub sick_leave_days: i32,
    pub personal_leave_days: i32,
}

/// Apply the one-time company setup. The `company_setup_completed = FALSE`
/// predicate is the write-once gate, racing callers see `AlreadyCompleted`
/// and the company row stays untouched.
pub(crate) async fn complete_company_setup(
    pool: &PgPool,
    principal_id: Uuid,
    company_id: Uuid,
    fields: &CompanySetupFields<'_>,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await.map_err(ApiError::Database)?;

    let query = r"UPDATE principals
          SET company_setup_completed = TRUE, setup_completed_at = NOW(),
              industry = $2, timezone = $3, currency = $4, total_employees = $5,
              working_hours_start = $6, working_hours_end = $7,
              casual_leave_days = $8, sick_leave_days = $9, personal_leave_days = $10,
              updated_at = NOW()
          WHERE id = $1 AND company_setup_completed = FALSE";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let updated = sqlx::query(query)
        .bind(principal_id)
        .bind(fields.industry)
        .bind(fields.timezone)
        .bind(fields.currency)
        .bind(fields.total_employees)
        .bind(fields.working_hours_start)
        .bind(fields.working_hours_end)
        .bind(fields.casual_leave_days)
        .bind(fields.sick_leave_days)
        .bind(fields.personal_leave_days)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .map_err(ApiError::Database)?;

    if updated.rows_affected() == 0 {
        let _ = tx.rollback().await;
        return Err(ApiError::AlreadyCompleted("Company setup already completed"));
    }

    let query = r"UPDATE companies
          SET name = COALESCE($2, name), website = COALESCE($3, website), updated_at = NOW()
          WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(company_id)
        .bind(fields.company_name)
        .bind(fields.company_website)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)
}

#[derive(Debug)]
pub(crate) struct RolePrincipalRow {
    id: Uuid,
    full_name: String,
    personal_email: String,
    login_email: String,
    phone: Option<String>,
    created_at: String,
}

impl RolePrincipalRow {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn full_name(&self) -> &str {
        &self.full_name
    }

    pub(crate) fn personal_email(&self) -> &str {
        &self.personal_email
    }

    pub(crate) fn login_email(&self) -> &str {
        &self.login_email
    }

    pub(crate) fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub(crate) fn created_at(&self) -> &str {
        &self.created_at
    }
}

pub(crate) async fn list_role_principals(
    pool: &PgPool,
    company_id: Uuid,
    role: &str,
) -> Result<Vec<RolePrincipalRow>, sqlx::Error> {
    let query = r#"SELECT id, full_name, personal_email, login_email, phone,
                  to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
           FROM principals
           WHERE company_id = $1 AND role = $2
           ORDER BY created_at"#;
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(company_id)
        .bind(role)
        .map(|row: PgRow| RolePrincipalRow {
            id: row.get("id"),
            full_name: row.get("full_name"),
            personal_email: row.get("personal_email"),
            login_email: row.get("login_email"),
            phone: row.get("phone"),
            created_at: row.get("created_at"),
        })
        .fetch_all(pool)
        .instrument(span)
        .await
}
