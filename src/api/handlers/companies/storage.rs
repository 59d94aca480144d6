//! SQL storage for companies, registration tokens, and departments.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::code::normalize_department_code;
use super::types::CompanySummary;
use crate::api::error::ApiError;
use crate::api::handlers::auth::credentials::{
    generate_registration_token, hash_registration_token,
};
use crate::api::handlers::is_unique_violation;

/// Row produced by a successful registration, token included so callers and
/// tests can hand it to first-admin provisioning.
#[derive(Debug)]
pub(crate) struct RegisteredCompany {
    id: Uuid,
    name: String,
    code: String,
    email: String,
    registration_status: String,
    registration_token: String,
}

impl RegisteredCompany {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn code(&self) -> &str {
        &self.code
    }

    pub(crate) fn registration_token(&self) -> &str {
        &self.registration_token
    }

    pub(crate) fn to_summary(&self) -> CompanySummary {
        CompanySummary {
            id: self.id.to_string(),
            name: self.name.clone(),
            code: self.code.clone(),
            email: self.email.clone(),
            registration_status: self.registration_status.clone(),
        }
    }
}

pub(crate) struct NewCompany<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
    pub pincode: Option<&'a str>,
    pub timezone: &'a str,
    pub currency: &'a str,
}

/// Insert the company and mint its one-time registration token in a single
/// transaction, so a pending company always has a token to redeem.
pub(crate) async fn register_company(
    pool: &PgPool,
    new: &NewCompany<'_>,
    token_ttl_seconds: i64,
) -> Result<RegisteredCompany, ApiError> {
    let mut tx = pool.begin().await.map_err(ApiError::Database)?;

    let query = r"INSERT INTO companies
            (name, code, email, phone, website, address, city, state, country, pincode, timezone, currency)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
          RETURNING id, registration_status";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let inserted = sqlx::query(query)
        .bind(new.name)
        .bind(new.code)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.website)
        .bind(new.address)
        .bind(new.city)
        .bind(new.state)
        .bind(new.country)
        .bind(new.pincode)
        .bind(new.timezone)
        .bind(new.currency)
        .map(|row: PgRow| (row.get::<Uuid, _>("id"), row.get::<String, _>("registration_status")))
        .fetch_one(&mut *tx)
        .instrument(span)
        .await;

    let (company_id, registration_status) = match inserted {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            let _ = tx.rollback().await;
            return Err(ApiError::Field(
                "name",
                "A company with this name is already registered.",
            ));
        }
        Err(err) => {
            let _ = tx.rollback().await;
            return Err(ApiError::Database(err));
        }
    };

    // Token space is 256 bits, collisions are not a practical concern.
    let token = generate_registration_token()
        .map_err(|err| ApiError::Internal(format!("failed to generate registration token: {err}")))?;

    let query = r"INSERT INTO registration_tokens (company_id, token_hash, expires_at)
          VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let stored = sqlx::query(query)
        .bind(company_id)
        .bind(hash_registration_token(&token))
        .bind(token_ttl_seconds)
        .execute(&mut *tx)
        .instrument(span)
        .await;

    if let Err(err) = stored {
        let _ = tx.rollback().await;
        return Err(ApiError::Database(err));
    }

    tx.commit().await.map_err(ApiError::Database)?;

    Ok(RegisteredCompany {
        id: company_id,
        name: new.name.to_string(),
        code: new.code.to_string(),
        email: new.email.to_string(),
        registration_status,
        registration_token: token,
    })
}

#[derive(Debug)]
pub(crate) struct DepartmentRow {
    id: Uuid,
    name: String,
    code: String,
}

impl DepartmentRow {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn code(&self) -> &str {
        &self.code
    }
}

pub(crate) async fn create_department(
    pool: &PgPool,
    company_id: Uuid,
    name: &str,
    code: &str,
    description: Option<&str>,
) -> Result<DepartmentRow, ApiError> {
    let Some(code) = normalize_department_code(code) else {
        return Err(ApiError::Validation(
            "Department code must be 3-4 alphanumeric characters",
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Department name is required"));
    }

    let query = r"INSERT INTO departments (company_id, name, code, description)
          VALUES ($1, $2, $3, $4)
          RETURNING id, name, code";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let inserted = sqlx::query(query)
        .bind(company_id)
        .bind(name)
        .bind(&code)
        .bind(description)
        .map(|row: PgRow| DepartmentRow {
            id: row.get("id"),
            name: row.get("name"),
            code: row.get("code"),
        })
        .fetch_one(pool)
        .instrument(span)
        .await;

    match inserted {
        Ok(department) => Ok(department),
        Err(err) if is_unique_violation(&err) => Err(ApiError::Validation(
            "Department code already exists for this company",
        )),
        Err(err) => Err(ApiError::Database(err)),
    }
}

/// Case-insensitive department lookup scoped to one company.
pub(crate) async fn find_department_id_by_name(
    pool: &PgPool,
    company_id: Uuid,
    name: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let query = r"SELECT id FROM departments
          WHERE company_id = $1 AND LOWER(name) = LOWER($2)
          LIMIT 1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(company_id)
        .bind(name.trim())
        .map(|row: PgRow| row.get::<Uuid, _>("id"))
        .fetch_optional(pool)
        .instrument(span)
        .await
}
