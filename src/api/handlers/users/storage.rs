//! Profile completion storage for employee-tier principals.

use sqlx::PgPool;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::api::error::ApiError;

pub(crate) struct ProfileFields<'a> {
    pub full_name: &'a str,
    pub designation: &'a str,
    pub department_id: Option<Uuid>,
    pub phone: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
    pub pincode: Option<&'a str>,
    pub marital_status: Option<&'a str>,
    pub bio: Option<&'a str>,
}

/// Apply the one-time profile completion.
///
/// The `profile_completed = FALSE` predicate is the replay guard: a second
/// call changes nothing and reports `AlreadyCompleted`. Optional fields keep
/// their stored value when absent; the department binding is written as
/// resolved, including `NULL` on a lookup miss.
pub(crate) async fn complete_profile(
    pool: &PgPool,
    principal_id: Uuid,
    fields: &ProfileFields<'_>,
) -> Result<(), ApiError> {
    let query = r"UPDATE principals
          SET full_name = $2, designation = $3, department_id = $4,
              phone = COALESCE($5, phone), gender = COALESCE($6, gender),
              date_of_birth = COALESCE($7, date_of_birth),
              address = COALESCE($8, address), city = COALESCE($9, city),
              state = COALESCE($10, state), country = COALESCE($11, country),
              pincode = COALESCE($12, pincode),
              marital_status = COALESCE($13, marital_status),
              bio = COALESCE($14, bio),
              profile_completed = TRUE, profile_completed_at = NOW(), updated_at = NOW()
          WHERE id = $1 AND profile_completed = FALSE";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let updated = sqlx::query(query)
        .bind(principal_id)
        .bind(fields.full_name)
        .bind(fields.designation)
        .bind(fields.department_id)
        .bind(fields.phone)
        .bind(fields.gender)
        .bind(fields.date_of_birth)
        .bind(fields.address)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.country)
        .bind(fields.pincode)
        .bind(fields.marital_status)
        .bind(fields.bio)
        .execute(pool)
        .instrument(span)
        .await
        .map_err(ApiError::Database)?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::AlreadyCompleted("Profile already completed"));
    }

    Ok(())
}
