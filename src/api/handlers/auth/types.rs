//! Request and response shapes for the auth surface.
//!
//! Request fields are optional at the wire level; handlers enforce presence
//! and answer with the exact message each client expects.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Client-side role hint, echoed back untouched.
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub company_id: String,
    pub company_name: String,
    pub temp_password: bool,
    pub company_setup_completed: bool,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginData {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AdminUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub data: AdminLoginData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeTempPasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanySetupRequest {
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub industry: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub total_employees: Option<i32>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub casual_leave_days: Option<i32>,
    pub sick_leave_days: Option<i32>,
    pub personal_leave_days: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub registration_token: Option<String>,
    pub full_name: Option<String>,
    pub personal_email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddHrRequest {
    pub full_name: Option<String>,
    pub personal_email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionedAccount {
    pub id: String,
    pub login_email: String,
    pub personal_email: String,
    pub full_name: String,
    pub role: String,
    pub company_id: String,
    pub company_name: String,
    pub temp_password: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionResponse {
    pub success: bool,
    pub message: String,
    pub data: ProvisionedAccount,
    /// Set when the credential email could not be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HrSummary {
    pub id: String,
    pub full_name: String,
    pub personal_email: String,
    pub login_email: String,
    pub phone: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HrListResponse {
    pub success: bool,
    pub data: Vec<HrSummary>,
}
