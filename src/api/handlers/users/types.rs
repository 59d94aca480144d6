//! Request and response shapes for the employee-tier surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub company_id: String,
    pub department_id: Option<String>,
    pub designation: Option<String>,
    pub temp_password: bool,
    pub profile_completed: bool,
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserLoginData {
    pub token: String,
    pub refresh_token: String,
    pub user: UserAccount,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserLoginResponse {
    pub success: bool,
    pub data: UserLoginData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangedUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub temp_password: bool,
    pub profile_completed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPasswordData {
    pub user: ChangedUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserChangePasswordResponse {
    pub success: bool,
    pub data: UserPasswordData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteProfileRequest {
    pub full_name: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub marital_status: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub company_id: String,
    pub department_id: Option<String>,
    pub designation: String,
    pub profile_completed: bool,
    pub temp_password: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileData {
    pub user: ProfileUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteProfileResponse {
    pub success: bool,
    pub data: ProfileData,
}
