use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProfileData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProfileResponse {
    pub success: bool,
    pub data: AdminProfileData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatedProfileData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub data: UpdatedProfileData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarData {
    pub avatar_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub success: bool,
    pub message: String,
    pub data: AvatarData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub sms_notifications: bool,
    pub leave_approvals: bool,
    pub task_assignments: bool,
    pub payroll_updates: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationsRequest {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub leave_approvals: Option<bool>,
    pub task_assignments: Option<bool>,
    pub payroll_updates: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: NotificationSettings,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    pub id: String,
    pub browser: String,
    pub device: String,
    pub location: String,
    pub ip_address: String,
    pub last_active: String,
    pub is_current: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionsResponse {
    pub success: bool,
    pub data: Vec<SessionInfo>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppearanceRequest {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppearanceData {
    pub theme: String,
    pub language: String,
    pub timezone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppearanceResponse {
    pub success: bool,
    pub message: String,
    pub data: AppearanceData,
}
