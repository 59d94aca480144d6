use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Self-registration payload. Every field is optional at the wire level so
/// missing values surface as field errors instead of deserialization noise.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterCompanyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub code: String,
    pub email: String,
    pub registration_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterCompanyResponse {
    pub success: bool,
    pub data: CompanySummary,
}
