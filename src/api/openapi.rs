use super::handlers::{admin, auth, companies, health, users};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/` or `OPTIONS /health`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut companies_tag = Tag::new("companies");
    companies_tag.description = Some("Tenant self-registration".to_string());

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Admin login, onboarding and setup wizards".to_string());

    let mut admin_tag = Tag::new("admin");
    admin_tag.description = Some("Admin settings".to_string());

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Employee-tier accounts".to_string());

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service health".to_string());

    // Tags must be set on the document up front: utoipa-axum 0.1 has no
    // mutable access to the router's OpenApi, and `.routes()` never touches tags.
    let mut openapi = cargo_openapi();
    openapi.tags = Some(vec![companies_tag, auth_tag, admin_tag, users_tag, health_tag]);

    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(health::health))
        .routes(routes!(companies::register::register))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::login::logout))
        .routes(routes!(auth::password::change_temp_password))
        .routes(routes!(auth::setup::company_setup))
        .routes(routes!(auth::onboarding::create_admin))
        .routes(routes!(auth::onboarding::add_hr))
        .routes(routes!(auth::onboarding::company_hrs))
        .routes(routes!(admin::get_profile, admin::update_profile))
        .routes(routes!(admin::upload_avatar))
        .routes(routes!(admin::get_notifications, admin::update_notifications))
        .routes(routes!(admin::change_password))
        .routes(routes!(admin::sessions))
        .routes(routes!(admin::logout_session))
        .routes(routes!(admin::update_appearance))
        .routes(routes!(users::login))
        .routes(routes!(users::change_password))
        .routes(routes!(users::complete_profile))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}
