//! Principal provisioning and invitation dispatch.
//!
//! Every role tier is provisioned through the same path; `RoleSpec` carries
//! the per-role differences (login mailbox, invitation template). Creation
//! is get-or-create on the derived login email, and the credential email is
//! dispatched only for rows this call actually created, after commit.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::credentials::{generate_temp_password, hash_password};
use super::state::AuthState;
use super::storage::{self, NewPrincipal, PrincipalRow};
use crate::api::email::EmailMessage;
use crate::api::error::ApiError;
use crate::api::handlers::companies::code::mailbox_code;

pub(crate) const ROLE_ADMIN: &str = "admin";
pub(crate) const ROLE_MANAGER: &str = "manager";
pub(crate) const ROLE_HR: &str = "hr";
pub(crate) const ROLE_EMPLOYEE: &str = "employee";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InvitationKind {
    AdminWelcome,
    ManagerInvite,
    HrInvite,
    EmployeeInvite,
}

pub(crate) struct RoleSpec {
    pub role: &'static str,
    pub mailbox: &'static str,
    pub invitation: InvitationKind,
}

pub(crate) const ROLE_SPECS: [RoleSpec; 4] = [
    RoleSpec {
        role: ROLE_ADMIN,
        mailbox: "admin",
        invitation: InvitationKind::AdminWelcome,
    },
    RoleSpec {
        role: ROLE_MANAGER,
        mailbox: "manager",
        invitation: InvitationKind::ManagerInvite,
    },
    RoleSpec {
        role: ROLE_HR,
        mailbox: "hr",
        invitation: InvitationKind::HrInvite,
    },
    RoleSpec {
        role: ROLE_EMPLOYEE,
        mailbox: "employee",
        invitation: InvitationKind::EmployeeInvite,
    },
];

pub(crate) const ADMIN_SPEC: &RoleSpec = &ROLE_SPECS[0];
pub(crate) const HR_SPEC: &RoleSpec = &ROLE_SPECS[2];

/// System login address for a role within a company:
/// `<mailbox>@<code lowercased, underscores stripped>.com`.
pub(crate) fn derive_login_email(company_code: &str, mailbox: &str) -> String {
    format!("{mailbox}@{}.com", mailbox_code(company_code))
}

pub(crate) const EMAIL_WARNING: &str = "Account created but credential email failed to send";

pub(crate) struct CompanyRef<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub code: &'a str,
}

pub(crate) struct ProvisionOutcome {
    pub principal: PrincipalRow,
    pub created: bool,
    pub email_warning: Option<&'static str>,
}

/// Get-or-create a principal with a fresh temporary credential.
///
/// A pre-existing row is returned as-is: its credential is not reissued and
/// no second invitation goes out.
pub(crate) async fn provision_principal(
    pool: &PgPool,
    state: &Arc<AuthState>,
    company: &CompanyRef<'_>,
    spec: &RoleSpec,
    full_name: &str,
    personal_email: &str,
    phone: Option<&str>,
) -> Result<ProvisionOutcome, ApiError> {
    let login_email = derive_login_email(company.code, spec.mailbox);
    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)
        .map_err(|err| ApiError::Internal(format!("failed to hash credential: {err}")))?;

    let new = NewPrincipal {
        company_id: company.id,
        company_name: company.name,
        company_code: company.code,
        role: spec.role,
        full_name,
        personal_email,
        login_email: &login_email,
        phone,
        password_hash: &password_hash,
    };

    let (principal, created) = storage::get_or_create_principal(pool, &new)
        .await
        .map_err(ApiError::Database)?;

    if !created {
        info!(
            login_email = %login_email,
            role = spec.role,
            "principal already provisioned, credential left untouched"
        );
        return Ok(ProvisionOutcome {
            principal,
            created,
            email_warning: None,
        });
    }

    let email_warning = dispatch_invitation(
        state,
        spec.invitation,
        personal_email,
        company.name,
        &login_email,
        &temp_password,
    )
    .await;

    Ok(ProvisionOutcome {
        principal,
        created,
        email_warning,
    })
}

/// Redeem a registration token and provision the company's first admin.
///
/// Token consumption, principal creation, and company activation commit as
/// one transaction; the welcome email goes out only after the commit.
pub(crate) async fn create_first_admin(
    pool: &PgPool,
    state: &Arc<AuthState>,
    registration_token: &str,
    full_name: &str,
    personal_email: &str,
    phone: Option<&str>,
) -> Result<ProvisionOutcome, ApiError> {
    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)
        .map_err(|err| ApiError::Internal(format!("failed to hash credential: {err}")))?;

    let mut tx = pool.begin().await.map_err(ApiError::Database)?;

    let Some(token_row) = storage::lock_valid_registration_token(&mut tx, registration_token)
        .await
        .map_err(ApiError::Database)?
    else {
        let _ = tx.rollback().await;
        return Err(ApiError::Validation("Invalid or expired registration token"));
    };

    let login_email = derive_login_email(token_row.company_code(), ADMIN_SPEC.mailbox);

    let new = NewPrincipal {
        company_id: token_row.company_id(),
        company_name: token_row.company_name(),
        company_code: token_row.company_code(),
        role: ROLE_ADMIN,
        full_name,
        personal_email,
        login_email: &login_email,
        phone,
        password_hash: &password_hash,
    };

    let (principal, created) = storage::get_or_create_principal_tx(&mut tx, &new)
        .await
        .map_err(ApiError::Database)?;

    storage::consume_registration_token(&mut tx, registration_token, &login_email)
        .await
        .map_err(ApiError::Database)?;
    storage::activate_company(&mut tx, token_row.company_id())
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)?;

    if !created {
        info!(
            login_email = %login_email,
            "admin already provisioned, token consumed without credential reissue"
        );
        return Ok(ProvisionOutcome {
            principal,
            created,
            email_warning: None,
        });
    }

    let email_warning = dispatch_invitation(
        state,
        ADMIN_SPEC.invitation,
        personal_email,
        token_row.company_name(),
        &login_email,
        &temp_password,
    )
    .await;

    Ok(ProvisionOutcome {
        principal,
        created,
        email_warning,
    })
}

async fn dispatch_invitation(
    state: &Arc<AuthState>,
    kind: InvitationKind,
    to_email: &str,
    company_name: &str,
    login_email: &str,
    temp_password: &str,
) -> Option<&'static str> {
    let message = invitation_message(kind, to_email, company_name, login_email, temp_password);

    match state.emailer().send(&message).await {
        Ok(()) => {
            info!(to_email = %message.to_email, subject = %message.subject, "credential email dispatched");
            None
        }
        Err(err) => {
            warn!(to_email = %message.to_email, "credential email failed: {err}");
            Some(EMAIL_WARNING)
        }
    }
}

pub(crate) fn invitation_message(
    kind: InvitationKind,
    to_email: &str,
    company_name: &str,
    login_email: &str,
    temp_password: &str,
) -> EmailMessage {
    let (subject, role_line) = match kind {
        InvitationKind::AdminWelcome => (
            format!("Dungi Admin Account Created - {company_name}"),
            "Your admin account is ready.",
        ),
        InvitationKind::ManagerInvite => (
            format!("Dungi Manager Account Created - {company_name}"),
            "You have been invited as a manager.",
        ),
        InvitationKind::HrInvite => (
            format!("Dungi HR Account Created - {company_name}"),
            "You have been invited to manage HR.",
        ),
        InvitationKind::EmployeeInvite => (
            format!("Dungi Employee Account Created - {company_name}"),
            "Your employee account is ready.",
        ),
    };

    let text_body = format!(
        "{role_line}\n\nLogin email: {login_email}\nTemporary password: {temp_password}\n\n\
         Sign in and change the temporary password before using your account.\n"
    );
    let html_body = format!(
        "<h2>{company_name}</h2><p>{role_line}</p>\
         <p><strong>Login email:</strong> {login_email}<br/>\
         <strong>Temporary password:</strong> {temp_password}</p>\
         <p>Sign in and change the temporary password before using your account.</p>"
    );

    EmailMessage {
        to_email: to_email.to_string(),
        subject,
        text_body,
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_login_email() {
        assert_eq!(derive_login_email("TECH_CORP", "admin"), "admin@techcorp.com");
        assert_eq!(derive_login_email("NOVA_9_LABS", "hr"), "hr@nova9labs.com");
        assert_eq!(derive_login_email("ACME", "employee"), "employee@acme.com");
    }

    #[test]
    fn test_role_specs_cover_every_tier() {
        let roles: Vec<&str> = ROLE_SPECS.iter().map(|spec| spec.role).collect();
        assert_eq!(roles, vec![ROLE_ADMIN, ROLE_MANAGER, ROLE_HR, ROLE_EMPLOYEE]);
        assert_eq!(ADMIN_SPEC.invitation, InvitationKind::AdminWelcome);
        assert_eq!(HR_SPEC.invitation, InvitationKind::HrInvite);
    }

    #[test]
    fn test_invitation_message_carries_credentials() {
        let message = invitation_message(
            InvitationKind::AdminWelcome,
            "jane@gmail.com",
            "Tech Corp",
            "admin@techcorp.com",
            "s3cretT3mp!",
        );
        assert_eq!(message.to_email, "jane@gmail.com");
        assert!(message.subject.contains("Tech Corp"));
        assert!(message.text_body.contains("admin@techcorp.com"));
        assert!(message.text_body.contains("s3cretT3mp!"));
        assert!(message.html_body.contains("admin@techcorp.com"));
    }

    #[test]
    fn test_invitation_subjects_differ_by_role() {
        let admin = invitation_message(InvitationKind::AdminWelcome, "a@b.com", "Acme", "x@y.com", "p");
        let hr = invitation_message(InvitationKind::HrInvite, "a@b.com", "Acme", "x@y.com", "p");
        assert_ne!(admin.subject, hr.subject);
    }
}
