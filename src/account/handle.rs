use super::Account;
use super::Error;
use super::UserAttributes;
use crate::RequirePermissionContext;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::json;
use sha256::digest;
use tracing::info;

use campus_events_shared::account::handle::*;
use campus_events_shared::account::Role;

/// Password rule of the portal: at least 8 characters with
/// upper, lower, digit and special ones.
fn password_acceptable(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric())
}

fn err_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    (err.to_status_code(), Json(json!({ "error": err.to_string() })))
}

/// Register an account with a role of student or staff.
///
/// Staff registrations must carry the configured verification code,
/// administrator accounts are never self-registered.
pub async fn register_account(
    Json(descriptor): Json<RegisterDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    for (value, field) in [
        (&descriptor.username, "username"),
        (&descriptor.first_name, "first_name"),
        (&descriptor.last_name, "last_name"),
    ] {
        if value.trim().is_empty() {
            return err_response(Error::FieldEmpty(field));
        }
    }

    if !password_acceptable(&descriptor.password) {
        return err_response(Error::PasswordTooWeak);
    }

    match descriptor.role {
        Role::Admin => return err_response(Error::PermissionDenied),
        Role::Staff => {
            if descriptor.staff_code.as_deref() != Some(crate::config::INSTANCE.staff_code.as_str()) {
                return err_response(Error::StaffCodeIncorrect);
            }
        }
        Role::Student => (),
    }

    {
        let b = super::INSTANCE.inner().read();
        if b.iter()
            .any(|a| a.read().attributes.username == descriptor.username)
        {
            return err_response(Error::UsernameConflict);
        }
        if b.iter().any(|a| a.read().attributes.email == descriptor.email) {
            return err_response(Error::EmailConflict);
        }
    }

    // ids stay hashed from the registration username across renames,
    // so a vacated username keeps its id reserved
    if super::INSTANCE
        .index()
        .contains_key(&super::id_of(&descriptor.username))
    {
        return err_response(Error::UsernameReserved);
    }

    let account = Account::new(UserAttributes {
        username: descriptor.username,
        email: descriptor.email,
        first_name: descriptor.first_name,
        last_name: descriptor.last_name,
        phone: descriptor.phone,
        department: descriptor.department,
        role: descriptor.role,
        registration_time: Utc::now(),
        password_sha: digest(descriptor.password),
        token_expiration_time: 5,
    });

    let id = account.id;
    let len = super::INSTANCE.inner().read().len();

    super::INSTANCE.index().insert(id, len);
    account.save();
    super::INSTANCE.inner().write().push(RwLock::new(account));

    info!("Account registered (id: {})", id);

    (StatusCode::OK, Json(json!({ "account_id": id })))
}

/// Login to an account with username and password.
pub async fn login_account(
    Json(descriptor): Json<AccountLoginDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Some(account) = super::INSTANCE
        .inner()
        .read()
        .iter()
        .find(|a| a.read().attributes.username == descriptor.username)
    {
        let mut aw = account.write();
        let token = aw.login(&descriptor.password);

        aw.save();

        return match token {
            Ok(t) => {
                info!(
                    "Account {} (id: {}) logged in",
                    aw.attributes.username, aw.id
                );
                (
                    StatusCode::OK,
                    Json(json!({
                        "account_id": aw.id,
                        "token": t,
                        "user": aw.metadata(),
                    })),
                )
            }

            Err(err) => err_response(err),
        };
    }

    // unknown username maps to the same error as a wrong password
    err_response(Error::UsernameOrPasswordIncorrect)
}

fn gone_response(id: u64) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": super::ManagerError::NotFound(id).to_string() })),
    )
}

/// Logout from an account.
pub async fn logout_account(
    ctx: RequirePermissionContext,
) -> (StatusCode, Json<serde_json::Value>) {
    let b = super::INSTANCE.inner().read();
    // the account may have been removed since extraction
    let mut aw = match super::INSTANCE
        .index()
        .get(&ctx.account_id)
        .and_then(|e| b.get(*e.value()))
    {
        Some(a) => a.write(),
        None => return gone_response(ctx.account_id),
    };

    match aw.logout(&ctx.token) {
        Ok(_) => {
            aw.save();
            info!(
                "Account {} (id: {}) logged out",
                aw.attributes.username, aw.id
            );
            (StatusCode::OK, Json(json!({})))
        }
        Err(err) => err_response(err),
    }
}

/// Get the caller's own account details.
pub async fn view_account(
    ctx: RequirePermissionContext,
) -> Result<Json<ViewAccountResult>, (StatusCode, Json<serde_json::Value>)> {
    let b = super::INSTANCE.inner().read();
    let a = match super::INSTANCE
        .index()
        .get(&ctx.account_id)
        .and_then(|e| b.get(*e.value()))
    {
        Some(a) => a.read(),
        None => return Err(gone_response(ctx.account_id)),
    };

    Ok(Json(ViewAccountResult {
        id: a.id,
        metadata: a.metadata(),
        registration_time: a.attributes.registration_time,
    }))
}

/// Replace the caller's password after re-authenticating
/// with the current one.
pub async fn change_password(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<ChangePasswordDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    let b = super::INSTANCE.inner().read();
    let mut aw = match super::INSTANCE
        .index()
        .get(&ctx.account_id)
        .and_then(|e| b.get(*e.value()))
    {
        Some(a) => a.write(),
        None => return gone_response(ctx.account_id),
    };

    if digest(descriptor.old) != aw.attributes.password_sha {
        return err_response(Error::PasswordIncorrect);
    }

    if !password_acceptable(&descriptor.new) {
        return err_response(Error::PasswordTooWeak);
    }

    aw.attributes.password_sha = digest(descriptor.new);
    aw.save();

    info!(
        "Account {} (id: {}) changed its password",
        aw.attributes.username, aw.id
    );

    (StatusCode::OK, Json(json!({})))
}

/// Manage accounts for administrators.
pub mod manage {
    use super::err_response;
    use crate::account::{self, Account, Error, UserAttributes};
    use crate::RequirePermissionContext;
    use axum::http::StatusCode;
    use axum::Json;
    use chrono::Utc;
    use parking_lot::RwLock;
    use serde_json::json;
    use sha256::digest;
    use tracing::info;

    use campus_events_shared::account::handle::manage::*;
    use campus_events_shared::account::handle::ViewAccountResult;
    use campus_events_shared::account::Role;

    /// Let administrators create accounts directly.
    pub async fn make_account(
        ctx: RequirePermissionContext,
        Json(descriptor): Json<MakeAccountDescriptor>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if !ctx.valid(&[Role::Admin]).unwrap_or_default() {
            return err_response(Error::PermissionDenied);
        }

        for (value, field) in [
            (&descriptor.username, "username"),
            (&descriptor.first_name, "first_name"),
            (&descriptor.last_name, "last_name"),
        ] {
            if value.trim().is_empty() {
                return err_response(Error::FieldEmpty(field));
            }
        }

        let password = match descriptor.password {
            Some(value) if value.is_empty() => return err_response(Error::FieldEmpty("password")),
            Some(value) => value,
            None => crate::config::INSTANCE.default_password.clone(),
        };

        {
            let b = account::INSTANCE.inner().read();
            if b.iter()
                .any(|a| a.read().attributes.username == descriptor.username)
            {
                return err_response(Error::UsernameConflict);
            }
            if b.iter().any(|a| a.read().attributes.email == descriptor.email) {
                return err_response(Error::EmailConflict);
            }
        }

        if account::INSTANCE
            .index()
            .contains_key(&account::id_of(&descriptor.username))
        {
            return err_response(Error::UsernameReserved);
        }

        let account = Account::new(UserAttributes {
            username: descriptor.username,
            email: descriptor.email,
            first_name: descriptor.first_name,
            last_name: descriptor.last_name,
            phone: descriptor.phone,
            department: descriptor.department,
            role: descriptor.role,
            registration_time: Utc::now(),
            password_sha: digest(password),
            token_expiration_time: 5,
        });

        let id = account.id;
        let mut b = account::INSTANCE.inner().write();

        account::INSTANCE.index().insert(id, b.len());
        account.save();

        info!(
            "Account {} (id: {}) created by administrator {}",
            account.attributes.username, id, ctx.account_id
        );

        b.push(RwLock::new(account));

        (StatusCode::OK, Json(json!({ "account_id": id })))
    }

    /// List every account of the directory.
    pub async fn list_accounts(
        ctx: RequirePermissionContext,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if !ctx.valid(&[Role::Admin]).unwrap_or_default() {
            return err_response(Error::PermissionDenied);
        }

        let mut accounts = Vec::new();
        for a in account::INSTANCE.inner().read().iter() {
            let ar = a.read();
            accounts.push(ViewAccountResult {
                id: ar.id,
                metadata: ar.metadata(),
                registration_time: ar.attributes.registration_time,
            });
        }

        (
            StatusCode::OK,
            Json(json!({ "accounts": serde_json::to_value(accounts).unwrap_or_default() })),
        )
    }

    /// Modify role or credentials of an account from admin side.
    pub async fn modify_account(
        ctx: RequirePermissionContext,
        Json(descriptor): Json<AccountModifyDescriptor>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if !ctx.valid(&[Role::Admin]).unwrap_or_default() {
            return err_response(Error::PermissionDenied);
        }

        let b = account::INSTANCE.inner().read();

        // uniqueness has to be checked before locking the target
        for variant in descriptor.variants.iter() {
            if let AccountModifyVariant::Username(name) = variant {
                if name.trim().is_empty() {
                    return err_response(Error::FieldEmpty("username"));
                }
                if b.iter().any(|a| {
                    let ar = a.read();
                    ar.attributes.username == *name && ar.id != descriptor.account_id
                }) {
                    return err_response(Error::UsernameConflict);
                }
            }
        }

        let mut a = b
            .get(
                if let Some(e) = account::INSTANCE.index().get(&descriptor.account_id) {
                    *e.value()
                } else {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "target account not found" })),
                    );
                },
            )
            .unwrap()
            .write();

        for variant in descriptor.variants {
            if let Err(err) = apply_account_modify_variant(variant, &mut a) {
                return err_response(err);
            }
        }

        a.save();

        info!(
            "Account {} (id: {}) modified by administrator {}",
            a.attributes.username, a.id, ctx.account_id
        );

        (StatusCode::OK, Json(json!({})))
    }

    fn apply_account_modify_variant(mt: AccountModifyVariant, account: &mut Account) -> Result<(), Error> {
        match mt {
            AccountModifyVariant::Password(password) => {
                if password.is_empty() {
                    return Err(Error::FieldEmpty("password"));
                }
                account.attributes.password_sha = digest(password);
            }
            AccountModifyVariant::Role(role) => account.attributes.role = role,
            AccountModifyVariant::Username(username) => account.attributes.username = username,
        }

        Ok(())
    }

    /// Delete an account from admin side.
    ///
    /// Administrator accounts are protected and always refused.
    pub async fn delete_account(
        ctx: RequirePermissionContext,
        Json(descriptor): Json<DeleteAccountDescriptor>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if !ctx.valid(&[Role::Admin]).unwrap_or_default() {
            return err_response(Error::PermissionDenied);
        }

        {
            let b = account::INSTANCE.inner().read();
            let a = b.get(
                if let Some(e) = account::INSTANCE.index().get(&descriptor.account_id) {
                    *e.value()
                } else {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "target account not found" })),
                    );
                },
            );

            if a.unwrap().read().attributes.role == Role::Admin {
                return err_response(Error::ProtectedAccount);
            }
        }

        account::INSTANCE.remove(descriptor.account_id);

        info!(
            "Account {} deleted by administrator {}",
            descriptor.account_id, ctx.account_id
        );

        (StatusCode::OK, Json(json!({})))
    }

    /// Let staff members delete student accounts of their own department.
    pub async fn delete_student(
        ctx: RequirePermissionContext,
        Json(descriptor): Json<DeleteStudentDescriptor>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if !ctx.valid(&[Role::Staff]).unwrap_or_default() {
            return err_response(Error::PermissionDenied);
        }

        let department = match ctx.metadata() {
            Ok(metadata) => metadata.department,
            Err(err) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": err.to_string() })),
                )
            }
        };

        {
            let b = account::INSTANCE.inner().read();
            let a = b.get(
                if let Some(e) = account::INSTANCE.index().get(&descriptor.student_id) {
                    *e.value()
                } else {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "target account not found" })),
                    );
                },
            );

            let ar = a.unwrap().read();

            if ar.attributes.role != Role::Student {
                return err_response(Error::NotAStudent);
            }

            if ar.attributes.department != department {
                return err_response(Error::DepartmentMismatch);
            }
        }

        account::INSTANCE.remove(descriptor.student_id);

        info!(
            "Student {} deleted by staff {}",
            descriptor.student_id, ctx.account_id
        );

        (StatusCode::OK, Json(json!({})))
    }
}
