mod account;
pub(crate) mod config;
mod event;
mod feedback;
mod insights;

/// The module for unit testing, will only be availabled in dev env.
#[cfg(test)]
mod tests;

use account::ManagerError;
use axum::{
    async_trait,
    http::StatusCode,
    routing::{get, post},
};
use campus_events_shared::account::{Role, UserMetadata};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    account::INSTANCE.refresh_all();

    // use an external function here so this won't be in a proc macros
    // for betting coding experience, also for tests
    let app = router();

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config::INSTANCE.port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

/// Construct a router.
fn router() -> axum::Router {
    axum::Router::new()
        // account
        .route(
            "/api/account/register",
            post(account::handle::register_account),
        )
        .route("/api/account/login", post(account::handle::login_account))
        .route("/api/account/logout", post(account::handle::logout_account))
        .route("/api/account/view", post(account::handle::view_account))
        .route(
            "/api/account/change-password",
            post(account::handle::change_password),
        )
        // account management
        .route(
            "/api/account/manage/create",
            post(account::handle::manage::make_account),
        )
        .route(
            "/api/account/manage/list",
            post(account::handle::manage::list_accounts),
        )
        .route(
            "/api/account/manage/modify",
            post(account::handle::manage::modify_account),
        )
        .route(
            "/api/account/manage/delete",
            post(account::handle::manage::delete_account),
        )
        .route(
            "/api/account/manage/delete-student",
            post(account::handle::manage::delete_student),
        )
        // events
        .route("/api/event/upload-poster", post(event::handle::cache_poster))
        .route("/api/event/get-poster", post(event::handle::get_poster))
        .route("/api/event/create", post(event::handle::new_event))
        .route("/api/event/get", post(event::handle::get_events))
        .route(
            "/api/event/get-approved",
            get(event::handle::get_approved_events),
        )
        .route("/api/event/review", post(event::handle::review_event))
        .route("/api/event/delete", post(event::handle::delete_event))
        // feedback
        .route(
            "/api/feedback/submit",
            post(feedback::handle::submit_feedback),
        )
        .route("/api/feedback/list", post(feedback::handle::list_feedback))
        // insights
        .route("/api/insights", post(insights::compute_stats))
}

/// A context for checking the validation of action an account
/// performs with role requirements.
pub struct RequirePermissionContext {
    /// The access token of this account.
    pub token: String,
    /// The only id of this account.
    pub account_id: u64,
}

impl RequirePermissionContext {
    /// Indicates whether this context's token is usable and the account
    /// holds one of the target roles. An empty slice only checks the token.
    pub fn valid(&self, roles: &[Role]) -> Result<bool, ManagerError> {
        match account::INSTANCE
            .index()
            .get(&self.account_id)
            .map(|e| *e.value())
        {
            Some(index) => {
                account::INSTANCE.refresh(self.account_id);
                let b = account::INSTANCE.inner().read();
                let account = b.get(index).unwrap().read();
                Ok(account.tokens.token_usable(&self.token)
                    && (roles.is_empty() || roles.contains(&account.attributes.role)))
            }
            None => Err(ManagerError::NotFound(self.account_id)),
        }
    }

    /// Metadata of the account this context points to.
    pub fn metadata(&self) -> Result<UserMetadata, ManagerError> {
        match account::INSTANCE
            .index()
            .get(&self.account_id)
            .map(|e| *e.value())
        {
            Some(index) => {
                let b = account::INSTANCE.inner().read();
                let metadata = b.get(index).unwrap().read().metadata();
                Ok(metadata)
            }
            None => Err(ManagerError::NotFound(self.account_id)),
        }
    }
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequirePermissionContext {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let this = Self {
            token: if let Some(value) = parts.headers.get("Token") {
                value.to_str().unwrap_or_default().to_string()
            } else {
                return Err((
                    StatusCode::UNAUTHORIZED,
                    axum::Json(
                        serde_json::json!({ "error": "no valid token field found in headers"}),
                    ),
                ));
            },

            account_id: if let Some(value) = parts.headers.get("AccountId") {
                value
                    .to_str()
                    .unwrap_or_default()
                    .to_string()
                    .parse()
                    .unwrap_or_default()
            } else {
                return Err((
                    StatusCode::UNAUTHORIZED,
                    axum::Json(
                        serde_json::json!({ "error": "no valid account id field found in headers"}),
                    ),
                ));
            },
        };

        if !this.valid(&[]).unwrap_or_default() {
            return Err((
                StatusCode::FORBIDDEN,
                axum::Json(serde_json::json!({ "error": "permission denied" })),
            ));
        }

        Ok(this)
    }
}
