use super::Error;
use super::FeedbackEntry;
use crate::RequirePermissionContext;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::info;

use campus_events_shared::account::Role;
use campus_events_shared::feedback::handle::*;

fn err_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    (err.to_status_code(), Json(json!({ "error": err.to_string() })))
}

/// Append an immutable feedback entry.
pub async fn submit_feedback(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<FeedbackDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !ctx.valid(&[Role::Student]).unwrap_or_default() {
        return err_response(Error::PermissionDenied);
    }

    if !(1..=5).contains(&descriptor.rating) {
        return err_response(Error::RatingOutOfRange(descriptor.rating));
    }

    let username = match ctx.metadata() {
        Ok(metadata) => metadata.username,
        Err(err) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    let created_at = Utc::now();

    let entry = FeedbackEntry {
        id: {
            let mut hasher = DefaultHasher::new();
            username.hash(&mut hasher);
            descriptor.message.hash(&mut hasher);
            created_at.hash(&mut hasher);
            hasher.finish()
        },
        username,
        rating: descriptor.rating,
        message: descriptor.message,
        created_at,
    };

    super::save_entry(&entry);

    let id = entry.id;
    super::INSTANCE.push(entry);

    info!("Feedback {} submitted by account {}", id, ctx.account_id);

    (StatusCode::OK, Json(json!({ "feedback_id": id })))
}

/// List the whole feedback history for staff, newest first.
pub async fn list_feedback(
    ctx: RequirePermissionContext,
) -> (StatusCode, Json<serde_json::Value>) {
    if !ctx.valid(&[Role::Staff]).unwrap_or_default() {
        return err_response(Error::PermissionDenied);
    }

    let mut entries: Vec<FeedbackEntry> = super::INSTANCE.entries.read().clone();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    (
        StatusCode::OK,
        Json(json!({ "entries": serde_json::to_value(entries).unwrap_or_default() })),
    )
}
