use crate::account;
use crate::event;
use crate::RequirePermissionContext;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use campus_events_shared::account::Role;
use campus_events_shared::event::ApprovalStatus;
use campus_events_shared::insights::InsightsResult;

/// Aggregate counters for a staff dashboard, always scoped to the
/// requesting staff member's department.
pub async fn compute_stats(
    ctx: RequirePermissionContext,
) -> (StatusCode, Json<serde_json::Value>) {
    if !ctx.valid(&[Role::Staff]).unwrap_or_default() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "permission denied" })),
        );
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

    let mut result = InsightsResult {
        total_students: account::INSTANCE
            .inner()
            .read()
            .iter()
            .filter(|a| {
                let ar = a.read();
                ar.attributes.role == Role::Student && ar.attributes.department == department
            })
            .count() as u64,
        ..Default::default()
    };

    for e in event::INSTANCE.events.read().iter() {
        let er = e.read();

        if er.department != department {
            continue;
        }

        result.total_requests += 1;
        match er.status {
            ApprovalStatus::Approved => result.approved += 1,
            ApprovalStatus::Rejected => result.rejected += 1,
            ApprovalStatus::Pending => result.pending += 1,
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::to_value(result).unwrap_or_default()),
    )
}
