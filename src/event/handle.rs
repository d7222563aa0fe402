use super::ApprovalStatus;
use super::Error;
use super::Event;
use super::EventMetadata;
use crate::event::cache::PosterCache;
use crate::RequirePermissionContext;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic;
use tracing::info;

use campus_events_shared::account::Role;
use campus_events_shared::event::handle::*;

fn err_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    (err.to_status_code(), Json(json!({ "error": err.to_string() })))
}

/// Read and store a poster image with its cache hash returned.
pub async fn cache_poster(
    (ctx, bytes): (RequirePermissionContext, Bytes),
) -> (StatusCode, Json<serde_json::Value>) {
    if !ctx.valid(&[Role::Student]).unwrap_or_default() {
        return err_response(Error::PermissionDenied);
    }

    let cache = match PosterCache::new(&bytes, ctx.account_id) {
        Ok(cache) => cache,
        Err(err) => return err_response(Error::Cache(err)),
    };
    let hash = cache.hash;

    super::cache::INSTANCE.push(cache);

    (StatusCode::OK, Json(json!({ "hash": hash })))
}

/// Get poster png bytes from target cache hash.
pub async fn get_poster(
    _ctx: RequirePermissionContext,
    Json(descriptor): Json<GetPosterDescriptor>,
) -> Result<Vec<u8>, (StatusCode, Json<serde_json::Value>)> {
    if let Some(_img) = super::cache::INSTANCE
        .caches
        .read()
        .iter()
        .find(|e| e.hash == descriptor.hash)
    {
        #[cfg(not(test))]
        return std::fs::File::open(format!("./data/posters/{}.png", _img.hash))
            .map(|mut file| {
                let mut vec = Vec::new();
                let _ = std::io::Read::read_to_end(&mut file, &mut vec);

                vec
            })
            .map_err(|_| err_response(Error::Cache(super::cache::Error::NotFound)));

        #[cfg(test)]
        unreachable!("test not covered");
    }

    Err(err_response(Error::Cache(super::cache::Error::NotFound)))
}

/// Submit a new event request, always starting as pending.
pub async fn new_event(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<EventDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !ctx.valid(&[Role::Student]).unwrap_or_default() {
        return err_response(Error::PermissionDenied);
    }

    let metadata = match ctx.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    if let Some(hash) = descriptor.poster {
        let cache = super::cache::INSTANCE.caches.read();
        match cache.iter().find(|e| e.hash == hash) {
            Some(c) => c.blocked.store(true, atomic::Ordering::Release),
            None => return err_response(Error::Cache(super::cache::Error::NotFound)),
        }
    }

    let event = Event {
        id: {
            let mut hasher = DefaultHasher::new();

            descriptor.title.hash(&mut hasher);
            descriptor.venue.hash(&mut hasher);
            descriptor.description.hash(&mut hasher);
            ctx.account_id.hash(&mut hasher);

            let id = hasher.finish();

            if super::INSTANCE.contains_id(id) {
                return err_response(Error::Conflict);
            }

            id
        },

        metadata: EventMetadata {
            title: descriptor.title,
            category: descriptor.category,
            start_date: descriptor.start_date,
            end_date: descriptor.end_date,
            start_time: descriptor.start_time,
            end_time: descriptor.end_time,
            venue: descriptor.venue,
            description: descriptor.description,
        },

        poster: descriptor.poster,
        publisher: ctx.account_id,
        department: metadata.department,
        status: ApprovalStatus::Pending,
        remark: None,
        approver: None,
        created_at: Utc::now(),
    };

    super::save_event(&event);

    let id = event.id;
    super::INSTANCE.push(event);

    info!("Event {} submitted by student {}", id, ctx.account_id);

    (StatusCode::OK, Json(json!({ "event_id": id })))
}

/// List events matching every given filter.
///
/// Staff and administrators see requests of all departments,
/// students only their own submissions and approved events.
pub async fn get_events(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<GetEventsDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    let metadata = match ctx.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    let mut events = Vec::new();

    for e in super::INSTANCE.events.read().iter() {
        let er = e.read();

        if descriptor.filters.iter().all(|f| matches_filter(f, &er))
            && visible_to(&er, metadata.role, ctx.account_id)
        {
            events.push(er.clone());
        }
    }

    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    (
        StatusCode::OK,
        Json(json!({ "events": serde_json::to_value(events).unwrap_or_default() })),
    )
}

fn matches_filter(filter: &GetEventsFilter, event: &Event) -> bool {
    match filter {
        GetEventsFilter::Department(department) => &event.department == department,
        GetEventsFilter::Keyword(keywords) => keywords.split_whitespace().all(|k| {
            event.metadata.title.contains(k) || event.metadata.description.contains(k)
        }),
        GetEventsFilter::Publisher(publisher) => &event.publisher == publisher,
        GetEventsFilter::Status(status) => &event.status == status,
    }
}

/// Reading is deliberately wider than acting: staff see events of
/// all departments while only being able to review their own.
fn visible_to(event: &Event, role: Role, account_id: u64) -> bool {
    match role {
        Role::Admin | Role::Staff => true,
        Role::Student => {
            event.publisher == account_id || event.status == ApprovalStatus::Approved
        }
    }
}

/// List approved events for public discovery, no account required.
pub async fn get_approved_events() -> (StatusCode, Json<serde_json::Value>) {
    let mut events = Vec::new();

    for e in super::INSTANCE.events.read().iter() {
        let er = e.read();
        if er.status == ApprovalStatus::Approved {
            events.push(er.clone());
        }
    }

    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    (
        StatusCode::OK,
        Json(json!({ "events": serde_json::to_value(events).unwrap_or_default() })),
    )
}

/// Approve, reject or reset an event request.
///
/// Only staff of the department the event was submitted to may
/// transition it, and repeating the current status is refused.
pub async fn review_event(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<ReviewEventDescriptor>,
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

    let events = super::INSTANCE.events.read();

    if let Some(e) = events.iter().find(|e| e.read().id == descriptor.event) {
        let mut ew = e.write();

        if ew.department != department {
            return err_response(Error::DepartmentMismatch);
        }

        match descriptor.variant {
            ReviewEventVariant::Approve(remark) => {
                if ew.status == ApprovalStatus::Approved {
                    return err_response(Error::Already(ApprovalStatus::Approved));
                }

                ew.status = ApprovalStatus::Approved;
                ew.approver = Some(ctx.account_id);
                ew.remark = remark;

                info!("Event {} approved by staff {}", ew.id, ctx.account_id);
            }

            ReviewEventVariant::Reject(remark) => {
                if ew.status == ApprovalStatus::Rejected {
                    return err_response(Error::Already(ApprovalStatus::Rejected));
                }

                ew.status = ApprovalStatus::Rejected;
                ew.remark = remark;

                info!("Event {} rejected by staff {}", ew.id, ctx.account_id);
            }

            ReviewEventVariant::Reset => {
                if ew.status == ApprovalStatus::Pending {
                    return err_response(Error::Already(ApprovalStatus::Pending));
                }

                ew.status = ApprovalStatus::Pending;
                ew.approver = None;

                info!("Event {} reset to pending by staff {}", ew.id, ctx.account_id);
            }
        }

        super::save_event(&ew);
        return (StatusCode::OK, Json(json!({})));
    }

    err_response(Error::NotFound)
}

/// Delete an event request.
///
/// Students may withdraw their own pending submissions, staff may
/// delete any event of their department regardless of status.
pub async fn delete_event(
    ctx: RequirePermissionContext,
    Json(descriptor): Json<DeleteEventDescriptor>,
) -> (StatusCode, Json<serde_json::Value>) {
    let metadata = match ctx.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    let mut events = super::INSTANCE.events.write();

    let i = match events.iter().position(|e| e.read().id == descriptor.event) {
        Some(i) => i,
        None => return err_response(Error::NotFound),
    };

    {
        let er = events[i].read();

        match metadata.role {
            Role::Student => {
                if er.publisher != ctx.account_id {
                    return err_response(Error::PermissionDenied);
                }
                if er.status != ApprovalStatus::Pending {
                    return err_response(Error::NotPending);
                }
            }
            Role::Staff => {
                if er.department != metadata.department {
                    return err_response(Error::DepartmentMismatch);
                }
            }
            Role::Admin => return err_response(Error::PermissionDenied),
        }

        super::remove_event(&er);
    }

    let event = events.remove(i).into_inner();

    // unblock the poster when no other event references it
    if let Some(hash) = event.poster {
        if !events.iter().any(|e| e.read().poster == Some(hash)) {
            for cache in super::cache::INSTANCE.caches.read().iter() {
                if cache.hash == hash {
                    cache.blocked.store(false, atomic::Ordering::Release);
                    break;
                }
            }
        }
    }

    info!("Event {} deleted by account {}", event.id, ctx.account_id);

    (StatusCode::OK, Json(json!({})))
}
