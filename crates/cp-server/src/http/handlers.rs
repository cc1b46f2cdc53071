//! Request handlers. Each one parses its input, makes a single call on the
//! shared dispatcher and renders the outcome.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use cp_core::{
    Assignment, GroupId, Seats, SharedDispatcher, Snapshot, ValidationError, VehicleSpec,
};
use serde::{Deserialize, Serialize};

use super::response::{ApiError, ApiResponse};

/// Form fields accepted by the group endpoints.
///
/// Kept as raw strings so that missing and malformed values produce our own
/// validation errors instead of a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct GroupForm {
    pub gid: Option<String>,
    pub seats: Option<String>,
}

fn required<T>(field: &'static str, value: Option<&str>) -> Result<T, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::Missing { field })?
        .parse()
}

fn group_id(form: &GroupForm) -> Result<GroupId, ValidationError> {
    required("gid", form.gid.as_deref())
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub message: &'static str,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

pub async fn home() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, None)
}

/// Readiness plus counters. Fails with 500 if the engagement invariant is
/// broken.
pub async fn status(
    State(dispatcher): State<SharedDispatcher>,
) -> Result<Json<StatusReport>, ApiError> {
    dispatcher.verify()?;
    let snapshot = dispatcher.snapshot()?;
    Ok(Json(StatusReport {
        message: "OK",
        snapshot,
    }))
}

pub async fn load_cars(
    State(dispatcher): State<SharedDispatcher>,
    payload: Result<Json<Vec<VehicleSpec>>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let Json(specs) = payload?;
    let loaded = dispatcher.load_fleet(&specs)?;
    Ok(ApiResponse::new(
        StatusCode::ACCEPTED,
        Some(u64::try_from(loaded).unwrap_or(u64::MAX)),
    ))
}

pub async fn register_group(
    State(dispatcher): State<SharedDispatcher>,
) -> Result<ApiResponse, ApiError> {
    let group = dispatcher.register_group()?;
    Ok(ApiResponse::ok(group.get()))
}

pub async fn start_journey(
    State(dispatcher): State<SharedDispatcher>,
    form: Result<Form<GroupForm>, FormRejection>,
) -> Result<ApiResponse, ApiError> {
    let Form(form) = form?;
    let group = group_id(&form)?;
    let seats: Seats = required("seats", form.seats.as_deref())?;

    let started = dispatcher.start_journey(group, seats)?;
    Ok(ApiResponse::ok(started.journey.get()))
}

/// 200 with the vehicle id, or 204 while the group is still waiting.
pub async fn locate(
    State(dispatcher): State<SharedDispatcher>,
    form: Result<Form<GroupForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    let group = group_id(&form)?;

    match dispatcher.locate(group)? {
        Assignment::Assigned(vehicle) => Ok(ApiResponse::ok(vehicle.get()).into_response()),
        Assignment::Waiting => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn drop_off(
    State(dispatcher): State<SharedDispatcher>,
    form: Result<Form<GroupForm>, FormRejection>,
) -> Result<ApiResponse, ApiError> {
    let Form(form) = form?;
    let group = group_id(&form)?;

    dispatcher.drop_off(group)?;
    Ok(ApiResponse::new(StatusCode::OK, None))
}

pub async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::unknown_route(uri.path())
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(&method, uri.path())
}
