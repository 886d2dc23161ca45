use axum::{
    Json,
    extract::{Path, State},
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use esshub_db::models::{AttendanceRequest, Employee};
use esshub_services::dao::attendance_request::AttendanceRequestInput;
use esshub_services::notify::LifecycleEvent;
use serde::Deserialize;
use tracing::error;

use crate::{envelope::Envelope, extractors::auth::AuthUser, state::AppState};

const DOCUMENT_TYPE: &str = "Attendance Request";

#[derive(Debug, Deserialize)]
pub struct AttendanceRequestBody {
    /// Present for updates, absent for inserts.
    pub request_id: Option<String>,
    pub company: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub reason: Option<String>,
    #[serde(default)]
    pub half_day: bool,
    pub half_day_date: Option<String>,
    #[serde(default)]
    pub include_holidays: bool,
    pub shift: Option<String>,
    pub explanation: Option<String>,
}

/// Insert or update the caller's attendance request. Always answers 200;
/// the outcome code lives in the envelope.
pub async fn create_or_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AttendanceRequestBody>,
) -> Json<Envelope> {
    let employee = match employee_for(&state, &auth).await {
        Ok(employee) => employee,
        Err(envelope) => return envelope,
    };

    let mut missing = Vec::new();
    for (name, value) in [
        ("company", &body.company),
        ("from_date", &body.from_date),
        ("to_date", &body.to_date),
        ("reason", &body.reason),
    ] {
        if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        return Envelope::err(500, format!("Please provide: {}", missing.join(", ")));
    }

    let input = AttendanceRequestInput {
        company: body.company.unwrap_or_default(),
        from_date: body.from_date.unwrap_or_default(),
        to_date: body.to_date.unwrap_or_default(),
        reason: body.reason.unwrap_or_default(),
        half_day: body.half_day,
        half_day_date: body.half_day_date,
        include_holidays: body.include_holidays,
        shift: body.shift,
        explanation: body.explanation,
    };

    match body.request_id {
        Some(ref request_id) => update(&state, &employee, request_id, input).await,
        None => insert(&state, &employee, input).await,
    }
}

async fn insert(
    state: &AppState,
    employee: &Employee,
    input: AttendanceRequestInput,
) -> Json<Envelope> {
    let request = match state.attendance.create(employee, input).await {
        Ok(request) => request,
        Err(e) => {
            error!(%e, "Failed to create attendance request");
            return Envelope::err(500, "Unable to create attendance request");
        }
    };

    notify(state, &request, None, true).await;
    Envelope::ok("Attendance request created", to_json(&request))
}

async fn update(
    state: &AppState,
    employee: &Employee,
    request_id: &str,
    input: AttendanceRequestInput,
) -> Json<Envelope> {
    let Ok(id) = ObjectId::parse_str(request_id) else {
        return Envelope::err(404, "Attendance request not found");
    };
    let Some(employee_id) = employee.id else {
        return Envelope::err(404, "Attendance request not found");
    };

    let before = match state.attendance.find_owned(id, employee_id).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return Envelope::err(404, "Attendance request not found"),
        Err(e) => {
            error!(%e, "Failed to load attendance request");
            return Envelope::err(500, "Unable to update attendance request");
        }
    };

    if let Err(e) = state.attendance.update(id, input).await {
        error!(%e, "Failed to update attendance request");
        return Envelope::err(500, "Unable to update attendance request");
    }

    let updated = match state.attendance.base.find_by_id(id).await {
        Ok(updated) => updated,
        Err(e) => {
            error!(%e, "Failed to reload attendance request");
            return Envelope::err(500, "Unable to update attendance request");
        }
    };

    notify(state, &updated, Some(&before), false).await;
    Envelope::ok("Attendance request updated", to_json(&updated))
}

pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Json<Envelope> {
    let employee = match employee_for(&state, &auth).await {
        Ok(employee) => employee,
        Err(envelope) => return envelope,
    };
    let Some(employee_id) = employee.id else {
        return Envelope::err(404, "Employee not found");
    };

    match state.attendance.find_for_employee(employee_id).await {
        Ok(requests) => {
            let data: Vec<serde_json::Value> = requests.iter().map(to_json).collect();
            Envelope::ok("success", data)
        }
        Err(e) => {
            error!(%e, "Failed to list attendance requests");
            Envelope::err(500, "Unable to list attendance requests")
        }
    }
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Json<Envelope> {
    let employee = match employee_for(&state, &auth).await {
        Ok(employee) => employee,
        Err(envelope) => return envelope,
    };
    let (Ok(id), Some(employee_id)) = (ObjectId::parse_str(&request_id), employee.id) else {
        return Envelope::err(404, "Attendance request not found");
    };

    match state.attendance.find_owned(id, employee_id).await {
        Ok(Some(request)) => Envelope::ok("success", to_json(&request)),
        Ok(None) => Envelope::err(404, "Attendance request not found"),
        Err(e) => {
            error!(%e, "Failed to load attendance request");
            Envelope::err(500, "Unable to load attendance request")
        }
    }
}

/// Force delete by id. No ownership filter beyond authentication; matches
/// the mobile app's administrative delete flow.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(request_id): Path<String>,
) -> Json<Envelope> {
    let Ok(id) = ObjectId::parse_str(&request_id) else {
        return Envelope::err(404, "Attendance request not found");
    };

    match state.attendance.force_delete(id).await {
        Ok(true) => Envelope::ok("Attendance request deleted", serde_json::json!({})),
        Ok(false) => Envelope::err(404, "Attendance request not found"),
        Err(e) => {
            error!(%e, "Failed to delete attendance request");
            Envelope::err(500, "Unable to delete attendance request")
        }
    }
}

pub async fn shift_types(State(state): State<AppState>, _auth: AuthUser) -> Json<Envelope> {
    match state.shift_types.list_names().await {
        Ok(names) => Envelope::ok("success", names),
        Err(e) => {
            error!(%e, "Failed to list shift types");
            Envelope::err(500, "Unable to list shift types")
        }
    }
}

/// The caller must resolve to exactly one employee record by login email.
async fn employee_for(state: &AppState, auth: &AuthUser) -> Result<Employee, Json<Envelope>> {
    match state.employees.find_by_user_email(&auth.email).await {
        Ok(Some(employee)) => Ok(employee),
        Ok(None) => Err(Envelope::err(404, "Employee not found")),
        Err(e) => {
            error!(%e, "Failed to resolve employee");
            Err(Envelope::err(500, "Unable to resolve employee"))
        }
    }
}

/// Lifecycle hook into the notification rule engine. A template error on a
/// misconfigured rule must not fail the request that is already saved.
async fn notify(
    state: &AppState,
    request: &AttendanceRequest,
    before: Option<&AttendanceRequest>,
    is_new: bool,
) {
    let Ok(doc) = bson::to_document(request) else {
        return;
    };
    let before_doc = before.and_then(|b| bson::to_document(b).ok());

    let events = if is_new {
        [LifecycleEvent::BeforeSave, LifecycleEvent::AfterSave]
    } else {
        [LifecycleEvent::AfterSave, LifecycleEvent::OnChange]
    };
    for event in events {
        if let Err(e) = state
            .engine
            .handle_event(DOCUMENT_TYPE, &doc, before_doc.as_ref(), event, is_new)
            .await
        {
            error!(%e, "Notification dispatch failed for attendance request");
        }
    }
}

fn to_json(request: &AttendanceRequest) -> serde_json::Value {
    serde_json::json!({
        "name": request.id.map(|id| id.to_hex()),
        "employee": request.employee.to_hex(),
        "employee_name": request.employee_name,
        "department": request.department,
        "company": request.company,
        "from_date": display_date(&request.from_date),
        "to_date": display_date(&request.to_date),
        "half_day": request.half_day,
        "half_day_date": request.half_day_date.as_deref().map(display_date),
        "include_holidays": request.include_holidays,
        "shift": request.shift,
        "reason": request.reason,
        "explanation": request.explanation,
    })
}

/// Stored dates are ISO `YYYY-MM-DD`; the mobile app expects `DD-MM-YYYY`.
fn display_date(stored: &str) -> String {
    NaiveDate::parse_from_str(stored, "%Y-%m-%d")
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|_| stored.to_string())
}
