// SPDX-License-Identifier: MIT
//! Issue REST routes.
//!
//! All four verbs share the `/api/issues/{project}` path. Client input
//! errors and missing rows are reported as HTTP 200 bodies with an `error`
//! key (the wire contract the front-ends depend on); only store failures
//! on list/create surface as HTTP 500.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::issues::model::{valid_issue_id, CreateIssueParams, IssueFilter, IssueUpdate};
use crate::AppContext;

pub async fn list_issues(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
    Query(filter): Query<IssueFilter>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ctx.issues.find(&project, &filter).await {
        Ok(issues) => Ok(Json(json!(issues))),
        Err(e) => {
            warn!(project = %project, err = %e, "issue query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "could not retrieve issues", "details": e.to_string() })),
            ))
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateIssueRequest {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

pub async fn create_issue(
    State(ctx): State<Arc<AppContext>>,
    Path(project): Path<String>,
    Json(body): Json<CreateIssueRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Required fields must be present and non-empty; nothing is persisted
    // otherwise. This path intentionally answers 200, not 400.
    let (issue_title, issue_text, created_by) = match (
        body.issue_title.filter(|s| !s.is_empty()),
        body.issue_text.filter(|s| !s.is_empty()),
        body.created_by.filter(|s| !s.is_empty()),
    ) {
        (Some(title), Some(text), Some(created_by)) => (title, text, created_by),
        _ => return Ok(Json(json!({ "error": "required field(s) missing" }))),
    };

    let params = CreateIssueParams {
        issue_title,
        issue_text,
        created_by,
        assigned_to: body.assigned_to.unwrap_or_default(),
        status_text: body.status_text.unwrap_or_default(),
    };

    match ctx.issues.create(&project, params).await {
        Ok(issue) => Ok(Json(json!(issue))),
        Err(e) => {
            warn!(project = %project, err = %e, "issue insert failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "could not save issue" })),
            ))
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateIssueRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    #[serde(deserialize_with = "crate::issues::model::de_open_flag")]
    pub open: Option<bool>,
}

pub async fn update_issue(
    State(ctx): State<Arc<AppContext>>,
    // Updates are keyed by id alone; the path segment is accepted but does
    // not scope the update.
    Path(_project): Path<String>,
    Json(body): Json<UpdateIssueRequest>,
) -> Json<Value> {
    let Some(id) = body.id else {
        return Json(json!({ "error": "missing _id" }));
    };
    if !valid_issue_id(&id) {
        return Json(json!({ "error": "could not update", "_id": id }));
    }

    let fields = IssueUpdate {
        issue_title: body.issue_title,
        issue_text: body.issue_text,
        created_by: body.created_by,
        assigned_to: body.assigned_to,
        status_text: body.status_text,
        open: body.open,
    };
    if fields.is_empty() {
        return Json(json!({ "error": "no update field(s) sent", "_id": id }));
    }

    match ctx.issues.update(&id, &fields).await {
        Ok(true) => Json(json!({ "result": "successfully updated", "_id": id })),
        Ok(false) => Json(json!({ "error": "could not update", "_id": id })),
        Err(e) => {
            // Same payload as not-found; the cause is only visible in logs.
            warn!(id = %id, err = %e, "issue update failed");
            Json(json!({ "error": "could not update", "_id": id }))
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DeleteIssueRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

pub async fn delete_issue(
    State(ctx): State<Arc<AppContext>>,
    Path(_project): Path<String>,
    Json(body): Json<DeleteIssueRequest>,
) -> Json<Value> {
    let Some(id) = body.id else {
        return Json(json!({ "error": "missing _id" }));
    };
    if !valid_issue_id(&id) {
        return Json(json!({ "error": "could not delete", "_id": id }));
    }

    match ctx.issues.delete(&id).await {
        Ok(true) => Json(json!({ "result": "successfully deleted", "_id": id })),
        Ok(false) => Json(json!({ "error": "could not delete", "_id": id })),
        Err(e) => {
            warn!(id = %id, err = %e, "issue delete failed");
            Json(json!({ "error": "could not delete", "_id": id }))
        }
    }
}
