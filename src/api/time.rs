// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Time echo endpoint, reachable without a token.

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TimeRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeResponse {
    pub name: Option<String>,
    /// Server local time, `YYYY-MM-DD HH:MM:SS`
    pub current_time: String,
}

impl TimeResponse {
    pub fn at(name: Option<String>, now: NaiveDateTime) -> Self {
        Self {
            name,
            current_time: now.format(TIME_FORMAT).to_string(),
        }
    }
}

/// Echo the caller's name with the current server time.
#[utoipa::path(
    post,
    path = "/time",
    tag = "Time",
    request_body = TimeRequest,
    responses(
        (status = 200, description = "Current time", body = TimeResponse),
        (status = 400, description = "Body is not valid JSON"),
    )
)]
pub async fn current_time(
    payload: Result<Json<TimeRequest>, JsonRejection>,
) -> Result<Json<TimeResponse>, ApiError> {
    let Json(request) = payload?;
    info!(name = request.name.as_deref(), "Time requested");
    Ok(Json(TimeResponse::at(request.name, Local::now().naive_local())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_time_as_date_and_clock() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        let response = TimeResponse::at(Some("Ada".into()), now);
        assert_eq!(response.current_time, "2026-03-07 09:05:03");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["currentTime"], "2026-03-07 09:05:03");
    }

    #[tokio::test]
    async fn handler_echoes_name() {
        let request = TimeRequest {
            name: Some("Grace".into()),
        };
        let Json(response) = current_time(Ok(Json(request))).await.unwrap();
        assert_eq!(response.name.as_deref(), Some("Grace"));
        assert_eq!(response.current_time.len(), "YYYY-MM-DD HH:MM:SS".len());
    }
}
