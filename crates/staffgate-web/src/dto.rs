use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `POST /api/v1/employee`. Every field is optional on the wire so
/// that a missing field yields a validation message instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub salary: Option<i64>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub contract_hire_date: Option<DateTime<Utc>>,
}
