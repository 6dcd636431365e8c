//! Field rules for new employee records. The first failing rule is reported.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::dto::EmployeeRequest;
use crate::employee::Employee;
use crate::error::AppError;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s'-]{2,50}$").expect("valid name pattern"));
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email pattern")
});
static JOB_TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s'-]{2,100}$").expect("valid job title pattern"));
static SALARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,7}$").expect("valid salary pattern"));

const MAX_SALARY: i64 = 1_000_000;

fn bad(msg: &str) -> AppError {
    AppError::BadRequest(msg.to_string())
}

fn required<'a>(value: &'a Option<String>, missing: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(bad(missing)),
    }
}

/// Checks `request` and builds the employee to store. Names and title are
/// trimmed, the email lowercased, and a missing hire date becomes `now`.
pub fn validate_employee(request: &EmployeeRequest, now: DateTime<Utc>) -> Result<Employee, AppError> {
    let first_name = required(&request.first_name, "First name is required")?;
    if !NAME_PATTERN.is_match(first_name) {
        return Err(bad(
            "First name must contain only letters, spaces, hyphens, and apostrophes (2-50 characters)",
        ));
    }

    let last_name = required(&request.last_name, "Last name is required")?;
    if !NAME_PATTERN.is_match(last_name) {
        return Err(bad(
            "Last name must contain only letters, spaces, hyphens, and apostrophes (2-50 characters)",
        ));
    }

    let email = required(&request.email, "Email is required")?.to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(bad(
            "Invalid email format. Must be in format: username@domain.com",
        ));
    }

    let salary = request.salary.ok_or_else(|| bad("Salary is required"))?;
    if !SALARY_PATTERN.is_match(&salary.to_string()) {
        return Err(bad(
            "Salary must be a positive number with no decimal places",
        ));
    }
    if salary <= 0 {
        return Err(bad("Salary must be positive"));
    }
    if salary > MAX_SALARY {
        return Err(bad("Salary seems unreasonably high"));
    }

    let job_title = required(&request.job_title, "Job title is required")?;
    if !JOB_TITLE_PATTERN.is_match(job_title) {
        return Err(bad(
            "Job title must contain only letters, spaces, hyphens, and apostrophes (2-100 characters)",
        ));
    }

    let hire_date = match request.contract_hire_date {
        Some(date) if date > now => {
            return Err(bad("Contract hire date cannot be in the future"));
        }
        Some(date) => date,
        None => now,
    };

    // Range checked above.
    let salary = salary as u32;

    Ok(Employee::new(
        first_name, last_name, salary, job_title, &email, hire_date,
    ))
}
