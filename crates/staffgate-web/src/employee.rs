//! Employee records held in memory.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub salary: u32,
    pub job_title: String,
    pub email: String,
    pub contract_hire_date: DateTime<Utc>,
    pub contract_termination_date: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(
        first_name: &str,
        last_name: &str,
        salary: u32,
        job_title: &str,
        email: &str,
        contract_hire_date: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            full_name: format!("{first_name} {last_name}"),
            salary,
            job_title: job_title.to_string(),
            email: email.to_string(),
            contract_hire_date,
            contract_termination_date: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct EmployeeStore {
    employees: DashMap<Uuid, Employee>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the demo staff list.
    pub fn seeded() -> Self {
        let store = Self::new();
        let now = Utc::now();
        for (first, last, salary, title, email) in [
            ("Anthony", "Apicella", 100_000, "Manager", "anthonyap@gmail.com"),
            ("Charles", "Wattick", 90_000, "Salesman", "charleswa@gmail.com"),
            ("Benjamin", "Mapp", 80_000, "Software Engineer", "benjaminma@gmail.com"),
            ("Aidan", "Fecteau", 200_000, "CEO", "aidanfe@gmail.com"),
            ("Peter", "Chelap", 50_000, "Accountant", "peterche@gmail.com"),
        ] {
            store.insert(Employee::new(first, last, salary, title, email, now));
        }
        store
    }

    /// All employees ordered by last then first name.
    pub fn all(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> =
            self.employees.iter().map(|e| e.value().clone()).collect();
        employees.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        employees
    }

    pub fn get(&self, uuid: &Uuid) -> Option<Employee> {
        self.employees.get(uuid).map(|e| e.value().clone())
    }

    pub fn insert(&self, employee: Employee) -> Employee {
        tracing::debug!("Employee stored: uuid={}", employee.uuid);
        self.employees.insert(employee.uuid, employee.clone());
        employee
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_has_five_employees() {
        let store = EmployeeStore::seeded();
        assert_eq!(store.len(), 5);
        let names: Vec<String> = store.all().into_iter().map(|e| e.last_name).collect();
        assert_eq!(names, ["Apicella", "Chelap", "Fecteau", "Mapp", "Wattick"]);
    }

    #[test]
    fn insert_then_get() {
        let store = EmployeeStore::new();
        let employee = Employee::new("Ada", "Lovelace", 120_000, "Engineer", "ada@example.com", Utc::now());
        let uuid = employee.uuid;
        store.insert(employee);
        let found = store.get(&uuid).unwrap();
        assert_eq!(found.full_name, "Ada Lovelace");
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let employee = Employee::new("Ada", "Lovelace", 1, "Engineer", "ada@example.com", Utc::now());
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["jobTitle"], "Engineer");
        assert!(json["contractTerminationDate"].is_null());
    }
}
