//! Domain Rows and Validated Input
//!
//! Plain data returned by the query layer and the structured input accepted by
//! its create operations. Rows derive `Serialize` so the output module can
//! render any of them as a table; field order is column order.

use serde::Serialize;

use crate::error::{Result, TrackerError};

/// A row of the `department` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Department {
    pub id: i32,
    pub name: String,
}

/// A row of the `role` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    pub id: i32,
    pub title: String,
    pub salary: f64,
    pub department_id: i32,
}

/// A row of the `employee` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub manager_id: Option<i32>,
}

/// Role joined with its department name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleListing {
    pub id: i32,
    pub title: String,
    pub salary: f64,
    pub department: String,
}

/// Employee joined with role, department and manager name
///
/// The joins are outer joins, so everything past the name may be missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeListing {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub department: Option<String>,
    pub salary: Option<f64>,
    pub manager: Option<String>,
}

impl EmployeeListing {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Row of the "employees by manager" listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagedEmployee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub department: Option<String>,
}

/// Row of the "employees by department" listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentEmployee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

/// Total salary of the staffed roles of one department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentBudget {
    pub department: String,
    pub total_budget: f64,
}

/// Input for creating a role
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub title: String,
    pub salary: f64,
    pub department_id: i32,
}

impl NewRole {
    /// Trim the title and check the fields before anything is sent to the database
    pub fn validate(self) -> Result<Self> {
        let title = required("Role title", &self.title)?;

        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(TrackerError::invalid_input(format!(
                "Salary must be a non-negative number, got {}",
                self.salary
            )));
        }

        // Store -0.0 as 0.0
        let salary = if self.salary == 0.0 { 0.0 } else { self.salary };
        Ok(Self { title, salary, ..self })
    }
}

/// Input for creating an employee
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub manager_id: Option<i32>,
}

impl NewEmployee {
    /// Trim both names and reject blank ones
    pub fn validate(self) -> Result<Self> {
        let first_name = required("First name", &self.first_name)?;
        let last_name = required("Last name", &self.last_name)?;
        Ok(Self { first_name, last_name, ..self })
    }
}

/// Trim a required text field, rejecting it when nothing is left
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::invalid_input(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
