//! Query Layer
//!
//! This module defines the `Repository` trait: one method per domain operation,
//! each backed by exactly one SQL statement. There are no transactions, no
//! retries and no caching; every read goes back to the database.
//!
//! # Failure Model
//! Database failures propagate unchanged in meaning (see
//! [`TrackerError::from_query`](crate::error::TrackerError::from_query)).
//! The layer never validates or repairs references itself.

use std::future::Future;

use crate::error::Result;
use crate::model::{
    Department, DepartmentBudget, DepartmentEmployee, Employee, EmployeeListing, ManagedEmployee,
    NewEmployee, NewRole, Role, RoleListing,
};

pub mod postgres;

pub use postgres::PgRepository;

/// Data access for departments, roles and employees
///
/// Listings are ordered by primary key ascending. Update operations return
/// `None` when no employee has the given id.
pub trait Repository {
    /// All departments
    fn list_departments(&self) -> impl Future<Output = Result<Vec<Department>>> + Send;

    /// All roles with their department name
    fn list_roles(&self) -> impl Future<Output = Result<Vec<RoleListing>>> + Send;

    /// All employees with role, department and manager name
    fn list_employees(&self) -> impl Future<Output = Result<Vec<EmployeeListing>>> + Send;

    /// Insert a department and return the stored row
    fn create_department(&self, name: &str) -> impl Future<Output = Result<Department>> + Send;

    /// Insert a role and return the stored row
    fn create_role(&self, role: &NewRole) -> impl Future<Output = Result<Role>> + Send;

    /// Insert an employee and return the stored row
    fn create_employee(
        &self,
        employee: &NewEmployee,
    ) -> impl Future<Output = Result<Employee>> + Send;

    /// Point an employee at a different role
    fn update_employee_role(
        &self,
        employee_id: i32,
        role_id: i32,
    ) -> impl Future<Output = Result<Option<Employee>>> + Send;

    /// Set or clear (`None`) an employee's manager
    fn update_employee_manager(
        &self,
        employee_id: i32,
        manager_id: Option<i32>,
    ) -> impl Future<Output = Result<Option<Employee>>> + Send;

    /// Employees whose `manager_id` equals `manager_id`
    fn employees_by_manager(
        &self,
        manager_id: i32,
    ) -> impl Future<Output = Result<Vec<ManagedEmployee>>> + Send;

    /// Employees holding a role in the given department
    fn employees_by_department(
        &self,
        department_id: i32,
    ) -> impl Future<Output = Result<Vec<DepartmentEmployee>>> + Send;

    fn delete_department(&self, id: i32) -> impl Future<Output = Result<()>> + Send;

    fn delete_role(&self, id: i32) -> impl Future<Output = Result<()>> + Send;

    fn delete_employee(&self, id: i32) -> impl Future<Output = Result<()>> + Send;

    /// Sum of the salaries of every employee's role in the department
    ///
    /// `Some` with a zero total when the department has no staffed roles,
    /// `None` when the department does not exist.
    fn department_budget(
        &self,
        department_id: i32,
    ) -> impl Future<Output = Result<Option<DepartmentBudget>>> + Send;
}
