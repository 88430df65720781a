//! `PostgreSQL` Repository Implementation
//!
//! Implements [`Repository`] on top of a single `tokio-postgres` client.
//!
//! # Implementation Notes
//! - One connection for the whole session; the driver task is spawned on connect
//! - Parameters are always bound positionally, never interpolated
//! - `salary` may be stored as `DECIMAL`: it is cast to `float8` on read and
//!   bound as `float8` on write
//! - The manager name is built with `||` so it is NULL when there is no manager

use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info, warn};

use crate::config::DbConfig;
use crate::db::Repository;
use crate::error::{Result, TrackerError};
use crate::model::{
    Department, DepartmentBudget, DepartmentEmployee, Employee, EmployeeListing, ManagedEmployee,
    NewEmployee, NewRole, Role, RoleListing,
};

const LIST_DEPARTMENTS: &str = "SELECT id, name FROM department ORDER BY id";

const LIST_ROLES: &str = "
    SELECT r.id, r.title, r.salary::float8 AS salary, d.name AS department
    FROM role r
    JOIN department d ON r.department_id = d.id
    ORDER BY r.id";

const LIST_EMPLOYEES: &str = "
    SELECT
        e.id,
        e.first_name,
        e.last_name,
        r.title,
        d.name AS department,
        r.salary::float8 AS salary,
        m.first_name || ' ' || m.last_name AS manager
    FROM employee e
    LEFT JOIN role r ON e.role_id = r.id
    LEFT JOIN department d ON r.department_id = d.id
    LEFT JOIN employee m ON e.manager_id = m.id
    ORDER BY e.id";

const INSERT_DEPARTMENT: &str = "INSERT INTO department (name) VALUES ($1) RETURNING id, name";

const INSERT_ROLE: &str = "
    INSERT INTO role (title, salary, department_id)
    VALUES ($1, $2::float8, $3)
    RETURNING id, title, salary::float8 AS salary, department_id";

const INSERT_EMPLOYEE: &str = "
    INSERT INTO employee (first_name, last_name, role_id, manager_id)
    VALUES ($1, $2, $3, $4)
    RETURNING id, first_name, last_name, role_id, manager_id";

const UPDATE_EMPLOYEE_ROLE: &str = "
    UPDATE employee SET role_id = $1 WHERE id = $2
    RETURNING id, first_name, last_name, role_id, manager_id";

const UPDATE_EMPLOYEE_MANAGER: &str = "
    UPDATE employee SET manager_id = $1 WHERE id = $2
    RETURNING id, first_name, last_name, role_id, manager_id";

const EMPLOYEES_BY_MANAGER: &str = "
    SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department
    FROM employee e
    LEFT JOIN role r ON e.role_id = r.id
    LEFT JOIN department d ON r.department_id = d.id
    WHERE e.manager_id = $1
    ORDER BY e.id";

const EMPLOYEES_BY_DEPARTMENT: &str = "
    SELECT e.id, e.first_name, e.last_name, r.title
    FROM employee e
    JOIN role r ON e.role_id = r.id
    WHERE r.department_id = $1
    ORDER BY e.id";

const DELETE_DEPARTMENT: &str = "DELETE FROM department WHERE id = $1";
const DELETE_ROLE: &str = "DELETE FROM role WHERE id = $1";
const DELETE_EMPLOYEE: &str = "DELETE FROM employee WHERE id = $1";

// Unstaffed roles have a NULL e.id after the outer join and are not counted.
const DEPARTMENT_BUDGET: &str = "
    SELECT
        d.name AS department,
        COALESCE(SUM(r.salary) FILTER (WHERE e.id IS NOT NULL), 0)::float8 AS total_budget
    FROM department d
    LEFT JOIN role r ON d.id = r.department_id
    LEFT JOIN employee e ON r.id = e.role_id
    WHERE d.id = $1
    GROUP BY d.name";

/// Repository backed by one long-lived `PostgreSQL` connection
pub struct PgRepository {
    client: Client,
}

impl PgRepository {
    /// Wrap an already connected client
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Open the session connection described by `config`
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let (client, connection) = config.to_pg_config().connect(NoTls).await.map_err(|e| {
            TrackerError::connection_failed(format!(
                "Failed to connect to PostgreSQL at {}: {e}",
                config.describe()
            ))
        })?;

        // The driver task ends when the client is dropped or the socket fails
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("PostgreSQL connection terminated: {e}");
            }
        });

        info!(database = %config.describe(), "Connected to PostgreSQL");
        Ok(Self::new(client))
    }

    /// The underlying client
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    async fn fetch_all(
        &self,
        operation: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        debug!(operation, "query");
        self.client.query(sql, params).await.map_err(|e| TrackerError::from_query(operation, &e))
    }

    async fn fetch_one(
        &self,
        operation: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row> {
        debug!(operation, "query");
        self.client
            .query_one(sql, params)
            .await
            .map_err(|e| TrackerError::from_query(operation, &e))
    }

    async fn fetch_opt(
        &self,
        operation: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>> {
        debug!(operation, "query");
        self.client
            .query_opt(sql, params)
            .await
            .map_err(|e| TrackerError::from_query(operation, &e))
    }

    async fn run(
        &self,
        operation: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64> {
        debug!(operation, "statement");
        self.client.execute(sql, params).await.map_err(|e| TrackerError::from_query(operation, &e))
    }
}

impl Repository for PgRepository {
    async fn list_departments(&self) -> Result<Vec<Department>> {
        let rows = self.fetch_all("list departments", LIST_DEPARTMENTS, &[]).await?;
        rows.iter().map(department_from_row).collect()
    }

    async fn list_roles(&self) -> Result<Vec<RoleListing>> {
        let rows = self.fetch_all("list roles", LIST_ROLES, &[]).await?;
        rows.iter().map(role_listing_from_row).collect()
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeListing>> {
        let rows = self.fetch_all("list employees", LIST_EMPLOYEES, &[]).await?;
        rows.iter().map(employee_listing_from_row).collect()
    }

    async fn create_department(&self, name: &str) -> Result<Department> {
        let row = self.fetch_one("create department", INSERT_DEPARTMENT, &[&name]).await?;
        department_from_row(&row)
    }

    async fn create_role(&self, role: &NewRole) -> Result<Role> {
        let row = self
            .fetch_one(
                "create role",
                INSERT_ROLE,
                &[&role.title, &role.salary, &role.department_id],
            )
            .await?;
        role_from_row(&row)
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let row = self
            .fetch_one(
                "create employee",
                INSERT_EMPLOYEE,
                &[
                    &employee.first_name,
                    &employee.last_name,
                    &employee.role_id,
                    &employee.manager_id,
                ],
            )
            .await?;
        employee_from_row(&row)
    }

    async fn update_employee_role(&self, employee_id: i32, role_id: i32) -> Result<Option<Employee>> {
        let row = self
            .fetch_opt("update employee role", UPDATE_EMPLOYEE_ROLE, &[&role_id, &employee_id])
            .await?;
        row.as_ref().map(employee_from_row).transpose()
    }

    async fn update_employee_manager(
        &self,
        employee_id: i32,
        manager_id: Option<i32>,
    ) -> Result<Option<Employee>> {
        let row = self
            .fetch_opt(
                "update employee manager",
                UPDATE_EMPLOYEE_MANAGER,
                &[&manager_id, &employee_id],
            )
            .await?;
        row.as_ref().map(employee_from_row).transpose()
    }

    async fn employees_by_manager(&self, manager_id: i32) -> Result<Vec<ManagedEmployee>> {
        let rows =
            self.fetch_all("employees by manager", EMPLOYEES_BY_MANAGER, &[&manager_id]).await?;
        rows.iter().map(managed_employee_from_row).collect()
    }

    async fn employees_by_department(&self, department_id: i32) -> Result<Vec<DepartmentEmployee>> {
        let rows = self
            .fetch_all("employees by department", EMPLOYEES_BY_DEPARTMENT, &[&department_id])
            .await?;
        rows.iter().map(department_employee_from_row).collect()
    }

    async fn delete_department(&self, id: i32) -> Result<()> {
        self.run("delete department", DELETE_DEPARTMENT, &[&id]).await?;
        Ok(())
    }

    async fn delete_role(&self, id: i32) -> Result<()> {
        self.run("delete role", DELETE_ROLE, &[&id]).await?;
        Ok(())
    }

    async fn delete_employee(&self, id: i32) -> Result<()> {
        self.run("delete employee", DELETE_EMPLOYEE, &[&id]).await?;
        Ok(())
    }

    async fn department_budget(&self, department_id: i32) -> Result<Option<DepartmentBudget>> {
        let row = self.fetch_opt("department budget", DEPARTMENT_BUDGET, &[&department_id]).await?;
        row.as_ref().map(budget_from_row).transpose()
    }
}

/// Read one column by name, reporting type mismatches as query failures
fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T> {
    row.try_get(name).map_err(|e| {
        TrackerError::query_failed(format!("Failed to read column '{name}': {e}"))
    })
}

fn department_from_row(row: &Row) -> Result<Department> {
    Ok(Department { id: column(row, "id")?, name: column(row, "name")? })
}

fn role_from_row(row: &Row) -> Result<Role> {
    Ok(Role {
        id: column(row, "id")?,
        title: column(row, "title")?,
        salary: column(row, "salary")?,
        department_id: column(row, "department_id")?,
    })
}

fn employee_from_row(row: &Row) -> Result<Employee> {
    Ok(Employee {
        id: column(row, "id")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        role_id: column(row, "role_id")?,
        manager_id: column(row, "manager_id")?,
    })
}

fn role_listing_from_row(row: &Row) -> Result<RoleListing> {
    Ok(RoleListing {
        id: column(row, "id")?,
        title: column(row, "title")?,
        salary: column(row, "salary")?,
        department: column(row, "department")?,
    })
}

fn employee_listing_from_row(row: &Row) -> Result<EmployeeListing> {
    Ok(EmployeeListing {
        id: column(row, "id")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        title: column(row, "title")?,
        department: column(row, "department")?,
        salary: column(row, "salary")?,
        manager: column(row, "manager")?,
    })
}

fn managed_employee_from_row(row: &Row) -> Result<ManagedEmployee> {
    Ok(ManagedEmployee {
        id: column(row, "id")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        title: column(row, "title")?,
        department: column(row, "department")?,
    })
}

fn department_employee_from_row(row: &Row) -> Result<DepartmentEmployee> {
    Ok(DepartmentEmployee {
        id: column(row, "id")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        title: column(row, "title")?,
    })
}

fn budget_from_row(row: &Row) -> Result<DepartmentBudget> {
    Ok(DepartmentBudget {
        department: column(row, "department")?,
        total_budget: column(row, "total_budget")?,
    })
}
