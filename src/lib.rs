//! Employee Tracker - Interactive Staff Database CLI
//!
//! An operator-facing tool for managing departments, roles and employees stored
//! in `PostgreSQL`. Every menu action maps to one parameterized SQL statement.
//!
//! # Core Principles
//! - One statement per action, no transactions, no retries
//! - No caching (every read goes back to the database)
//! - Foreign-key integrity is left to the database
//! - One long-lived connection handle, passed explicitly
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`config`] - Connection settings from the environment
//! - [`model`] - Row types and validated input
//! - [`db`] - Query layer (`Repository` trait and its `PostgreSQL` implementation)
//! - [`output`] - Table rendering
//! - [`menu`] - Interactive menu loop

pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod model;
pub mod output;

pub use config::DbConfig;
pub use db::{PgRepository, Repository};
pub use error::{Result, TrackerError};
pub use menu::{Choice, Menu, MenuChoice, Prompter, TerminalPrompter};
pub use model::{
    Department, DepartmentBudget, DepartmentEmployee, Employee, EmployeeListing, ManagedEmployee,
    NewEmployee, NewRole, Role, RoleListing,
};
pub use output::render_table;
