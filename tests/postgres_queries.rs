//! PostgreSQL Query Layer Tests
//!
//! These tests run every statement of `PgRepository` against a live server.
//! Each test works inside its own throwaway schema built from `db/schema.sql`,
//! so they can run in parallel against a shared database.
//!
//! Run with the DB_* variables set (or a `.env` file):
//! cargo test --test postgres_queries -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};

use employee_tracker::config::{load_dotenv, DbConfig};
use employee_tracker::{NewEmployee, NewRole, PgRepository, Repository};
use pretty_assertions::assert_eq;

const SCHEMA_SQL: &str = include_str!("../db/schema.sql");

// ============================================================================
// Test Helpers
// ============================================================================

/// Connect and point `search_path` at a fresh schema with empty tables
async fn fresh_repository() -> (PgRepository, String) {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    load_dotenv();
    let config = DbConfig::from_env().expect("DB_USER and friends must be set");
    let repo = PgRepository::connect(&config).await.expect("Failed to connect to PostgreSQL");

    let schema = format!(
        "tracker_test_{}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    repo.client()
        .batch_execute(&format!("CREATE SCHEMA {schema}; SET search_path TO {schema};"))
        .await
        .expect("Failed to create test schema");
    repo.client().batch_execute(SCHEMA_SQL).await.expect("Failed to create tables");

    (repo, schema)
}

async fn cleanup(repo: &PgRepository, schema: &str) {
    let _ = repo.client().batch_execute(&format!("DROP SCHEMA {schema} CASCADE")).await;
}

fn new_role(title: &str, salary: f64, department_id: i32) -> NewRole {
    NewRole { title: title.to_string(), salary, department_id }
}

fn new_employee(first: &str, last: &str, role_id: i32, manager_id: Option<i32>) -> NewEmployee {
    NewEmployee {
        first_name: first.to_string(),
        last_name: last.to_string(),
        role_id,
        manager_id,
    }
}

// ============================================================================
// Departments
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_created_department_is_listed() {
    let (repo, schema) = fresh_repository().await;

    let created = repo.create_department("Engineering").await.unwrap();
    assert_eq!(created.name, "Engineering");
    assert!(created.id > 0);

    let departments = repo.list_departments().await.unwrap();
    assert_eq!(departments, vec![created]);

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_delete_department_removes_only_that_row() {
    let (repo, schema) = fresh_repository().await;

    let engineering = repo.create_department("Engineering").await.unwrap();
    let sales = repo.create_department("Sales").await.unwrap();
    let legal = repo.create_department("Legal").await.unwrap();

    repo.delete_department(sales.id).await.unwrap();

    let departments = repo.list_departments().await.unwrap();
    assert_eq!(departments, vec![engineering, legal]);

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_delete_department_with_roles_is_constraint_violation() {
    let (repo, schema) = fresh_repository().await;

    let engineering = repo.create_department("Engineering").await.unwrap();
    repo.create_role(&new_role("Engineer", 100_000.0, engineering.id)).await.unwrap();

    let err = repo.delete_department(engineering.id).await.unwrap_err();
    assert_eq!(err.error_code(), "CONSTRAINT_VIOLATION");
    assert_eq!(repo.list_departments().await.unwrap().len(), 1);

    cleanup(&repo, &schema).await;
}

// ============================================================================
// Roles
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_roles_join_department_name() {
    let (repo, schema) = fresh_repository().await;

    let sales = repo.create_department("Sales").await.unwrap();
    let role = repo.create_role(&new_role("Account Manager", 82_500.5, sales.id)).await.unwrap();
    assert_eq!(role.salary, 82_500.5);
    assert_eq!(role.department_id, sales.id);

    let roles = repo.list_roles().await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].title, "Account Manager");
    assert_eq!(roles[0].department, "Sales");

    repo.delete_role(role.id).await.unwrap();
    assert!(repo.list_roles().await.unwrap().is_empty());

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_role_with_unknown_department_is_rejected() {
    let (repo, schema) = fresh_repository().await;

    let err = repo.create_role(&new_role("Ghost", 1.0, 9_999)).await.unwrap_err();
    assert_eq!(err.error_code(), "CONSTRAINT_VIOLATION");

    cleanup(&repo, &schema).await;
}

// ============================================================================
// Employees
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_clearing_manager_removes_manager_name() {
    let (repo, schema) = fresh_repository().await;

    let dept = repo.create_department("Engineering").await.unwrap();
    let role = repo.create_role(&new_role("Engineer", 100_000.0, dept.id)).await.unwrap();
    let ada = repo.create_employee(&new_employee("Ada", "Lovelace", role.id, None)).await.unwrap();
    let grace =
        repo.create_employee(&new_employee("Grace", "Hopper", role.id, Some(ada.id))).await.unwrap();

    let listing = repo.list_employees().await.unwrap();
    assert_eq!(listing[1].manager.as_deref(), Some("Ada Lovelace"));
    assert_eq!(listing[0].manager, None);

    let updated = repo.update_employee_manager(grace.id, None).await.unwrap().unwrap();
    assert_eq!(updated.manager_id, None);

    let listing = repo.list_employees().await.unwrap();
    assert_eq!(listing[1].id, grace.id);
    assert_eq!(listing[1].manager, None);

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_update_role_and_missing_employee() {
    let (repo, schema) = fresh_repository().await;

    let dept = repo.create_department("Engineering").await.unwrap();
    let junior = repo.create_role(&new_role("Junior", 60_000.0, dept.id)).await.unwrap();
    let senior = repo.create_role(&new_role("Senior", 120_000.0, dept.id)).await.unwrap();
    let ada = repo.create_employee(&new_employee("Ada", "Lovelace", junior.id, None)).await.unwrap();

    let promoted = repo.update_employee_role(ada.id, senior.id).await.unwrap().unwrap();
    assert_eq!(promoted.role_id, senior.id);

    let listing = repo.list_employees().await.unwrap();
    assert_eq!(listing[0].title.as_deref(), Some("Senior"));
    assert_eq!(listing[0].salary, Some(120_000.0));

    assert_eq!(repo.update_employee_role(ada.id + 1_000, senior.id).await.unwrap(), None);

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_employees_by_manager_exact_set_in_id_order() {
    let (repo, schema) = fresh_repository().await;

    let dept = repo.create_department("Engineering").await.unwrap();
    let role = repo.create_role(&new_role("Engineer", 100_000.0, dept.id)).await.unwrap();
    let boss = repo.create_employee(&new_employee("Ada", "Lovelace", role.id, None)).await.unwrap();
    let other = repo.create_employee(&new_employee("Alan", "Turing", role.id, None)).await.unwrap();
    let first =
        repo.create_employee(&new_employee("Grace", "Hopper", role.id, Some(boss.id))).await.unwrap();
    repo.create_employee(&new_employee("Edsger", "Dijkstra", role.id, Some(other.id)))
        .await
        .unwrap();
    let second =
        repo.create_employee(&new_employee("Barbara", "Liskov", role.id, Some(boss.id))).await.unwrap();

    let reports = repo.employees_by_manager(boss.id).await.unwrap();
    let ids: Vec<i32> = reports.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(reports[0].department.as_deref(), Some("Engineering"));

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_employees_by_department() {
    let (repo, schema) = fresh_repository().await;

    let engineering = repo.create_department("Engineering").await.unwrap();
    let sales = repo.create_department("Sales").await.unwrap();
    let engineer = repo.create_role(&new_role("Engineer", 100_000.0, engineering.id)).await.unwrap();
    let seller = repo.create_role(&new_role("Seller", 70_000.0, sales.id)).await.unwrap();
    repo.create_employee(&new_employee("Ada", "Lovelace", engineer.id, None)).await.unwrap();
    let alan = repo.create_employee(&new_employee("Alan", "Turing", seller.id, None)).await.unwrap();

    let in_sales = repo.employees_by_department(sales.id).await.unwrap();
    assert_eq!(in_sales.len(), 1);
    assert_eq!(in_sales[0].id, alan.id);
    assert_eq!(in_sales[0].title, "Seller");

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_delete_manager_clears_reports() {
    let (repo, schema) = fresh_repository().await;

    let dept = repo.create_department("Engineering").await.unwrap();
    let role = repo.create_role(&new_role("Engineer", 100_000.0, dept.id)).await.unwrap();
    let ada = repo.create_employee(&new_employee("Ada", "Lovelace", role.id, None)).await.unwrap();
    repo.create_employee(&new_employee("Grace", "Hopper", role.id, Some(ada.id))).await.unwrap();

    repo.delete_employee(ada.id).await.unwrap();

    let listing = repo.list_employees().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].first_name, "Grace");
    assert_eq!(listing[0].manager, None);

    cleanup(&repo, &schema).await;
}

// ============================================================================
// Budget
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_budget_counts_only_staffed_roles() {
    let (repo, schema) = fresh_repository().await;

    let dept = repo.create_department("Engineering").await.unwrap();
    let empty = repo.department_budget(dept.id).await.unwrap().unwrap();
    assert_eq!(empty.department, "Engineering");
    assert_eq!(empty.total_budget, 0.0);

    let role = repo.create_role(&new_role("Engineer", 100_000.0, dept.id)).await.unwrap();
    let unstaffed = repo.department_budget(dept.id).await.unwrap().unwrap();
    assert_eq!(unstaffed.total_budget, 0.0);

    repo.create_employee(&new_employee("Ada", "Lovelace", role.id, None)).await.unwrap();
    repo.create_employee(&new_employee("Grace", "Hopper", role.id, None)).await.unwrap();
    let staffed = repo.department_budget(dept.id).await.unwrap().unwrap();
    assert_eq!(staffed.total_budget, 200_000.0);

    assert_eq!(repo.department_budget(dept.id + 1_000).await.unwrap(), None);

    cleanup(&repo, &schema).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL instance"]
async fn test_engineering_scenario() {
    let (repo, schema) = fresh_repository().await;

    let engineering = repo.create_department("Engineering").await.unwrap();
    let engineer =
        repo.create_role(&new_role("Engineer", 100_000.0, engineering.id)).await.unwrap();
    repo.create_employee(&new_employee("Ada", "Lovelace", engineer.id, None)).await.unwrap();

    let budget = repo.department_budget(engineering.id).await.unwrap().unwrap();
    assert_eq!(budget.department, "Engineering");
    assert_eq!(budget.total_budget, 100_000.0);

    cleanup(&repo, &schema).await;
}
