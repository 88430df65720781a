//! Interactive Menu Loop
//!
//! One state, "awaiting menu choice". Every action runs its prompt sequence,
//! issues its query, prints the result and comes back to the menu; `Exit` ends
//! the loop. Selection lists are fetched fresh for every action.
//!
//! Input validation failures are reported and the loop continues. Database
//! and terminal errors end the loop and are returned to the caller.

use std::fmt;
use std::io::Write;

use tracing::{debug, warn};

use crate::db::Repository;
use crate::error::{Result, TrackerError};
use crate::model::{required, Department, EmployeeListing, NewEmployee, NewRole, RoleListing};
use crate::output::{format_amount, render_table};

pub mod prompt;

pub use prompt::{pick, Choice, Prompter, TerminalPrompter};

/// Top-level menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuChoice {
    ViewAllEmployees,
    AddEmployee,
    UpdateEmployeeRole,
    UpdateEmployeeManager,
    ViewEmployeesByManager,
    ViewEmployeesByDepartment,
    ViewAllRoles,
    AddRole,
    DeleteRole,
    ViewAllDepartments,
    AddDepartment,
    DeleteDepartment,
    ViewDepartmentBudget,
    Exit,
}

impl MenuChoice {
    pub const ALL: [Self; 14] = [
        Self::ViewAllEmployees,
        Self::AddEmployee,
        Self::UpdateEmployeeRole,
        Self::UpdateEmployeeManager,
        Self::ViewEmployeesByManager,
        Self::ViewEmployeesByDepartment,
        Self::ViewAllRoles,
        Self::AddRole,
        Self::DeleteRole,
        Self::ViewAllDepartments,
        Self::AddDepartment,
        Self::DeleteDepartment,
        Self::ViewDepartmentBudget,
        Self::Exit,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewAllEmployees => "View All Employees",
            Self::AddEmployee => "Add Employee",
            Self::UpdateEmployeeRole => "Update Employee Role",
            Self::UpdateEmployeeManager => "Update Employee Manager",
            Self::ViewEmployeesByManager => "View Employees by Manager",
            Self::ViewEmployeesByDepartment => "View Employees by Department",
            Self::ViewAllRoles => "View All Roles",
            Self::AddRole => "Add Role",
            Self::DeleteRole => "Delete Role",
            Self::ViewAllDepartments => "View All Departments",
            Self::AddDepartment => "Add Department",
            Self::DeleteDepartment => "Delete Department",
            Self::ViewDepartmentBudget => "View Department Budget",
            Self::Exit => "Exit",
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const MENU_PROMPT: &str = "What would you like to do?";

const NO_EMPLOYEES: &str = "There are no employees yet. Add an employee first.";
const NO_ROLES: &str = "There are no roles yet. Add a role first.";
const NO_DEPARTMENTS: &str = "There are no departments yet. Add a department first.";

/// The interactive session
pub struct Menu<'a, R, P, W> {
    repo: &'a R,
    prompter: P,
    out: W,
}

impl<'a, R, P, W> Menu<'a, R, P, W>
where
    R: Repository,
    P: Prompter,
    W: Write,
{
    pub fn new(repo: &'a R, prompter: P, out: W) -> Self {
        Self { repo, prompter, out }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until the operator picks `Exit`
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let choice = self.prompt_choice()?;
            debug!(action = %choice, "menu selection");

            if choice == MenuChoice::Exit {
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(TrackerError::InvalidInput(reason)) => {
                    warn!(action = %choice, "rejected input: {reason}");
                    writeln!(self.out, "{reason}")?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn prompt_choice(&mut self) -> Result<MenuChoice> {
        let choices: Vec<Choice<MenuChoice>> =
            MenuChoice::ALL.iter().map(|c| Choice::new(c.label(), *c)).collect();
        pick(&mut self.prompter, MENU_PROMPT, &choices)
    }

    /// Perform one menu action
    pub async fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::ViewAllEmployees => {
                let rows = self.repo.list_employees().await?;
                self.print_table(&rows)
            }
            MenuChoice::AddEmployee => self.add_employee().await,
            MenuChoice::UpdateEmployeeRole => self.update_employee_role().await,
            MenuChoice::UpdateEmployeeManager => self.update_employee_manager().await,
            MenuChoice::ViewEmployeesByManager => self.view_employees_by_manager().await,
            MenuChoice::ViewEmployeesByDepartment => self.view_employees_by_department().await,
            MenuChoice::ViewAllRoles => {
                let rows = self.repo.list_roles().await?;
                self.print_table(&rows)
            }
            MenuChoice::AddRole => self.add_role().await,
            MenuChoice::DeleteRole => self.delete_role().await,
            MenuChoice::ViewAllDepartments => {
                let rows = self.repo.list_departments().await?;
                self.print_table(&rows)
            }
            MenuChoice::AddDepartment => self.add_department().await,
            MenuChoice::DeleteDepartment => self.delete_department().await,
            MenuChoice::ViewDepartmentBudget => self.view_department_budget().await,
            MenuChoice::Exit => Ok(()),
        }
    }

    async fn add_employee(&mut self) -> Result<()> {
        let roles = self.repo.list_roles().await?;
        if roles.is_empty() {
            return self.say(NO_ROLES);
        }
        let employees = self.repo.list_employees().await?;

        let first_name = self.prompter.input("What is the employee's first name?")?;
        let first_name = required("First name", &first_name)?;
        let last_name = self.prompter.input("What is the employee's last name?")?;
        let last_name = required("Last name", &last_name)?;

        let role_id =
            pick(&mut self.prompter, "What is the employee's role?", &role_choices(&roles))?;
        let manager_id = pick(
            &mut self.prompter,
            "Who is the employee's manager?",
            &manager_choices(&employees, None),
        )?;

        let employee = NewEmployee { first_name, last_name, role_id, manager_id }.validate()?;
        let created = self.repo.create_employee(&employee).await?;
        debug!(id = created.id, "employee created");
        self.say("Employee added successfully!")
    }

    async fn update_employee_role(&mut self) -> Result<()> {
        let employees = self.repo.list_employees().await?;
        if employees.is_empty() {
            return self.say(NO_EMPLOYEES);
        }
        let roles = self.repo.list_roles().await?;
        if roles.is_empty() {
            return self.say(NO_ROLES);
        }

        let employee_id = pick(
            &mut self.prompter,
            "Which employee's role do you want to update?",
            &employee_choices(&employees),
        )?;
        let role_id = pick(
            &mut self.prompter,
            "Which role do you want to assign to the selected employee?",
            &role_choices(&roles),
        )?;

        match self.repo.update_employee_role(employee_id, role_id).await? {
            Some(_) => self.say("Employee role updated successfully!"),
            None => self.say(&format!("No employee with id {employee_id}.")),
        }
    }

    async fn update_employee_manager(&mut self) -> Result<()> {
        let employees = self.repo.list_employees().await?;
        if employees.is_empty() {
            return self.say(NO_EMPLOYEES);
        }

        let employee_id = pick(
            &mut self.prompter,
            "Which employee's manager do you want to update?",
            &employee_choices(&employees),
        )?;
        let manager_id = pick(
            &mut self.prompter,
            "Which employee should be the new manager?",
            &manager_choices(&employees, Some(employee_id)),
        )?;

        match self.repo.update_employee_manager(employee_id, manager_id).await? {
            Some(_) => self.say("Employee manager updated successfully!"),
            None => self.say(&format!("No employee with id {employee_id}.")),
        }
    }

    async fn view_employees_by_manager(&mut self) -> Result<()> {
        let employees = self.repo.list_employees().await?;
        if employees.is_empty() {
            return self.say(NO_EMPLOYEES);
        }

        let manager_id = pick(
            &mut self.prompter,
            "Which manager would you like to view employees for?",
            &employee_choices(&employees),
        )?;
        let rows = self.repo.employees_by_manager(manager_id).await?;
        self.print_table(&rows)
    }

    async fn view_employees_by_department(&mut self) -> Result<()> {
        let departments = self.repo.list_departments().await?;
        if departments.is_empty() {
            return self.say(NO_DEPARTMENTS);
        }

        let department_id = pick(
            &mut self.prompter,
            "Which department would you like to view employees for?",
            &department_choices(&departments),
        )?;
        let rows = self.repo.employees_by_department(department_id).await?;
        self.print_table(&rows)
    }

    async fn add_role(&mut self) -> Result<()> {
        let departments = self.repo.list_departments().await?;
        if departments.is_empty() {
            return self.say(NO_DEPARTMENTS);
        }

        let title = self.prompter.input("What is the title of the role?")?;
        let title = required("Role title", &title)?;
        let salary = self.prompter.input_number("What is the salary for this role?")?;
        let department_id = pick(
            &mut self.prompter,
            "Which department does the role belong to?",
            &department_choices(&departments),
        )?;

        let role = NewRole { title, salary, department_id }.validate()?;
        let created = self.repo.create_role(&role).await?;
        debug!(id = created.id, "role created");
        self.say("Role added successfully!")
    }

    async fn delete_role(&mut self) -> Result<()> {
        let roles = self.repo.list_roles().await?;
        if roles.is_empty() {
            return self.say(NO_ROLES);
        }

        let role_id =
            pick(&mut self.prompter, "Which role would you like to delete?", &role_choices(&roles))?;
        self.repo.delete_role(role_id).await?;
        self.say("Role deleted successfully!")
    }

    async fn add_department(&mut self) -> Result<()> {
        let name = self.prompter.input("What is the name of the department?")?;
        let name = required("Department name", &name)?;

        let created = self.repo.create_department(&name).await?;
        debug!(id = created.id, "department created");
        self.say("Department added successfully!")
    }

    async fn delete_department(&mut self) -> Result<()> {
        let departments = self.repo.list_departments().await?;
        if departments.is_empty() {
            return self.say(NO_DEPARTMENTS);
        }

        let department_id = pick(
            &mut self.prompter,
            "Which department would you like to delete?",
            &department_choices(&departments),
        )?;
        self.repo.delete_department(department_id).await?;
        self.say("Department deleted successfully!")
    }

    async fn view_department_budget(&mut self) -> Result<()> {
        let departments = self.repo.list_departments().await?;
        if departments.is_empty() {
            return self.say(NO_DEPARTMENTS);
        }

        let department_id = pick(
            &mut self.prompter,
            "Which department would you like to view the budget for?",
            &department_choices(&departments),
        )?;

        match self.repo.department_budget(department_id).await? {
            Some(budget) => self.say(&format!(
                "The budget for {} is: ${}",
                budget.department,
                format_amount(budget.total_budget)
            )),
            None => self.say(&format!("No department with id {department_id}.")),
        }
    }

    fn print_table<T: serde::Serialize>(&mut self, rows: &[T]) -> Result<()> {
        let table = render_table(rows)?;
        writeln!(self.out, "{table}")?;
        Ok(())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }
}

/// One entry per employee, labelled with the full name
#[must_use]
pub fn employee_choices(employees: &[EmployeeListing]) -> Vec<Choice<i32>> {
    employees.iter().map(|e| Choice::new(e.full_name(), e.id)).collect()
}

/// "None" followed by every employee except `exclude`
#[must_use]
pub fn manager_choices(
    employees: &[EmployeeListing],
    exclude: Option<i32>,
) -> Vec<Choice<Option<i32>>> {
    std::iter::once(Choice::new("None", None))
        .chain(
            employees
                .iter()
                .filter(|e| Some(e.id) != exclude)
                .map(|e| Choice::new(e.full_name(), Some(e.id))),
        )
        .collect()
}

#[must_use]
pub fn role_choices(roles: &[RoleListing]) -> Vec<Choice<i32>> {
    roles.iter().map(|r| Choice::new(r.title.clone(), r.id)).collect()
}

#[must_use]
pub fn department_choices(departments: &[Department]) -> Vec<Choice<i32>> {
    departments.iter().map(|d| Choice::new(d.name.clone(), d.id)).collect()
}
