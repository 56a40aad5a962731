//! Repository for the `employees` table.

use sqlx::PgPool;
use seatwise_core::types::DbId;

use crate::models::employee::{CreateEmployee, Employee};

/// Column list shared across queries. `salary` is cast so it decodes as text.
const COLUMNS: &str = "id, user_id, department, salary::TEXT AS salary, created_at, updated_at";

/// Provides lookups for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (user_id, department, salary)
             VALUES ($1, $2, COALESCE($3::NUMERIC, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(input.user_id)
            .bind(&input.department)
            .bind(input.salary.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Resolve an authenticated user id to its employee record.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE user_id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
