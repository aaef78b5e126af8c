// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database abstraction to manipulate employees.

use crate::model::{Employee, EmployeeFields, EmployeeId, PersonName};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use iii_iv_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use iii_iv_core::db::sqlite;
use iii_iv_core::db::{DbError, DbResult, Executor};
use iii_iv_core::model::EmailAddress;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Reassembles an `Employee` from the raw values stored in a row, validating all of them.
fn build_employee(
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
) -> DbResult<Employee> {
    let fields = EmployeeFields::new(
        PersonName::new(first_name)?,
        PersonName::new(last_name)?,
        EmailAddress::new(email)?,
    );
    Ok(Employee::new(EmployeeId::from(id), fields))
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Employee {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(postgres::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;

        build_employee(id, first_name, last_name, email)
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Employee {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(sqlite::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;

        build_employee(id, first_name, last_name, email)
    }
}

/// Creates a new employee with the given `fields` and a freshly-generated identifier.
///
/// Fails with `AlreadyExists` if another employee already uses the same email address.
pub async fn create_employee(ex: &mut Executor, fields: EmployeeFields) -> DbResult<Employee> {
    let id = EmployeeId::generate();

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO employees (id, first_name, last_name, email)
                VALUES ($1, $2, $3, $4)";
            let done = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .bind(fields.first_name().as_str())
                .bind(fields.last_name().as_str())
                .bind(fields.email().as_str())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO employees (id, first_name, last_name, email)
                VALUES (?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .bind(fields.first_name().as_str())
                .bind(fields.last_name().as_str())
                .bind(fields.email().as_str())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        1 => Ok(Employee::new(id, fields)),
        n => Err(DbError::BackendError(format!("Insertion affected {} rows instead of one", n))),
    }
}

/// Gets all employees sorted by last name, first name and email.
pub async fn get_employees(ex: &mut Executor) -> DbResult<Vec<Employee>> {
    let mut employees = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email FROM employees
                ORDER BY last_name, first_name, email";
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                employees.push(Employee::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email FROM employees
                ORDER BY last_name, first_name, email";
            let mut rows = sqlx::query(query_str).fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                employees.push(Employee::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(employees)
}

/// Gets the employee identified by `id`.
pub async fn get_employee_by_id(ex: &mut Executor, id: EmployeeId) -> DbResult<Employee> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, first_name, last_name, email FROM employees WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Employee::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, first_name, last_name, email FROM employees WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Employee::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the employee that owns the `email` address, if any.
pub async fn get_employee_by_email(
    ex: &mut Executor,
    email: &EmailAddress,
) -> DbResult<Option<Employee>> {
    let row = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT id, first_name, last_name, email FROM employees WHERE email = $1";
            sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .map(Employee::try_from)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT id, first_name, last_name, email FROM employees WHERE email = ?";
            sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .map(Employee::try_from)
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    row.transpose()
}

/// Gets all employees whose first and last names match `first_name` and `last_name` exactly.
///
/// Names are not unique so this can return any number of employees, sorted by email.
pub async fn get_employees_by_name(
    ex: &mut Executor,
    first_name: &PersonName,
    last_name: &PersonName,
) -> DbResult<Vec<Employee>> {
    let mut employees = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email FROM employees
                WHERE first_name = $1 AND last_name = $2
                ORDER BY email";
            let mut rows = sqlx::query(query_str)
                .bind(first_name.as_str())
                .bind(last_name.as_str())
                .fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                employees.push(Employee::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email FROM employees
                WHERE first_name = ? AND last_name = ?
                ORDER BY email";
            let mut rows = sqlx::query(query_str)
                .bind(first_name.as_str())
                .bind(last_name.as_str())
                .fetch(ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                employees.push(Employee::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(employees)
}

/// Overwrites the name and email of the employee identified by `id` with `fields`.
///
/// Fails with `NotFound` if the employee does not exist and with `AlreadyExists` if the new email
/// address belongs to a different employee.
pub async fn update_employee(
    ex: &mut Executor,
    id: EmployeeId,
    fields: EmployeeFields,
) -> DbResult<Employee> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE employees SET first_name = $1, last_name = $2, email = $3
                WHERE id = $4";
            let done = sqlx::query(query_str)
                .bind(fields.first_name().as_str())
                .bind(fields.last_name().as_str())
                .bind(fields.email().as_str())
                .bind(*id.as_uuid())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE employees SET first_name = ?, last_name = ?, email = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(fields.first_name().as_str())
                .bind(fields.last_name().as_str())
                .bind(fields.email().as_str())
                .bind(*id.as_uuid())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(Employee::new(id, fields)),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the employee identified by `id`.
pub async fn delete_employee(ex: &mut Executor, id: EmployeeId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM employees WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM employees WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(*id.as_uuid())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
