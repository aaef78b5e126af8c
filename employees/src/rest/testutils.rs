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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::{Employee, EmployeeFields, EmployeeId, PersonName};
use crate::rest::app;
use axum::Router;
use iii_iv_core::db::{Db, DbError};
use iii_iv_core::model::EmailAddress;
use std::sync::Arc;

/// Syntactic sugar to build the fields of an employee from hardcoded valid values.
pub(crate) fn fields(
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
) -> EmployeeFields {
    EmployeeFields::new(
        PersonName::from(first_name),
        PersonName::from(last_name),
        EmailAddress::from(email),
    )
}

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the REST app using an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(iii_iv_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let app = app(Driver::new(db.clone()));
        Self { db, app }
    }

    /// Returns a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Creates an employee by directly modifying the backing database.
    pub(crate) async fn create_employee(
        &self,
        first_name: &'static str,
        last_name: &'static str,
        email: &'static str,
    ) -> Employee {
        let mut ex = self.db.ex().await.unwrap();
        db::create_employee(&mut ex, fields(first_name, last_name, email)).await.unwrap()
    }

    /// Gets the employee identified by `id` straight from the database, if it exists.
    pub(crate) async fn get_employee(&self, id: EmployeeId) -> Option<Employee> {
        let mut ex = self.db.ex().await.unwrap();
        match db::get_employee_by_id(&mut ex, id).await {
            Ok(employee) => Some(employee),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets all employees straight from the database.
    pub(crate) async fn get_employees(&self) -> Vec<Employee> {
        let mut ex = self.db.ex().await.unwrap();
        db::get_employees(&mut ex).await.unwrap()
    }
}
