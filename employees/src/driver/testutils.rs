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

//! Utilities to help testing the business logic.

use crate::db;
use crate::driver::Driver;
use crate::model::{Employee, EmployeeFields, PersonName};
use iii_iv_core::db::{Db, Executor};
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
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(iii_iv_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone());
        Self { db, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Syntactic sugar to create an employee via the driver for testing purposes.
    pub(crate) async fn create_employee(
        &self,
        first_name: &'static str,
        last_name: &'static str,
        email: &'static str,
    ) -> Employee {
        self.driver().create_employee(fields(first_name, last_name, email)).await.unwrap()
    }
}
