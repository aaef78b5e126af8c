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

//! Extends the driver with the operations on the collection of employees.

use crate::db;
use crate::driver::{Driver, email_taken};
use crate::model::{Employee, EmployeeFields};
use iii_iv_core::db::DbError;
use iii_iv_core::driver::DriverResult;
use log::{debug, info};

impl Driver {
    /// Creates a new employee with `fields`, assigning it a fresh identifier.
    ///
    /// Email addresses are unique across employees so this fails if another employee already
    /// uses the requested one.
    pub(crate) async fn create_employee(self, fields: EmployeeFields) -> DriverResult<Employee> {
        let mut tx = self.db.begin().await?;

        // Duplicates are detected by the unique index.  Looking up the email before inserting
        // makes concurrent SQLite transactions deadlock.
        let employee = match db::create_employee(tx.ex(), fields.clone()).await {
            Ok(employee) => employee,
            Err(DbError::AlreadyExists) => {
                debug!("Rejecting creation of employee with duplicate email {}", fields.email());
                return Err(email_taken(&fields));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        info!("Created employee {} with email {}", employee.id(), employee.email());
        Ok(employee)
    }

    /// Gets all employees sorted by last name, first name and email.
    pub(crate) async fn get_employees(self) -> DriverResult<Vec<Employee>> {
        let mut ex = self.db.ex().await?;
        let employees = db::get_employees(&mut ex).await?;
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::PersonName;
    use iii_iv_core::driver::DriverError;
    use iii_iv_core::model::EmailAddress;

    #[tokio::test]
    async fn test_create_employee_ok() {
        let context = TestContext::setup().await;

        let fields = fields("Mohamed", "Ahmed", "mahmed@gmail.com");
        let employee = context.driver().create_employee(fields.clone()).await.unwrap();
        assert_eq!(Employee::new(*employee.id(), fields), employee);

        let mut ex = context.ex().await;
        assert_eq!(employee, db::get_employee_by_id(&mut ex, *employee.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_employee_duplicate_email() {
        let context = TestContext::setup().await;

        let existing = context.create_employee("Mohamed", "Ahmed", "mahmed@gmail.com").await;

        match context
            .driver()
            .create_employee(fields("Ahmed", "Samir", "mahmed@gmail.com"))
            .await
        {
            Err(DriverError::AlreadyExists(msg)) => {
                assert_eq!("Employee with email mahmed@gmail.com already exists", msg)
            }
            e => panic!("{:?}", e),
        }

        let mut ex = context.ex().await;
        assert_eq!(vec![existing], db::get_employees(&mut ex).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_employee_concurrent_same_email() {
        let context = TestContext::setup().await;

        let (result1, result2) = tokio::join!(
            context.driver().create_employee(fields("Mohamed", "Ahmed", "mahmed@gmail.com")),
            context.driver().create_employee(fields("Ahmed", "Samir", "mahmed@gmail.com")),
        );

        let (created, rejected) = match (result1, result2) {
            (Ok(employee), Err(e)) => (employee, e),
            (Err(e), Ok(employee)) => (employee, e),
            results => panic!("{:?}", results),
        };
        assert_eq!(
            DriverError::AlreadyExists(
                "Employee with email mahmed@gmail.com already exists".to_owned()
            ),
            rejected
        );

        let mut ex = context.ex().await;
        assert_eq!(vec![created], db::get_employees(&mut ex).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_employee_same_name_different_email() {
        let context = TestContext::setup().await;

        let employee1 = context.create_employee("Mohamed", "Ahmed", "mahmed1@gmail.com").await;
        let employee2 = context.create_employee("Mohamed", "Ahmed", "mahmed2@gmail.com").await;
        assert_ne!(employee1.id(), employee2.id());

        let mut ex = context.ex().await;
        assert_eq!(
            vec![employee1, employee2],
            db::get_employees_by_name(
                &mut ex,
                &PersonName::from("Mohamed"),
                &PersonName::from("Ahmed")
            )
            .await
            .unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_employees_empty() {
        let context = TestContext::setup().await;

        assert!(context.driver().get_employees().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_employees_sorted() {
        let context = TestContext::setup().await;

        let samir = context.create_employee("Ahmed", "Samir", "asamir@gmail.com").await;
        let ahmed = context.create_employee("Mohamed", "Ahmed", "mahmed@gmail.com").await;

        assert_eq!(vec![ahmed, samir], context.driver().get_employees().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_employees_propagates_corruption() {
        let context = TestContext::setup().await;

        let mut ex = context.ex().await;
        db::create_employee(
            &mut ex,
            EmployeeFields::new(
                PersonName::from("Mohamed"),
                PersonName::from("Ahmed"),
                EmailAddress::new_invalid("corrupted"),
            ),
        )
        .await
        .unwrap();
        drop(ex);

        match context.driver().get_employees().await {
            Err(DriverError::BackendError(msg)) => assert!(msg.contains("Data integrity error")),
            e => panic!("{:?}", e),
        }
    }
}
