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

//! Extends the driver with the operations on individual employees.

use crate::db;
use crate::driver::{Driver, email_taken, map_db_error};
use crate::model::{Employee, EmployeeFields, EmployeeId};
use iii_iv_core::db::DbError;
use iii_iv_core::driver::DriverResult;
use log::{debug, info};

impl Driver {
    /// Gets the employee identified by `id`.
    pub(crate) async fn get_employee(self, id: EmployeeId) -> DriverResult<Employee> {
        let mut ex = self.db.ex().await?;
        db::get_employee_by_id(&mut ex, id).await.map_err(|e| map_db_error(e, id))
    }

    /// Replaces the names and email of the employee identified by `id` with `fields`.
    pub(crate) async fn update_employee(
        self,
        id: EmployeeId,
        fields: EmployeeFields,
    ) -> DriverResult<Employee> {
        let mut tx = self.db.begin().await?;

        // A single statement covers both checks: an unknown id matches no rows so it is reported
        // as missing even if the email is taken, and keeping one's own email is not a conflict.
        let employee = match db::update_employee(tx.ex(), id, fields.clone()).await {
            Ok(employee) => employee,
            Err(DbError::AlreadyExists) => {
                debug!("Rejecting update of employee {} to taken email {}", id, fields.email());
                return Err(email_taken(&fields));
            }
            Err(e) => return Err(map_db_error(e, id)),
        };

        tx.commit().await?;
        info!("Updated employee {}", id);
        Ok(employee)
    }

    /// Deletes the employee identified by `id`.
    pub(crate) async fn delete_employee(self, id: EmployeeId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        db::delete_employee(tx.ex(), id).await.map_err(|e| map_db_error(e, id))?;
        tx.commit().await?;
        info!("Deleted employee {}", id);
        Ok(())
    }
}
