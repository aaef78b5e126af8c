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

//! High-level data types of the employee directory.

use derive_getters::Getters;
use derive_more::{Constructor, Display};
use iii_iv_core::model::{EmailAddress, ModelError, ModelResult};
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of first and last names, in characters.
pub(crate) const MAX_NAME_LENGTH: usize = 64;

/// Opaque identifier of an employee.  Identifiers are assigned by the server at creation time.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Generates a new random identifier.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the raw UUID backing this identifier.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EmployeeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Represents the first or last name of a person.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Creates a new name from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.trim().is_empty() {
            return Err(ModelError("Name cannot be empty".to_owned()));
        }
        if s.chars().count() > MAX_NAME_LENGTH {
            return Err(ModelError(format!("Name '{}' is too long", s)));
        }

        Ok(Self(s))
    }

    /// Creates a new name from an untrusted string `s`, without validation.  Useful for testing
    /// purposes only.
    #[cfg(test)]
    pub(crate) fn new_invalid<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns a string view of the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&str> for PersonName {
    fn from(raw_name: &str) -> Self {
        Self::new(raw_name).expect("Hardcoded names for testing must be valid")
    }
}

/// Visitor to deserialize a `PersonName` from a string.
struct PersonNameVisitor;

impl Visitor<'_> for PersonNameVisitor {
    type Value = PersonName;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-empty name")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        PersonName::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        PersonName::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for PersonName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(PersonNameVisitor)
    }
}

/// The client-supplied properties of an employee.
///
/// This is the payload of both creation and update requests.  Any `id` supplied by the client is
/// ignored because identifiers are owned by the server.
#[derive(Clone, Constructor, Debug, Deserialize, Eq, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFields {
    /// The first name of the employee.
    first_name: PersonName,

    /// The last name of the employee.
    last_name: PersonName,

    /// The email address of the employee, which is unique across all employees.
    email: EmailAddress,
}

/// An employee as stored in the directory.
#[derive(Clone, Debug, Eq, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// The identifier of the employee.
    id: EmployeeId,

    /// The first name of the employee.
    first_name: PersonName,

    /// The last name of the employee.
    last_name: PersonName,

    /// The email address of the employee, which is unique across all employees.
    email: EmailAddress,
}

impl Employee {
    /// Creates a new employee identified by `id` with the given `fields`.
    pub fn new(id: EmployeeId, fields: EmployeeFields) -> Self {
        let EmployeeFields { first_name, last_name, email } = fields;
        Self { id, first_name, last_name, email }
    }
}
