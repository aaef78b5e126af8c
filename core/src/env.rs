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

//! Utilities to deal with environment variables.
//!
//! Configuration is always read from variables named `<prefix>_<suffix>`, where the prefix groups
//! all settings of a single component (such as `PGSQL_PROD`) and the suffix names the setting.

use std::env;
use std::net::IpAddr;

/// Result type for environment errors.
type Result<T> = std::result::Result<T, String>;

/// Wrapper around an environment variable's value to support conversions to other types.
pub struct Value(String);

impl TryFrom<Value> for String {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Ok(value.0)
    }
}

/// Generates a `TryFrom<Value>` for a type that can be parsed by `FromStr`.
macro_rules! tryfrom_value_for_fromstr [
    ( $t:ty ) => {
        impl TryFrom<Value> for $t {
            type Error = String;

            fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
                value.0.parse::<$t>().map_err(|e| format!("Invalid {}: {}", stringify!($t), e))
            }
        }
    }
];

tryfrom_value_for_fromstr!(IpAddr);
tryfrom_value_for_fromstr!(u16);
tryfrom_value_for_fromstr!(u32);

/// Gets the raw value of the environment variable `<prefix>_<suffix>` and converts it to `T`.
///
/// Returns the name of the variable along with its value so that callers can construct meaningful
/// error messages.
fn get_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> (String, std::result::Result<Result<T>, env::VarError>) {
    let name = format!("{}_{}", prefix, suffix);
    let result = env::var(&name).map(|value| {
        Value(value)
            .try_into()
            .map_err(|e| format!("Invalid type in environment variable {}: {}", name, e))
    });
    (name, result)
}

/// Gets a required environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
pub fn get_required_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<T> {
    match get_var(prefix, suffix) {
        (_, Ok(value)) => value,
        (name, Err(env::VarError::NotPresent)) => {
            Err(format!("Required environment variable {} not present", name))
        }
        (name, Err(env::VarError::NotUnicode(_))) => {
            Err(format!("Invalid value in environment variable {}", name))
        }
    }
}

/// Gets an optional environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
///
/// A variable that is present but that cannot be converted to `T` is an error, not a missing
/// value.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>> {
    match get_var(prefix, suffix) {
        (_, Ok(value)) => value.map(Some),
        (_, Err(env::VarError::NotPresent)) => Ok(None),
        (name, Err(env::VarError::NotUnicode(_))) => {
            Err(format!("Invalid value in environment variable {}", name))
        }
    }
}
