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

//! REST interface for the employee directory.

use crate::driver::Driver;
use axum::Router;
use http::Method;
use tower_http::cors::{Any, CorsLayer};

mod employee_delete;
mod employee_get;
mod employee_put;
mod employees_get;
mod employees_post;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
///
/// Browsers are allowed to call the API from any origin.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    Router::new()
        .route("/api/v1/employees", get(employees_get::handler).post(employees_post::handler))
        .route(
            "/api/v1/employees/:id",
            get(employee_get::handler).put(employee_put::handler).delete(employee_delete::handler),
        )
        .layer(cors)
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use crate::model::Employee;
    use http::{Method, StatusCode};
    use iii_iv_core::rest::testutils::*;

    #[tokio::test]
    async fn test_e2e_crud_flow() {
        let context = TestContext::setup().await;

        let created = OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/employees"))
            .send_json(fields("Mohamed", "Ahmed", "mahmed@gmail.com"))
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<Employee>()
            .await;

        OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/employees"))
            .send_json(fields("Ahmed", "Samir", "mahmed@gmail.com"))
            .await
            .expect_status(StatusCode::CONFLICT)
            .expect_error("already exists")
            .await;

        let path = format!("/api/v1/employees/{}", created.id());

        let fetched = OneShotBuilder::new(context.app(), (Method::GET, &path))
            .send_empty()
            .await
            .expect_json::<Employee>()
            .await;
        assert_eq!(created, fetched);

        let new_fields = fields("Mohamed", "Ali", "mali@gmail.com");
        let updated = OneShotBuilder::new(context.app(), (Method::PUT, &path))
            .send_json(&new_fields)
            .await
            .expect_json::<Employee>()
            .await;
        assert_eq!(Employee::new(*created.id(), new_fields), updated);

        let all = OneShotBuilder::new(context.app(), (Method::GET, "/api/v1/employees"))
            .send_empty()
            .await
            .expect_json::<Vec<Employee>>()
            .await;
        assert_eq!(vec![updated], all);

        OneShotBuilder::new(context.app(), (Method::DELETE, &path))
            .send_empty()
            .await
            .expect_status(StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        OneShotBuilder::new(context.app(), (Method::GET, &path))
            .send_empty()
            .await
            .expect_status(StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;

        // The email of the deleted employee is free again.
        OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/employees"))
            .send_json(fields("Ahmed", "Samir", "mahmed@gmail.com"))
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<Employee>()
            .await;
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), (Method::OPTIONS, "/api/v1/employees"))
            .with_header(http::header::ORIGIN, "http://localhost:4200")
            .with_header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .with_header(http::header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .send_empty()
            .await
            .take_response()
            .await;

        let headers = response.headers();
        assert_eq!("*", headers.get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap());
        let methods = headers.get(http::header::ACCESS_CONTROL_ALLOW_METHODS).unwrap();
        assert_eq!("GET,POST,PUT,DELETE", methods);
        assert_eq!("*", headers.get(http::header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap());
    }

    #[tokio::test]
    async fn test_cors_simple_request() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), (Method::GET, "/api/v1/employees"))
            .with_header(http::header::ORIGIN, "http://example.com")
            .send_empty()
            .await
            .take_response()
            .await;

        let headers = response.headers();
        assert_eq!("*", headers.get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap());
    }
}
