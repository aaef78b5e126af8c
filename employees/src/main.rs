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

//! Entry point to the employee directory service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use iii_iv_core::db::Db;
use iii_iv_core::db::postgres::{PostgresDb, PostgresOptions};
use iii_iv_employees::db::init_schema;
use iii_iv_employees::{ServerOptions, serve};
use log::{info, warn};
use std::error::Error;
use std::sync::Arc;

/// Waits until the process is asked to terminate.
async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!("Cannot listen for shutdown signals: {}", e),
    }
}

/// Prepares the database and serves the app until shutdown is requested.
async fn run(server_opts: ServerOptions, db: Arc<PostgresDb>) -> Result<(), Box<dyn Error>> {
    init_schema(&mut db.ex().await?).await?;
    serve(server_opts.bind_addr(), db, wait_for_shutdown()).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let server_opts = ServerOptions::from_env("EMPLOYEES")?;
    let db_opts = PostgresOptions::from_env("PGSQL_PROD")?;
    let db = Arc::new(PostgresDb::connect(db_opts)?);

    let result = run(server_opts, db.clone()).await;
    db.close().await;
    result
}
