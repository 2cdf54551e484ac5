//! services/api/src/bin/openapi.rs
//!
//! Dumps the study assistant's OpenAPI document so front-end clients can be
//! generated without starting the server. Usage: `openapi [OUTPUT]`, where
//! `OUTPUT` defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use std::{error::Error, fs};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let document = ApiDoc::openapi().to_pretty_json()?;
    fs::write(&output, document)?;

    println!("Wrote the process-document and chat-with-document API to {}", output);
    Ok(())
}
