pub mod db;
pub mod gateway_llm;
pub mod supabase;

pub use db::DbAdapter;
pub use gateway_llm::AiGatewayAdapter;
pub use supabase::SupabaseAdapter;

use std::time::Duration;

/// Builds an HTTP client whose requests give up after `timeout`.
///
/// The gateway and the backend each get their own client so a slow completion
/// budget never applies to auth or row writes.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
