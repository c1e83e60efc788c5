//! Answer backends and the shared HTTP client

mod http_client;
mod simulated;

pub use http_client::{HttpClient, HttpClientTrait};
pub use simulated::{BackendConfig, SimulatedBackend};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
