// Typed client for an environment on the hosting platform's management API

pub mod client;
pub mod environment;
pub mod http;
pub mod transport;

pub use client::ApiClient;
pub use environment::EnvironmentResource;
pub use http::HttpTransport;
pub use transport::{Method, Response, Transport};

pub use cloudenv_core::{Error, Result};
