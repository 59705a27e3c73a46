mod client;
pub(crate) mod types;

pub use client::ApiClient;
pub use types::{Cell, Dashboard};
