pub mod client;
pub mod gateway;
mod paginator;
mod status;

pub use client::GitHubClient;
pub use gateway::SourceGateway;
