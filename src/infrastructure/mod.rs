// Infrastructure layer - External dependencies and adapters
pub mod ascii_chart;
pub mod config;
pub mod csv_repository;
pub mod http_response;
pub mod system_clock;
