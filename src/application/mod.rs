// Application layer - use cases and the seams they depend on
pub mod chart_renderer;
pub mod clock;
pub mod report_builder;
pub mod sample_repository;
pub mod stats_service;
