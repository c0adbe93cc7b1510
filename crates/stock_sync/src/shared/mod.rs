pub mod api_log;
pub mod batch;
pub mod config;
pub mod marketplaces;
