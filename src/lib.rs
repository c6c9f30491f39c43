pub mod catalog;
pub mod config;
pub mod search;
pub mod service;
pub mod util;

pub use config::LookupConfig;
pub use service::LookupService;
