//! Service implementations
//!
//! File-backed stores and the environment-backed site configuration used by
//! the command-line tool.

pub mod aid_store;
pub mod json_dir;
pub mod site_config;
pub mod staging;

#[cfg(test)]
mod tests;

pub use aid_store::FileAidStore;
pub use site_config::EnvSiteConfig;
pub use staging::FileStagingStore;
