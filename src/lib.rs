pub mod config;
pub mod importer;
pub mod logs;
pub mod message;
pub mod pimcore;
pub mod storefront;
