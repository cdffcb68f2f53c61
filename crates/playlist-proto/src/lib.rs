pub mod api;
pub mod config;
pub mod entry;
pub mod error;
pub mod platform;
pub mod view;
