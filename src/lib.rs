pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod metoffice;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod series;
pub mod server;
pub mod store;
