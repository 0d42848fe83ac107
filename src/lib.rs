pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod form;
pub mod report;
