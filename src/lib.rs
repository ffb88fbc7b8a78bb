pub mod actions;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod logs;
pub mod state;
pub mod views;
