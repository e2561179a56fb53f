pub mod app;
pub mod config;
pub mod db;
pub mod planner;
pub mod state;
pub mod sync;
