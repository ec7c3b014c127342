pub mod app;
pub mod cache;
pub mod config;
pub mod format;
pub mod models;
pub mod render;
pub mod tmdb;
