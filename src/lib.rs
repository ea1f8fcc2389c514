//! Swellspot - surf spot discovery and session sharing backend

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
