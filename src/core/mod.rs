//! Core translation engine module

pub mod backend;
pub mod config;
pub mod errors;
pub mod marian;
pub mod mock;
pub mod models;
pub mod registry;
pub mod service;
