//! Carpool sub-domain of the bookstore: cars, the customers who own them and
//! the transportations they provide.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use error::{Error, Result};
