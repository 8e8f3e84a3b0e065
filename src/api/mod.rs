//! Client for the EduLog REST backend

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod client;
pub mod models;
pub mod reports;
pub mod students;

pub use client::{ApiClient, PendingRequest};
pub use models::*;
