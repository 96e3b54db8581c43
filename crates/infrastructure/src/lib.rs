//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod frappe_session_api;

pub use frappe_session_api::FrappeSessionApi;
