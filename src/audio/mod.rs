//! Production audio backend using kira.

mod kira_backend;

pub use kira_backend::KiraCueBackend;
