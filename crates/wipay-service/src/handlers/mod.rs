//! HTTP request handlers.

pub mod accounts;
pub mod admin;
pub mod health;
pub mod invoices;
pub mod reports;
pub mod subscription;
pub mod tokens;
pub mod webhooks;
