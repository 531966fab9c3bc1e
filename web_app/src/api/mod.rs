//! # API Module
//!
//! Business logic behind the landing page endpoints. Each operation owns the
//! pipeline of one submission: store the lead, then run the best-effort side
//! effects (CRM relay, email notification) whose failures are only logged.
//!
//! ## Modules
//!
//! - [`call_request`] - Call-back requests relayed to the CRM
//! - [`subscription`] - Email subscriptions for product updates

pub mod call_request;
pub mod subscription;
