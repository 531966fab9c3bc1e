//! # WhatsApp Webhook Module
//!
//! Webhook endpoints of both vendors, the payload schemas and the relay
//! pipeline shared by the two channels.

pub mod handler;
pub mod routes;
pub mod schemas;
