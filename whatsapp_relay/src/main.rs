//! # WhatsApp Relay
//!
//! Receives WhatsApp webhooks from Twilio and the Meta Cloud API, keeps the
//! messages coming from Instagram ads and forwards them as call requests to
//! the Ruka landing backend.

pub mod action;
pub mod ad_tracker;
pub mod config;
pub mod consts;
pub mod lead;
pub mod logger;
pub mod server;
pub mod services;
pub mod webhook;

use clap::Parser;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let args = action::AppArgs::parse();

    args.run().await
}
