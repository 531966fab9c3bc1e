use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::{ad_tracker, config, lead, logger, server};

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// WhatsApp message text to classify
    #[arg(short, long)]
    message: String,
    /// Sender profile name, used when the message names nobody
    #[arg(short, long)]
    profile_name: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Run the webhook server
    Serve,
    /// Print how a single message would be classified and parsed
    Inspect(InspectArgs),
}

/// WhatsApp intake relay for the Ruka landing page
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub ad_sourced: bool,
    pub campaign: Option<ad_tracker::AdCampaign>,
    pub lead: lead::ParsedLead,
}

impl InspectReport {
    pub fn new(message: &str, profile_name: Option<&str>) -> Self {
        let ad_sourced = ad_tracker::is_from_instagram_ad(message);

        Self {
            ad_sourced,
            campaign: ad_sourced.then(|| ad_tracker::campaign_details(message)),
            lead: lead::parse_lead_message(message, profile_name),
        }
    }
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Action::Serve => {
                logger::setup_simple_logger()?;
                let relay_config = config::init_config()?;

                server::run_server(relay_config).await
            }
            Action::Inspect(InspectArgs {
                message,
                profile_name,
            }) => {
                let report = InspectReport::new(message, profile_name.as_deref());
                println!("{}", serde_json::to_string_pretty(&report)?);

                Ok(())
            }
        }
    }
}
