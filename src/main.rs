//! givehub-demo entry point.
//!
//! Logs in (when `GIVEHUB_EMAIL` and `GIVEHUB_PASSWORD` are set), prints
//! active campaigns and streams live notifications until Ctrl-C.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use givehub_client::GiveHubClient;
use givehub_client::ws::{DONATION_RECEIVED, IMPACT_VERIFIED, MILESTONE_COMPLETED};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("GIVEHUB_LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let client = GiveHubClient::from_env().context("failed to configure client")?;
    tracing::info!(base_url = %client.session().base_url(), "starting givehub-demo");

    if let (Ok(email), Ok(password)) = (
        std::env::var("GIVEHUB_EMAIL"),
        std::env::var("GIVEHUB_PASSWORD"),
    ) {
        client
            .auth()
            .login(&email, &password)
            .await
            .context("login failed")?;
    }

    let campaigns = client
        .campaigns()
        .list(&[("status", "active"), ("page", "1"), ("limit", "10")])
        .await
        .context("failed to list campaigns")?;
    tracing::info!(%campaigns, "active campaigns");

    if !client.session().is_authenticated() {
        tracing::info!("not logged in; skipping notifications");
        return Ok(());
    }

    let notifications = client.notifications();
    let _donations = notifications.on(DONATION_RECEIVED, |event| {
        tracing::info!(amount = ?event.get("amount"), "new donation");
    });
    let _milestones = notifications.on(MILESTONE_COMPLETED, |event| {
        tracing::info!(milestone = ?event.get("milestone"), "milestone completed");
    });
    let _impact = notifications.on(IMPACT_VERIFIED, |event| {
        tracing::info!(metrics = ?event.get("metrics"), "impact verified");
    });
    notifications
        .connect()
        .await
        .context("failed to open notification channel")?;

    tokio::signal::ctrl_c().await?;
    notifications.disconnect().await;

    Ok(())
}
