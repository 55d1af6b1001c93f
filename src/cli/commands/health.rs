//! Health Command
//!
//! Probe every configured provider and the idea store.

use serde::Serialize;

use crate::ai::ProviderHealth;
use crate::ai::provider::ProviderChain;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, serialize_as};
use crate::storage::StoreHealth;
use crate::types::Result;

#[derive(Debug, Serialize)]
struct HealthReport {
    providers: Vec<ProviderHealth>,
    storage_backend: &'static str,
    storage: StoreHealth,
}

pub async fn run(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let chain = ProviderChain::from_configs(
        &ctx.config.providers,
        ctx.config.chain_config(),
        &ctx.config.generation_options(),
    )?;

    let (providers, storage) = tokio::join!(chain.health_check(), ctx.store.health_check());
    let report = HealthReport {
        providers,
        storage_backend: ctx.store.backend(),
        storage,
    };

    match serialize_as(&report, format)? {
        Some(rendered) => println!("{}", rendered),
        None => {
            let output = Output::new();
            output.header("bizplan health");
            output.provider_health(&report.providers);
            output.store_health(report.storage_backend, &report.storage);
            if !report.providers.iter().any(|p| p.available) {
                println!();
                output.warning("No provider is reachable; generation will fail");
            }
        }
    }
    Ok(())
}
