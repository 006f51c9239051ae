use anyhow::{Context as _, Result};
use dealhook_bitrix::{BitrixClient, Enricher};
use dealhook_config::AppConfig;
use dealhook_core::Composer;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

pub mod city;
pub mod completions;
pub mod enrich;
pub mod phone;
pub mod serve;

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub fn build_enricher(config: &AppConfig) -> Result<Enricher<BitrixClient>> {
    let url = config.require_webhook_url()?.clone();
    let client = BitrixClient::new(url, config.bitrix.timeout, config.bitrix.connect_timeout)
        .with_context(|| "build bitrix client")?;
    let composer = Composer::new(config.fields.clone(), config.links.clone());
    Ok(Enricher::new(client, composer, Arc::clone(&config.directory)))
}
