use crate::commands::{build_enricher, Context};
use crate::server;
use anyhow::{Context as _, Result};
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the config
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

pub fn serve(ctx: &Context<'_>, args: ServeArgs) -> Result<()> {
    let listen = args.listen.unwrap_or(ctx.config.server.listen);
    // The blocking HTTP client must be created and dropped outside the runtime.
    let enricher = Arc::new(build_enricher(ctx.config)?);
    let state = server::AppState::new(Arc::clone(&enricher), ctx.config.directory.version());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "start async runtime")?;
    runtime.block_on(server::run(listen, state))?;
    drop(runtime);
    Ok(())
}
