use crate::commands::{build_enricher, print_json, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use dealhook_bitrix::{EnrichOptions, EnrichReport, UpdateStatus};
use dealhook_core::FieldUpdates;

#[derive(Debug, Args)]
pub struct EnrichArgs {
    pub deal_id: String,
    /// Compute updates without writing them back
    #[arg(long)]
    pub dry_run: bool,
}

pub fn enrich_deal(ctx: &Context<'_>, args: EnrichArgs) -> Result<()> {
    let enricher = build_enricher(ctx.config)?;
    let report = enricher
        .enrich(
            &args.deal_id,
            EnrichOptions {
                dry_run: args.dry_run,
            },
        )
        .with_context(|| format!("enrich deal {}", args.deal_id.trim()))?;

    if ctx.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if !report.is_complete() {
        return Err(anyhow!("one or more updates failed for deal {}", report.deal_id));
    }
    Ok(())
}

fn print_report(report: &EnrichReport) {
    println!("Deal {}", report.deal_id);
    match &report.contact_id {
        Some(id) => println!("Contact: {}", id),
        None => println!("Contact: none"),
    }
    if let Some(phone) = &report.phone {
        println!("Phone: {}", phone);
    }
    if let Some(city) = &report.city {
        println!(
            "City: {} ({})",
            city.name,
            report.timezone.as_deref().unwrap_or("unknown timezone")
        );
    }
    print_updates("Contact updates", &report.contact_updates, &report.contact_status);
    print_updates("Deal updates", &report.deal_updates, &report.deal_status);
}

fn print_updates(heading: &str, updates: &FieldUpdates, status: &UpdateStatus) {
    let label = match status {
        UpdateStatus::Applied => "applied".to_string(),
        UpdateStatus::Skipped => "nothing to update".to_string(),
        UpdateStatus::DryRun => "dry run".to_string(),
        UpdateStatus::Failed { error } => format!("failed: {}", error),
    };
    println!("{} ({}):", heading, label);
    for (field, value) in updates.iter() {
        println!("- {} = {}", field, value);
    }
}
