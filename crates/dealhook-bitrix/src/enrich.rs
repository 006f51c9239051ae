use crate::gateway::CrmGateway;
use crate::BitrixError;
use dealhook_core::{
    CityDirectory, Composer, Contact, Deal, EntityKind, Enrichment, FieldUpdates, ResolvedCity,
    TimezoneLabel,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("invalid deal id: {0:?}")]
    InvalidDealId(String),
    #[error("deal not found: {0}")]
    DealNotFound(String),
    #[error("gateway error: {0}")]
    Gateway(#[from] BitrixError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOptions {
    /// Compute updates without submitting them.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    Applied,
    Skipped,
    DryRun,
    Failed { error: String },
}

impl UpdateStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, UpdateStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichReport {
    pub deal_id: String,
    pub contact_id: Option<String>,
    pub phone: Option<String>,
    pub city: Option<ResolvedCity>,
    pub timezone: Option<String>,
    pub contact_updates: FieldUpdates,
    pub deal_updates: FieldUpdates,
    pub contact_status: UpdateStatus,
    pub deal_status: UpdateStatus,
}

impl EnrichReport {
    pub fn is_complete(&self) -> bool {
        !self.contact_status.is_failed() && !self.deal_status.is_failed()
    }
}

/// Fetches a deal and its contact, derives updates and submits them.
pub struct Enricher<G> {
    gateway: G,
    composer: Composer,
    directory: Arc<CityDirectory>,
}

impl<G: CrmGateway> Enricher<G> {
    pub fn new(gateway: G, composer: Composer, directory: Arc<CityDirectory>) -> Self {
        Self {
            gateway,
            composer,
            directory,
        }
    }

    pub fn enrich(&self, deal_id: &str, options: EnrichOptions) -> Result<EnrichReport, EnrichError> {
        let deal_id = validate_deal_id(deal_id)?;
        info!(deal_id = %deal_id, dry_run = options.dry_run, "processing deal");

        let deal_record = self
            .gateway
            .fetch_deal(&deal_id)?
            .ok_or_else(|| EnrichError::DealNotFound(deal_id.clone()))?;
        let deal = Deal::from_record(&deal_id, &deal_record, self.composer.schema());

        let contact = match deal.contact_id.as_deref() {
            Some(contact_id) => {
                let contact = self
                    .gateway
                    .fetch_contact(contact_id)?
                    .map(|record| Contact::from_record(contact_id, &record));
                if contact.is_none() {
                    warn!(deal_id = %deal_id, contact_id, "linked contact not found");
                }
                contact
            }
            None => {
                debug!(deal_id = %deal_id, "deal has no linked contact");
                None
            }
        };

        let enrichment =
            Enrichment::derive(&deal, contact.as_ref(), &self.directory, &self.composer);
        log_derivation(&deal_id, &enrichment);

        let contact_status = match contact.as_ref() {
            Some(contact) => self.submit(
                EntityKind::Contact,
                &contact.id,
                &enrichment.contact_updates,
                options,
            ),
            None => UpdateStatus::Skipped,
        };
        let deal_status = self.submit(EntityKind::Deal, &deal.id, &enrichment.deal_updates, options);

        Ok(EnrichReport {
            deal_id,
            contact_id: contact.map(|contact| contact.id),
            phone: enrichment.phone,
            city: enrichment.city,
            timezone: enrichment.timezone.as_ref().map(TimezoneLabel::to_string),
            contact_updates: enrichment.contact_updates,
            deal_updates: enrichment.deal_updates,
            contact_status,
            deal_status,
        })
    }

    fn submit(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &FieldUpdates,
        options: EnrichOptions,
    ) -> UpdateStatus {
        if fields.is_empty() {
            return UpdateStatus::Skipped;
        }
        if options.dry_run {
            return UpdateStatus::DryRun;
        }
        match self.gateway.submit_update(kind, id, fields) {
            Ok(()) => {
                info!(%kind, id, fields = ?fields.field_names(), "update applied");
                UpdateStatus::Applied
            }
            Err(err) => {
                warn!(%kind, id, error = %err, "update failed");
                UpdateStatus::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}

fn log_derivation(deal_id: &str, enrichment: &Enrichment) {
    match (&enrichment.city, &enrichment.timezone) {
        (Some(city), Some(timezone)) => {
            info!(deal_id, city = %city.name, source = ?city.source, timezone = %timezone, "timezone resolved");
        }
        (Some(city), None) => {
            debug!(deal_id, city = %city.name, source = ?city.source, "city not in directory");
        }
        (None, _) => debug!(deal_id, "no city found"),
    }
    if enrichment.phone.is_none() {
        debug!(deal_id, "no contact phone");
    }
}

/// Bitrix24 entity ids are positive integers.
pub fn validate_deal_id(raw: &str) -> Result<String, EnrichError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(EnrichError::InvalidDealId(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
