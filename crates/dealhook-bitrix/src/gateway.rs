use crate::Result;
use dealhook_core::{EntityKind, FieldUpdates, Record};

/// Read and write access to CRM entities.
pub trait CrmGateway {
    fn fetch_deal(&self, id: &str) -> Result<Option<Record>>;
    fn fetch_contact(&self, id: &str) -> Result<Option<Record>>;
    fn submit_update(&self, kind: EntityKind, id: &str, fields: &FieldUpdates) -> Result<()>;
}

impl<T: CrmGateway + ?Sized> CrmGateway for &T {
    fn fetch_deal(&self, id: &str) -> Result<Option<Record>> {
        (**self).fetch_deal(id)
    }

    fn fetch_contact(&self, id: &str) -> Result<Option<Record>> {
        (**self).fetch_contact(id)
    }

    fn submit_update(&self, kind: EntityKind, id: &str, fields: &FieldUpdates) -> Result<()> {
        (**self).submit_update(kind, id, fields)
    }
}
