pub mod fields;
pub mod phone;
pub mod record;

pub use fields::{ContactFields, DealFields, EntityKind, FieldSchema, FieldUpdates};
pub use phone::normalize_phone;
pub use record::{Contact, Deal, Record};
