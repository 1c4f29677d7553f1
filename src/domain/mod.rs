pub mod batch_query;
pub mod email_entry;
pub mod email_update;

pub use batch_query::BatchQuery;
pub use email_entry::EmailEntry;
pub use email_update::EmailUpdate;
