pub mod album;
pub mod history;
pub mod record;

pub use album::CatalogEntry;
pub use history::{HistoryEntry, Ledger};
pub use record::{AlbumRecord, ExternalIds, ExternalLinks, SelectionResult, StreamingLinks};
