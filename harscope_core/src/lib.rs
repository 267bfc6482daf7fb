//! Harscope Core - Trace query and view engine for the harscope HAR viewer
//!
//! This crate owns everything that does not touch the terminal:
//! the HAR ingestion contract, the canonical trace store with its derived
//! filtered/sorted view, the virtualized row window, the timeline projection
//! and the selection rules shared by all of them.

pub mod debounce;
pub mod entry;
pub mod error;
pub mod filter;
pub mod generator;
pub mod har;
pub mod ingest;
pub mod sort;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod view;
pub mod window;

pub use entry::{Entry, EntryId, ResourceType};
pub use error::{ImportError, ParseError};
pub use filter::{FilterCriteria, FilterType, TypeFilter};
pub use har::HarEntry;
pub use ingest::{parse_har, ImportSource};
pub use sort::{SortCriteria, SortDirection, SortKey};
pub use stats::TraceStats;
pub use store::{ImportOutcome, ImportTicket, TraceStore};
pub use timeline::{Bar, TimeAxis, Timeline, TimelineGeometry};
pub use window::{RowSize, Virtualizer, Window};
