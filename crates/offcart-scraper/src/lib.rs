pub mod client;
pub mod error;
pub mod extract;
pub mod identifier;
mod jsonld;
pub mod map;
pub mod rate_limit;
pub mod sink;
pub mod types;

pub use client::PageClient;
pub use error::ScrapeError;
pub use extract::PageExtractor;
pub use identifier::{normalize, Identifier};
pub use map::map_record;
pub use rate_limit::RequestGate;
pub use sink::{create_output, EmitOutcome, RecordSink};
pub use types::{FetchedPage, RawFields};
