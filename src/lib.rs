//! Client library for a wire service's flat-file election results feed.
//!
//! The feed publishes static "init" files (races, reporting units and
//! candidates, pipe-delimited) and live "flat" files (results and delegate
//! totals, semicolon-delimited with repeating candidate groups). This crate
//! decodes both formats, assembles them into an in-memory entity graph, and
//! folds successive downloads into a fresh, queryable snapshot.
//!
//! ```no_run
//! use election_wire::{Client, MemoryTransport};
//!
//! # fn main() -> Result<(), election_wire::FeedError> {
//! let mut client = Client::new(MemoryTransport::new());
//! let mut iowa = client.get_state("IA")?;
//! for race in iowa.races() {
//!     println!("{}: {} votes cast", race.name(), race.votes_cast);
//! }
//! // Poll again later; the same graph is updated in place.
//! client.update_results(&mut iowa)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod crosswalk;
pub mod decode;
pub mod election;
pub mod merge;
pub mod model;
pub mod transport;

pub use client::{Client, FeedError, FeedPaths, FetchOptions, LEADING_ZERO_FIPS_STATES};
pub use election::{Election, LookupError, RaceFilter};
pub use merge::MergeStats;
pub use model::{Candidate, Race, ReportingUnit, VoteResult, STATEWIDE_FIPS};
pub use transport::{FileTransport, MemoryTransport, TransportError};
