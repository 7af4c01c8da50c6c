//! Sharded index lookup and the search pipeline for lectern.
//!
//! A collection is published as static files: hashed JSON shards mapping words (or stems, or
//! lemma codes) to fragment ids, a metadata file, and one HTML file per section. This crate
//! turns a query into shard fetches, merges the per-term hit lists, groups candidates by
//! section, and re-verifies every candidate against the live section content before it
//! becomes a result.
//!
//! - [`ShardStore`]: shard, stem table and metadata fetching with per-instance caches
//! - [`merge`], [`group_by_section`], [`brute_force_buckets`]: candidate assembly
//! - [`SectionScanner`]: section loading, fragment extraction and verification
//! - [`TextSearch`]: the orchestrator, with a single-run guard and cooperative cancellation
//!
//! # Example
//!
//! ```no_run
//! use lectern_index::{
//!     FetcherContentStore, FsFetcher, SearchOptions, SearchRequest, SilentReporter, TextSearch,
//! };
//!
//! # async fn demo() -> Result<(), lectern_index::SearchError> {
//! let fetcher = FsFetcher::new("/srv/texts");
//! let search = TextSearch::new(
//!     fetcher.clone(),
//!     FetcherContentStore::new(fetcher),
//!     SearchOptions::default(),
//! );
//! let outcome = search
//!     .run(&SearchRequest::new("eng_kjv", "the word"), &mut SilentReporter)
//!     .await?;
//! for result in &outcome.results {
//!     println!("{}: {}", result.fragment_id, result.html);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cancel;
mod collection;
mod content;
mod error;
mod fetch;
mod id;
mod merge;
mod report;
mod scan;
mod search;
mod server;
mod shard;
mod store;

pub use cancel::CancelFlag;
pub use collection::{CollectionInfo, DivisionFilter, INFO_FILE, SectionOrder};
pub use content::{FetcherContentStore, section_path};
pub use error::{IndexError, SearchError};
pub use fetch::{Fetcher, FsFetcher, HttpFetcher, ResourceFetcher, fetch_json, is_url};
pub use id::{FragmentId, book_code};
pub use merge::{SectionBucket, brute_force_buckets, group_by_section, merge};
pub use report::{ChannelReporter, SearchEvent, SearchProgress, SearchReporter, SilentReporter};
pub use scan::{SearchResult, SectionScanner};
pub use search::{
    ResultSource, SearchOptions, SearchOutcome, SearchPhase, SearchRequest, TextSearch,
};
pub use server::{ServerResponse, ServerSearch};
pub use shard::{
    HASH_SIZE, STEMS_PATH, Shard, ShardKey, StemEntry, StemShard, StemTable, WordShard, hash_word,
};
pub use store::{IndexLookup, ShardStore, StemInfo};
