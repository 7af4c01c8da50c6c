//! Sharded index lookup with per-instance caches.

use std::{collections::HashMap, sync::Arc};

use lectern_query::Query;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    CancelFlag, FragmentId, SearchError,
    collection::{CollectionInfo, INFO_FILE},
    fetch::{ResourceFetcher, fetch_json},
    shard::{STEMS_PATH, Shard, ShardKey, StemShard, StemTable, WordShard},
};

/// How a stemmed term was resolved, kept for building highlight patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StemInfo {
    /// The lookup word as typed (lowercased).
    pub word: String,
    /// The stem it mapped to.
    pub stem: String,
    /// Surface words that share the stem.
    pub words: Vec<String>,
}

/// Per-term results of an index lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexLookup {
    /// One entry per lookup term in term order; `None` when the term had no shard entry or
    /// its shard could not be loaded.
    pub hit_lists: Vec<Option<Vec<FragmentId>>>,
    /// Stem resolutions for terms found through the stem table.
    pub stems: Vec<StemInfo>,
}

impl IndexLookup {
    /// Returns the hit lists that were found.
    pub fn present(&self) -> Vec<&[FragmentId]> {
        self.hit_lists
            .iter()
            .flatten()
            .map(Vec::as_slice)
            .collect()
    }

    /// Returns true if no term produced a hit list.
    pub fn is_empty(&self) -> bool {
        self.hit_lists.iter().all(Option::is_none)
    }
}

/// Loads index shards for a collection, caching everything it fetches.
///
/// Caches live as long as the store. Shards are immutable once published, so a cached shard
/// is never refetched; collection metadata and stem tables are fetched at most once per
/// collection, including when the fetch fails.
pub struct ShardStore<F> {
    /// Resource transport.
    fetcher: F,
    /// Collection metadata by collection id.
    info: Mutex<HashMap<String, Arc<CollectionInfo>>>,
    /// Stem tables by collection id; `None` records an unavailable table.
    stems: Mutex<HashMap<String, Option<Arc<StemTable>>>>,
    /// Parsed shards by full resource path.
    shards: Mutex<HashMap<String, Arc<Shard>>>,
}

impl<F: ResourceFetcher> ShardStore<F> {
    /// Creates a store with empty caches.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            info: Mutex::new(HashMap::new()),
            stems: Mutex::new(HashMap::new()),
            shards: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the collection's metadata, or empty metadata if it cannot be loaded.
    pub async fn collection_info(&self, collection_id: &str) -> Arc<CollectionInfo> {
        let cached = self.info.lock().get(collection_id).cloned();
        if let Some(info) = cached {
            return info;
        }

        let path = format!("{collection_id}/{INFO_FILE}");
        let info = match fetch_json::<_, CollectionInfo>(&self.fetcher, &path).await {
            Ok(info) => info,
            Err(err) => {
                warn!(collection = collection_id, error = %err, "collection info unavailable");
                CollectionInfo {
                    id: collection_id.to_string(),
                    ..CollectionInfo::default()
                }
            }
        };

        let info = Arc::new(info);
        self.info
            .lock()
            .insert(collection_id.to_string(), Arc::clone(&info));
        info
    }

    /// Returns the collection's stem table, or `None` if it has none.
    pub async fn stem_table(&self, collection_id: &str) -> Option<Arc<StemTable>> {
        let cached = self.stems.lock().get(collection_id).cloned();
        if let Some(table) = cached {
            return table;
        }

        let path = format!("{collection_id}/{STEMS_PATH}");
        let table = match fetch_json::<_, StemTable>(&self.fetcher, &path).await {
            Ok(table) => {
                debug!(collection = collection_id, stems = table.len(), "stem table loaded");
                Some(Arc::new(table))
            }
            Err(err) => {
                warn!(
                    collection = collection_id,
                    error = %err,
                    "stem table unavailable; searching unstemmed shards"
                );
                None
            }
        };

        self.stems
            .lock()
            .insert(collection_id.to_string(), table.clone());
        table
    }

    /// Looks up every term of `query`, one shard fetch at a time in term order.
    ///
    /// With a stem table, plain terms are mapped to their stems and looked up in the stemmed
    /// shards; words missing from the table stand for themselves. Shard failures count as
    /// zero hits for that term. Cancellation is checked before each fetch.
    pub async fn load_indexes(
        &self,
        collection_id: &str,
        query: &Query,
        stems: Option<&StemTable>,
        cancel: &CancelFlag,
    ) -> Result<IndexLookup, SearchError> {
        let mut lookup = IndexLookup::default();

        for term in query.terms() {
            cancel.check()?;

            if query.is_lemma() {
                let hits = match ShardKey::for_lemma(term) {
                    Some(key) => self.word_hits(collection_id, key, term).await,
                    None => None,
                };
                lookup.hit_lists.push(hits);
                continue;
            }

            let Some(table) = stems else {
                let hits = self
                    .word_hits(collection_id, ShardKey::for_word(term), term)
                    .await;
                lookup.hit_lists.push(hits);
                continue;
            };

            let stem = table.get(term).cloned().unwrap_or_else(|| term.clone());
            let shard = self.shard(collection_id, ShardKey::for_stem(&stem)).await;
            match shard.as_deref().and_then(|s| s.stem(&stem)) {
                Some(entry) => {
                    lookup.hit_lists.push(Some(entry.fragmentids.clone()));
                    lookup.stems.push(StemInfo {
                        word: term.clone(),
                        stem,
                        words: entry.words.clone(),
                    });
                }
                None => lookup.hit_lists.push(None),
            }
        }

        debug!(
            collection = collection_id,
            terms = lookup.hit_lists.len(),
            found = lookup.present().len(),
            "index lookup finished"
        );
        Ok(lookup)
    }

    /// Returns the hit list for `term` in a word or lemma shard.
    async fn word_hits(
        &self,
        collection_id: &str,
        key: ShardKey,
        term: &str,
    ) -> Option<Vec<FragmentId>> {
        let shard = self.shard(collection_id, key).await?;
        shard.hits(term).map(<[FragmentId]>::to_vec)
    }

    /// Returns a parsed shard, fetching it on first use.
    async fn shard(&self, collection_id: &str, key: ShardKey) -> Option<Arc<Shard>> {
        let path = format!("{collection_id}/{}", key.path());
        let cached = self.shards.lock().get(&path).cloned();
        if cached.is_some() {
            return cached;
        }

        let parsed = if key.is_stemmed() {
            fetch_json::<_, StemShard>(&self.fetcher, &path)
                .await
                .map(Shard::Stems)
        } else {
            fetch_json::<_, WordShard>(&self.fetcher, &path)
                .await
                .map(Shard::Words)
        };

        match parsed {
            Ok(shard) => {
                let shard = Arc::new(shard);
                self.shards.lock().insert(path, Arc::clone(&shard));
                Some(shard)
            }
            Err(err) => {
                warn!(%path, error = %err, "shard unavailable; treating term as no hits");
                None
            }
        }
    }
}
