//! The search orchestrator.
//!
//! A run moves through these phases:
//!
//! ```text
//! Idle -> StemmingLoad (optional) -> IndexLoad -> BruteForceBuild | IndexProcessed
//!      -> SectionScan (one section at a time) -> Complete
//! ```
//!
//! When a search server is configured, `ServerSearch` is tried first and, if it answers,
//! replaces the local pipeline entirely.
//!
//! Every fetch and section load is awaited before the next one starts, so a run never has
//! more than one request in flight. Only one run may be active per orchestrator.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use lectern_document::ContentStore;
use lectern_highlight::{DEFAULT_HIGHLIGHT_CLASS, MatchPlan};
use lectern_query::{JoinMode, MatchPattern, PatternKind, Query, QueryError};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    CancelFlag, FragmentId, SearchError,
    collection::DivisionFilter,
    fetch::ResourceFetcher,
    merge::{SectionBucket, brute_force_buckets, group_by_section, merge},
    report::{SearchProgress, SearchReporter},
    scan::{SearchResult, SectionScanner},
    server::{ServerResponse, ServerSearch},
    store::{ShardStore, StemInfo},
};

/// The phase a search run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No run has started, or the last one was canceled or failed.
    #[default]
    Idle,
    /// Loading the collection's stem table.
    StemmingLoad,
    /// Fetching per-term shards.
    IndexLoad,
    /// No term had a hit list; building buckets for every section.
    BruteForceBuild,
    /// Hit lists merged and grouped into section buckets.
    IndexProcessed,
    /// Loading and verifying section content.
    SectionScan,
    /// The last run completed.
    Complete,
    /// Waiting on the remote search server.
    ServerSearch,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::StemmingLoad => "stemming load",
            Self::IndexLoad => "index load",
            Self::BruteForceBuild => "brute force build",
            Self::IndexProcessed => "index processed",
            Self::SectionScan => "section scan",
            Self::Complete => "complete",
            Self::ServerSearch => "server search",
        };
        f.write_str(name)
    }
}

/// Where a run's results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Index candidates, verified against content.
    Index,
    /// Every section of the collection, verified against content.
    BruteForce,
    /// The remote search server.
    Server,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Index => "index",
            Self::BruteForce => "brute force",
            Self::Server => "server",
        })
    }
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// The collection to search.
    pub collection_id: String,
    /// The raw query text.
    pub query: String,
    /// Books to restrict the search to.
    pub divisions: DivisionFilter,
}

impl SearchRequest {
    /// Creates an unrestricted request.
    pub fn new(collection_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            query: query.into(),
            divisions: DivisionFilter::all(),
        }
    }

    /// Restricts the request to `divisions`.
    #[must_use]
    pub fn with_divisions(mut self, divisions: DivisionFilter) -> Self {
        self.divisions = divisions;
        self
    }
}

/// The result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Verified fragments in document order.
    pub results: Vec<SearchResult>,
    /// Sources of the match patterns used.
    pub patterns: Vec<String>,
    /// How terms were combined.
    pub join_mode: JoinMode,
    /// Whether this was a lemma search.
    pub is_lemma: bool,
    /// Where the results came from.
    pub source: ResultSource,
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Look terms up through stem tables when the collection has them.
    pub stemming: bool,
    /// Class written on highlight markup.
    pub highlight_class: String,
    /// Remote server to try before the local index.
    pub server: Option<ServerSearch>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            stemming: true,
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            server: None,
        }
    }
}

/// Clears the busy flag when a run ends, however it ends.
struct BusyGuard<'a> {
    /// The orchestrator's busy flag.
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Runs searches over one set of collections.
///
/// Caches (collection metadata, stem tables, shards) live as long as the orchestrator.
pub struct TextSearch<F, C> {
    /// Index shard lookup.
    store: ShardStore<F>,
    /// Section content verification.
    scanner: SectionScanner<C>,
    /// Settings.
    options: SearchOptions,
    /// Set while a run is active.
    is_searching: AtomicBool,
    /// Cancellation for the active run.
    cancel: CancelFlag,
    /// Current phase.
    phase: Mutex<SearchPhase>,
}

impl<F, C> TextSearch<F, C>
where
    F: ResourceFetcher + 'static,
    C: ContentStore + 'static,
{
    /// Creates an idle orchestrator.
    pub fn new(fetcher: F, content: C, options: SearchOptions) -> Self {
        Self {
            store: ShardStore::new(fetcher),
            scanner: SectionScanner::new(content),
            options,
            is_searching: AtomicBool::new(false),
            cancel: CancelFlag::new(),
            phase: Mutex::new(SearchPhase::Idle),
        }
    }

    /// Returns the shard store.
    pub fn store(&self) -> &ShardStore<F> {
        &self.store
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SearchPhase {
        *self.phase.lock()
    }

    /// Returns true while a run is active.
    pub fn is_searching(&self) -> bool {
        self.is_searching.load(Ordering::SeqCst)
    }

    /// Asks the active run to stop at its next suspension point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Starts a run in the background, reporting to `reporter`.
    ///
    /// Returns `false`, without emitting any event, if a run is already active. Must be
    /// called from within a Tokio runtime.
    pub fn start<R>(self: &Arc<Self>, request: SearchRequest, reporter: R) -> bool
    where
        R: SearchReporter + Send + 'static,
    {
        if !self.try_begin() {
            debug!(collection = %request.collection_id, "search rejected: already searching");
            return false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut reporter = reporter;
            let _busy = BusyGuard {
                flag: &this.is_searching,
            };
            match this.execute(&request, &mut reporter).await {
                Ok(_) | Err(SearchError::Canceled) => {}
                Err(err) => reporter.on_failed(&err),
            }
        });
        true
    }

    /// Runs a search to completion.
    ///
    /// Fails with [`SearchError::Busy`] if a run is already active.
    pub async fn run<R: SearchReporter>(
        &self,
        request: &SearchRequest,
        reporter: &mut R,
    ) -> Result<SearchOutcome, SearchError> {
        if !self.try_begin() {
            return Err(SearchError::Busy);
        }
        let _busy = BusyGuard {
            flag: &self.is_searching,
        };
        self.execute(request, reporter).await
    }

    /// Claims the busy flag and clears any stale cancellation.
    fn try_begin(&self) -> bool {
        let claimed = self
            .is_searching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if claimed {
            self.cancel.reset();
        }
        claimed
    }

    /// Records the current phase.
    fn set_phase(&self, phase: SearchPhase) {
        *self.phase.lock() = phase;
    }

    /// Runs the pipeline, resetting the phase to idle if it does not complete.
    async fn execute<R: SearchReporter>(
        &self,
        request: &SearchRequest,
        reporter: &mut R,
    ) -> Result<SearchOutcome, SearchError> {
        let result = self.pipeline(request, reporter).await;
        match &result {
            Ok(outcome) => {
                self.set_phase(SearchPhase::Complete);
                info!(
                    collection = %request.collection_id,
                    results = outcome.results.len(),
                    source = ?outcome.source,
                    "search complete"
                );
                reporter.on_complete(outcome);
            }
            Err(SearchError::Canceled) => {
                self.set_phase(SearchPhase::Idle);
                info!(collection = %request.collection_id, "search canceled");
            }
            Err(err) => {
                self.set_phase(SearchPhase::Idle);
                warn!(collection = %request.collection_id, error = %err, "search failed");
            }
        }
        result
    }

    /// The search pipeline proper.
    async fn pipeline<R: SearchReporter>(
        &self,
        request: &SearchRequest,
        reporter: &mut R,
    ) -> Result<SearchOutcome, SearchError> {
        let query = Query::parse(&request.query)?;
        let collection = request.collection_id.as_str();
        info!(
            collection,
            query = query.text(),
            join = %query.join_mode(),
            lemma = query.is_lemma(),
            "search started"
        );

        if let Some(server) = &self.options.server {
            self.set_phase(SearchPhase::ServerSearch);
            self.cancel.check()?;
            match server
                .search(collection, query.text(), &request.divisions)
                .await
            {
                Ok(response) => return self.server_outcome(&query, response),
                Err(err) => {
                    warn!(error = %err, "search server unavailable; using the local index");
                }
            }
        }

        self.cancel.check()?;
        let info = self.store.collection_info(collection).await;

        let stems = if self.options.stemming && info.stemming && !query.is_lemma() {
            self.set_phase(SearchPhase::StemmingLoad);
            self.cancel.check()?;
            self.store.stem_table(collection).await
        } else {
            None
        };

        self.set_phase(SearchPhase::IndexLoad);
        let lookup = self
            .store
            .load_indexes(collection, &query, stems.as_deref(), &self.cancel)
            .await?;

        let (buckets, source) = if lookup.is_empty() {
            self.set_phase(SearchPhase::BruteForceBuild);
            debug!(collection, "no hit lists; scanning every section");
            (
                brute_force_buckets(&info, &request.divisions),
                ResultSource::BruteForce,
            )
        } else {
            self.set_phase(SearchPhase::IndexProcessed);
            let merged = merge(&lookup.present(), query.join_mode(), &info.section_order());
            (
                group_by_section(&merged, &request.divisions),
                ResultSource::Index,
            )
        };
        reporter.on_index_ready(&buckets);

        let plan = self.plan(&query, &lookup.stems)?;
        let results = self
            .scan_sections(collection, &buckets, &plan, reporter)
            .await?;

        Ok(SearchOutcome {
            results,
            patterns: plan.pattern_sources(),
            join_mode: query.join_mode(),
            is_lemma: query.is_lemma(),
            source,
        })
    }

    /// Scans buckets one at a time, checking for cancellation before each load.
    async fn scan_sections<R: SearchReporter>(
        &self,
        collection: &str,
        buckets: &[SectionBucket],
        plan: &MatchPlan,
        reporter: &mut R,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.set_phase(SearchPhase::SectionScan);
        let total = buckets.len();
        let mut results = Vec::new();

        for (index, bucket) in buckets.iter().enumerate() {
            self.cancel.check()?;
            reporter.on_progress(&SearchProgress {
                section_id: bucket.section_id.clone(),
                index,
                total,
            });
            results.extend(self.scanner.scan(collection, bucket, plan).await);
        }

        Ok(results)
    }

    /// Builds the match plan, widening stemmed words to every surface form of their stem.
    fn plan(&self, query: &Query, stems: &[StemInfo]) -> Result<MatchPlan, QueryError> {
        let patterns = query
            .patterns()?
            .into_iter()
            .map(|pattern| widen_to_stem(pattern, stems))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MatchPlan::new(patterns, query.join_mode())
            .with_class(self.options.highlight_class.as_str()))
    }

    /// Verifies and highlights the snippets a search server returned.
    fn server_outcome(
        &self,
        query: &Query,
        response: ServerResponse,
    ) -> Result<SearchOutcome, SearchError> {
        let server_words = response
            .stem_words
            .clone()
            .filter(|_| !query.is_lemma())
            .unwrap_or_default();

        let plan = match server_words.split_first() {
            Some((first, rest)) => MatchPlan::new(
                vec![MatchPattern::alternation(first, rest)?],
                query.join_mode(),
            )
            .with_class(self.options.highlight_class.as_str()),
            None => self.plan(query, &[])?,
        };

        let results = response
            .snippets()
            .filter_map(|(id, html)| {
                plan.highlight(&html).map(|html| SearchResult {
                    fragment_id: FragmentId::new(id),
                    html,
                })
            })
            .collect();

        Ok(SearchOutcome {
            results,
            patterns: plan.pattern_sources(),
            join_mode: query.join_mode(),
            is_lemma: query.is_lemma(),
            source: ResultSource::Server,
        })
    }
}

/// Replaces a word pattern resolved through the stem table with an alternation over the
/// stem's surface words.
fn widen_to_stem(pattern: MatchPattern, stems: &[StemInfo]) -> Result<MatchPattern, QueryError> {
    if pattern.kind() != PatternKind::Word {
        return Ok(pattern);
    }
    match stems
        .iter()
        .find(|info| info.word.eq_ignore_ascii_case(pattern.term()))
    {
        Some(info) => MatchPattern::alternation(pattern.term(), &info.words),
        None => Ok(pattern),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::watch;

    use super::*;
    use crate::{
        ChannelReporter, FetcherContentStore, IndexError, SearchEvent, SilentReporter, hash_word,
    };

    /// In-memory fetcher recording every path requested, optionally held shut by a gate.
    #[derive(Clone)]
    struct MemoryFetcher {
        files: Arc<HashMap<String, String>>,
        requests: Arc<Mutex<Vec<String>>>,
        gate: Option<watch::Receiver<bool>>,
    }

    impl MemoryFetcher {
        fn new(files: HashMap<String, String>) -> Self {
            Self {
                files: Arc::new(files),
                requests: Arc::new(Mutex::new(Vec::new())),
                gate: None,
            }
        }

        fn gated(files: HashMap<String, String>) -> (Self, watch::Sender<bool>) {
            let (open, gate) = watch::channel(false);
            let fetcher = Self {
                gate: Some(gate),
                ..Self::new(files)
            };
            (fetcher, open)
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl ResourceFetcher for MemoryFetcher {
        async fn fetch(&self, path: &str) -> Result<String, IndexError> {
            if let Some(gate) = &self.gate {
                let mut gate = gate.clone();
                assert!(gate.wait_for(|open| *open).await.is_ok());
            }
            self.requests.lock().push(path.to_string());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| IndexError::NotFound {
                    path: path.to_string(),
                })
        }
    }

    type Search = TextSearch<MemoryFetcher, FetcherContentStore<MemoryFetcher>>;

    const JN1: &str = concat!(
        r#"<div class="c">1</div><div class="p">"#,
        r#"<span class="v" data-id="JN1_1"><span class="vn">1</span>In the beginning was the Word"#,
        r#"<span class="note">a. Or reason</span></span>"#,
        r#"<span class="v" data-id="JN1_2"><span class="vn">2</span>He was with God</span></div>"#,
    );

    const JN2: &str = concat!(
        r#"<div class="p"><span class="v" data-id="JN2_1">On the third day</span>"#,
        r#"<span class="v" data-id="JN2_2">a wedding took place</span>"#,
        r#"<span class="v" data-id="JN2_3">and the mother of Jesus was there</span></div>"#,
    );

    fn files() -> HashMap<String, String> {
        HashMap::from([
            (
                "kjv/info.json".to_string(),
                r#"{"id": "kjv", "sections": ["JN1", "JN2"], "fragment_counts": {"JN1": 2, "JN2": 3}}"#
                    .to_string(),
            ),
            (
                format!("kjv/index/_{}.json", hash_word("the")),
                r#"{"the": ["JN1_1", "JN2_3"]}"#.to_string(),
            ),
            (
                format!("kjv/index/_{}.json", hash_word("word")),
                r#"{"word": ["JN1_1"]}"#.to_string(),
            ),
            ("kjv/JN1.html".to_string(), JN1.to_string()),
            ("kjv/JN2.html".to_string(), JN2.to_string()),
        ])
    }

    fn options(stemming: bool) -> SearchOptions {
        SearchOptions {
            stemming,
            ..SearchOptions::default()
        }
    }

    fn search_over(fetcher: MemoryFetcher, stemming: bool) -> Search {
        TextSearch::new(
            fetcher.clone(),
            FetcherContentStore::new(fetcher),
            options(stemming),
        )
    }

    fn search(files: HashMap<String, String>) -> Search {
        search_over(MemoryFetcher::new(files), false)
    }

    fn result_ids(outcome: &SearchOutcome) -> Vec<&str> {
        outcome
            .results
            .iter()
            .map(|r| r.fragment_id.as_str())
            .collect()
    }

    async fn run(search: &Search, query: &str) -> SearchOutcome {
        search
            .run(&SearchRequest::new("kjv", query), &mut SilentReporter)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn and_query_intersects_and_highlights() {
        let search = search(files());
        let outcome = run(&search, "the word").await;

        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
        let html = &outcome.results[0].html;
        assert!(html.contains(r#"In <span class="highlight">the</span> beginning"#));
        assert!(html.contains(r#"<span class="highlight">Word</span>"#));
        assert!(!html.contains("reason"));
        assert_eq!(outcome.join_mode, JoinMode::And);
        assert_eq!(outcome.source, ResultSource::Index);
        assert!(!outcome.is_lemma);
        assert_eq!(outcome.patterns.len(), 2);
        assert_eq!(search.phase(), SearchPhase::Complete);
        assert!(!search.is_searching());
    }

    #[tokio::test]
    async fn or_query_keeps_duplicates_in_document_order() {
        let search = search(files());
        let outcome = run(&search, "the OR word").await;
        assert_eq!(result_ids(&outcome), vec!["JN1_1", "JN1_1", "JN2_3"]);
        assert_eq!(outcome.join_mode, JoinMode::Or);
    }

    #[tokio::test]
    async fn fetches_are_sequential_in_term_order() {
        let fetcher = MemoryFetcher::new(files());
        let search = search_over(fetcher.clone(), false);
        run(&search, "the word").await;
        assert_eq!(
            fetcher.requests(),
            vec![
                "kjv/info.json".to_string(),
                format!("kjv/index/_{}.json", hash_word("the")),
                format!("kjv/index/_{}.json", hash_word("word")),
                "kjv/JN1.html".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_shards_fall_back_to_brute_force() {
        let search = search(files());
        let outcome = run(&search, "mother").await;
        assert_eq!(outcome.source, ResultSource::BruteForce);
        assert_eq!(result_ids(&outcome), vec!["JN2_3"]);
    }

    #[tokio::test]
    async fn brute_force_honours_division_filter() {
        let search = search(files());
        let request =
            SearchRequest::new("kjv", "mother").with_divisions(DivisionFilter::new(["MT"]));
        let outcome = search.run(&request, &mut SilentReporter).await.unwrap();
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn unloadable_sections_are_skipped() {
        let mut files = files();
        files.remove("kjv/JN1.html");
        let search = search(files);
        let outcome = run(&search, "the OR word").await;
        assert_eq!(result_ids(&outcome), vec!["JN2_3"]);
    }

    #[tokio::test]
    async fn stale_index_entries_are_verified_away() {
        let mut files = files();
        files.insert(
            format!("kjv/index/_{}.json", hash_word("god")),
            r#"{"god": ["JN1_2", "JN2_1"]}"#.to_string(),
        );
        let search = search(files);
        let outcome = run(&search, "god").await;
        assert_eq!(result_ids(&outcome), vec!["JN1_2"]);
    }

    #[tokio::test]
    async fn stemmed_terms_highlight_every_surface_form() {
        let mut files = files();
        files.insert(
            "kjv/index/stems.json".to_string(),
            r#"{"words": "word", "word": "word"}"#.to_string(),
        );
        files.insert(
            format!("kjv/index/_stems_{}.json", hash_word("word")),
            r#"{"word": {"fragmentids": ["JN1_1"], "words": ["word", "words"]}}"#.to_string(),
        );
        let search = search_over(MemoryFetcher::new(files), true);

        let outcome = run(&search, "words").await;
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
        assert!(
            outcome.results[0]
                .html
                .contains(r#"<span class="highlight">Word</span>"#)
        );
    }

    #[tokio::test]
    async fn missing_stem_table_uses_raw_shards() {
        let search = search_over(MemoryFetcher::new(files()), true);
        let outcome = run(&search, "the word").await;
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
        assert_eq!(outcome.source, ResultSource::Index);
    }

    #[tokio::test]
    async fn malformed_stem_table_uses_raw_shards() {
        let mut files = files();
        files.insert("kjv/index/stems.json".to_string(), "not json".to_string());
        let fetcher = MemoryFetcher::new(files);
        let search = search_over(fetcher.clone(), true);

        let outcome = run(&search, "the word").await;
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
        assert_eq!(outcome.source, ResultSource::Index);
        let requests = fetcher.requests();
        assert!(requests.contains(&"kjv/index/stems.json".to_string()));
        assert!(requests.contains(&format!("kjv/index/_{}.json", hash_word("word"))));
    }

    #[tokio::test]
    async fn malformed_shard_counts_as_no_hits() {
        let mut files = files();
        files.insert(
            format!("kjv/index/_{}.json", hash_word("word")),
            "not json".to_string(),
        );
        let search = search(files);

        let outcome = run(&search, "the word").await;
        assert_eq!(outcome.source, ResultSource::Index);
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
    }

    #[tokio::test]
    async fn lemma_queries_mark_attributes() {
        let mut files = files();
        files.insert(
            "kjv/JN1.html".to_string(),
            r#"<span data-id="JN1_1">In the beginning was the <w s="G3056">Word</w></span>"#
                .to_string(),
        );
        files.insert(
            "kjv/indexlemma/_G3000.json".to_string(),
            r#"{"G3056": ["JN1_1"]}"#.to_string(),
        );
        let search = search(files);
        let outcome = run(&search, "G3056").await;
        assert!(outcome.is_lemma);
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
        assert!(
            outcome.results[0]
                .html
                .contains(r#"<w class="highlight" s="G3056">Word</w>"#)
        );
    }

    #[tokio::test]
    async fn empty_query_is_an_error() {
        let search = search(files());
        let result = search
            .run(&SearchRequest::new("kjv", "  OR  "), &mut SilentReporter)
            .await;
        assert!(matches!(result, Err(SearchError::Query(QueryError::Empty))));
        assert_eq!(search.phase(), SearchPhase::Idle);
        assert!(!search.is_searching());
    }

    #[tokio::test]
    async fn reports_progress_and_completion() {
        let search = search(files());
        let (mut reporter, mut events) = ChannelReporter::new();
        search
            .run(&SearchRequest::new("kjv", "the OR word"), &mut reporter)
            .await
            .unwrap();

        let Some(SearchEvent::IndexReady { buckets }) = events.recv().await else {
            panic!("expected index-ready first");
        };
        assert_eq!(buckets.len(), 2);
        assert_eq!(
            events.recv().await,
            Some(SearchEvent::Progress(SearchProgress {
                section_id: "JN1".into(),
                index: 0,
                total: 2,
            }))
        );
        assert!(matches!(events.recv().await, Some(SearchEvent::Progress(_))));
        assert!(matches!(events.recv().await, Some(SearchEvent::Complete(_))));
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_busy() {
        let (fetcher, open) = MemoryFetcher::gated(files());
        let search = Arc::new(search_over(fetcher, false));
        let (reporter, mut events) = ChannelReporter::new();

        assert!(search.start(SearchRequest::new("kjv", "the word"), reporter));
        assert!(!search.start(SearchRequest::new("kjv", "the word"), SilentReporter));
        assert!(search.is_searching());
        let busy = search
            .run(&SearchRequest::new("kjv", "the"), &mut SilentReporter)
            .await;
        assert!(matches!(busy, Err(SearchError::Busy)));

        open.send(true).unwrap();
        let mut completed = None;
        while let Some(event) = events.recv().await {
            if let SearchEvent::Complete(outcome) = event {
                completed = Some(outcome);
            }
        }
        assert_eq!(result_ids(&completed.unwrap()), vec!["JN1_1"]);
        assert!(!search.is_searching());
        assert!(search.start(SearchRequest::new("kjv", "word"), SilentReporter));
    }

    #[tokio::test]
    async fn canceled_run_emits_nothing_and_releases_guard() {
        let (fetcher, open) = MemoryFetcher::gated(files());
        let search = Arc::new(search_over(fetcher.clone(), false));
        let (reporter, mut events) = ChannelReporter::new();

        assert!(search.start(SearchRequest::new("kjv", "the word"), reporter));
        search.cancel();
        open.send(true).unwrap();

        assert_eq!(events.recv().await, None);
        assert!(!search.is_searching());
        assert_eq!(search.phase(), SearchPhase::Idle);
        assert!(fetcher.requests().is_empty());

        let outcome = search
            .run(&SearchRequest::new("kjv", "the word"), &mut SilentReporter)
            .await
            .unwrap();
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
    }

    #[test]
    fn widening_only_touches_stemmed_words() {
        let stems = vec![StemInfo {
            word: "words".into(),
            stem: "word".into(),
            words: vec!["word".into(), "worded".into()],
        }];
        let widened = widen_to_stem(MatchPattern::word("words").unwrap(), &stems).unwrap();
        assert!(widened.is_match("it was worded"));
        assert_eq!(widened.term(), "words");

        let other = widen_to_stem(MatchPattern::word("light").unwrap(), &stems).unwrap();
        assert!(!other.is_match("worded"));
    }

    #[test]
    fn server_snippets_are_verified() {
        let search = search(files());
        let query = Query::parse("the word").unwrap();
        let response: ServerResponse = serde_json::from_str(
            r#"{"results": [{"JN1_1": "In the beginning was the Word"}, {"JN2_3": "the mother"}]}"#,
        )
        .unwrap();
        let outcome = search.server_outcome(&query, response).unwrap();
        assert_eq!(outcome.source, ResultSource::Server);
        assert_eq!(result_ids(&outcome), vec!["JN1_1"]);
    }

    #[test]
    fn server_stem_words_replace_patterns() {
        let search = search(files());
        let query = Query::parse("love").unwrap();
        let response: ServerResponse = serde_json::from_str(
            r#"{"results": [{"JN3_16": "God so loved the world"}], "stem_words": ["love", "loved"]}"#,
        )
        .unwrap();
        let outcome = search.server_outcome(&query, response).unwrap();
        assert_eq!(outcome.patterns.len(), 1);
        assert_eq!(
            outcome.results[0].html,
            r#"God so <span class="highlight">loved</span> the world"#
        );
    }
}
