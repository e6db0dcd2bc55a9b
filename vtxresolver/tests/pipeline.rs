use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use vtxcache::{ManualClock, MemoryCache, ResultCache};
use vtxresolver::{DurationTolerance, ResolveError, Resolver, WarmUpSettings};
use vtxsource::{
    InstancePool, Lookup, Result, SourceError, SourceKind, StreamDescriptor, StreamSource, TrackId,
    TrackRequest, TrackSearch,
};

const NATIVE: &str = "dQw4w9WgXcQ";

#[derive(Debug, Clone)]
enum Answer {
    Stream { delay_ms: u64, duration: Option<u32> },
    Fail { delay_ms: u64 },
}

#[derive(Debug)]
struct FakePool {
    kind: SourceKind,
    answers: Vec<(String, Answer)>,
    queried: Mutex<Vec<String>>,
}

impl FakePool {
    fn new(kind: SourceKind, answers: Vec<(&str, Answer)>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            answers: answers
                .into_iter()
                .map(|(name, answer)| (name.to_string(), answer))
                .collect(),
            queried: Mutex::new(Vec::new()),
        })
    }

    fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstancePool for FakePool {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn instance_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn instances(&self) -> Vec<String> {
        self.answers.iter().map(|(name, _)| name.clone()).collect()
    }

    async fn query(&self, instance: &str, video_id: &str) -> Result<StreamDescriptor> {
        self.queried.lock().unwrap().push(video_id.to_string());
        let answer = self
            .answers
            .iter()
            .find(|(name, _)| name == instance)
            .map(|(_, a)| a.clone())
            .ok_or_else(|| SourceError::unavailable("unknown instance"))?;

        match answer {
            Answer::Stream { delay_ms, duration } => {
                sleep(Duration::from_millis(delay_ms)).await;
                Ok(StreamDescriptor::new(self.kind, format!("https://{}/{}", instance, video_id))?
                    .with_duration(duration))
            }
            Answer::Fail { delay_ms } => {
                sleep(Duration::from_millis(delay_ms)).await;
                Err(SourceError::unavailable("instance down"))
            }
        }
    }
}

#[derive(Debug)]
struct FakeSource {
    kind: SourceKind,
    delay: Duration,
    succeed: AtomicUsize,
    catalog_only: bool,
    calls: AtomicUsize,
    order: Arc<Mutex<Vec<SourceKind>>>,
}

impl FakeSource {
    fn new(kind: SourceKind, succeed: bool, order: &Arc<Mutex<Vec<SourceKind>>>) -> Self {
        Self {
            kind,
            delay: Duration::from_millis(10),
            succeed: AtomicUsize::new(succeed as usize),
            catalog_only: false,
            calls: AtomicUsize::new(0),
            order: order.clone(),
        }
    }

    fn catalog_only(mut self) -> Self {
        self.catalog_only = true;
        self
    }

    fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed as usize, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamSource for FakeSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn accepts(&self, request: &TrackRequest) -> bool {
        !self.catalog_only || !request.track_id.is_native()
    }

    async fn resolve(&self, lookup: &Lookup<'_>) -> Result<StreamDescriptor> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().push(self.kind);
        sleep(self.delay).await;
        if self.succeed.load(Ordering::SeqCst) == 1 {
            StreamDescriptor::new(self.kind, format!("https://fallback/{}", lookup.effective_id))
        } else {
            Err(SourceError::no_stream("nothing"))
        }
    }
}

#[derive(Debug)]
struct FakeSearch {
    answer: Option<String>,
}

#[async_trait]
impl TrackSearch for FakeSearch {
    fn timeout(&self) -> Duration {
        Duration::from_secs(6)
    }

    async fn find_native_id(&self, _query: &str) -> Result<Option<String>> {
        sleep(Duration::from_millis(50)).await;
        match &self.answer {
            Some(id) => Ok(Some(id.clone())),
            None => Err(SourceError::unavailable("search down")),
        }
    }
}

fn native_request() -> TrackRequest {
    TrackRequest::new(TrackId::native(NATIVE)).with_expected_duration(300)
}

#[tokio::test(start_paused = true)]
async fn race_returns_the_fastest_acceptable_answer() {
    let pool = FakePool::new(
        SourceKind::ProxyPoolA,
        vec![
            ("slow", Answer::Stream { delay_ms: 300, duration: Some(300) }),
            ("fast", Answer::Stream { delay_ms: 100, duration: Some(302) }),
            ("stuck", Answer::Stream { delay_ms: 4_000, duration: Some(300) }),
        ],
    );
    let resolver = Resolver::builder().pool(pool).build();

    let started = Instant::now();
    let descriptor = resolver.resolve(&native_request()).await.unwrap();

    assert_eq!(descriptor.upstream_url(), format!("https://fast/{}", NATIVE));
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn pools_are_raced_together() {
    let a = FakePool::new(
        SourceKind::ProxyPoolA,
        vec![("a1", Answer::Stream { delay_ms: 500, duration: None })],
    );
    let b = FakePool::new(
        SourceKind::ProxyPoolB,
        vec![("b1", Answer::Stream { delay_ms: 200, duration: None })],
    );
    let resolver = Resolver::builder().pool(a).pool(b).build();

    let started = Instant::now();
    let descriptor = resolver.resolve(&native_request()).await.unwrap();
    assert_eq!(descriptor.source_kind, SourceKind::ProxyPoolB);
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn implausible_durations_lose_the_race() {
    let pool = FakePool::new(
        SourceKind::ProxyPoolB,
        vec![
            ("extended", Answer::Stream { delay_ms: 50, duration: Some(345) }),
            ("broken", Answer::Fail { delay_ms: 60 }),
            ("right", Answer::Stream { delay_ms: 120, duration: Some(325) }),
        ],
    );
    let resolver = Resolver::builder()
        .pool(pool)
        .tolerance(DurationTolerance::default())
        .build();

    let descriptor = resolver.resolve(&native_request()).await.unwrap();
    assert_eq!(descriptor.upstream_url(), format!("https://right/{}", NATIVE));
}

#[tokio::test(start_paused = true)]
async fn fallback_runs_in_order_and_stops_at_first_success() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let pool = FakePool::new(
        SourceKind::ProxyPoolA,
        vec![("down", Answer::Fail { delay_ms: 10 })],
    );
    let extractor = Arc::new(FakeSource::new(SourceKind::GeneralExtractor, false, &order));
    let catalog =
        Arc::new(FakeSource::new(SourceKind::LicensedDirect, true, &order).catalog_only());
    let social = Arc::new(FakeSource::new(SourceKind::SocialAudio, true, &order));

    let resolver = Resolver::builder()
        .pool(pool)
        .fallback(extractor.clone())
        .fallback(catalog.clone())
        .fallback(social.clone())
        .build();

    // Identifiant natif : la source catalogue est sautée
    let descriptor = resolver.resolve(&native_request()).await.unwrap();
    assert_eq!(descriptor.source_kind, SourceKind::SocialAudio);
    assert_eq!(
        *order.lock().unwrap(),
        vec![SourceKind::GeneralExtractor, SourceKind::SocialAudio]
    );
    assert_eq!(catalog.calls(), 0);

    // Identifiant catalogue : elle passe avant SoundCloud
    order.lock().unwrap().clear();
    let request = TrackRequest::new(TrackId::catalog("QQ8jRRlhBEs", None));
    let descriptor = resolver.resolve(&request).await.unwrap();
    assert_eq!(descriptor.source_kind, SourceKind::LicensedDirect);
    assert_eq!(
        *order.lock().unwrap(),
        vec![SourceKind::GeneralExtractor, SourceKind::LicensedDirect]
    );
    assert_eq!(social.calls(), 1);

    // Catalogue en échec : SoundCloud est atteint en dernier
    order.lock().unwrap().clear();
    catalog.set_succeed(false);
    let request = TrackRequest::new(TrackId::catalog("5WXAlMNt", None));
    let descriptor = resolver.resolve(&request).await.unwrap();
    assert_eq!(descriptor.source_kind, SourceKind::SocialAudio);
    assert_eq!(descriptor.upstream_url(), "https://fallback/5WXAlMNt");
    assert_eq!(
        *order.lock().unwrap(),
        vec![
            SourceKind::GeneralExtractor,
            SourceKind::LicensedDirect,
            SourceKind::SocialAudio
        ]
    );
    assert_eq!(catalog.calls(), 2);
    assert_eq!(social.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn fallback_results_skip_the_duration_filter() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let extractor = Arc::new(FakeSource::new(SourceKind::GeneralExtractor, true, &order));
    let resolver = Resolver::builder().fallback(extractor).build();

    let request = TrackRequest::new(TrackId::native(NATIVE)).with_expected_duration(10);
    assert!(resolver.resolve(&request).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn exhaustion_is_reported() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let pool = FakePool::new(
        SourceKind::ProxyPoolA,
        vec![
            ("a", Answer::Fail { delay_ms: 10 }),
            ("b", Answer::Stream { delay_ms: 20, duration: Some(900) }),
        ],
    );
    let resolver = Resolver::builder()
        .pool(pool)
        .fallback(Arc::new(FakeSource::new(SourceKind::GeneralExtractor, false, &order)))
        .build();

    let err = resolver.resolve(&native_request()).await.unwrap_err();
    assert!(matches!(err, ResolveError::Exhausted));
}

#[tokio::test(start_paused = true)]
async fn deadline_bounds_the_whole_resolution() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let slow = FakeSource::new(SourceKind::GeneralExtractor, true, &order)
        .delay(Duration::from_secs(8));
    let resolver = Resolver::builder()
        .fallback(Arc::new(slow))
        .deadline(Duration::from_secs(5))
        .build();

    let started = Instant::now();
    let err = resolver.resolve(&native_request()).await.unwrap_err();
    assert!(matches!(err, ResolveError::DeadlineExceeded(_)));
    assert!(started.elapsed() < Duration::from_secs(6));
    assert_eq!(resolver.cached_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cached_results_are_served_until_expiry() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(MemoryCache::with_clock(Duration::from_secs(1800), clock.clone()));
    let order = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(FakeSource::new(SourceKind::GeneralExtractor, true, &order));

    let resolver = Resolver::builder()
        .fallback(source.clone())
        .cache(cache.clone())
        .build();

    let first = resolver.resolve(&native_request()).await.unwrap();
    let second = resolver.resolve(&native_request()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);

    clock.advance(Duration::from_secs(1801));
    resolver.resolve(&native_request()).await.unwrap();
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_are_not_cached() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(FakeSource::new(SourceKind::GeneralExtractor, false, &order));
    let resolver = Resolver::builder().fallback(source.clone()).build();

    assert!(resolver.resolve(&native_request()).await.is_err());
    assert_eq!(resolver.cached_count(), 0);

    source.set_succeed(true);
    assert!(resolver.resolve(&native_request()).await.is_ok());
    assert_eq!(source.calls(), 2);
    assert_eq!(resolver.cached_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn catalog_ids_are_mapped_before_racing() {
    let pool = FakePool::new(
        SourceKind::ProxyPoolB,
        vec![("p", Answer::Stream { delay_ms: 10, duration: Some(213) })],
    );
    let resolver = Resolver::builder()
        .pool(pool.clone())
        .search(Arc::new(FakeSearch {
            answer: Some(NATIVE.to_string()),
        }))
        .build();

    let request = TrackRequest::new(TrackId::catalog("QQ8jRRlhBEs", None))
        .with_title("Never Gonna Give You Up")
        .with_artist("Rick Astley")
        .with_expected_duration(212);
    let descriptor = resolver.resolve(&request).await.unwrap();

    assert_eq!(pool.queried(), vec![NATIVE.to_string()]);
    assert_eq!(descriptor.source_kind, SourceKind::ProxyPoolB);
    assert!(resolver.cached(&request).is_some());
}

#[tokio::test(start_paused = true)]
async fn failed_search_keeps_the_catalog_id() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let pool = FakePool::new(
        SourceKind::ProxyPoolA,
        vec![("p", Answer::Stream { delay_ms: 10, duration: None })],
    );
    let catalog =
        Arc::new(FakeSource::new(SourceKind::LicensedDirect, true, &order).catalog_only());
    let resolver = Resolver::builder()
        .pool(pool.clone())
        .fallback(catalog)
        .search(Arc::new(FakeSearch { answer: None }))
        .build();

    let request = TrackRequest::new(TrackId::catalog("5WXAlMNt", None)).with_title("Gehra Hua");
    let descriptor = resolver.resolve(&request).await.unwrap();

    // Les pools ne comprennent que les identifiants natifs
    assert!(pool.queried().is_empty());
    assert_eq!(descriptor.upstream_url(), "https://fallback/5WXAlMNt");
}

#[tokio::test(start_paused = true)]
async fn warm_up_skips_cached_and_caps_the_batch() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(FakeSource::new(SourceKind::GeneralExtractor, true, &order));
    let resolver = Resolver::builder()
        .fallback(source.clone())
        .warm_up(WarmUpSettings {
            max_tracks: 3,
            concurrency: 2,
        })
        .build();

    let cached = TrackRequest::new(TrackId::native("aaaaaaaaaaa"));
    resolver.resolve(&cached).await.unwrap();

    let batch = vec![
        cached.clone(),
        TrackRequest::new(TrackId::native("bbbbbbbbbbb")),
        TrackRequest::new(TrackId::native("bbbbbbbbbbb")),
        TrackRequest::new(TrackId::native("ccccccccccc")),
        TrackRequest::new(TrackId::native("ddddddddddd")),
        TrackRequest::new(TrackId::native("eeeeeeeeeee")),
    ];
    let resolved = resolver.warm_up(batch).await;

    assert_eq!(resolved, 3);
    assert_eq!(source.calls(), 4);
    assert_eq!(resolver.cached_count(), 4);
}
