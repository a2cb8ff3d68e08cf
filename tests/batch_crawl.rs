use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docsift::config::{DriverConfig, HeuristicConfig};
use docsift::crawl::BatchCrawler;
use docsift::driver::{Driver, ElementInfo, PageSession, SessionError, SessionFactory};
use docsift::search::{PageSearch, SearchProvider, SearchResult};
use mockall::mock;
use serde_json::Value;

/// Open and closed session counts shared by every session of one test.
#[derive(Debug, Default)]
struct Ledger {
    opened: AtomicUsize,
    closed: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

fn open_session(ledger: &Arc<Ledger>) -> StubSession {
    ledger.opened.fetch_add(1, Ordering::SeqCst);
    let active = ledger.active.fetch_add(1, Ordering::SeqCst) + 1;
    ledger.peak.fetch_max(active, Ordering::SeqCst);
    StubSession {
        ledger: Arc::clone(ledger),
        url: Mutex::new(String::new()),
    }
}

/// Serves a prose page naming the navigated url. Urls containing `broken`
/// fail to load.
pub struct StubSession {
    ledger: Arc<Ledger>,
    url: Mutex<String>,
}

#[async_trait]
impl PageSession for StubSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if url.contains("broken") {
            return Err(SessionError::Browser("net::ERR_CONNECTION_REFUSED".to_string()));
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool, SessionError> {
        Ok(selector == "a.result")
    }

    async fn evaluate(&self, _script: &str, _args: Value) -> Result<Value, SessionError> {
        Ok(Value::Null)
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, SessionError> {
        if selector != "a.result" {
            return Ok(Vec::new());
        }
        Ok(["/docs/one", "/docs/two"]
            .into_iter()
            .enumerate()
            .map(|(index, href)| ElementInfo {
                index,
                text: format!("Result {index}"),
                visible: true,
                href: Some(href.to_string()),
                title: None,
            })
            .collect())
    }

    async fn click(&self, _selector: &str, _index: usize) -> Result<(), SessionError> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<String, SessionError> {
        let url = self.url.lock().unwrap().clone();
        Ok(format!(
            "<html><body><main><p>Page at {url}. {}</p></main></body></html>",
            "Keys are rotated on a fixed schedule. ".repeat(15)
        ))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.ledger.closed.fetch_add(1, Ordering::SeqCst);
        self.ledger.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

mock! {
    pub Factory {}

    #[async_trait]
    impl SessionFactory for Factory {
        type Session = StubSession;

        async fn open(&self) -> Result<StubSession, SessionError>;
    }
}

fn factory(ledger: &Arc<Ledger>, sessions: usize) -> Arc<MockFactory> {
    let ledger = Arc::clone(ledger);
    let mut factory = MockFactory::new();
    factory
        .expect_open()
        .times(sessions)
        .returning(move || Ok(open_session(&ledger)));
    Arc::new(factory)
}

fn driver() -> Arc<Driver> {
    Arc::new(Driver::new(
        DriverConfig {
            content_wait: Duration::from_millis(50),
            ..DriverConfig::without_delays()
        },
        Arc::new(HeuristicConfig::default()),
    ))
}

fn result(path: &str) -> SearchResult {
    SearchResult {
        url: format!("https://docs.example.com{path}"),
        title: path.trim_start_matches('/').to_string(),
    }
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_batch() {
    let ledger = Arc::new(Ledger::default());
    let crawler = BatchCrawler::new(factory(&ledger, 5), driver(), 2);
    let paths = ["/alpha", "/broken", "/gamma", "/delta", "/epsilon"];

    let reports = crawler
        .crawl_all(paths.iter().map(|path| result(path)).collect())
        .await;

    assert_eq!(reports.len(), paths.len());
    for (report, path) in reports.iter().zip(paths) {
        assert_eq!(report.url, format!("https://docs.example.com{path}"));
        assert_eq!(report.title, path.trim_start_matches('/'));
        assert!(report.content.is_some() != report.error.is_some());
    }

    let failed: Vec<_> = reports.iter().filter(|report| !report.is_success()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].url.ends_with("/broken"));
    assert!(failed[0].error.as_deref().unwrap().contains("ERR_CONNECTION_REFUSED"));

    let gamma = reports[2].content.as_deref().unwrap();
    assert!(gamma.contains("Page at https://docs.example.com/gamma"));
}

#[tokio::test]
async fn test_batch_respects_concurrency_and_closes_every_session() {
    let ledger = Arc::new(Ledger::default());
    let crawler = BatchCrawler::new(factory(&ledger, 6), driver(), 2);
    let batch = (0..6).map(|i| result(&format!("/page-{i}"))).collect();

    let reports = crawler.crawl_all(batch).await;

    assert!(reports.iter().all(|report| report.is_success()));
    assert_eq!(ledger.opened.load(Ordering::SeqCst), 6);
    assert_eq!(ledger.closed.load(Ordering::SeqCst), 6);
    assert!(ledger.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_crawl_one_closes_its_session_on_failure() {
    let ledger = Arc::new(Ledger::default());
    let crawler = BatchCrawler::new(factory(&ledger, 1), driver(), 1);

    let err = crawler
        .crawl_one("https://docs.example.com/broken")
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("ERR_CONNECTION_REFUSED"));
    assert_eq!(ledger.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_page_search_closes_its_session() {
    let ledger = Arc::new(Ledger::default());
    let search = PageSearch::new(
        factory(&ledger, 1),
        "https://docs.example.com/search?q={query}",
        "a.result",
    );

    let results = search.search("keys", 10).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://docs.example.com/docs/one");
    assert_eq!(ledger.closed.load(Ordering::SeqCst), 1);
}
