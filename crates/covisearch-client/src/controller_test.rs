use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use covisearch_core::{Catalog, LeadRecord, SearchResult};

use super::*;

#[derive(Debug, Clone)]
enum Reply {
    Pending,
    Ready { leads: usize, more: bool },
    Fail(u16),
}

impl Reply {
    fn into_outcome(self) -> Result<FetchOutcome, SearchError> {
        match self {
            Reply::Pending => Ok(FetchOutcome::Pending),
            Reply::Ready { leads, more } => Ok(FetchOutcome::Ready(SearchResult {
                leads: vec![LeadRecord::default(); leads],
                has_more_data: more,
            })),
            Reply::Fail(status) => Err(SearchError::UnexpectedStatus {
                status,
                body: format!("scripted failure {status}"),
            }),
        }
    }
}

/// Answers per city from a script. The last reply for a city repeats.
#[derive(Default)]
struct ScriptedFetcher {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<SearchQuery>>,
}

impl ScriptedFetcher {
    fn with(city: &str, replies: Vec<Reply>) -> Self {
        let fetcher = Self::default();
        fetcher.add(city, replies);
        fetcher
    }

    fn add(&self, city: &str, replies: Vec<Reply>) {
        self.script
            .lock()
            .unwrap()
            .insert(city.to_owned(), replies.into());
    }

    fn calls(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_for(&self, city: &str) -> usize {
        self.calls().iter().filter(|q| q.city == city).count()
    }
}

impl LeadFetcher for ScriptedFetcher {
    fn fetch_page(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<FetchOutcome, SearchError>> + Send {
        self.calls.lock().unwrap().push(query.clone());
        let reply = {
            let mut script = self.script.lock().unwrap();
            let queue = script
                .get_mut(&query.city)
                .unwrap_or_else(|| panic!("no script for {}", query.city));
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        };
        async move { reply.into_outcome() }
    }
}

fn filter(city: &str) -> SearchFilter {
    let catalog = Catalog::embedded().unwrap();
    let oxygen = catalog.find("oxygen").unwrap().clone();
    let all = oxygen.all_child().cloned();
    SearchFilter::new(city, oxygen, all)
}

fn immediate(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        retry_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn always_pending_stops_after_budget() {
    let fetcher = Arc::new(ScriptedFetcher::with("Delhi", vec![Reply::Pending]));
    let mut controller = SearchController::new(Arc::clone(&fetcher), immediate(3));

    let state = controller.submit(filter("Delhi")).await;
    assert_eq!(state.status, ScreenStatus::Timeout);
    assert!(state.result.leads.is_empty());
    assert_eq!(fetcher.calls().len(), 4, "first attempt plus three retries");
    assert!(!controller.take_scroll_request());
}

#[tokio::test]
async fn success_after_pending_attempts() {
    let fetcher = Arc::new(ScriptedFetcher::with(
        "Delhi",
        vec![
            Reply::Pending,
            Reply::Pending,
            Reply::Ready {
                leads: 2,
                more: true,
            },
        ],
    ));
    let mut controller = SearchController::new(Arc::clone(&fetcher), immediate(5));

    let state = controller.submit(filter("Delhi")).await;
    assert_eq!(state.status, ScreenStatus::DataFetched);
    assert_eq!(state.result.leads.len(), 2);
    assert_eq!(fetcher.calls().len(), 3);
    assert!(fetcher.calls().iter().all(|q| q.page_number == 1));
    assert!(controller.take_scroll_request());
    assert!(!controller.take_scroll_request(), "scroll request is consumed");
}

#[tokio::test]
async fn server_error_surfaces_payload() {
    let fetcher = Arc::new(ScriptedFetcher::with("Delhi", vec![Reply::Fail(500)]));
    let mut controller = SearchController::new(Arc::clone(&fetcher), immediate(5));

    let state = controller.submit(filter("Delhi")).await;
    assert_eq!(state.status, ScreenStatus::Error);
    assert_eq!(state.error.as_deref(), Some("scripted failure 500"));
    assert_eq!(fetcher.calls().len(), 1, "errors are not retried");
}

#[tokio::test]
async fn paging_walks_forward_and_back() {
    let fetcher = Arc::new(ScriptedFetcher::with(
        "Delhi",
        vec![Reply::Ready {
            leads: 10,
            more: true,
        }],
    ));
    let mut controller = SearchController::new(Arc::clone(&fetcher), immediate(5));

    controller.submit(filter("Delhi")).await;
    let state = controller.fetch_next_batch().await;
    assert_eq!(state.page_number, 2);
    assert_eq!(state.status, ScreenStatus::DataFetched);

    let state = controller.fetch_previous_batch().await;
    assert_eq!(state.page_number, 1);

    let pages: Vec<u32> = fetcher.calls().iter().map(|q| q.page_number).collect();
    assert_eq!(pages, vec![1, 2, 1]);
}

#[tokio::test]
async fn previous_on_first_page_sends_nothing() {
    let fetcher = Arc::new(ScriptedFetcher::with(
        "Delhi",
        vec![Reply::Ready {
            leads: 1,
            more: false,
        }],
    ));
    let mut controller = SearchController::new(Arc::clone(&fetcher), immediate(5));

    controller.submit(filter("Delhi")).await;
    controller.fetch_previous_batch().await;
    controller.fetch_next_batch().await;
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn new_submit_cancels_scheduled_retry() {
    let fetcher = Arc::new(ScriptedFetcher::with("Delhi", vec![Reply::Pending]));
    fetcher.add(
        "Pune",
        vec![Reply::Ready {
            leads: 1,
            more: false,
        }],
    );
    let policy = RetryPolicy {
        max_retries: 5,
        retry_delay: Duration::from_millis(100),
    };
    let mut controller = SearchController::new(Arc::clone(&fetcher), policy);

    controller.dispatch(Msg::Submit(filter("Delhi")));
    assert!(controller.step().await, "first Delhi attempt completes");
    assert_eq!(controller.state().status, ScreenStatus::FetchingData);

    let state = controller.submit(filter("Pune")).await;
    assert_eq!(state.status, ScreenStatus::DataFetched);
    assert_eq!(state.query.as_ref().map(|q| q.city.as_str()), Some("Pune"));

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(fetcher.calls_for("Delhi"), 1, "retry was cancelled");
    assert_eq!(controller.state().status, ScreenStatus::DataFetched);
}

/// Fails every request by panicking inside the fetch task.
struct PanickingFetcher;

impl LeadFetcher for PanickingFetcher {
    fn fetch_page(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<FetchOutcome, SearchError>> + Send {
        let city = query.city.clone();
        async move {
            assert!(city.is_empty(), "fetcher crashed for {city}");
            Ok(FetchOutcome::Pending)
        }
    }
}

#[tokio::test]
async fn panicking_fetch_task_ends_in_error() {
    let mut controller = SearchController::new(Arc::new(PanickingFetcher), immediate(5));

    let state = tokio::time::timeout(Duration::from_secs(2), controller.submit(filter("Delhi")))
        .await
        .expect("controller should settle after a task panic");
    assert_eq!(state.status, ScreenStatus::Error);
    let message = state.error.as_deref().unwrap_or_default();
    assert!(message.starts_with("fetch task failed"), "got {message}");

    // The controller stays usable for the next search.
    let state = tokio::time::timeout(Duration::from_secs(2), controller.submit(filter("Pune")))
        .await
        .expect("second search should settle too");
    assert_eq!(state.status, ScreenStatus::Error);
}
