use covisearch_core::{Catalog, LeadRecord};

use super::*;

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        retry_delay: Duration::from_millis(2_000),
    }
}

fn oxygen_all(city: &str) -> SearchFilter {
    let catalog = Catalog::embedded().unwrap();
    let oxygen = catalog.find("oxygen").unwrap().clone();
    let all = oxygen.all_child().cloned();
    SearchFilter::new(city, oxygen, all)
}

fn ready(leads: usize, more: bool) -> Result<FetchOutcome, SearchError> {
    Ok(FetchOutcome::Ready(SearchResult {
        leads: vec![LeadRecord::default(); leads],
        has_more_data: more,
    }))
}

/// Submits `filter` and completes the first fetch with `outcome`.
fn submitted_with(
    filter: SearchFilter,
    outcome: Result<FetchOutcome, SearchError>,
) -> SearchState {
    let t = update(&SearchState::default(), Msg::Submit(filter), policy(5));
    let lineage = t.state.lineage;
    update(&t.state, Msg::Completed { lineage, outcome }, policy(5)).state
}

#[test]
fn submit_requests_first_page_with_fresh_budget() {
    let t = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(5),
    );
    assert_eq!(t.state.status, ScreenStatus::Loading);
    assert_eq!(t.state.page_number, 1);
    assert_eq!(t.state.retries_left, 5);
    assert_eq!(t.state.lineage, 1);
    assert_eq!(
        t.command,
        Some(Command::Fetch {
            lineage: 1,
            query: SearchQuery {
                resource_value: "oxygen".to_owned(),
                city: "Delhi".to_owned(),
                page_number: 1,
            },
            delay: Duration::ZERO,
        })
    );
}

#[test]
fn submit_without_subresource_is_rejected() {
    let catalog = Catalog::embedded().unwrap();
    let medicine = catalog.find("medicine").unwrap().clone();
    let t = update(
        &SearchState::default(),
        Msg::Submit(SearchFilter::new("Delhi", medicine, None)),
        policy(5),
    );
    assert_eq!(t.state.status, ScreenStatus::Error);
    assert!(t.command.is_none());
    assert!(t.state.error.unwrap().contains("Medicines"));
}

#[test]
fn submit_with_subresource_from_another_group_is_rejected() {
    let catalog = Catalog::embedded().unwrap();
    let oxygen = catalog.find("oxygen").unwrap().clone();
    let fabiflu = catalog
        .find("medicine")
        .unwrap()
        .find_child("med_fabiflu")
        .cloned();
    let filter = SearchFilter::new("Delhi", oxygen, fabiflu);

    assert!(matches!(
        SearchQuery::for_page(&filter, 1),
        Err(SearchError::InvalidFilter(_))
    ));

    let t = update(&SearchState::default(), Msg::Submit(filter), policy(5));
    assert_eq!(t.state.status, ScreenStatus::Error);
    assert!(t.state.query.is_none());
    assert!(t.command.is_none());
    assert!(t.state.error.unwrap().contains("not a subcategory of 'Oxygen'"));
}

#[test]
fn submit_with_blank_city_is_rejected() {
    let t = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("   ")),
        policy(5),
    );
    assert_eq!(t.state.status, ScreenStatus::Error);
    assert!(t.command.is_none());
}

#[test]
fn pending_schedules_retry_of_same_query() {
    let first = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(5),
    );
    let Some(Command::Fetch { query, .. }) = first.command.clone() else {
        panic!("expected fetch command");
    };

    let t = update(
        &first.state,
        Msg::Completed {
            lineage: 1,
            outcome: Ok(FetchOutcome::Pending),
        },
        policy(5),
    );
    assert_eq!(t.state.status, ScreenStatus::FetchingData);
    assert_eq!(t.state.retries_left, 4);
    assert_eq!(
        t.command,
        Some(Command::Fetch {
            lineage: 1,
            query,
            delay: Duration::from_millis(2_000),
        })
    );
}

#[test]
fn pending_with_exhausted_budget_times_out() {
    let mut state = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(2),
    )
    .state;

    let mut scheduled = 0;
    loop {
        let t = update(
            &state,
            Msg::Completed {
                lineage: state.lineage,
                outcome: Ok(FetchOutcome::Pending),
            },
            policy(2),
        );
        state = t.state;
        match t.command {
            Some(Command::Fetch { .. }) => scheduled += 1,
            None => break,
            Some(other) => panic!("unexpected command {other:?}"),
        }
    }
    assert_eq!(scheduled, 2);
    assert_eq!(state.status, ScreenStatus::Timeout);
}

#[test]
fn success_stores_leads_and_requests_scroll() {
    let t = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(5),
    );
    let done = update(
        &t.state,
        Msg::Completed {
            lineage: 1,
            outcome: ready(2, true),
        },
        policy(5),
    );
    assert_eq!(done.state.status, ScreenStatus::DataFetched);
    assert_eq!(done.state.result.leads.len(), 2);
    assert!(done.state.result.has_more_data);
    assert_eq!(done.command, Some(Command::ScrollToTop));
}

#[test]
fn error_is_terminal_and_keeps_payload() {
    let state = submitted_with(
        oxygen_all("Delhi"),
        Err(SearchError::UnexpectedStatus {
            status: 500,
            body: "aggregator crashed".to_owned(),
        }),
    );
    assert_eq!(state.status, ScreenStatus::Error);
    assert_eq!(state.error.as_deref(), Some("aggregator crashed"));
    assert!(state.result.leads.is_empty());
}

#[test]
fn stale_completion_is_ignored() {
    let first = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(5),
    );
    let second = update(&first.state, Msg::Submit(oxygen_all("Pune")), policy(5));
    assert_eq!(second.state.lineage, 2);

    let t = update(
        &second.state,
        Msg::Completed {
            lineage: 1,
            outcome: ready(3, false),
        },
        policy(5),
    );
    assert_eq!(t.state, second.state);
    assert!(t.command.is_none());
}

#[test]
fn next_batch_is_noop_without_more_data() {
    let state = submitted_with(oxygen_all("Delhi"), ready(1, false));
    let t = update(&state, Msg::NextBatch, policy(5));
    assert_eq!(t.state, state);
    assert!(t.command.is_none());
}

#[test]
fn next_batch_advances_page_and_starts_new_lineage() {
    let state = submitted_with(oxygen_all("Delhi"), ready(10, true));
    let t = update(&state, Msg::NextBatch, policy(5));
    assert_eq!(t.state.page_number, 2);
    assert_eq!(t.state.status, ScreenStatus::Loading);
    assert!(t.state.result.leads.is_empty(), "results clear on fetch");
    assert!(t.state.lineage > state.lineage);
    assert!(matches!(
        t.command,
        Some(Command::Fetch { ref query, .. }) if query.page_number == 2
    ));
}

#[test]
fn page_changes_are_ignored_while_busy() {
    let t = update(
        &SearchState::default(),
        Msg::Submit(oxygen_all("Delhi")),
        policy(5),
    );
    let next = update(&t.state, Msg::NextBatch, policy(5));
    assert_eq!(next.state, t.state);
    assert!(next.command.is_none());
}

#[test]
fn previous_batch_is_noop_on_first_page() {
    let state = submitted_with(oxygen_all("Delhi"), ready(10, true));
    assert_eq!(state.page_number, 1);
    let t = update(&state, Msg::PreviousBatch, policy(5));
    assert_eq!(t.state, state);
    assert!(t.command.is_none());
}

#[test]
fn previous_batch_goes_back_one_page() {
    let mut state = submitted_with(oxygen_all("Delhi"), ready(10, true));
    let next = update(&state, Msg::NextBatch, policy(5));
    state = update(
        &next.state,
        Msg::Completed {
            lineage: next.state.lineage,
            outcome: ready(10, true),
        },
        policy(5),
    )
    .state;
    assert_eq!(state.page_number, 2);

    let t = update(&state, Msg::PreviousBatch, policy(5));
    assert_eq!(t.state.page_number, 1);
    assert!(matches!(
        t.command,
        Some(Command::Fetch { ref query, .. }) if query.page_number == 1
    ));
}

#[test]
fn actions_before_any_submit_do_nothing() {
    let idle = SearchState::default();
    for msg in [Msg::NextBatch, Msg::PreviousBatch] {
        let t = update(&idle, msg, policy(5));
        assert_eq!(t.state, idle);
        assert!(t.command.is_none());
    }
}
