//! Generic paginated and filtered collection controller.
//!
//! One [`ResourceListController`] owns the query, the last applied result and
//! the loading flag of a screen's table. Every fetch takes a sequence ticket
//! and only the response to the latest ticket is applied.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;

use async_trait::async_trait;

use crate::api::{ApiResult, Page};
use crate::pagination::Paginated;
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

/// Where search, filtering and pagination happen for a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMode {
    /// Query parameters go to the backend; every change re-fetches.
    ServerFiltered,
    /// The full collection is fetched once and filtered in memory.
    ClientFiltered,
    /// The full collection is shown without pagination or filters.
    Unpaged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// One of a fixed set of wire values.
    Choice(&'static [&'static str]),
    Flag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FilterKind,
}

/// Per-entity descriptor of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListConfig {
    /// Plural entity name used in log lines and fallback notifications.
    pub label: &'static str,
    pub mode: ListMode,
    pub default_page_size: usize,
    pub filters: &'static [FilterField],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Text(text) => write!(f, "{text}"),
            FilterValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub filters: BTreeMap<String, FilterValue>,
    pub search_text: Option<String>,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            filters: BTreeMap::new(),
            search_text: None,
        }
    }

    pub fn text_filter(&self, name: &str) -> Option<&str> {
        match self.filters.get(name) {
            Some(FilterValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn flag_filter(&self, name: &str) -> Option<bool> {
        match self.filters.get(name) {
            Some(FilterValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> ListResult<T> {
    fn empty(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }
}

/// How a fetch ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued while this one was in flight; its response
    /// was discarded.
    Superseded,
    /// The latest fetch failed; the previous result is still shown.
    Failed,
}

/// Entity-specific half of a list: how to fetch and how to filter locally.
#[async_trait(?Send)]
pub trait ListSource {
    type Item: Clone;

    fn config(&self) -> &ListConfig;

    async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<Self::Item>>;

    /// In-memory filter for client-filtered lists.
    fn matches(&self, _item: &Self::Item, _query: &ListQuery) -> bool {
        true
    }
}

struct LoadingGuard<'a>(&'a Cell<usize>);

impl<'a> LoadingGuard<'a> {
    fn new(in_flight: &'a Cell<usize>) -> Self {
        in_flight.set(in_flight.get() + 1);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

pub struct ResourceListController<S: ListSource> {
    source: S,
    notifier: Notifier,
    query: RefCell<ListQuery>,
    result: RefCell<ListResult<S::Item>>,
    /// Full collection of client-filtered and unpaged lists.
    cache: RefCell<Option<Vec<S::Item>>>,
    issued: Cell<u64>,
    in_flight: Cell<usize>,
}

impl<S: ListSource> ResourceListController<S> {
    pub fn new(source: S, notifier: Notifier) -> Self {
        let page_size = source.config().default_page_size;
        Self::with_page_size(source, notifier, page_size)
    }

    pub fn with_page_size(source: S, notifier: Notifier, page_size: usize) -> Self {
        let query = ListQuery::new(page_size);
        let result = ListResult::empty(query.page_size);
        Self {
            source,
            notifier,
            query: RefCell::new(query),
            result: RefCell::new(result),
            cache: RefCell::new(None),
            issued: Cell::new(0),
            in_flight: Cell::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn query(&self) -> ListQuery {
        self.query.borrow().clone()
    }

    pub fn result(&self) -> ListResult<S::Item> {
        self.result.borrow().clone()
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.result.borrow().items.clone()
    }

    pub fn total(&self) -> usize {
        self.result.borrow().total
    }

    /// Current page with its page strip.
    pub fn paginated(&self) -> Paginated<S::Item> {
        let result = self.result.borrow();
        Paginated::new(
            result.items.clone(),
            result.page,
            result.page_size,
            result.total,
        )
    }

    /// Unfiltered collection of a client-side list, once fetched.
    pub fn cached_items(&self) -> Option<Vec<S::Item>> {
        self.cache.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Sets or clears (`None`) one filter and returns to page 1.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UnknownFilter`] when `name` is not declared for this
    /// list or `value` is outside its choices. Nothing is fetched then.
    pub async fn set_filter(&self, name: &str, value: Option<FilterValue>) -> ServiceResult<()> {
        self.check_filter(name, value.as_ref())?;
        {
            let mut query = self.query.borrow_mut();
            match value {
                Some(value) => {
                    query.filters.insert(name.to_string(), value);
                }
                None => {
                    query.filters.remove(name);
                }
            }
            query.page = 1;
        }
        self.reload().await;
        Ok(())
    }

    /// Sets the search text and returns to page 1. Blank text clears it.
    pub async fn set_search_text(&self, text: &str) {
        {
            let mut query = self.query.borrow_mut();
            let trimmed = text.trim();
            query.search_text = Some(trimmed.to_string()).filter(|t| !t.is_empty());
            query.page = 1;
        }
        self.reload().await;
    }

    pub async fn set_page(&self, page: usize, page_size: usize) {
        {
            let mut query = self.query.borrow_mut();
            query.page = page.max(1);
            query.page_size = page_size.max(1);
        }
        self.reload().await;
    }

    /// Re-issues the fetch with the current query.
    /// A server-filtered page past the end comes back empty; the query then
    /// moves to the last page and fetches again.
    pub async fn refresh(&self) -> FetchOutcome {
        loop {
            let ticket = self.issued.get() + 1;
            self.issued.set(ticket);
            let label = self.source.config().label;
            let query = self.query();

            let _loading = LoadingGuard::new(&self.in_flight);
            let fetched = self.source.fetch(&query).await;

            if ticket != self.issued.get() {
                log::debug!("Discarding superseded {label} response (ticket {ticket})");
                return FetchOutcome::Superseded;
            }

            match fetched {
                Ok(page) => {
                    if let Some(last_page) = self.past_last_page(&query, &page) {
                        log::debug!(
                            "{label} page {} is past the end, moving to {last_page}",
                            query.page
                        );
                        self.query.borrow_mut().page = last_page;
                        continue;
                    }
                    self.apply(page);
                    return FetchOutcome::Applied;
                }
                Err(err) => {
                    log::error!("Failed to fetch {label}: {err}");
                    self.notifier
                        .api_error(&err, &format!("Failed to fetch {label}"));
                    return FetchOutcome::Failed;
                }
            }
        }
    }

    /// Runs a mutation. On success notifies `success` and refreshes before
    /// returning; on failure notifies the backend message or `failure` and
    /// leaves the list untouched.
    pub async fn mutate<T, Fut>(&self, success: &str, failure: &str, op: Fut) -> ServiceResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        match op.await {
            Ok(value) => {
                self.notifier.success(success);
                self.refresh().await;
                Ok(value)
            }
            Err(err) => {
                log::error!("{failure}: {err}");
                self.notifier.api_error(&err, failure);
                Err(ServiceError::from(err))
            }
        }
    }

    fn check_filter(&self, name: &str, value: Option<&FilterValue>) -> ServiceResult<()> {
        let field = self
            .source
            .config()
            .filters
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ServiceError::UnknownFilter(name.to_string()))?;

        let valid = match (field.kind, value) {
            (_, None) => true,
            (FilterKind::Choice(choices), Some(FilterValue::Text(text))) => {
                choices.contains(&text.as_str())
            }
            (FilterKind::Flag, Some(FilterValue::Flag(_))) => true,
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            let shown = value.map(ToString::to_string).unwrap_or_default();
            Err(ServiceError::UnknownFilter(format!("{name}={shown}")))
        }
    }

    async fn reload(&self) {
        let derive_locally = match self.source.config().mode {
            ListMode::ServerFiltered => false,
            ListMode::ClientFiltered | ListMode::Unpaged => self.cache.borrow().is_some(),
        };
        if derive_locally {
            self.derive();
        } else {
            self.refresh().await;
        }
    }

    fn past_last_page(&self, query: &ListQuery, page: &Page<S::Item>) -> Option<usize> {
        if self.source.config().mode != ListMode::ServerFiltered
            || !page.items.is_empty()
            || page.total == 0
        {
            return None;
        }
        let last_page = page.total.div_ceil(query.page_size.max(1));
        (query.page > last_page).then_some(last_page)
    }

    fn apply(&self, page: Page<S::Item>) {
        match self.source.config().mode {
            ListMode::ServerFiltered => {
                let query = self.query.borrow();
                *self.result.borrow_mut() = ListResult {
                    items: page.items,
                    total: page.total,
                    page: query.page,
                    page_size: query.page_size,
                };
            }
            ListMode::ClientFiltered | ListMode::Unpaged => {
                *self.cache.borrow_mut() = Some(page.items);
                self.derive();
            }
        }
    }

    fn derive(&self) {
        let query = self.query.borrow();
        let cache = self.cache.borrow();
        let Some(all) = cache.as_ref() else {
            return;
        };

        let matching: Vec<S::Item> = all
            .iter()
            .filter(|item| self.source.matches(item, &query))
            .cloned()
            .collect();
        let total = matching.len();

        let result = match self.source.config().mode {
            ListMode::Unpaged => ListResult {
                items: matching,
                total,
                page: 1,
                page_size: total.max(1),
            },
            _ => {
                // Past the last page after a delete or narrower search.
                let last_page = total.div_ceil(query.page_size).max(1);
                let page = query.page.min(last_page);
                let offset = (page - 1) * query.page_size;
                ListResult {
                    items: matching
                        .into_iter()
                        .skip(offset)
                        .take(query.page_size)
                        .collect(),
                    total,
                    page,
                    page_size: query.page_size,
                }
            }
        };
        *self.result.borrow_mut() = result;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;
    use crate::api::ApiError;
    use crate::services::notifications::Level;

    const STATUS_CHOICES: &[&str] = &["PENDING", "VERIFIED"];

    static SERVER: ListConfig = ListConfig {
        label: "users",
        mode: ListMode::ServerFiltered,
        default_page_size: 20,
        filters: &[
            FilterField {
                name: "status",
                kind: FilterKind::Choice(STATUS_CHOICES),
            },
            FilterField {
                name: "premium",
                kind: FilterKind::Flag,
            },
        ],
    };

    static CLIENT: ListConfig = ListConfig {
        label: "locations",
        mode: ListMode::ClientFiltered,
        default_page_size: 2,
        filters: &[],
    };

    type Reply = ApiResult<Page<String>>;

    struct FakeSource {
        config: &'static ListConfig,
        items: RefCell<Vec<String>>,
        queries: RefCell<Vec<ListQuery>>,
        pending: RefCell<VecDeque<oneshot::Receiver<Reply>>>,
        fail: Cell<bool>,
    }

    impl FakeSource {
        fn new(config: &'static ListConfig, items: &[&str]) -> Self {
            Self {
                config,
                items: RefCell::new(items.iter().map(|s| s.to_string()).collect()),
                queries: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                fail: Cell::new(false),
            }
        }

        fn defer(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push_back(rx);
            tx
        }

        fn fetches(&self) -> usize {
            self.queries.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl ListSource for FakeSource {
        type Item = String;

        fn config(&self) -> &ListConfig {
            self.config
        }

        async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<String>> {
            self.queries.borrow_mut().push(query.clone());
            let deferred = self.pending.borrow_mut().pop_front();
            if let Some(rx) = deferred {
                return rx
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Transport("dropped".into())));
            }
            if self.fail.get() {
                return Err(ApiError::Transport("connection refused".into()));
            }
            Ok(Page::all(self.items.borrow().clone()))
        }

        fn matches(&self, item: &String, query: &ListQuery) -> bool {
            match &query.search_text {
                Some(text) => item.to_lowercase().contains(&text.to_lowercase()),
                None => true,
            }
        }
    }

    fn page_of(items: &[&str]) -> Reply {
        Ok(Page::all(items.iter().map(|s| s.to_string()).collect()))
    }

    #[tokio::test]
    async fn filter_and_search_reset_page() {
        let list = ResourceListController::new(FakeSource::new(&SERVER, &[]), Notifier::new());
        list.set_page(3, 20).await;
        assert_eq!(list.query().page, 3);

        list.set_filter("status", Some(FilterValue::Text("VERIFIED".into())))
            .await
            .unwrap();
        let sent = list.source().queries.borrow().last().cloned().unwrap();
        assert_eq!(sent.page, 1);
        assert_eq!(sent.text_filter("status"), Some("VERIFIED"));

        list.set_page(2, 20).await;
        list.set_search_text("  priya ").await;
        let sent = list.source().queries.borrow().last().cloned().unwrap();
        assert_eq!(sent.page, 1);
        assert_eq!(sent.search_text.as_deref(), Some("priya"));
        assert_eq!(list.source().fetches(), 4);
    }

    #[tokio::test]
    async fn undeclared_filters_are_rejected_without_fetch() {
        let list = ResourceListController::new(FakeSource::new(&SERVER, &[]), Notifier::new());

        let err = list
            .set_filter("city", Some(FilterValue::Text("Noida".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownFilter(name) if name == "city"));

        let err = list
            .set_filter("status", Some(FilterValue::Text("BANNED".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownFilter(_)));

        assert!(list
            .set_filter("premium", Some(FilterValue::Text("yes".into())))
            .await
            .is_err());
        assert_eq!(list.source().fetches(), 0);

        list.set_filter("premium", Some(FilterValue::Flag(true)))
            .await
            .unwrap();
        list.set_filter("premium", None).await.unwrap();
        assert!(list.query().filters.is_empty());
    }

    #[tokio::test]
    async fn later_fetch_wins_when_it_completes_first() {
        let source = FakeSource::new(&SERVER, &[]);
        let first = source.defer();
        let second = source.defer();
        let notifier = Notifier::new();
        let list = ResourceListController::new(source, notifier.clone());

        let (a, b, ()) = tokio::join!(list.refresh(), list.refresh(), async {
            let _ = second.send(page_of(&["B"]));
            tokio::task::yield_now().await;
            let _ = first.send(page_of(&["A"]));
        });

        assert_eq!(a, FetchOutcome::Superseded);
        assert_eq!(b, FetchOutcome::Applied);
        assert_eq!(list.items(), vec!["B".to_string()]);
        assert!(!list.is_loading());
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn superseded_failure_is_silent() {
        let source = FakeSource::new(&SERVER, &[]);
        let first = source.defer();
        let second = source.defer();
        let notifier = Notifier::new();
        let list = ResourceListController::new(source, notifier.clone());

        let (a, b, ()) = tokio::join!(list.refresh(), list.refresh(), async {
            let _ = second.send(page_of(&["B"]));
            let _ = first.send(Err(ApiError::Transport("timeout".into())));
        });

        assert_eq!(a, FetchOutcome::Superseded);
        assert_eq!(b, FetchOutcome::Applied);
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_result() {
        let notifier = Notifier::new();
        let list = ResourceListController::new(
            FakeSource::new(&SERVER, &["Asha", "Ravi"]),
            notifier.clone(),
        );
        assert_eq!(list.refresh().await, FetchOutcome::Applied);

        list.source().fail.set(true);
        assert_eq!(list.refresh().await, FetchOutcome::Failed);

        assert_eq!(list.total(), 2);
        assert!(!list.is_loading());
        let raised = notifier.drain();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].level, Level::Error);
        assert_eq!(raised[0].message, "Failed to fetch users");
    }

    #[tokio::test]
    async fn loading_flag_tracks_in_flight_fetch_and_resets_on_drop() {
        let source = FakeSource::new(&SERVER, &[]);
        let reply = source.defer();
        let list = ResourceListController::new(source, Notifier::new());

        let fetch = list.refresh();
        tokio::pin!(fetch);
        assert!(tokio::time::timeout(Duration::from_millis(10), &mut fetch)
            .await
            .is_err());
        assert!(list.is_loading());

        let _ = reply.send(page_of(&["A"]));
        assert_eq!(fetch.await, FetchOutcome::Applied);
        assert!(!list.is_loading());

        let _never = list.source().defer();
        {
            let abandoned = list.refresh();
            tokio::pin!(abandoned);
            assert!(tokio::time::timeout(Duration::from_millis(10), &mut abandoned)
                .await
                .is_err());
            assert!(list.is_loading());
        }
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn client_filtered_search_rederives_without_fetch() {
        let list = ResourceListController::new(
            FakeSource::new(&CLIENT, &["Gurugram", "Noida", "Gurgaon East", "Delhi"]),
            Notifier::new(),
        );
        list.refresh().await;
        assert_eq!(list.total(), 4);
        assert_eq!(list.items().len(), 2);

        list.set_page(2, 2).await;
        assert_eq!(list.items(), vec!["Gurgaon East".to_string(), "Delhi".to_string()]);

        list.set_search_text("GUR").await;
        let result = list.result();
        assert_eq!(result.page, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.items, vec!["Gurugram".to_string(), "Gurgaon East".to_string()]);
        assert_eq!(list.source().fetches(), 1);
        assert_eq!(list.cached_items().map(|c| c.len()), Some(4));
    }

    #[tokio::test]
    async fn mutation_refreshes_only_on_success() {
        let notifier = Notifier::new();
        let list = ResourceListController::new(FakeSource::new(&SERVER, &["A"]), notifier.clone());

        let value = list
            .mutate("Saved", "Failed to save", async { Ok::<_, ApiError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(list.source().fetches(), 1);

        let err = list
            .mutate::<(), _>("Saved", "Failed to save", async {
                Err(ApiError::Rejected {
                    status: 400,
                    message: None,
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Api(_)));
        assert_eq!(list.source().fetches(), 1);

        let messages: Vec<_> = notifier.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["Saved", "Failed to save"]);
    }
}
