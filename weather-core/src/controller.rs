//! Drives one search screen: input, the busy gate, the provider call and alerts.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::{
    error::SearchError,
    model::WeatherSnapshot,
    notify::NotificationSurface,
    provider::WeatherProvider,
    state::{Action, Effect, Notification, RequestToken, SearchState, reduce},
};

/// How a call to [`WeatherSearchController::submit_search`] ended.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(WeatherSnapshot),
    /// Validation or fetch failure; already shown to the user.
    Failed(SearchError),
    /// Another search was still in flight; nothing happened.
    Busy,
    /// Nothing from this call was stored: either no request slot was handed
    /// out, or the slot no longer held this call's token when the result
    /// arrived. Only happens if something other than `submit_search` changes
    /// the state while a request is in flight.
    NotApplied,
}

impl SearchOutcome {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Found(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct WeatherSearchController {
    provider: Box<dyn WeatherProvider>,
    notifier: Box<dyn NotificationSurface>,
    state: Mutex<SearchState>,
}

impl WeatherSearchController {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        notifier: Box<dyn NotificationSurface>,
    ) -> Self {
        Self {
            provider,
            notifier,
            state: Mutex::new(SearchState::new()),
        }
    }

    /// Record the current input text.
    pub fn edit_query(&self, text: impl Into<String>) {
        self.dispatch(Action::Edit(text.into()));
    }

    /// Search for whatever is currently in the input.
    pub async fn submit(&self) -> SearchOutcome {
        let query = self.lock().query.clone();
        self.submit_search(&query).await
    }

    /// Validate `query`, fetch its weather and update the snapshot.
    ///
    /// The busy flag is clear again when this returns, and also if the
    /// returned future is dropped or the provider panics.
    pub async fn submit_search(&self, query: &str) -> SearchOutcome {
        let (token, city) = match self.dispatch(Action::Submit(query.to_string())) {
            Effect::Fetch { token, city } => (token, city),
            Effect::Notify(notification) => return self.notify(notification),
            Effect::RejectedBusy => {
                debug!(query, "search already in flight, ignoring submission");
                return SearchOutcome::Busy;
            }
            Effect::None | Effect::Ignored => return SearchOutcome::NotApplied,
        };

        let guard = InFlight {
            controller: self,
            token: Some(token),
        };

        debug!(city = %city, token = token.id(), "fetching weather");
        let result = self.provider.current_weather(&city).await;

        if let Err(cause) = &result {
            warn!(city = %city, error = %format!("{cause:#}"), "weather fetch failed");
        }
        let fetched = result.as_ref().ok().cloned();

        match (guard.complete(result), fetched) {
            (Effect::Notify(notification), _) => self.notify(notification),
            (Effect::None, Some(snapshot)) => {
                info!(
                    city = %city,
                    temperature_celsius = snapshot.temperature_celsius,
                    conditions = snapshot.conditions.as_str(),
                    "weather updated"
                );
                SearchOutcome::Found(snapshot)
            }
            (effect, _) => {
                debug!(token = token.id(), ?effect, "result not applied");
                SearchOutcome::NotApplied
            }
        }
    }

    /// Copy of the current state.
    pub fn state(&self) -> SearchState {
        self.lock().clone()
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.lock().snapshot.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_busy()
    }

    fn dispatch(&self, action: Action) -> Effect {
        let mut state = self.lock();
        let transition = reduce(&state, action);
        *state = transition.state;
        transition.effect
    }

    fn notify(&self, notification: Notification) -> SearchOutcome {
        self.notifier.alert(notification.title, &notification.message());
        SearchOutcome::Failed(notification.error)
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the busy flag for `token` when dropped without being completed.
struct InFlight<'a> {
    controller: &'a WeatherSearchController,
    token: Option<RequestToken>,
}

impl InFlight<'_> {
    fn complete(mut self, result: anyhow::Result<WeatherSnapshot>) -> Effect {
        match self.token.take() {
            Some(token) => self.controller.dispatch(Action::Completed { token, result }),
            None => Effect::Ignored,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            warn!(token = token.id(), "weather request abandoned before completion");
            self.controller.dispatch(Action::Completed {
                token,
                result: Err(anyhow::anyhow!("request abandoned")),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    #[derive(Debug, Clone)]
    enum Reply {
        Snapshot(WeatherSnapshot),
        Fail(&'static str),
        Panic,
    }

    #[derive(Debug, Clone)]
    struct FakeProvider {
        reply: Reply,
        delay: Duration,
        calls: Arc<AtomicUsize>,
        cities: Arc<Mutex<Vec<String>>>,
    }

    impl FakeProvider {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
                cities: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_weather(&self, city: &str) -> anyhow::Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cities.lock().unwrap().push(city.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Reply::Snapshot(s) => Ok(s.clone()),
                Reply::Fail(msg) => Err(anyhow::anyhow!(*msg)),
                Reply::Panic => panic!("provider blew up"),
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingNotifier {
        alerts: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingNotifier {
        fn alerts(&self) -> Vec<(String, String)> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl NotificationSurface for RecordingNotifier {
        fn alert(&self, title: &str, message: &str) {
            self.alerts
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn clouds() -> WeatherSnapshot {
        WeatherSnapshot::from_raw(15.6, "Clouds", 70, 3.2)
    }

    fn controller(
        provider: &FakeProvider,
        notifier: &RecordingNotifier,
    ) -> WeatherSearchController {
        WeatherSearchController::new(Box::new(provider.clone()), Box::new(notifier.clone()))
    }

    #[tokio::test]
    async fn successful_search_stores_snapshot() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds()));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        let outcome = c.submit_search("London").await;

        assert_eq!(outcome.snapshot(), Some(&clouds()));
        assert_eq!(
            c.snapshot(),
            Some(WeatherSnapshot {
                temperature_celsius: 16,
                conditions: "Clouds".into(),
                humidity_percent: 70,
                wind_speed_mps: 3.2,
            })
        );
        assert!(!c.is_busy());
        assert!(notifier.alerts().is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn blank_query_never_hits_the_network() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds()));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        for blank in ["", "   ", "\t", " \n "] {
            let outcome = c.submit_search(blank).await;
            assert!(matches!(outcome, SearchOutcome::Failed(ref e) if e.is_validation()));
        }

        assert_eq!(provider.calls(), 0);
        assert!(!c.is_busy());
        assert_eq!(notifier.alerts().len(), 4);
        assert!(
            notifier
                .alerts()
                .iter()
                .all(|(t, m)| t == "Error" && m == "Please enter a city name")
        );
    }

    #[tokio::test]
    async fn blank_query_leaves_previous_snapshot() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds()));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        c.submit_search("London").await;
        c.submit_search("   ").await;

        assert_eq!(c.snapshot(), Some(clouds()));
    }

    #[tokio::test]
    async fn not_found_clears_snapshot_and_alerts_once() {
        let ok = FakeProvider::new(Reply::Snapshot(clouds()));
        let notifier = RecordingNotifier::default();
        let c = controller(&ok, &notifier);
        c.submit_search("London").await;
        assert!(c.snapshot().is_some());

        let failing = FakeProvider::new(Reply::Fail("status 404 Not Found"));
        let c = WeatherSearchController {
            provider: Box::new(failing.clone()),
            notifier: Box::new(notifier.clone()),
            state: Mutex::new(c.state()),
        };

        let outcome = c.submit_search("Nonexistentville").await;

        assert!(matches!(outcome, SearchOutcome::Failed(SearchError::Fetch { .. })));
        assert_eq!(c.snapshot(), None);
        assert!(!c.is_busy());
        assert_eq!(
            notifier.alerts(),
            vec![(
                "Error".to_string(),
                "City not found or error fetching weather data".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn query_is_trimmed_before_fetch() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds()));
        let c = controller(&provider, &RecordingNotifier::default());

        c.submit_search("  London  ").await;

        assert_eq!(*provider.cities.lock().unwrap(), vec!["London".to_string()]);
    }

    #[tokio::test]
    async fn second_submission_while_busy_is_a_no_op() {
        let provider =
            FakeProvider::new(Reply::Snapshot(clouds())).slow(Duration::from_millis(50));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        let (first, second) = tokio::join!(c.submit_search("London"), async {
            tokio::task::yield_now().await;
            c.submit_search("Paris").await
        });

        assert!(matches!(first, SearchOutcome::Found(_)));
        assert!(matches!(second, SearchOutcome::Busy));
        assert_eq!(provider.calls(), 1);
        assert!(notifier.alerts().is_empty());
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn result_for_released_slot_is_not_applied() {
        let provider =
            FakeProvider::new(Reply::Snapshot(clouds())).slow(Duration::from_millis(50));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        let (outcome, ()) = tokio::join!(c.submit_search("London"), async {
            tokio::task::yield_now().await;
            *c.lock() = SearchState::new();
        });

        assert!(matches!(outcome, SearchOutcome::NotApplied));
        assert_eq!(c.snapshot(), None);
        assert!(!c.is_busy());
        assert!(notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn submit_uses_edited_query() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds()));
        let c = controller(&provider, &RecordingNotifier::default());

        c.edit_query("L");
        c.edit_query("Lo");
        c.edit_query("London");
        assert_eq!(c.state().query, "London");

        let outcome = c.submit().await;

        assert!(matches!(outcome, SearchOutcome::Found(_)));
        assert_eq!(*provider.cities.lock().unwrap(), vec!["London".to_string()]);
    }

    #[tokio::test]
    async fn dropped_search_releases_busy_flag() {
        let provider = FakeProvider::new(Reply::Snapshot(clouds())).slow(Duration::from_secs(5));
        let notifier = RecordingNotifier::default();
        let c = controller(&provider, &notifier);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), c.submit_search("London")).await;

        assert!(timed_out.is_err());
        assert!(!c.is_busy());
        assert_eq!(c.snapshot(), None);
        assert!(notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn panicking_provider_releases_busy_flag() {
        let provider = FakeProvider::new(Reply::Panic);
        let c = Arc::new(controller(&provider, &RecordingNotifier::default()));

        let task = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.submit_search("London").await })
        };

        assert!(task.await.is_err());
        assert!(!c.is_busy());
    }
}
