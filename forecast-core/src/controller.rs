//! Forecast query controller.
//!
//! Owns the application state (location, fetch status, derived view) and is the
//! only thing that mutates it. Rendering code reads consistent snapshots.

use chrono::{Local, Locale};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    error::LocationError,
    model::{ForecastResult, Location},
    provider::ForecastProvider,
    view::{DerivedView, derive_view_state},
};

const CANCELLED_MESSAGE: &str = "Request cancelled before the forecast arrived.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success(Arc<ForecastResult>),
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        match self {
            FetchStatus::Success(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the view renders from. Always updated as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Location most recently requested.
    pub location: Option<Location>,
    pub status: FetchStatus,
    /// Present only while `status` is `Success`.
    pub derived: Option<DerivedView>,
    /// Bumped whenever a fetch starts.
    pub generation: u64,
    /// Location the current payload (or in-flight request) belongs to.
    pub fetched_location: Option<Location>,
}

impl ViewState {
    /// True when the requested location has no result or request behind it.
    pub fn needs_fetch(&self) -> bool {
        !self.status.is_loading()
            && self.location.is_some()
            && (self.location != self.fetched_location || self.status == FetchStatus::Idle)
    }
}

#[derive(Debug)]
pub struct ForecastController {
    provider: Arc<dyn ForecastProvider>,
    locale: Locale,
    state: Mutex<ViewState>,
}

impl ForecastController {
    pub fn new(provider: Arc<dyn ForecastProvider>, locale: Locale) -> Self {
        Self { provider, locale, state: Mutex::new(ViewState::default()) }
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.state.lock().status.clone()
    }

    /// Record a new desired location.
    ///
    /// A response still in flight is discarded on arrival unless it belongs to
    /// the location current at that point.
    pub fn set_location(&self, location: Location) {
        self.state.lock().location = Some(location);
    }

    /// Validate user input, make it the current location and fetch it.
    ///
    /// Blank input is rejected and leaves state untouched.
    pub async fn submit(&self, raw: &str) -> Result<FetchStatus, LocationError> {
        let location = Location::parse(raw)?;
        self.set_location(location.clone());
        Ok(self.fetch(location).await)
    }

    /// Fetch the forecast for `location`.
    ///
    /// While another fetch is in flight this is a no-op returning `Loading`.
    /// Never fails: every error path resolves to `FetchStatus::Failed`.
    pub async fn fetch(&self, location: Location) -> FetchStatus {
        let token = {
            let mut state = self.state.lock();
            if state.status.is_loading() {
                debug!(location = %location, "fetch already in flight, ignoring");
                return FetchStatus::Loading;
            }
            state.generation += 1;
            state.location = Some(location.clone());
            state.fetched_location = Some(location.clone());
            state.status = FetchStatus::Loading;
            state.derived = None;
            state.generation
        };

        let guard = InFlightGuard { state: &self.state, token, armed: true };
        let outcome = self.provider.fetch_forecast(&location).await;
        guard.disarm();

        let mut state = self.state.lock();
        if state.generation != token || state.location.as_ref() != Some(&location) {
            debug!(location = %location, token, latest = state.generation, "discarding stale forecast response");
            state.status = FetchStatus::Idle;
            state.derived = None;
            state.fetched_location = None;
            return FetchStatus::Idle;
        }

        match outcome {
            Ok(result) => {
                info!(location = %location, days = result.forecast.forecastday.len(), "forecast loaded");
                state.derived = Some(derive_view_state(&result, self.locale, &Local::now()));
                state.status = FetchStatus::Success(Arc::new(result));
            }
            Err(err) => {
                warn!(location = %location, error = %err, "forecast fetch failed");
                state.derived = None;
                state.status = FetchStatus::Failed(err.to_string());
            }
        }

        state.status.clone()
    }
}

/// Leaves `Loading` if a fetch future is dropped before the provider answers.
struct InFlightGuard<'a> {
    state: &'a Mutex<ViewState>,
    token: u64,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.generation == self.token && state.status.is_loading() {
            debug!(token = self.token, "forecast request dropped before completion");
            state.status = FetchStatus::Failed(CANCELLED_MESSAGE.to_string());
            state.derived = None;
            state.fetched_location = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Provider that waits for `gate` before answering with a canned result.
    #[derive(Debug, Default)]
    struct GatedProvider {
        calls: AtomicUsize,
        gate: Notify,
        fail_with: Option<FetchError>,
    }

    #[async_trait]
    impl ForecastProvider for GatedProvider {
        async fn fetch_forecast(&self, location: &Location) -> Result<ForecastResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let mut result = ForecastResult::default();
            result.location.name = Some(location.to_string());
            result.current.temp_c = Some(31.2);
            result.current.condition.text = Some("Partly Cloudy".into());
            Ok(result)
        }
    }

    fn loc(name: &str) -> Location {
        Location::parse(name).expect("non-empty")
    }

    #[tokio::test]
    async fn second_fetch_while_loading_is_a_noop() {
        let provider = Arc::new(GatedProvider::default());
        let controller = ForecastController::new(provider.clone(), Locale::en_US);

        let (first, second) = tokio::join!(controller.fetch(loc("Delhi")), async {
            let status = controller.fetch(loc("Mumbai")).await;
            provider.gate.notify_one();
            status
        });

        assert_eq!(second, FetchStatus::Loading);
        assert!(matches!(first, FetchStatus::Success(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.snapshot().location, Some(loc("Delhi")));
    }

    #[tokio::test]
    async fn success_derives_view_state() {
        let provider = Arc::new(GatedProvider::default());
        provider.gate.notify_one();
        let controller = ForecastController::new(provider, Locale::en_US);

        let status = controller.fetch(loc("Delhi")).await;
        let state = controller.snapshot();

        assert_eq!(state.status, status);
        let derived = state.derived.as_ref().expect("derived view after success");
        assert_eq!(derived.calendar_slots.len(), 7);
        assert_eq!(derived.current_icon_key.as_str(), "partly_cloudy");
        assert!(!state.needs_fetch());
    }

    #[tokio::test]
    async fn failure_clears_payload_and_carries_message() {
        let provider = Arc::new(GatedProvider {
            fail_with: Some(FetchError::http(404, "city not found")),
            ..GatedProvider::default()
        });
        provider.gate.notify_one();
        let controller = ForecastController::new(provider, Locale::en_US);

        let status = controller.fetch(loc("Atlantis")).await;
        let message = status.error().expect("failed status");

        assert!(message.contains("404"));
        assert!(message.contains("city not found"));
        assert!(controller.snapshot().derived.is_none());
    }

    #[tokio::test]
    async fn location_change_mid_flight_discards_stale_response() {
        let provider = Arc::new(GatedProvider::default());
        let controller = ForecastController::new(provider.clone(), Locale::en_US);

        let (first, _) = tokio::join!(controller.fetch(loc("Delhi")), async {
            let ignored = controller.submit("Mumbai").await.expect("valid input");
            assert_eq!(ignored, FetchStatus::Loading);
            provider.gate.notify_one();
        });

        assert_eq!(first, FetchStatus::Idle);
        let state = controller.snapshot();
        assert_eq!(state.location, Some(loc("Mumbai")));
        assert!(state.derived.is_none());
        assert!(state.needs_fetch());

        provider.gate.notify_one();
        let status = controller.fetch(loc("Mumbai")).await;
        assert_eq!(status.result().and_then(|r| r.location.name.as_deref()), Some("Mumbai"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_submit_is_rejected_without_fetching() {
        let provider = Arc::new(GatedProvider::default());
        let controller = ForecastController::new(provider.clone(), Locale::en_US);

        let err = controller.submit("   ").await.unwrap_err();

        assert_eq!(err, LocationError::Empty);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.snapshot(), ViewState::default());
    }

    #[tokio::test]
    async fn dropped_fetch_does_not_leave_controller_loading() {
        let provider = Arc::new(GatedProvider::default());
        let controller = ForecastController::new(provider.clone(), Locale::en_US);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), controller.fetch(loc("Delhi"))).await;
        assert!(timed_out.is_err());

        let state = controller.snapshot();
        assert_eq!(state.status.error(), Some(CANCELLED_MESSAGE));
        assert!(state.needs_fetch());

        provider.gate.notify_one();
        let status = controller.fetch(loc("Delhi")).await;
        assert!(matches!(status, FetchStatus::Success(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returning_to_in_flight_location_keeps_its_response() {
        let provider = Arc::new(GatedProvider::default());
        let controller = ForecastController::new(provider.clone(), Locale::en_US);

        let (first, _) = tokio::join!(controller.fetch(loc("Delhi")), async {
            controller.set_location(loc("Mumbai"));
            controller.set_location(loc("Delhi"));
            provider.gate.notify_one();
        });

        assert_eq!(first.result().and_then(|r| r.location.name.as_deref()), Some("Delhi"));
        assert!(!controller.snapshot().needs_fetch());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn needs_fetch_after_location_set_while_idle() {
        let controller = ForecastController::new(Arc::new(GatedProvider::default()), Locale::en_US);
        assert!(!controller.snapshot().needs_fetch());

        controller.set_location(loc("Delhi"));
        assert!(controller.snapshot().needs_fetch());
    }
}
