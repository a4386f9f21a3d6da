//! Search screen state and its pure transition function.
//!
//! `reduce` never performs I/O. It returns the next state together with the
//! side effect the caller must run: a provider fetch or a user alert.

use crate::{
    error::{ALERT_TITLE, SearchError},
    model::{WeatherSnapshot, normalize_query},
};

/// Identifies one in-flight request. Only the outstanding token may complete a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Raw input text, exactly as typed.
    pub query: String,
    pub snapshot: Option<WeatherSnapshot>,
    in_flight: Option<RequestToken>,
    next_token: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }
}

#[derive(Debug)]
pub enum Action {
    /// Input text changed.
    Edit(String),
    /// The user asked to search for this text.
    Submit(String),
    /// The provider call for `token` finished.
    Completed {
        token: RequestToken,
        result: anyhow::Result<WeatherSnapshot>,
    },
}

/// Alert to present to the user.
#[derive(Debug)]
pub struct Notification {
    pub title: &'static str,
    pub error: SearchError,
}

impl Notification {
    fn error(error: SearchError) -> Self {
        Self {
            title: ALERT_TITLE,
            error,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

#[derive(Debug)]
pub enum Effect {
    None,
    Fetch { token: RequestToken, city: String },
    Notify(Notification),
    /// A submission arrived while another request was outstanding.
    RejectedBusy,
    /// A completion arrived for a token that is no longer outstanding.
    Ignored,
}

#[derive(Debug)]
pub struct Transition {
    pub state: SearchState,
    pub effect: Effect,
}

impl Transition {
    fn new(state: SearchState, effect: Effect) -> Self {
        Self { state, effect }
    }
}

pub fn reduce(state: &SearchState, action: Action) -> Transition {
    match action {
        Action::Edit(text) => {
            let next = SearchState {
                query: text,
                ..state.clone()
            };
            Transition::new(next, Effect::None)
        }

        Action::Submit(text) => {
            let Some(city) = normalize_query(&text) else {
                let next = SearchState {
                    query: text,
                    ..state.clone()
                };
                let effect = Effect::Notify(Notification::error(SearchError::Validation));
                return Transition::new(next, effect);
            };

            if state.is_busy() {
                return Transition::new(state.clone(), Effect::RejectedBusy);
            }

            let token = RequestToken(state.next_token);
            let effect = Effect::Fetch {
                token,
                city: city.to_string(),
            };
            let next = SearchState {
                query: text,
                snapshot: state.snapshot.clone(),
                in_flight: Some(token),
                next_token: state.next_token.wrapping_add(1),
            };
            Transition::new(next, effect)
        }

        Action::Completed { token, result } => {
            if state.in_flight != Some(token) {
                return Transition::new(state.clone(), Effect::Ignored);
            }

            match result {
                Ok(snapshot) => {
                    let next = SearchState {
                        snapshot: Some(snapshot),
                        in_flight: None,
                        ..state.clone()
                    };
                    Transition::new(next, Effect::None)
                }
                Err(cause) => {
                    let next = SearchState {
                        snapshot: None,
                        in_flight: None,
                        ..state.clone()
                    };
                    let effect = Effect::Notify(Notification::error(SearchError::fetch(cause)));
                    Transition::new(next, effect)
                }
            }
        }
    }
}
