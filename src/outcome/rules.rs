//! Rules and the dispatch step.
//!
//! Dispatch runs once per response:
//! 1. no rules: the unrouted policy decides (pass-through or rejection)
//! 2. first predicate that matches, in registration order, runs its handler
//! 3. nothing matches: `UnmatchedResponse` carrying the response

use std::fmt;

use crate::error::{Error, Result};
use crate::message::Response;
use crate::observability::metrics;

pub type Predicate = Box<dyn Fn(&Response) -> bool + Send>;
pub type Handler<T> = Box<dyn FnOnce(Response) -> T + Send>;

/// What to do with a response when no rules were registered.
pub type Unrouted<T> = fn(Response) -> Result<T>;

/// Informational responses.
pub const INFORMATION: (u16, u16) = (100, 199);
/// Successful responses.
pub const SUCCESS: (u16, u16) = (200, 299);
/// Redirections.
pub const REDIRECT: (u16, u16) = (300, 399);
/// Client errors.
pub const CLIENT_ERROR: (u16, u16) = (400, 499);
/// Server errors.
pub const SERVER_ERROR: (u16, u16) = (500, 599);
/// Client and server errors.
pub const ERROR: (u16, u16) = (400, 599);

/// A (predicate, handler) pair.
pub struct Rule<T> {
    predicate: Predicate,
    handler: Handler<T>,
}

impl<T> Rule<T> {
    pub fn new<P, H>(predicate: P, handler: H) -> Self
    where
        P: Fn(&Response) -> bool + Send + 'static,
        H: FnOnce(Response) -> T + Send + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        }
    }

    pub fn matches(&self, response: &Response) -> bool {
        (self.predicate)(response)
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule")
    }
}

/// Predicate accepting `min..=max`.
pub fn status_range(min: u16, max: u16) -> impl Fn(&Response) -> bool + Send + 'static {
    move |res: &Response| (min..=max).contains(&res.status())
}

/// Pass-through policy for outcomes resolving to the response itself.
pub fn pass_through(response: Response) -> Result<Response> {
    Ok(response)
}

/// Policy for outcomes whose value only handlers can produce.
pub fn unmatched<T>(response: Response) -> Result<T> {
    Err(Error::UnmatchedResponse(Box::new(response)))
}

/// Route `response` through `rules`.
pub fn dispatch<T>(rules: Vec<Rule<T>>, unrouted: Unrouted<T>, response: Response) -> Result<T> {
    if rules.is_empty() {
        return unrouted(response);
    }

    for (index, rule) in rules.into_iter().enumerate() {
        if rule.matches(&response) {
            tracing::debug!(rule = index, status = response.status(), "Rule matched");
            return Ok((rule.handler)(response));
        }
    }

    tracing::debug!(status = response.status(), "No rule matched response");
    metrics::record_unmatched(response.status());
    unmatched(response)
}
