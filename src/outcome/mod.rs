//! Response outcome subsystem.
//!
//! # States
//! - Open: rules may be appended
//! - Consumed: the outcome has been polled; rules are frozen
//!
//! # State Transitions
//! ```text
//! Open ──first poll──→ Consumed ──response──→ rules.rs dispatch ──→ Ready
//!                               └─transport error──────────────────→ Ready(Err)
//! ```
//!
//! # Design Decisions
//! - Composition over the wrapped future; dispatch is one extra stage
//!   applied inside `poll`
//! - Builders take `&mut self` and return `&mut Self`, so rules chain with
//!   `?` and the outcome is then awaited by value or by `&mut`
//! - Transport failures bypass the rules entirely

pub mod rules;

pub use rules::{Rule, Unrouted};

use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;

use crate::error::{Error, Result};
use crate::message::Response;

/// Eventual result of sending a request, with status-routed handlers.
///
/// `Outcome<Response>` passes the response through when no rules were
/// added. `Outcome<T>` for other `T` resolves to whatever the matching
/// handler returns and rejects a response nothing handled.
#[must_use = "an outcome does nothing unless awaited"]
pub struct Outcome<T = Response> {
    future: BoxFuture<'static, Result<Response>>,
    rules: Vec<Rule<T>>,
    unrouted: Unrouted<T>,
    consumed: bool,
    finished: bool,
}

impl Outcome<Response> {
    /// Wrap a response future; with no rules the response passes through.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        Self::with_policy(future, rules::pass_through)
    }
}

impl<T: Send + 'static> Outcome<T> {
    /// Wrap a response future whose value comes from handlers only.
    pub fn routed<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        Self::with_policy(future, rules::unmatched::<T>)
    }

    fn with_policy<F>(future: F, unrouted: Unrouted<T>) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
            rules: Vec::new(),
            unrouted,
            consumed: false,
            finished: false,
        }
    }

    /// Append a rule. Fails with `RulesClosed` once the outcome was polled.
    pub fn add_rule<P, H>(&mut self, predicate: P, handler: H) -> Result<&mut Self>
    where
        P: Fn(&Response) -> bool + Send + 'static,
        H: FnOnce(Response) -> T + Send + 'static,
    {
        if self.consumed {
            return Err(Error::RulesClosed);
        }
        self.rules.push(Rule::new(predicate, handler));
        Ok(self)
    }

    /// Handle one exact status.
    pub fn status<H>(&mut self, code: u16, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.add_rule(move |res: &Response| res.status() == code, handler)
    }

    /// Handle statuses in `min..=max`.
    pub fn status_range<H>(&mut self, min: u16, max: u16, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.add_rule(rules::status_range(min, max), handler)
    }

    fn class<H>(&mut self, (min, max): (u16, u16), handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.status_range(min, max, handler)
    }

    /// Handle 1xx responses.
    pub fn information<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::INFORMATION, handler)
    }

    /// Handle 2xx responses.
    pub fn success<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::SUCCESS, handler)
    }

    /// Handle 3xx responses.
    pub fn redirect<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::REDIRECT, handler)
    }

    /// Handle 4xx responses.
    pub fn client_error<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::CLIENT_ERROR, handler)
    }

    /// Handle 5xx responses.
    pub fn server_error<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::SERVER_ERROR, handler)
    }

    /// Handle 4xx and 5xx responses.
    pub fn error<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: FnOnce(Response) -> T + Send + 'static,
    {
        self.class(rules::ERROR, handler)
    }

    /// True once the outcome has been polled.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl<T> Future for Outcome<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.finished {
            panic!("Outcome polled after completion");
        }
        this.consumed = true;

        let settled = match this.future.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(settled) => settled,
        };
        this.finished = true;

        Poll::Ready(match settled {
            Ok(response) => rules::dispatch(mem::take(&mut this.rules), this.unrouted, response),
            Err(e) => Err(e),
        })
    }
}

impl<T> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("rules", &self.rules.len())
            .field("consumed", &self.consumed)
            .finish()
    }
}
