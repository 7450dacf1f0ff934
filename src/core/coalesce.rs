//! At-most-one-in-flight wrapper around a routing machine
//!
//! Interactive callers (a dragged marker, a rapidly edited form) produce
//! requests faster than directions come back. The coalescer runs one request
//! at a time; anything submitted meanwhile is parked, and only the newest
//! parked request runs once the current one finishes.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::core::error::Result;
use crate::core::geo::Point;
use crate::core::machine::RoutingMachine;
use crate::core::network::Network;
use crate::core::remote::RemoteDirections;
use crate::core::route::RouteResult;

/// Outcome of [`DirectionsCoalescer::request`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was running; the request started immediately
    Started,
    /// A request is in flight; this one runs after it (unless superseded)
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    InFlight,
    QueuedRetry { a: Point, b: Point },
}

/// Completed request: the points it was made for and its outcome
#[derive(Debug)]
pub struct Delivery {
    pub a: Point,
    pub b: Point,
    pub result: Result<RouteResult>,
}

/// Request-coalescing front of a [`RoutingMachine`]
pub struct DirectionsCoalescer<N, R> {
    machine: Arc<RoutingMachine<N, R>>,
    state: Arc<Mutex<State>>,
    results: mpsc::UnboundedSender<Delivery>,
}

impl<N, R> DirectionsCoalescer<N, R>
where
    N: Network + 'static,
    R: RemoteDirections + 'static,
{
    /// Create the coalescer and the channel its results are delivered on
    pub fn new(machine: Arc<RoutingMachine<N, R>>) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coalescer = Self {
            machine,
            state: Arc::new(Mutex::new(State::Idle)),
            results: tx,
        };
        (coalescer, rx)
    }

    /// Ask for directions; must be called from within a tokio runtime
    pub fn request(&self, a: Point, b: Point) -> Submission {
        {
            let mut state = self.state.lock();
            match *state {
                State::Idle => *state = State::InFlight,
                State::InFlight | State::QueuedRetry { .. } => {
                    *state = State::QueuedRetry { a, b };
                    debug!("Directions request in flight, queued {a:?} -> {b:?}");
                    return Submission::Queued;
                }
            }
        }

        let machine = Arc::clone(&self.machine);
        let state = Arc::clone(&self.state);
        let results = self.results.clone();
        tokio::spawn(run_requests(machine, state, results, a, b));

        Submission::Started
    }

    /// True when no request is running or queued
    pub fn is_idle(&self) -> bool {
        *self.state.lock() == State::Idle
    }
}

/// Returns the coalescer to `Idle` if a worker ends without finishing its
/// queue (a panicking request, a runtime shutting down). A parked retry is
/// dropped with it.
struct InFlightGuard {
    state: Arc<Mutex<State>>,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = State::Idle;
        }
    }
}

async fn run_requests<N, R>(
    machine: Arc<RoutingMachine<N, R>>,
    state: Arc<Mutex<State>>,
    results: mpsc::UnboundedSender<Delivery>,
    mut a: Point,
    mut b: Point,
) where
    N: Network + 'static,
    R: RemoteDirections + 'static,
{
    let mut in_flight = InFlightGuard {
        state: Arc::clone(&state),
        armed: true,
    };

    loop {
        let result = machine.get_directions(a, b).await;
        // A dropped receiver only means nobody is listening anymore
        let _ = results.send(Delivery { a, b, result });

        let next = {
            let mut guard = state.lock();
            match *guard {
                State::QueuedRetry { a, b } => {
                    *guard = State::InFlight;
                    Some((a, b))
                }
                State::InFlight | State::Idle => {
                    *guard = State::Idle;
                    // Disarm under the lock: a new worker may start right after
                    in_flight.armed = false;
                    None
                }
            }
        };

        match next {
            Some((next_a, next_b)) => {
                a = next_a;
                b = next_b;
            }
            None => return,
        }
    }
}
