//! Per-connection query timing state.
//!
//! # Responsibilities
//! - Give every instrumented connection a unique ID for diagnostics
//! - Hold the LIFO stack of start times of queries still in flight
//!
//! # Design Decisions
//! - The stack lives beside the connection, not in a global table, so it
//!   follows the connection through a pool across many requests
//! - A connection is assumed to run at most one query at a time; the lock
//!   only guards against misuse, it does not make interleaving meaningful

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Relaxed ordering is enough: IDs only need to be unique.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an instrumented connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "db-conn-{}", self.0)
    }
}

/// Start times of the queries currently open on one connection.
#[derive(Debug, Default)]
pub struct QueryStack {
    id: ConnectionId,
    starts: Mutex<Vec<f64>>,
}

impl QueryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Push a start time and return its slot, the stack depth below it.
    pub fn push(&self, start: f64) -> usize {
        let mut starts = self.starts.lock();
        starts.push(start);
        starts.len() - 1
    }

    /// Most recent start time, or `None` when nothing is open.
    pub fn pop(&self) -> Option<f64> {
        self.starts.lock().pop()
    }

    /// Drop the entry at `slot` along with anything opened after it.
    ///
    /// Returns how many entries were removed.
    pub fn discard(&self, slot: usize) -> usize {
        let mut starts = self.starts.lock();
        let removed = starts.len().saturating_sub(slot);
        starts.truncate(slot);
        removed
    }

    /// Number of started-but-unfinished queries.
    pub fn depth(&self) -> usize {
        self.starts.lock().len()
    }
}

/// A database connection paired with its query stack.
#[derive(Debug)]
pub struct TimedConnection<C> {
    inner: C,
    queries: QueryStack,
}

impl<C> TimedConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            queries: QueryStack::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.queries.id()
    }

    pub fn queries(&self) -> &QueryStack {
        &self.queries
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> Deref for TimedConnection<C> {
    type Target = C;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C> DerefMut for TimedConnection<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
