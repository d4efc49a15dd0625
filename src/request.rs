// src/request.rs

//! Request-side types consumed by the throttler: tags, priorities and the
//! `TaggedRequest` seam the throttler is generic over.

// dependencies
use std::borrow::Borrow;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// A workload tag attached to a read-version request.
///
/// Tags order lexicographically; that ordering breaks ties when choosing a
/// request's home queue.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionTag(String);

impl TransactionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

impl From<String> for TransactionTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl Borrow<str> for TransactionTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Downstream priority class an admitted request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Batch,
    #[default]
    Default,
}

/// A request the throttler can classify.
///
/// The throttler only looks at tags and priority; everything else about the
/// request is carried through untouched.
pub trait TaggedRequest {
    /// Tags attached by the request's originator. May be empty.
    fn tags(&self) -> impl Iterator<Item = &TransactionTag>;

    /// Priority class used to pick the output sequence on release.
    fn priority(&self) -> Priority;
}

/// A read-version request carrying a tag set and an opaque payload.
///
/// Each tag maps to the number of transactions the client is starting under
/// it, mirroring what clients put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadVersionRequest<P = ()> {
    pub tags: BTreeMap<TransactionTag, u32>,
    pub priority: Priority,
    pub payload: P,
}

impl<P> ReadVersionRequest<P> {
    pub fn new(priority: Priority, payload: P) -> Self {
        Self {
            tags: BTreeMap::new(),
            priority,
            payload,
        }
    }

    /// Builder-style: attach a tag with a transaction count of one
    pub fn tag(mut self, tag: impl Into<TransactionTag>) -> Self {
        *self.tags.entry(tag.into()).or_insert(0) += 1;
        self
    }
}

impl<P> TaggedRequest for ReadVersionRequest<P> {
    fn tags(&self) -> impl Iterator<Item = &TransactionTag> {
        self.tags.keys()
    }

    fn priority(&self) -> Priority {
        self.priority
    }
}

/// Push `request` onto the output matching its priority.
pub(crate) fn route<R: TaggedRequest>(
    request: R,
    out_batch: &mut VecDeque<R>,
    out_default: &mut VecDeque<R>,
) {
    match request.priority() {
        Priority::Batch => out_batch.push_back(request),
        Priority::Default => out_default.push_back(request),
    }
}
