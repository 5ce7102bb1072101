//! Strongly-typed identifiers.
//!
//! Ids are ULIDs wrapped in a phantom-typed `Id<T>` so that a request id can
//! never be confused with some other kind of id at compile time. ULIDs sort
//! by creation time, which keeps log output readable.

use std::fmt;
use std::marker::PhantomData;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Marker trait providing the display prefix of an id type.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ULID-backed id.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Generate a fresh id stamped with the current wall-clock time.
    pub fn generate() -> Self {
        let timestamp_ms = Utc::now().timestamp_millis().max(0) as u64;
        Self::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Marker for queued requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueuedRequest {}

impl IdMarker for QueuedRequest {
    fn prefix() -> &'static str {
        "req-"
    }
}

/// Identifier of a queued request. Generated once at enqueue, never reused.
pub type RequestId = Id<QueuedRequest>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let a = RequestId::generate();
        let b = RequestId::generate();

        assert_ne!(a, b);
        assert!(a.to_string().starts_with("req-"));
    }

    #[test]
    fn ids_sort_by_creation_time() {
        let first = RequestId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RequestId::generate();

        assert!(first < second);
    }

    #[test]
    fn ids_serialize_as_bare_ulids() {
        let id = RequestId::generate();

        let s = serde_json::to_string(&id).unwrap();
        let back: RequestId = serde_json::from_str(&s).unwrap();

        assert_eq!(id, back);
        assert_eq!(s, format!("\"{}\"", id.as_ulid()));
        assert_eq!(std::mem::size_of::<RequestId>(), std::mem::size_of::<Ulid>());
    }
}
