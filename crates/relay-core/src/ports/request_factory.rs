//! RequestFactory port - rebuilds requests from archived dictionaries.
//!
//! The queue cannot construct concrete request types; the owner injects this.

use std::sync::Arc;

use crate::domain::{Request, RequestDictionary};

pub trait RequestFactory: Send + Sync {
    /// `None` drops the entry.
    fn revive(&self, dictionary: &RequestDictionary) -> Option<Arc<dyn Request>>;
}

impl<F> RequestFactory for F
where
    F: Fn(&RequestDictionary) -> Option<Arc<dyn Request>> + Send + Sync,
{
    fn revive(&self, dictionary: &RequestDictionary) -> Option<Arc<dyn Request>> {
        self(dictionary)
    }
}
