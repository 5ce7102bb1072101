//! RequestRegistry - kind -> reviver table used to rebuild archived requests.
//!
//! Revivers are stored type-erased (`Box<dyn Reviver>`), so one registry can
//! hold any mix of request types. Built once at startup, read-only afterwards.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use super::codec::{self, CodecError};
use super::revivable::Revivable;
use crate::domain::{Request, RequestDictionary};
use crate::ports::RequestFactory;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("reviver for kind '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("no reviver registered for kind '{0}'")]
    UnknownKind(String),

    #[error("archived dictionary has no kind")]
    MissingKind,

    #[error("failed to revive '{kind}': {source}")]
    Decode {
        kind: String,
        #[source]
        source: CodecError,
    },
}

/// Object-safe reviver.
trait Reviver: Send + Sync {
    fn revive(&self, dictionary: &RequestDictionary) -> Result<Arc<dyn Request>, CodecError>;
}

struct TypedReviver<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Revivable> Reviver for TypedReviver<T> {
    fn revive(&self, dictionary: &RequestDictionary) -> Result<Arc<dyn Request>, CodecError> {
        let request: T = codec::decode(dictionary)?;
        Ok(Arc::new(request))
    }
}

struct FnReviver<F>(F);

impl<F> Reviver for FnReviver<F>
where
    F: Fn(&RequestDictionary) -> Result<Arc<dyn Request>, CodecError> + Send + Sync,
{
    fn revive(&self, dictionary: &RequestDictionary) -> Result<Arc<dyn Request>, CodecError> {
        (self.0)(dictionary)
    }
}

/// # Example
/// ```ignore
/// let mut registry = RequestRegistry::new();
/// registry.register::<CheckIn>()?;
/// registry.register_fn("uploads.photo.v1", move |dictionary| {
///     let spec: PhotoSpec = codec::decode_payload(dictionary)?;
///     Ok(Arc::new(PhotoUpload::new(spec, api.clone())) as Arc<dyn Request>)
/// })?;
///
/// let queue = QueueBuilder::new("offline_requests").factory(registry);
/// ```
#[derive(Default)]
pub struct RequestRegistry {
    revivers: HashMap<String, Box<dyn Reviver>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request type that deserializes straight from its dictionary.
    pub fn register<T: Revivable>(&mut self) -> Result<(), RegistryError> {
        self.insert(
            T::KIND,
            Box::new(TypedReviver::<T> {
                _marker: PhantomData,
            }),
        )
    }

    /// Register a constructor, for requests that need injected dependencies.
    pub fn register_fn<F>(&mut self, kind: &str, reviver: F) -> Result<(), RegistryError>
    where
        F: Fn(&RequestDictionary) -> Result<Arc<dyn Request>, CodecError> + Send + Sync + 'static,
    {
        self.insert(kind, Box::new(FnReviver(reviver)))
    }

    fn insert(&mut self, kind: &str, reviver: Box<dyn Reviver>) -> Result<(), RegistryError> {
        if self.revivers.contains_key(kind) {
            return Err(RegistryError::AlreadyRegistered(kind.to_string()));
        }
        self.revivers.insert(kind.to_string(), reviver);
        Ok(())
    }

    pub fn try_revive(&self, dictionary: &RequestDictionary) -> Result<Arc<dyn Request>, RegistryError> {
        let kind = codec::kind_of(dictionary).ok_or(RegistryError::MissingKind)?;
        let reviver = self
            .revivers
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_string()))?;
        reviver.revive(dictionary).map_err(|source| RegistryError::Decode {
            kind: kind.to_string(),
            source,
        })
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.revivers.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.revivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revivers.is_empty()
    }
}

impl RequestFactory for RequestRegistry {
    fn revive(&self, dictionary: &RequestDictionary) -> Option<Arc<dyn Request>> {
        match self.try_revive(dictionary) {
            Ok(request) => Some(request),
            Err(error) => {
                warn!(%error, "dropping archived request");
                None
            }
        }
    }
}
