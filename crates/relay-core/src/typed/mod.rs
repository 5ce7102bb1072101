//! Typed revival API.
//!
//! A request type declares its kind once (`Revivable::KIND`); the codec writes
//! that kind into every dictionary, and the registry maps it back to a
//! constructor after a restart.
//!
//! # Two layers
//! - **Typed**: `Revivable`, `RequestRegistry::register::<T>()`
//! - **Erased**: the registry's internal reviver table, exposed as a `RequestFactory`

pub mod codec;
pub mod registry;
pub mod revivable;

pub use self::codec::{CodecError, KIND_KEY};
pub use self::registry::{RegistryError, RequestRegistry};
pub use self::revivable::Revivable;
