//! Revivable - requests that can be rebuilt from their archived dictionary.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::Request;

/// Ties a request type to the kind string written into its dictionary.
///
/// # Example
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct CheckIn {
///     place: String,
/// }
///
/// impl Revivable for CheckIn {
///     const KIND: &'static str = "check_in.v1";
/// }
///
/// #[async_trait]
/// impl Request for CheckIn {
///     // ...
///     fn to_dictionary(&self) -> RequestDictionary {
///         codec::dictionary_or_empty(self)
///     }
/// }
/// ```
///
/// `to_dictionary` is not filled in automatically; forward it to
/// `codec::dictionary_or_empty` as above or the request will not survive a
/// restart.
///
/// # Naming
/// - `{domain}.{action}.v{major}`, e.g. `visits.create.v1`
pub trait Revivable: Request + Serialize + DeserializeOwned {
    const KIND: &'static str;
}
