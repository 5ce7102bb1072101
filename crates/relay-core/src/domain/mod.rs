//! Domain model (ids, the request contract, errors, decisions, status text).

pub mod decision;
pub mod errors;
pub mod ids;
pub mod request;
pub mod status;

pub use decision::{Decision, decide};
pub use errors::{NetworkFailure, RelayError, RequestError};
pub use ids::RequestId;
pub use request::{Request, RequestContext, RequestDictionary};
pub use status::RequestStatus;
