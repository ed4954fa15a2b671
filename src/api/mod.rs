pub mod envelope;
pub mod extract;
pub mod response;

pub use envelope::{message, LoginEnvelope, ResponseEnvelope};
pub use extract::{IdPath, JsonBody, PageQuery};
pub use response::{method_not_allowed_envelope, not_found_fallback, LoginResponse, ServerResponse};
