// crud/mod.rs - capability contracts for REST resources
//
// A resource implements `Resource` once, then any subset of the five capability
// traits. `ResourceRouter` mounts only the routes for the capabilities present:
//
//   POST   /                 CreateService::create
//   GET    /                 FindAllService::find_all
//   GET    /page?page=&size= FindAllService::find_page
//   GET    /:id              FindService::find_by_id
//   GET    /projection/:id   FindService::find_projection
//   PUT    /:id              UpdateService::update
//   DELETE /:id              DeleteService::delete_by_id

pub mod page;
pub mod router;
pub mod service;

pub use page::{Page, PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use router::ResourceRouter;
pub use service::{CreateService, DeleteService, FindAllService, FindService, UpdateService};

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;

use crate::api::envelope::message;
use crate::auth::Principal;
use crate::error::ApiError;

/// Identifier and payload types shared by a resource's capabilities, plus the error helpers
pub trait Resource: Send + Sync + 'static {
    type Id: DeserializeOwned + Send + Sync + 'static;
    type Body: DeserializeOwned + Send + 'static;

    /// ValidationFailure `Field '<field>' is required`
    fn required(&self, field: &str) -> ApiError {
        ApiError::required(field)
    }

    /// ValidationFailure with a caller-supplied message
    fn message(&self, text: &str) -> ApiError {
        ApiError::validation(text)
    }

    /// Wrap a lower-layer failure as an UnexpectedFailure
    fn exception<E>(&self, cause: E) -> ApiError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::exception(cause)
    }
}

/// Per-request state handed to every capability method
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    principal: Option<Principal>,
}

impl RequestContext {
    pub fn new(principal: Option<Principal>) -> Self {
        Self { principal }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self::new(Some(principal))
    }

    /// The bound principal, or an AuthorizationFailure when the caller is anonymous
    pub fn principal(&self) -> Result<&Principal, ApiError> {
        self.principal
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized(message::UNAUTHORIZED))
    }

    pub fn maybe_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(parts.extensions.get::<Principal>().cloned()))
    }
}
