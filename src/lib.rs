pub mod api;
pub mod auth;
pub mod config;
pub mod crud;
pub mod date;
pub mod entity;
pub mod error;
pub mod middleware;

pub use api::{ResponseEnvelope, ServerResponse};
pub use error::{ApiError, ApiResult};

/// Everything a resource implementation usually needs
pub mod prelude {
    pub use crate::api::{message, IdPath, JsonBody, LoginResponse, ServerResponse};
    pub use crate::auth::{JwtService, Principal, PrincipalLoader, TokenService};
    pub use crate::crud::{
        CreateService, DeleteService, FindAllService, FindService, Page, PageRequest, RequestContext,
        Resource, ResourceRouter, UpdateService,
    };
    pub use crate::entity::{Auditable, AuditableRecord, Secured, SecuredRecord, SecurityFlags};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::middleware::{authentication_gate, AuthGate, Authenticated};
}
