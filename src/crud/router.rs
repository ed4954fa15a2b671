use std::sync::Arc;

use axum::{
    extract::State,
    middleware::map_response,
    routing::{delete, get, post, put},
    Json, Router,
};

use super::{
    CreateService, DeleteService, FindAllService, FindService, Page, RequestContext, Resource,
    UpdateService,
};
use crate::api::extract::{IdPath, JsonBody, PageQuery};
use crate::api::method_not_allowed_envelope;
use crate::error::ApiResult;

/// Route table for one resource, built from the capabilities it implements.
///
/// ```ignore
/// let notes = ResourceRouter::new(NotesService::default()).create().find().find_all().build();
/// let app = Router::new().nest("/api/notes", notes);
/// ```
pub struct ResourceRouter<S: Resource> {
    service: Arc<S>,
    routes: Router<Arc<S>>,
}

impl<S: Resource> ResourceRouter<S> {
    pub fn new(service: S) -> Self {
        Self::from_arc(Arc::new(service))
    }

    pub fn from_arc(service: Arc<S>) -> Self {
        Self {
            service,
            routes: Router::new(),
        }
    }

    pub fn create(mut self) -> Self
    where
        S: CreateService,
    {
        self.routes = self.routes.route("/", post(create_handler::<S>));
        self
    }

    pub fn find(mut self) -> Self
    where
        S: FindService,
    {
        self.routes = self
            .routes
            .route("/:id", get(find_handler::<S>))
            .route("/projection/:id", get(projection_handler::<S>));
        self
    }

    pub fn find_all(mut self) -> Self
    where
        S: FindAllService,
    {
        self.routes = self
            .routes
            .route("/", get(find_all_handler::<S>))
            .route("/page", get(find_page_handler::<S>));
        self
    }

    pub fn update(mut self) -> Self
    where
        S: UpdateService,
    {
        self.routes = self.routes.route("/:id", put(update_handler::<S>));
        self
    }

    pub fn delete(mut self) -> Self
    where
        S: DeleteService,
    {
        self.routes = self.routes.route("/:id", delete(delete_handler::<S>));
        self
    }

    /// All five capabilities
    pub fn crud(self) -> Self
    where
        S: CreateService + FindService + FindAllService + UpdateService + DeleteService,
    {
        self.create().find().find_all().update().delete()
    }

    /// Unsupported methods on a mounted path answer 405 with the standard envelope
    pub fn build(self) -> Router {
        self.routes
            .with_state(self.service)
            .layer(map_response(method_not_allowed_envelope))
    }
}

async fn create_handler<S: CreateService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    JsonBody(body): JsonBody<S::Body>,
) -> ApiResult<S::Created> {
    service.validate_create(&body)?;
    service.create(&ctx, body).await
}

async fn find_handler<S: FindService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    IdPath(id): IdPath<S::Id>,
) -> ApiResult<Json<S::Record>> {
    service.validate_find(&id)?;
    service.find_by_id(&ctx, id).await.map(Json)
}

async fn projection_handler<S: FindService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    IdPath(id): IdPath<S::Id>,
) -> ApiResult<Json<S::Projection>> {
    service.validate_find(&id)?;
    service.find_projection(&ctx, id).await.map(Json)
}

async fn find_all_handler<S: FindAllService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
) -> ApiResult<Json<Vec<S::Item>>> {
    service.find_all(&ctx).await.map(Json)
}

async fn find_page_handler<S: FindAllService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    PageQuery(request): PageQuery,
) -> ApiResult<Json<Page<S::Item>>> {
    service.find_page(&ctx, request).await.map(Json)
}

async fn update_handler<S: UpdateService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    IdPath(id): IdPath<S::Id>,
    JsonBody(body): JsonBody<S::Body>,
) -> ApiResult<S::Updated> {
    service.validate_update(&id, &body)?;
    service.update(&ctx, id, body).await
}

async fn delete_handler<S: DeleteService>(
    State(service): State<Arc<S>>,
    ctx: RequestContext,
    IdPath(id): IdPath<S::Id>,
) -> ApiResult<S::Deleted> {
    service.validate_delete(&id)?;
    service.delete_by_id(&ctx, id).await
}
