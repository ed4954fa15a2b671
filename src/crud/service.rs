use async_trait::async_trait;
use axum::response::IntoResponse;
use serde::Serialize;

use super::{Page, PageRequest, RequestContext, Resource};
use crate::error::ApiResult;

/// `POST /`
#[async_trait]
pub trait CreateService: Resource {
    /// Usually a `ServerResponse::created` envelope or the stored record as JSON
    type Created: IntoResponse + Send;

    /// Resource rules for a new body; runs before `create`
    fn validate_create(&self, _body: &Self::Body) -> ApiResult<()> {
        Ok(())
    }

    async fn create(&self, ctx: &RequestContext, body: Self::Body) -> ApiResult<Self::Created>;
}

/// `GET /:id` and `GET /projection/:id`
#[async_trait]
pub trait FindService: Resource {
    type Record: Serialize + Send;
    type Projection: Serialize + Send;

    fn validate_find(&self, _id: &Self::Id) -> ApiResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: Self::Id) -> ApiResult<Self::Record>;

    async fn find_projection(&self, ctx: &RequestContext, id: Self::Id) -> ApiResult<Self::Projection>;
}

/// `GET /` and `GET /page`
#[async_trait]
pub trait FindAllService: Resource {
    type Item: Serialize + Send;

    async fn find_all(&self, ctx: &RequestContext) -> ApiResult<Vec<Self::Item>>;

    async fn find_page(&self, ctx: &RequestContext, request: PageRequest) -> ApiResult<Page<Self::Item>>;
}

/// `PUT /:id`
#[async_trait]
pub trait UpdateService: Resource {
    type Updated: IntoResponse + Send;

    fn validate_update(&self, _id: &Self::Id, _body: &Self::Body) -> ApiResult<()> {
        Ok(())
    }

    async fn update(&self, ctx: &RequestContext, id: Self::Id, body: Self::Body) -> ApiResult<Self::Updated>;
}

/// `DELETE /:id`
#[async_trait]
pub trait DeleteService: Resource {
    type Deleted: IntoResponse + Send;

    fn validate_delete(&self, _id: &Self::Id) -> ApiResult<()> {
        Ok(())
    }

    async fn delete_by_id(&self, ctx: &RequestContext, id: Self::Id) -> ApiResult<Self::Deleted>;
}
