//! Capability contracts of entity-bound services.
//!
//! # Design
//! An `Endpoint` names a resource family once: its context, item type, query
//! descriptor and collection path. `ResourceService<E>` implements every
//! capability generically on top of `PayrollClient`; which capabilities a
//! concrete service has is decided by the marker traits its endpoint opts
//! into (`Writable`, `Removable`, `WithAttributes`), not by a fixed hierarchy.
//!
//! Every operation validates its context and ids before building a path.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::PayrollClient;
use crate::context::ServiceContext;
use crate::error::{require_id, require_text, ApiResult};
use crate::model::Resource;
use crate::paths;
use crate::query::{self, Query, QueryDescriptor, QueryResult, QueryResultType};

/// A resource family of the backend.
pub trait Endpoint: Send + Sync + 'static {
    type Context: ServiceContext;
    type Item: Resource + Serialize + DeserializeOwned + Send + Sync;
    type Query: QueryDescriptor + Clone + Send + Sync;

    /// Field matched by `get_by_name`.
    const NAME_FIELD: &'static str = "Name";

    /// Collection path for an already validated context.
    fn collection_path(context: &Self::Context) -> String;
}

/// Endpoints that accept create and update.
pub trait Writable: Endpoint {}

/// Endpoints that accept delete.
pub trait Removable: Endpoint {}

/// Endpoints with an attribute sub-resource per item.
pub trait WithAttributes: Endpoint {}

/// Types shared by all capabilities of a service.
pub trait Service {
    type Context: ServiceContext;
    type Item: Send + Sync;
}

#[async_trait]
pub trait Queryable: Service {
    type Query: QueryDescriptor + Send + Sync;

    async fn query(&self, context: &Self::Context, query: &Self::Query) -> ApiResult<Vec<Self::Item>>;

    async fn query_count(&self, context: &Self::Context, query: &Self::Query) -> ApiResult<i64>;

    async fn query_result(
        &self,
        context: &Self::Context,
        query: &Self::Query,
    ) -> ApiResult<QueryResult<Self::Item>>;

    async fn get(&self, context: &Self::Context, id: i32) -> ApiResult<Option<Self::Item>>;

    /// First item whose name field equals `name`, `None` if there is none.
    async fn get_by_name(&self, context: &Self::Context, name: &str) -> ApiResult<Option<Self::Item>>;
}

#[async_trait]
pub trait Creatable: Service {
    async fn create(&self, context: &Self::Context, item: &Self::Item) -> ApiResult<Self::Item>;
}

#[async_trait]
pub trait Updatable: Service {
    async fn update(&self, context: &Self::Context, item: &Self::Item) -> ApiResult<()>;

    /// Create `item`, or update `existing` with it; see `PayrollClient::upsert`.
    async fn upsert(
        &self,
        context: &Self::Context,
        item: &mut Self::Item,
        existing: Option<&Self::Item>,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait Deletable: Service {
    async fn delete(&self, context: &Self::Context, id: i32) -> ApiResult<()>;
}

#[async_trait]
pub trait AttributeCapable: Service {
    async fn get_attribute(&self, context: &Self::Context, id: i32, name: &str) -> ApiResult<Option<String>>;

    async fn set_attribute(&self, context: &Self::Context, id: i32, name: &str, value: &str) -> ApiResult<()>;

    async fn delete_attribute(&self, context: &Self::Context, id: i32, name: &str) -> ApiResult<()>;
}

/// Generic service over one endpoint.
#[derive(Debug, Clone)]
pub struct ResourceService<E> {
    client: PayrollClient,
    endpoint: PhantomData<fn() -> E>,
}

impl<E: Endpoint> ResourceService<E> {
    pub fn new(client: PayrollClient) -> Self {
        Self {
            client,
            endpoint: PhantomData,
        }
    }

    pub fn client(&self) -> &PayrollClient {
        &self.client
    }

    pub(crate) fn collection(&self, context: &E::Context) -> ApiResult<String> {
        context.validate()?;
        Ok(E::collection_path(context))
    }

    pub(crate) fn item(&self, context: &E::Context, id: i32) -> ApiResult<String> {
        require_id("id", id)?;
        Ok(paths::item(&self.collection(context)?, id))
    }

    fn query_url(&self, context: &E::Context, descriptor: &E::Query, result: QueryResultType) -> ApiResult<String> {
        let mut descriptor = descriptor.clone();
        descriptor.set_result(result);
        Ok(query::compose(&self.collection(context)?, &descriptor))
    }
}

impl<E: Endpoint> Service for ResourceService<E> {
    type Context = E::Context;
    type Item = E::Item;
}

#[async_trait]
impl<E: Endpoint> Queryable for ResourceService<E> {
    type Query = E::Query;

    async fn query(&self, context: &E::Context, query: &E::Query) -> ApiResult<Vec<E::Item>> {
        let url = self.query_url(context, query, QueryResultType::Items)?;
        self.client.get_collection(&url).await
    }

    async fn query_count(&self, context: &E::Context, query: &E::Query) -> ApiResult<i64> {
        let url = self.query_url(context, query, QueryResultType::Count)?;
        self.client.get_count(&url).await
    }

    async fn query_result(&self, context: &E::Context, query: &E::Query) -> ApiResult<QueryResult<E::Item>> {
        let url = self.query_url(context, query, QueryResultType::ItemsWithCount)?;
        self.client.get_query_result(&url).await
    }

    async fn get(&self, context: &E::Context, id: i32) -> ApiResult<Option<E::Item>> {
        let path = self.item(context, id)?;
        self.client.get(&path).await
    }

    async fn get_by_name(&self, context: &E::Context, name: &str) -> ApiResult<Option<E::Item>> {
        require_text("name", name)?;
        let url = query::compose(&self.collection(context)?, &Query::equals(E::NAME_FIELD, name));
        let items: Vec<E::Item> = self.client.get_collection(&url).await?;
        Ok(items.into_iter().next())
    }
}

#[async_trait]
impl<E: Writable> Creatable for ResourceService<E> {
    async fn create(&self, context: &E::Context, item: &E::Item) -> ApiResult<E::Item> {
        let path = self.collection(context)?;
        self.client.post(&path, item).await
    }
}

#[async_trait]
impl<E: Writable> Updatable for ResourceService<E> {
    async fn update(&self, context: &E::Context, item: &E::Item) -> ApiResult<()> {
        let path = self.item(context, item.id())?;
        self.client.put(&path, item).await
    }

    async fn upsert(&self, context: &E::Context, item: &mut E::Item, existing: Option<&E::Item>) -> ApiResult<()> {
        let path = self.collection(context)?;
        self.client.upsert(&path, item, existing, None).await
    }
}

#[async_trait]
impl<E: Removable> Deletable for ResourceService<E> {
    async fn delete(&self, context: &E::Context, id: i32) -> ApiResult<()> {
        let path = self.item(context, id)?;
        self.client.delete(&path).await
    }
}

#[async_trait]
impl<E: WithAttributes> AttributeCapable for ResourceService<E> {
    async fn get_attribute(&self, context: &E::Context, id: i32, name: &str) -> ApiResult<Option<String>> {
        let path = self.item(context, id)?;
        self.client.get_attribute(&path, name).await
    }

    async fn set_attribute(&self, context: &E::Context, id: i32, name: &str, value: &str) -> ApiResult<()> {
        let path = self.item(context, id)?;
        self.client.set_attribute(&path, name, value).await
    }

    async fn delete_attribute(&self, context: &E::Context, id: i32, name: &str) -> ApiResult<()> {
        let path = self.item(context, id)?;
        self.client.delete_attribute(&path, name).await
    }
}
