//! Asynchronous typed client for the payroll backend REST API.
//!
//! # Overview
//! `PayrollClient` moves JSON payloads between typed entities and the
//! backend: it builds requests, maps non-2xx responses to structured errors,
//! extracts server-assigned ids and decides between create and update
//! (`upsert`). Entity services are instantiations of one generic
//! `ResourceService` over an `Endpoint`. Case changes travel as a tree of
//! `CaseSetup` nodes that can be searched and checked for duplicate values
//! in memory, before submitting or after receiving them.
//!
//! # Design
//! - The client holds only immutable configuration; calls are independent.
//! - Each operation is split into `build_*` (request) and `parse_*`
//!   (response) steps around an `HttpTransport`, so status interpretation is
//!   testable without a network.
//! - Preconditions (positive ids, non-empty names) are checked before a
//!   request is built.
//! - Case tree algorithms are synchronous, read-only and stack-safe.

pub mod case_tree;
pub mod client;
pub mod config;
pub mod context;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod model;
pub mod paths;
pub mod query;
pub mod service;

pub use case_tree::{CaseChangeSetup, CaseSetup, CaseValueSetup};
pub use client::PayrollClient;
pub use config::{ApiVersion, ClientConfig};
pub use context::{
    EmployeeServiceContext, PayrollServiceContext, PayrunServiceContext, RegulationServiceContext,
    RootServiceContext, ServiceContext, TenantServiceContext,
};
pub use endpoints::{
    CaseService, DivisionService, EmployeeCaseChangeService, EmployeeService, PayrollLayerService,
    PayrollService, PayrunParameterService, PayrunService, RegulationService, TenantService, UserService,
};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use model::{ObjectStatus, Resource, UpdateMode};
pub use query::{CaseChangeQuery, DivisionQuery, Query, QueryDescriptor, QueryResult, QueryResultType};
pub use service::{AttributeCapable, Creatable, Deletable, Queryable, ResourceService, Updatable};
