//! Immutable path contexts for tenant-bound services.
//!
//! A context carries the ids a service needs to build its paths. Every
//! operation validates its context before building a path, so a missing or
//! non-positive id fails locally and never reaches the network.

use std::fmt::Debug;

use crate::error::{require_id, ApiResult};

pub trait ServiceContext: Debug + Clone + Send + Sync {
    /// Fail with a precondition error unless every id is positive.
    fn validate(&self) -> ApiResult<()>;
}

/// Context of root-level resources such as tenants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootServiceContext;

impl ServiceContext for RootServiceContext {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantServiceContext {
    pub tenant_id: i32,
}

impl TenantServiceContext {
    pub fn new(tenant_id: i32) -> Self {
        Self { tenant_id }
    }
}

impl ServiceContext for TenantServiceContext {
    fn validate(&self) -> ApiResult<()> {
        require_id("tenantId", self.tenant_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulationServiceContext {
    pub tenant_id: i32,
    pub regulation_id: i32,
}

impl RegulationServiceContext {
    pub fn new(tenant_id: i32, regulation_id: i32) -> Self {
        Self {
            tenant_id,
            regulation_id,
        }
    }
}

impl ServiceContext for RegulationServiceContext {
    fn validate(&self) -> ApiResult<()> {
        require_id("tenantId", self.tenant_id)?;
        require_id("regulationId", self.regulation_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollServiceContext {
    pub tenant_id: i32,
    pub payroll_id: i32,
}

impl PayrollServiceContext {
    pub fn new(tenant_id: i32, payroll_id: i32) -> Self {
        Self { tenant_id, payroll_id }
    }
}

impl ServiceContext for PayrollServiceContext {
    fn validate(&self) -> ApiResult<()> {
        require_id("tenantId", self.tenant_id)?;
        require_id("payrollId", self.payroll_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrunServiceContext {
    pub tenant_id: i32,
    pub payrun_id: i32,
}

impl PayrunServiceContext {
    pub fn new(tenant_id: i32, payrun_id: i32) -> Self {
        Self { tenant_id, payrun_id }
    }
}

impl ServiceContext for PayrunServiceContext {
    fn validate(&self) -> ApiResult<()> {
        require_id("tenantId", self.tenant_id)?;
        require_id("payrunId", self.payrun_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeServiceContext {
    pub tenant_id: i32,
    pub employee_id: i32,
}

impl EmployeeServiceContext {
    pub fn new(tenant_id: i32, employee_id: i32) -> Self {
        Self {
            tenant_id,
            employee_id,
        }
    }
}

impl ServiceContext for EmployeeServiceContext {
    fn validate(&self) -> ApiResult<()> {
        require_id("tenantId", self.tenant_id)?;
        require_id("employeeId", self.employee_id)
    }
}
