//! Concrete resource families and their service aliases.

use tracing::debug;

use crate::case_tree::CaseChangeSetup;
use crate::context::{
    EmployeeServiceContext, PayrollServiceContext, PayrunServiceContext, RegulationServiceContext,
    RootServiceContext, TenantServiceContext,
};
use crate::error::{require_text, ApiResult};
use crate::model::{
    Case, CaseChange, Division, Employee, Payroll, PayrollLayer, Payrun, PayrunParameter, Regulation,
    Tenant, User,
};
use crate::paths;
use crate::query::{CaseChangeQuery, DivisionQuery, Query};
use crate::service::{Endpoint, Removable, ResourceService, WithAttributes, Writable};

macro_rules! endpoint {
    (
        $(#[$meta:meta])*
        $name:ident {
            context: $context:ty,
            item: $item:ty,
            query: $query:ty,
            $(name_field: $name_field:literal,)?
            path: |$ctx:ident| $path:expr $(,)?
        }
        $(, $capability:ident)*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Endpoint for $name {
            type Context = $context;
            type Item = $item;
            type Query = $query;
            $(const NAME_FIELD: &'static str = $name_field;)?

            fn collection_path($ctx: &Self::Context) -> String {
                $path
            }
        }

        $(impl $capability for $name {})*
    };
}

endpoint!(
    TenantEndpoint {
        context: RootServiceContext,
        item: Tenant,
        query: Query,
        name_field: "Identifier",
        path: |_context| paths::tenants(),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    DivisionEndpoint {
        context: TenantServiceContext,
        item: Division,
        query: Query,
        path: |context| paths::divisions(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    UserEndpoint {
        context: TenantServiceContext,
        item: User,
        query: Query,
        name_field: "Identifier",
        path: |context| paths::users(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    EmployeeEndpoint {
        context: TenantServiceContext,
        item: Employee,
        query: DivisionQuery,
        name_field: "Identifier",
        path: |context| paths::employees(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    RegulationEndpoint {
        context: TenantServiceContext,
        item: Regulation,
        query: Query,
        path: |context| paths::regulations(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    /// Cases are versioned with their regulation and are never deleted.
    CaseEndpoint {
        context: RegulationServiceContext,
        item: Case,
        query: Query,
        path: |context| paths::cases(context.tenant_id, context.regulation_id),
    },
    Writable,
    WithAttributes
);

endpoint!(
    PayrollEndpoint {
        context: TenantServiceContext,
        item: Payroll,
        query: DivisionQuery,
        path: |context| paths::payrolls(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    PayrollLayerEndpoint {
        context: PayrollServiceContext,
        item: PayrollLayer,
        query: Query,
        name_field: "RegulationName",
        path: |context| paths::payroll_layers(context.tenant_id, context.payroll_id),
    },
    Writable,
    Removable
);

endpoint!(
    PayrunEndpoint {
        context: TenantServiceContext,
        item: Payrun,
        query: Query,
        path: |context| paths::payruns(context.tenant_id),
    },
    Writable,
    Removable,
    WithAttributes
);

endpoint!(
    PayrunParameterEndpoint {
        context: PayrunServiceContext,
        item: PayrunParameter,
        query: Query,
        path: |context| paths::payrun_parameters(context.tenant_id, context.payrun_id),
    },
    Writable,
    Removable
);

endpoint!(
    /// Case changes are immutable; new ones go through `add_case`.
    EmployeeCaseChangeEndpoint {
        context: EmployeeServiceContext,
        item: CaseChange,
        query: CaseChangeQuery,
        path: |context| paths::employee_cases(context.tenant_id, context.employee_id),
    }
);

pub type TenantService = ResourceService<TenantEndpoint>;
pub type DivisionService = ResourceService<DivisionEndpoint>;
pub type UserService = ResourceService<UserEndpoint>;
pub type EmployeeService = ResourceService<EmployeeEndpoint>;
pub type RegulationService = ResourceService<RegulationEndpoint>;
pub type CaseService = ResourceService<CaseEndpoint>;
pub type PayrollService = ResourceService<PayrollEndpoint>;
pub type PayrollLayerService = ResourceService<PayrollLayerEndpoint>;
pub type PayrunService = ResourceService<PayrunEndpoint>;
pub type PayrunParameterService = ResourceService<PayrunParameterEndpoint>;
pub type EmployeeCaseChangeService = ResourceService<EmployeeCaseChangeEndpoint>;

impl EmployeeCaseChangeService {
    /// Submit a case tree and return the case change the backend stored.
    ///
    /// Duplicate `(field, slot)` keys are not rejected here; check
    /// `CaseChangeSetup::find_duplicated_case_value` before submitting if
    /// the caller cares.
    pub async fn add_case(
        &self,
        context: &EmployeeServiceContext,
        case_change: &CaseChangeSetup,
    ) -> ApiResult<CaseChange> {
        require_text("caseName", &case_change.case.case_name)?;
        let path = self.collection(context)?;
        debug!(
            %path,
            case = %case_change.case.case_name,
            values = case_change.collect_case_values().len(),
            "adding case change"
        );
        self.client().post(&path, case_change).await
    }
}
