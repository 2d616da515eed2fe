//! Endpoint paths of the backend REST surface, relative to the base url.

pub const TENANTS: &str = "api/tenants";

pub fn tenants() -> String {
    TENANTS.to_string()
}

pub fn tenant(tenant_id: i32) -> String {
    item(TENANTS, tenant_id)
}

pub fn divisions(tenant_id: i32) -> String {
    format!("{}/divisions", tenant(tenant_id))
}

pub fn users(tenant_id: i32) -> String {
    format!("{}/users", tenant(tenant_id))
}

pub fn employees(tenant_id: i32) -> String {
    format!("{}/employees", tenant(tenant_id))
}

pub fn regulations(tenant_id: i32) -> String {
    format!("{}/regulations", tenant(tenant_id))
}

pub fn cases(tenant_id: i32, regulation_id: i32) -> String {
    format!("{}/cases", item(&regulations(tenant_id), regulation_id))
}

pub fn payrolls(tenant_id: i32) -> String {
    format!("{}/payrolls", tenant(tenant_id))
}

pub fn payruns(tenant_id: i32) -> String {
    format!("{}/payruns", tenant(tenant_id))
}

pub fn payroll_layers(tenant_id: i32, payroll_id: i32) -> String {
    format!("{}/layers", item(&payrolls(tenant_id), payroll_id))
}

pub fn payrun_parameters(tenant_id: i32, payrun_id: i32) -> String {
    format!("{}/parameters", item(&payruns(tenant_id), payrun_id))
}

pub fn employee_cases(tenant_id: i32, employee_id: i32) -> String {
    format!("{}/cases", item(&employees(tenant_id), employee_id))
}

pub fn item(collection: &str, id: i32) -> String {
    format!("{collection}/{id}")
}

/// `{item}/attributes/{name}`, the name percent-encoded.
pub fn attribute(item_path: &str, attribute_name: &str) -> String {
    format!("{item_path}/attributes/{}", urlencoding::encode(attribute_name))
}
