use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// In-memory records of the mock backend. Every id comes from one sequence.
#[derive(Debug, Default)]
pub struct Store {
    last_id: i32,
    tenants: BTreeMap<i32, Value>,
    divisions: BTreeMap<i32, (i32, Value)>,
    attributes: HashMap<(i32, String), Value>,
    case_changes: BTreeMap<i32, (i32, i32, Value)>,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

pub type Db = Arc<RwLock<Store>>;

type Params = Query<Vec<(String, String)>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/tenants", get(list_tenants).post(create_tenant))
        .route(
            "/api/tenants/{tenant_id}",
            get(get_tenant).put(update_tenant).delete(delete_tenant),
        )
        .route(
            "/api/tenants/{tenant_id}/attributes/{name}",
            get(get_attribute).post(set_attribute).delete(delete_attribute),
        )
        .route(
            "/api/tenants/{tenant_id}/divisions",
            get(list_divisions).post(create_division),
        )
        .route(
            "/api/tenants/{tenant_id}/divisions/{id}",
            get(get_division).put(update_division).delete(delete_division),
        )
        .route(
            "/api/tenants/{tenant_id}/employees/{employee_id}/cases",
            get(list_case_changes).post(add_case_change),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Query handling
// ---------------------------------------------------------------------------

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Parse `Field eq 'value'` into the camelCase JSON key and the unquoted value.
fn parse_equality(filter: &str) -> Option<(String, String)> {
    let (field, value) = filter.split_once(" eq ")?;
    let value = value.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = field.trim().chars();
    let first = chars.next()?;
    let key = first.to_lowercase().chain(chars).collect();
    Some((key, value.replace("''", "'")))
}

fn query_response(records: Vec<Value>, params: &[(String, String)]) -> Response {
    let mut records = records;
    if let Some((key, expected)) = param(params, "Filter").and_then(parse_equality) {
        records.retain(|record| record.get(&key).and_then(Value::as_str) == Some(expected.as_str()));
    }
    if let Some(status) = param(params, "Status") {
        records.retain(|record| record.get("status").and_then(Value::as_str) == Some(status));
    }
    let count = records.len();
    let skip = param(params, "Skip").and_then(|v| v.parse().ok()).unwrap_or(0);
    let top = param(params, "Top").and_then(|v| v.parse().ok()).unwrap_or(usize::MAX);
    let items: Vec<Value> = records.into_iter().skip(skip).take(top).collect();

    match param(params, "Result") {
        Some("Count") => Json(json!(count)).into_response(),
        Some("ItemsWithCount") => Json(json!({ "count": count, "items": items })).into_response(),
        _ => Json(items).into_response(),
    }
}

fn created(location: String, record: Value) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(record)).into_response()
}

fn conflict(message: String) -> Response {
    (StatusCode::CONFLICT, message).into_response()
}

/// Stamp id and default status onto a posted object.
fn stamp(body: Value, id: i32) -> Result<Value, StatusCode> {
    let Value::Object(mut fields) = body else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    fields.insert("id".to_string(), json!(id));
    fields.entry("status").or_insert_with(|| json!("Active"));
    Ok(Value::Object(fields))
}

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

async fn list_tenants(State(db): State<Db>, Query(params): Params) -> Response {
    let store = db.read().await;
    query_response(store.tenants.values().cloned().collect(), &params)
}

async fn create_tenant(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let Some(identifier) = body.get("identifier").and_then(Value::as_str).map(str::to_string) else {
        return (StatusCode::BAD_REQUEST, "tenant identifier missing").into_response();
    };
    let mut store = db.write().await;
    if store
        .tenants
        .values()
        .any(|tenant| tenant.get("identifier").and_then(Value::as_str) == Some(identifier.as_str()))
    {
        return conflict(format!("tenant with identifier {identifier} already exists"));
    }
    let id = store.next_id();
    let tenant = match stamp(body, id) {
        Ok(tenant) => tenant,
        Err(status) => return status.into_response(),
    };
    store.tenants.insert(id, tenant.clone());
    debug!(id, %identifier, "tenant created");
    created(format!("/api/tenants/{id}"), tenant)
}

async fn get_tenant(State(db): State<Db>, Path(tenant_id): Path<i32>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store.tenants.get(&tenant_id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_tenant(
    State(db): State<Db>,
    Path(tenant_id): Path<i32>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let tenant = store.tenants.get_mut(&tenant_id).ok_or(StatusCode::NOT_FOUND)?;
    *tenant = stamp(body, tenant_id)?;
    Ok(Json(tenant.clone()))
}

async fn delete_tenant(State(db): State<Db>, Path(tenant_id): Path<i32>) -> StatusCode {
    let mut store = db.write().await;
    match store.tenants.remove(&tenant_id) {
        Some(_) => {
            store.attributes.retain(|(owner, _), _| *owner != tenant_id);
            store.divisions.retain(|_, (owner, _)| *owner != tenant_id);
            store.case_changes.retain(|_, (owner, _, _)| *owner != tenant_id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

// ---------------------------------------------------------------------------
// Tenant attributes
// ---------------------------------------------------------------------------

async fn get_attribute(
    State(db): State<Db>,
    Path((tenant_id, name)): Path<(i32, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .attributes
        .get(&(tenant_id, name))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn set_attribute(
    State(db): State<Db>,
    Path((tenant_id, name)): Path<(i32, String)>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    if !store.tenants.contains_key(&tenant_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    store.attributes.insert((tenant_id, name), value.clone());
    Ok(Json(value))
}

async fn delete_attribute(State(db): State<Db>, Path((tenant_id, name)): Path<(i32, String)>) -> StatusCode {
    let mut store = db.write().await;
    match store.attributes.remove(&(tenant_id, name)) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

// ---------------------------------------------------------------------------
// Divisions
// ---------------------------------------------------------------------------

async fn list_divisions(
    State(db): State<Db>,
    Path(tenant_id): Path<i32>,
    Query(params): Params,
) -> Result<Response, StatusCode> {
    let store = db.read().await;
    if !store.tenants.contains_key(&tenant_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let divisions = store
        .divisions
        .values()
        .filter(|(owner, _)| *owner == tenant_id)
        .map(|(_, division)| division.clone())
        .collect();
    Ok(query_response(divisions, &params))
}

async fn create_division(State(db): State<Db>, Path(tenant_id): Path<i32>, Json(body): Json<Value>) -> Response {
    let mut store = db.write().await;
    if !store.tenants.contains_key(&tenant_id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let id = store.next_id();
    let division = match stamp(body, id) {
        Ok(division) => division,
        Err(status) => return status.into_response(),
    };
    store.divisions.insert(id, (tenant_id, division.clone()));
    created(format!("/api/tenants/{tenant_id}/divisions/{id}"), division)
}

async fn get_division(
    State(db): State<Db>,
    Path((tenant_id, id)): Path<(i32, i32)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    match store.divisions.get(&id) {
        Some((owner, division)) if *owner == tenant_id => Ok(Json(division.clone())),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn update_division(
    State(db): State<Db>,
    Path((tenant_id, id)): Path<(i32, i32)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    match store.divisions.get_mut(&id) {
        Some((owner, division)) if *owner == tenant_id => {
            *division = stamp(body, id)?;
            Ok(Json(division.clone()))
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn delete_division(State(db): State<Db>, Path((tenant_id, id)): Path<(i32, i32)>) -> StatusCode {
    let mut store = db.write().await;
    let owned = matches!(store.divisions.get(&id), Some((owner, _)) if *owner == tenant_id);
    if !owned {
        return StatusCode::NOT_FOUND;
    }
    store.divisions.remove(&id);
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Employee case changes
// ---------------------------------------------------------------------------

/// Flatten a posted case tree into stored case values, node before related cases.
/// A value without its own slot takes the slot of its case.
fn case_values(case: &Value, values: &mut Vec<Value>) {
    let case_name = case.get("caseName").cloned().unwrap_or(Value::Null);
    let case_slot = case.get("caseSlot").filter(|slot| !slot.is_null());
    for value in case.get("values").and_then(Value::as_array).into_iter().flatten() {
        let mut stored = Map::new();
        stored.insert("caseName".to_string(), case_name.clone());
        for key in ["caseFieldName", "caseSlot", "value", "start", "end"] {
            if let Some(field) = value.get(key) {
                stored.insert(key.to_string(), field.clone());
            }
        }
        if !stored.contains_key("caseSlot") {
            if let Some(slot) = case_slot {
                stored.insert("caseSlot".to_string(), slot.clone());
            }
        }
        values.push(Value::Object(stored));
    }
    for related in case.get("relatedCases").and_then(Value::as_array).into_iter().flatten() {
        case_values(related, values);
    }
}

async fn list_case_changes(
    State(db): State<Db>,
    Path((tenant_id, employee_id)): Path<(i32, i32)>,
    Query(params): Params,
) -> Response {
    let store = db.read().await;
    let changes = store
        .case_changes
        .values()
        .filter(|(tenant, employee, _)| *tenant == tenant_id && *employee == employee_id)
        .map(|(_, _, change)| change.clone())
        .collect();
    query_response(changes, &params)
}

async fn add_case_change(
    State(db): State<Db>,
    Path((tenant_id, employee_id)): Path<(i32, i32)>,
    Json(setup): Json<Value>,
) -> Response {
    let Some(case) = setup.get("case") else {
        return (StatusCode::BAD_REQUEST, "case missing").into_response();
    };
    let mut values = Vec::new();
    case_values(case, &mut values);

    let mut store = db.write().await;
    if !store.tenants.contains_key(&tenant_id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let id = store.next_id();
    let mut change = json!({
        "id": id,
        "status": "Active",
        "userId": setup.get("userId").cloned().unwrap_or(json!(0)),
        "employeeId": employee_id,
        "values": values,
    });
    for key in ["divisionId", "reason"] {
        if let Some(field) = setup.get(key) {
            change[key] = field.clone();
        }
    }
    store.case_changes.insert(id, (tenant_id, employee_id, change.clone()));
    created(
        format!("/api/tenants/{tenant_id}/employees/{employee_id}/cases/{id}"),
        change,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_filter_parses_to_camel_case_key() {
        assert_eq!(
            parse_equality("Identifier eq 'Acme'"),
            Some(("identifier".to_string(), "Acme".to_string()))
        );
        assert_eq!(
            parse_equality("Name eq 'O''Neil'"),
            Some(("name".to_string(), "O'Neil".to_string()))
        );
        assert_eq!(parse_equality("Name ne 'x'"), None);
        assert_eq!(parse_equality("Name eq x"), None);
    }

    #[test]
    fn stamp_sets_id_and_default_status() {
        let stamped = stamp(json!({"identifier":"Acme","id":99}), 3).unwrap();
        assert_eq!(stamped["id"], 3);
        assert_eq!(stamped["status"], "Active");
        assert!(stamp(json!([1, 2]), 3).is_err());
    }

    #[test]
    fn case_values_flatten_in_pre_order() {
        let case = json!({
            "caseName": "A",
            "values": [{"caseFieldName": "a1", "value": "1"}],
            "relatedCases": [
                {
                    "caseName": "B",
                    "values": [{"caseFieldName": "b1"}],
                    "relatedCases": [{"caseName": "D", "values": [{"caseFieldName": "d1"}]}]
                },
                {"caseName": "C", "values": [{"caseFieldName": "c1", "caseSlot": "2"}]}
            ]
        });
        let mut values = Vec::new();
        case_values(&case, &mut values);
        let fields: Vec<&str> = values
            .iter()
            .map(|v| v["caseFieldName"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["a1", "b1", "d1", "c1"]);
        assert_eq!(values[2]["caseName"], "D");
        assert_eq!(values[3]["caseSlot"], "2");
    }

    #[tokio::test]
    async fn delete_tenant_purges_owned_records() {
        let db: Db = Arc::default();
        {
            let mut store = db.write().await;
            store.tenants.insert(1, json!({"id": 1}));
            store.tenants.insert(2, json!({"id": 2}));
            store.divisions.insert(3, (1, json!({"id": 3})));
            store.attributes.insert((1, "Region".to_string()), json!("north"));
            store.case_changes.insert(4, (1, 7, json!({"id": 4})));
            store.case_changes.insert(5, (2, 7, json!({"id": 5})));
        }

        let status = delete_tenant(State(db.clone()), Path(1)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let store = db.read().await;
        assert!(store.divisions.is_empty());
        assert!(store.attributes.is_empty());
        assert_eq!(store.case_changes.keys().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn case_values_inherit_case_slot() {
        let case = json!({
            "caseName": "Child",
            "caseSlot": "1",
            "values": [
                {"caseFieldName": "BirthDate"},
                {"caseFieldName": "Name", "caseSlot": "2"}
            ]
        });
        let mut values = Vec::new();
        case_values(&case, &mut values);
        assert_eq!(values[0]["caseSlot"], "1");
        assert_eq!(values[1]["caseSlot"], "2");

        let mut values = Vec::new();
        case_values(&json!({"caseName": "Wage", "values": [{"caseFieldName": "Salary"}]}), &mut values);
        assert!(values[0].get("caseSlot").is_none());
    }
}
