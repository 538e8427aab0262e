/// Generic CRUD and query endpoints, mounted once per entity type
use crate::{
    api::run_blocking,
    auth::AdminSession,
    context::AppContext,
    error::CamResult,
    store::{Condition, Entity, FieldValue, Filters, Page, SortBy},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Routes for one entity under `/api/{path}`
pub fn entity_routes<E: Entity>(path: &str) -> Router<AppContext> {
    Router::new()
        .route(&format!("/api/{}", path), post(insert_record::<E>))
        .route(&format!("/api/{}/query", path), post(list_records::<E>))
        .route(
            &format!("/api/{}/:id", path),
            get(get_record::<E>)
                .put(update_record::<E>)
                .delete(delete_record::<E>),
        )
}

/// Record plus the field names to write (empty means all)
#[derive(Debug, Deserialize)]
pub struct WriteRequest<E> {
    pub record: E,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub offset: usize,
    pub limit: Option<usize>,
    pub filters: FilterSpec,
    pub return_fields: Vec<String>,
    pub sort_by: Option<SortSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub operator: Option<String>,
    pub conditions: Vec<ConditionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionSpec {
    pub field: String,
    pub comparison: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "ASC".to_string()
}

impl FilterSpec {
    /// Operands are typed by the target field's descriptor
    pub fn into_filters<E: Entity>(self) -> CamResult<Filters> {
        let conditions = self
            .conditions
            .into_iter()
            .map(|condition| {
                let value = match E::field(&condition.field) {
                    Some(def) => def.parse_json(&condition.value)?,
                    None => FieldValue::infer(&condition.value),
                };
                Condition::parse(condition.field, &condition.comparison, value)
            })
            .collect::<CamResult<Vec<_>>>()?;

        Filters::parse(self.operator.as_deref().unwrap_or("AND"), conditions)
    }
}

async fn insert_record<E: Entity>(
    _session: AdminSession,
    State(ctx): State<AppContext>,
    Json(req): Json<WriteRequest<E>>,
) -> CamResult<(StatusCode, Json<Value>)> {
    let repo = ctx.repository::<E>();
    let id = run_blocking(move || repo.insert(&req.record, &req.fields)).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn get_record<E: Entity>(
    _session: AdminSession,
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> CamResult<Json<E>> {
    let repo = ctx.repository::<E>();
    let record = run_blocking(move || repo.get(&id)).await?;

    Ok(Json(record))
}

async fn update_record<E: Entity>(
    _session: AdminSession,
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<WriteRequest<E>>,
) -> CamResult<Json<Value>> {
    let WriteRequest { mut record, fields } = req;
    record.set_id(id);

    let repo = ctx.repository::<E>();
    let rows_affected = run_blocking(move || repo.update(&record, &fields)).await?;

    Ok(Json(json!({ "rows_affected": rows_affected })))
}

async fn delete_record<E: Entity>(
    _session: AdminSession,
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> CamResult<Json<Value>> {
    let repo = ctx.repository::<E>();
    let rows_affected = run_blocking(move || repo.delete(&id)).await?;

    Ok(Json(json!({ "rows_affected": rows_affected })))
}

async fn list_records<E: Entity>(
    _session: AdminSession,
    State(ctx): State<AppContext>,
    Json(req): Json<QueryRequest>,
) -> CamResult<Json<Page<E>>> {
    let max_limit = ctx.config.api.list_max_limit;
    let limit = req.limit.unwrap_or(max_limit).min(max_limit);

    let filters = req.filters.into_filters::<E>()?;
    let sort_by = match req.sort_by {
        Some(sort) => SortBy::parse(sort.field, &sort.direction)?,
        None => SortBy::default(),
    };
    let return_fields = req.return_fields;
    let offset = req.offset;

    let repo = ctx.repository::<E>();
    let page = run_blocking(move || repo.list(offset, limit, &filters, &return_fields, &sort_by)).await?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Photo;
    use crate::store::Operator;

    #[test]
    fn test_condition_values_follow_field_kind() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "operator": "OR",
            "conditions": [
                { "field": "FileType", "comparison": "LIKE", "value": "%pg" },
                { "field": "Width", "comparison": ">", "value": 320 },
                { "field": "Created", "comparison": "<", "value": "2030-01-01T00:00:00Z" }
            ]
        }))
        .unwrap();

        let filters = spec.into_filters::<Photo>().unwrap();
        assert_eq!(filters.operator, Operator::Or);
        assert_eq!(filters.conditions[0].value, FieldValue::from("%pg"));
        assert_eq!(filters.conditions[1].value, FieldValue::Integer(320));
        assert!(matches!(filters.conditions[2].value, FieldValue::Timestamp(_)));
    }

    #[test]
    fn test_mistyped_operand_is_rejected() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "conditions": [{ "field": "Width", "comparison": "=", "value": "wide" }]
        }))
        .unwrap();

        assert!(spec.into_filters::<Photo>().unwrap_err().is_validation());
    }

    #[test]
    fn test_bad_operator_is_rejected() {
        let spec: FilterSpec = serde_json::from_value(json!({ "operator": "XOR" })).unwrap();
        assert!(spec.into_filters::<Photo>().unwrap_err().is_validation());
    }
}
