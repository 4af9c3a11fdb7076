use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use keystone::prelude::*;
use keystone_persistence::{AuditFields, Entity, FieldFillHandler, OrderItem, PageReq, SortDir};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(flatten)]
    audit: AuditFields,
    sku: String,
    quantity: u32,
}

impl Entity for Order {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    sku: String,
    quantity: u32,
}

impl Validate for CreateOrder {
    fn validate(&self, result: &mut BindingResult) {
        result
            .reject_if(self.sku.trim().is_empty(), "sku", "商品编号不能为空")
            .reject_if(self.quantity == 0, "quantity", "数量必须大于0")
            .reject_if(self.quantity > 999, "quantity", "数量不能超过999");
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    sku: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderPage {
    total: u64,
    pages: u64,
    records: Vec<Order>,
}

#[derive(Default)]
pub struct OrderStore {
    next_id: AtomicI64,
    orders: RwLock<BTreeMap<i64, Order>>,
    fill: FieldFillHandler,
}

fn not_found(id: i64) -> Fault {
    Fault::business_with(
        FaultOptions::default()
            .message("order {} not found", &[&id])
            .view_message("订单 {} 不存在", &[&id])
            .stack_trace(StackTrace::Suppressed)
            .log_level(LogLevel::Info)
            .view_level(ViewLevel::Warn)
            .status(Status::NOT_FOUND),
    )
}

async fn create(
    State(store): State<Arc<OrderStore>>,
    ValidJson(body): ValidJson<CreateOrder>,
) -> ApiResponse<Order> {
    let id = store.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    let mut order = Order {
        audit: AuditFields::with_id(id),
        sku: body.sku,
        quantity: body.quantity,
    };
    store.fill.insert_fill(&mut order);
    store.orders.write().await.insert(id, order.clone());
    tracing::info!(id, "order created");
    ApiResponse::ok(order)
}

async fn find(
    State(store): State<Arc<OrderStore>>,
    Bound(Path(id)): Bound<Path<i64>>,
) -> Result<ApiResponse<Order>, Fault> {
    let orders = store.orders.read().await;
    let order = orders
        .get(&id)
        .filter(|order| !order.audit().is_deleted())
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(order.clone()))
}

async fn remove(
    State(store): State<Arc<OrderStore>>,
    Bound(Path(id)): Bound<Path<i64>>,
) -> Result<ApiResponse<()>, Fault> {
    let mut orders = store.orders.write().await;
    let order = orders
        .get_mut(&id)
        .filter(|order| !order.audit().is_deleted())
        .ok_or_else(|| not_found(id))?;
    let audit = order.audit_mut();
    audit.deleted = Some(1);
    audit.last_modified_by = None;
    audit.last_modified_date = None;
    store.fill.update_fill(order);
    Ok(ApiResponse::ok_empty())
}

async fn search(
    State(store): State<Arc<OrderStore>>,
    Bound(Json(page)): Bound<Json<PageReq<OrderQuery>>>,
) -> Result<ApiResponse<OrderPage>, Fault> {
    let sort = page.orders()?;
    let sku = page.entity().and_then(|query| query.sku.clone());

    let orders = store.orders.read().await;
    let mut matching: Vec<Order> = orders
        .values()
        .filter(|order| !order.audit().is_deleted())
        .filter(|order| sku.as_deref().is_none_or(|sku| order.sku == sku))
        .cloned()
        .collect();
    matching.sort_by(|a, b| compare(a, b, sort));

    let total = matching.len() as u64;
    let records = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.size as usize)
        .collect();
    Ok(ApiResponse::ok(OrderPage {
        total,
        pages: page.pages(total),
        records,
    }))
}

fn compare(a: &Order, b: &Order, sort: &[OrderItem]) -> CmpOrdering {
    for item in sort {
        let ordering = match item.column.as_str() {
            "sku" => a.sku.cmp(&b.sku),
            "quantity" => a.quantity.cmp(&b.quantity),
            "createDate" | "create_date" => a.audit.create_date.cmp(&b.audit.create_date),
            "id" => a.id().cmp(&b.id()),
            other => {
                tracing::debug!(column = other, "ignoring unknown sort column");
                CmpOrdering::Equal
            }
        };
        let ordering = match item.dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        };
        if ordering != CmpOrdering::Equal {
            return ordering;
        }
    }
    a.id().cmp(&b.id())
}

/// Any error a handler does not classify ends up as the generic busy message.
async fn report() -> Result<ApiResponse<()>, Exception> {
    Err(anyhow::anyhow!("report backend unreachable").into())
}

pub fn router() -> Router {
    Router::new()
        .route("/orders", post(create))
        .route("/orders/search", post(search))
        .route("/orders/{id}", get(find).delete(remove))
        .route("/reports", get(report))
        .with_state(Arc::new(OrderStore::default()))
}
