use crate::sql_injection;
use keystone::common::{LogLevel, ViewLevel};
use keystone::exception::{Fault, FaultOptions, StackTrace};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CURRENT: u64 = 1;
pub const DEFAULT_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

/// One `ORDER BY` entry as requested by a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItem {
    pub column: String,
    #[serde(default)]
    pub dir: SortDir,
}

impl OrderItem {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column)
    }
}

/// Paging request with an optional query-by-example entity
///
/// Sort columns arrive from clients, so [`PageReq::orders`] refuses to hand them out
/// when any of them looks like SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageReq<E> {
    pub current: u64,
    pub size: u64,
    orders: Vec<OrderItem>,
    entity: Option<E>,
}

impl<E> Default for PageReq<E> {
    fn default() -> Self {
        Self {
            current: DEFAULT_CURRENT,
            size: DEFAULT_SIZE,
            orders: Vec::new(),
            entity: None,
        }
    }
}

impl<E> PageReq<E> {
    pub fn new(current: u64, size: u64) -> Self {
        Self {
            current,
            size,
            ..Default::default()
        }
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn set_entity(&mut self, entity: E) {
        self.entity = Some(entity);
    }

    pub fn add_order(&mut self, item: OrderItem) -> &mut Self {
        self.orders.push(item);
        self
    }

    /// Sort entries, or a business fault naming every suspicious column.
    pub fn orders(&self) -> Result<&[OrderItem], Fault> {
        let mut offenders: Vec<&str> = Vec::new();
        for item in &self.orders {
            let column = item.column.as_str();
            if !column.is_empty() && sql_injection::check(column) && !offenders.contains(&column) {
                offenders.push(column);
            }
        }
        if offenders.is_empty() {
            return Ok(&self.orders);
        }

        let joined = offenders.join("、");
        Err(Fault::business_with(
            FaultOptions::default()
                .message("排序字段: {} 非法", &[&joined])
                .view_message("排序字段: {} 非法", &[&joined])
                .stack_trace(StackTrace::Suppressed)
                .log_level(LogLevel::Warn)
                .view_level(ViewLevel::Warn),
        ))
    }

    /// Rows to skip before the current page; pages are 1-based.
    pub fn offset(&self) -> u64 {
        self.current.saturating_sub(1).saturating_mul(self.size)
    }

    /// Number of pages needed for `total` rows.
    pub fn pages(&self, total: u64) -> u64 {
        if self.size == 0 {
            return 0;
        }
        total.div_ceil(self.size)
    }
}
