//! Persistence-side conventions shared by keystone services: audit columns, their fill
//! rules and paging requests whose sort columns are checked for SQL injection.

pub mod entity;
pub mod fill;
pub mod page;
pub mod sql_injection;

pub use entity::{AuditFields, DEFAULT_DATE_FORMAT, Entity};
pub use fill::{FieldFillHandler, OperatorProvider, SYSTEM_OPERATOR, SystemOperator};
pub use page::{OrderItem, PageReq, SortDir};
