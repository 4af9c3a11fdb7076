use crate::entity::Entity;
use chrono::{Local, NaiveDateTime};

/// Operator name recorded when no security context is available.
pub const SYSTEM_OPERATOR: &str = "sys";

/// Supplies the name stamped into `create_by` / `last_modified_by`.
pub trait OperatorProvider: Send + Sync {
    fn operator(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOperator;

impl OperatorProvider for SystemOperator {
    fn operator(&self) -> String {
        SYSTEM_OPERATOR.to_string()
    }
}

impl<F> OperatorProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn operator(&self) -> String {
        self()
    }
}

/// Fills audit columns right before a record is written
///
/// Only unset columns are touched, so values set explicitly by the caller survive.
#[derive(Debug, Clone, Default)]
pub struct FieldFillHandler<P = SystemOperator> {
    provider: P,
}

impl FieldFillHandler<SystemOperator> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: OperatorProvider> FieldFillHandler<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn insert_fill(&self, entity: &mut impl Entity) {
        self.insert_fill_at(entity, Local::now().naive_local());
    }

    pub fn update_fill(&self, entity: &mut impl Entity) {
        self.update_fill_at(entity, Local::now().naive_local());
    }

    /// Stamp creation and modification columns, live flag and initial version.
    pub fn insert_fill_at(&self, entity: &mut impl Entity, now: NaiveDateTime) {
        let operator = self.provider.operator();
        let audit = entity.audit_mut();

        audit.create_by.get_or_insert_with(|| operator.clone());
        audit.create_date.get_or_insert(now);
        audit.last_modified_by.get_or_insert(operator);
        audit.last_modified_date.get_or_insert(now);
        audit.deleted.get_or_insert(0);
        audit.version.get_or_insert(0);
        tracing::trace!(id = ?audit.id, "insert fill");
    }

    pub fn update_fill_at(&self, entity: &mut impl Entity, now: NaiveDateTime) {
        let audit = entity.audit_mut();
        if audit.last_modified_by.is_none() {
            audit.last_modified_by = Some(self.provider.operator());
        }
        audit.last_modified_date.get_or_insert(now);
        tracing::trace!(id = ?audit.id, "update fill");
    }
}
