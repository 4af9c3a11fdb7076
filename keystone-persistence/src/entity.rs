use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date pattern used when audit timestamps are shown to clients.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Columns shared by every persisted record
///
/// Only `id` and `create_date` reach clients; `id` is written as a string so that
/// 64-bit identifiers survive JavaScript number precision. The remaining columns are
/// bookkeeping owned by [`FieldFillHandler`](crate::FieldFillHandler).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    #[serde(default, with = "id_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, with = "date_format", skip_serializing_if = "Option::is_none")]
    pub create_date: Option<NaiveDateTime>,
    #[serde(skip)]
    pub create_by: Option<String>,
    #[serde(skip)]
    pub last_modified_date: Option<NaiveDateTime>,
    #[serde(skip)]
    pub last_modified_by: Option<String>,
    /// Optimistic lock version, starts at 0.
    #[serde(skip)]
    pub version: Option<i64>,
    /// Logical delete flag: 0 live, 1 deleted.
    #[serde(skip)]
    pub deleted: Option<i32>,
}

impl AuditFields {
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted == Some(1)
    }
}

/// A persisted record carrying [`AuditFields`].
///
/// ```
/// use keystone_persistence::{AuditFields, Entity};
///
/// struct Customer {
///     audit: AuditFields,
///     name: String,
/// }
///
/// impl Entity for Customer {
///     fn audit(&self) -> &AuditFields {
///         &self.audit
///     }
///
///     fn audit_mut(&mut self) -> &mut AuditFields {
///         &mut self.audit
///     }
/// }
///
/// let a = Customer { audit: AuditFields::with_id(7), name: "a".into() };
/// let b = Customer { audit: AuditFields::with_id(7), name: "b".into() };
/// assert!(a.same_identity(&b));
/// ```
pub trait Entity {
    fn audit(&self) -> &AuditFields;
    fn audit_mut(&mut self) -> &mut AuditFields;

    fn id(&self) -> Option<i64> {
        self.audit().id
    }

    /// Records are the same when both carry the same id. Unsaved records never are.
    fn same_identity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

impl Entity for AuditFields {
    fn audit(&self) -> &AuditFields {
        self
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        self
    }
}

mod id_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<RawId>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawId::Number(id)) => Ok(Some(id)),
            Some(RawId::Text(text)) => text.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

mod date_format {
    use super::DEFAULT_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(DEFAULT_DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| NaiveDateTime::parse_from_str(&text, DEFAULT_DATE_FORMAT))
            .transpose()
            .map_err(D::Error::custom)
    }
}
