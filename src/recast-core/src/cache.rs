//! Member lookup cache.
//!
//! Resolving a member name against a record type is a linear scan over its
//! fields. `MemberCache` memoizes the resolved table per record type. It is an
//! ordinary value with an owner: the engine evaluator holds one, and callers
//! ordering by member name pass one in explicitly.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use common_error::{RecastError, RecastResult};

use crate::types::{DataType, RecordType};

/// Resolved position and type of a record member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Position of the field within the record.
    pub index: usize,
    /// Declared type of the field.
    pub data_type: DataType,
}

/// All members of one record type, keyed by name.
#[derive(Debug)]
pub struct MemberTable {
    type_name: String,
    members: HashMap<String, MemberInfo>,
}

impl MemberTable {
    fn build(record_type: &RecordType) -> Self {
        let members = record_type
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| {
                (
                    field.name.clone(),
                    MemberInfo {
                        index,
                        data_type: field.data_type.clone(),
                    },
                )
            })
            .collect();

        Self {
            type_name: record_type.name().to_string(),
            members,
        }
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&MemberInfo> {
        self.members.get(name)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the record type has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Name of the record type this table describes.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Thread-safe, read-mostly cache of member tables.
#[derive(Debug, Default)]
pub struct MemberCache {
    tables: RwLock<HashMap<RecordType, Arc<MemberTable>>>,
}

impl MemberCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the member table for a record type, building it on first use.
    pub fn members(&self, record_type: &RecordType) -> Arc<MemberTable> {
        // Tables are immutable once inserted, so a poisoned lock still holds
        // consistent data.
        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(record_type)
        {
            return Arc::clone(table);
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            tables
                .entry(record_type.clone())
                .or_insert_with(|| Arc::new(MemberTable::build(record_type))),
        )
    }

    /// Resolve a member of a record type.
    ///
    /// Fails with `MemberNotFound` when the type has no such member.
    pub fn lookup(&self, record_type: &RecordType, name: &str) -> RecastResult<MemberInfo> {
        self.members(record_type).get(name).cloned().ok_or_else(|| {
            RecastError::member_not_found(format!(
                "type {} has no member '{name}'",
                record_type.name()
            ))
        })
    }

    /// Number of record types cached.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no record type has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
