use serde::{Deserialize, Serialize};

use super::fields::ChildRow;

/// Child collections owned by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildCollection {
    PreviousSchools,
    EmergencyContacts,
    Guardians,
}

impl ChildCollection {
    pub const fn label(self) -> &'static str {
        match self {
            ChildCollection::PreviousSchools => "previous schools",
            ChildCollection::EmergencyContacts => "emergency contacts",
            ChildCollection::Guardians => "guardians",
        }
    }

    pub const fn payload_key(self) -> &'static str {
        match self {
            ChildCollection::PreviousSchools => "previousSchools",
            ChildCollection::EmergencyContacts => "emergencyContacts",
            ChildCollection::Guardians => "guardians",
        }
    }
}

/// How one submission changes a child collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "rows", rename_all = "snake_case")]
pub enum CollectionChange {
    /// Delete every existing record, then create these.
    Replace(Vec<ChildRow>),
    /// Delete every existing record.
    Clear,
    /// Leave the stored records untouched.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionPlan {
    pub collection: ChildCollection,
    pub change: CollectionChange,
}

/// Inputs deciding a collection's fate for one submission.
#[derive(Debug, Clone)]
pub struct CollectionInput {
    pub collection: ChildCollection,
    /// Normalized rows, empty rows already dropped.
    pub rows: Vec<ChildRow>,
    /// The answers say the collection must not exist.
    pub cleared: bool,
    /// The submission must carry at least one row.
    pub required: bool,
}

/// Raised when a required collection arrives without a single usable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCollection(pub ChildCollection);

pub fn reconcile(input: CollectionInput) -> Result<CollectionPlan, EmptyCollection> {
    let CollectionInput {
        collection,
        rows,
        cleared,
        required,
    } = input;

    let change = if cleared {
        CollectionChange::Clear
    } else if !rows.is_empty() {
        CollectionChange::Replace(rows)
    } else if required {
        return Err(EmptyCollection(collection));
    } else {
        CollectionChange::Keep
    };

    Ok(CollectionPlan { collection, change })
}

/// Applies a change to stored rows. Replacement never appends.
pub fn apply_change(stored: &mut Vec<ChildRow>, change: &CollectionChange) {
    match change {
        CollectionChange::Replace(rows) => *stored = rows.clone(),
        CollectionChange::Clear => stored.clear(),
        CollectionChange::Keep => {}
    }
}
