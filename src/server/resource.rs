use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{branch::model::Branch, ISO_FORMAT};

/// A branch as shown to API clients, with texts in the request locale.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BranchResource {
    id: i64,
    name: Option<String>,
    address: Option<String>,
    description: Option<String>,
    is_active: bool,
    is_open_now: bool,
    created_at: String,
}

impl BranchResource {
    pub fn new(branch: &Branch, locale: &str, is_open_now: bool) -> Self {
        Self {
            id: branch.id,
            name: branch.name.get(locale).map(str::to_string),
            address: branch.address.get(locale).map(str::to_string),
            description: branch.description.get(locale).map(str::to_string),
            is_active: branch.is_active,
            is_open_now,
            created_at: branch.created_at.format(ISO_FORMAT).to_string(),
        }
    }
}

/// Answer to a point-in-time availability query.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AvailabilityResource {
    branch_id: i64,
    at: String,
    is_open: bool,
}

impl AvailabilityResource {
    pub fn new(branch_id: i64, at: NaiveDateTime, is_open: bool) -> Self {
        Self {
            branch_id,
            at: at.format(ISO_FORMAT).to_string(),
            is_open,
        }
    }
}
