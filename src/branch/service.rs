use std::sync::Arc;

use chrono::NaiveDateTime;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::{
    database::sqlite::{ConnectionPool, SqliteDatabase},
    error::{AppError, AppResult},
    timing::{day_entry::DayEntry, schedule::WeeklySchedule, weekday::Weekday},
};

use super::{
    model::{Branch, BranchChanges, NewBranch},
    validation::{
        validate_new_branch, validate_open_day, validate_working_hours, OpenDayRequest,
        WorkingHoursInput,
    },
};

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

/// One page of a listing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    /// Reads raw query values. `per_page` is clamped to 1..=100 and defaults to 15;
    /// values that are not integers fall back to the defaults.
    pub fn resolve(page: Option<&str>, per_page: Option<&str>) -> Self {
        let per_page = per_page
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PER_PAGE as i64)
            .clamp(1, MAX_PER_PAGE as i64) as u32;
        let number = page
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, u32::MAX as i64) as u32;
        Self { number, per_page }
    }

    fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.per_page as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Branch and working hours operations on top of the store.
///
/// Each call takes a single pooled connection for its whole duration.
#[derive(Clone)]
pub struct BranchService {
    connection_pool: Arc<ConnectionPool>,
}

impl BranchService {
    pub fn new(connection_pool: Arc<ConnectionPool>) -> Self {
        Self { connection_pool }
    }

    fn get_connection(&self) -> AppResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.connection_pool.get()?)
    }

    fn require_branch(
        connection: &PooledConnection<SqliteConnectionManager>,
        id: i64,
    ) -> AppResult<Branch> {
        SqliteDatabase::query_branch(connection, id)?
            .ok_or_else(|| AppError::NotFound(format!("Branch {} not found.", id)))
    }

    pub fn create_branch(&self, branch: NewBranch, created_at: NaiveDateTime) -> AppResult<Branch> {
        validate_new_branch(&branch).map_err(AppError::Validation)?;
        let connection = self.get_connection()?;
        let id = SqliteDatabase::insert_branch(&connection, &branch, created_at)?;
        info!(branch_id = id, "Branch created");
        Self::require_branch(&connection, id)
    }

    pub fn update_branch(&self, id: i64, changes: BranchChanges) -> AppResult<Branch> {
        let connection = self.get_connection()?;
        let mut branch = Self::require_branch(&connection, id)?;
        branch.apply(changes);
        if branch.name.is_empty() {
            return Err(AppError::Validation(
                [("name".to_string(), vec!["The name field is required.".to_string()])].into(),
            ));
        }
        SqliteDatabase::update_branch(&connection, &branch)?;
        info!(branch_id = id, "Branch updated");
        Ok(branch)
    }

    pub fn activate_branch(&self, id: i64) -> AppResult<Branch> {
        self.update_branch(
            id,
            BranchChanges {
                is_active: Some(true),
                ..BranchChanges::default()
            },
        )
    }

    pub fn deactivate_branch(&self, id: i64) -> AppResult<Branch> {
        self.update_branch(
            id,
            BranchChanges {
                is_active: Some(false),
                ..BranchChanges::default()
            },
        )
    }

    pub fn delete_branch(&self, id: i64) -> AppResult<()> {
        let connection = self.get_connection()?;
        if SqliteDatabase::delete_branch(&connection, id)? == 0 {
            return Err(AppError::NotFound(format!("Branch {} not found.", id)));
        }
        info!(branch_id = id, "Branch deleted");
        Ok(())
    }

    /// Active branches with their schedules, one page at a time.
    pub fn active_branches(&self, page: Page) -> AppResult<Vec<(Branch, WeeklySchedule)>> {
        let connection = self.get_connection()?;
        let branches =
            SqliteDatabase::query_active_branches(&connection, page.per_page as i64, page.offset())?;

        let mut data = Vec::with_capacity(branches.len());
        for branch in branches {
            let schedule = SqliteDatabase::query_schedule(&connection, branch.id)?;
            data.push((branch, schedule));
        }
        Ok(data)
    }

    /// A branch together with its schedule.
    pub fn branch_with_schedule(&self, id: i64) -> AppResult<(Branch, WeeklySchedule)> {
        let connection = self.get_connection()?;
        let branch = Self::require_branch(&connection, id)?;
        let schedule = SqliteDatabase::query_schedule(&connection, id)?;
        Ok((branch, schedule))
    }

    /// Validates and stores a batch of days in one transaction. Days not in the
    /// batch keep their current entry.
    pub fn set_working_hours(
        &self,
        id: i64,
        data: &[WorkingHoursInput],
    ) -> AppResult<WeeklySchedule> {
        let entries = validate_working_hours(data).map_err(AppError::Validation)?;
        let connection = self.get_connection()?;
        Self::require_branch(&connection, id)?;
        SqliteDatabase::upsert_many_day_entries(&connection, id, &entries)?;
        let schedule = SqliteDatabase::query_schedule(&connection, id)?;
        info!(
            branch_id = id,
            written = entries.len(),
            configured = schedule.len(),
            "Working hours set"
        );
        Ok(schedule)
    }

    pub fn open_day(
        &self,
        id: i64,
        weekday: Weekday,
        request: &OpenDayRequest,
    ) -> AppResult<WeeklySchedule> {
        let (opens_at, closes_at) = validate_open_day(request).map_err(AppError::Validation)?;
        self.write_day(id, DayEntry::new_open(weekday, opens_at, closes_at))
    }

    pub fn close_day(&self, id: i64, weekday: Weekday) -> AppResult<WeeklySchedule> {
        self.write_day(id, DayEntry::new_closed(weekday))
    }

    fn write_day(&self, id: i64, entry: DayEntry) -> AppResult<WeeklySchedule> {
        let connection = self.get_connection()?;
        Self::require_branch(&connection, id)?;
        SqliteDatabase::upsert_day_entry(&connection, id, &entry)?;
        info!(
            branch_id = id,
            day_of_week = entry.weekday().number(),
            is_closed = entry.is_closed(),
            "Day updated"
        );
        Ok(SqliteDatabase::query_schedule(&connection, id)?)
    }
}
