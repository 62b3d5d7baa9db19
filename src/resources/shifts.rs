//! Shift scheduling: shift definitions, staff assignments, attendance, and
//! per-employee statistics.

use time::Date;

use super::models::{AssignmentForm, Shift, ShiftAssignment, ShiftForm, ShiftStats};
use super::{EntityId, ResourceClient, Validate};
use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};

pub const SHIFTS_PATH: &str = "/shifts";
const SHIFTS_LIST_PATH: &str = "/shifts/all";
const ASSIGN_PATH: &str = "/shifts/assign";
const ASSIGNMENTS_PATH: &str = "/shifts/assignments";
const CHECKIN_PATH: &str = "/shifts/checkin";
const CHECKOUT_PATH: &str = "/shifts/checkout";
const ACTIVE_PATH: &str = "/shifts/active";
const STATS_PATH: &str = "/shifts/stats";

#[derive(Clone)]
pub struct ShiftsApi {
    client: ApiClient,
    shifts: ResourceClient<Shift>,
}

impl ShiftsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { shifts: ResourceClient::new(client.clone(), SHIFTS_PATH).with_list_path(SHIFTS_LIST_PATH), client }
    }

    // -------------------------------------------------------------------------
    // Shifts
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn list(&self) -> Result<Vec<Shift>, ApiError> {
        self.shifts.list().await
    }

    /// # Errors
    ///
    /// `ApiError::Validation` without a request if a field is blank.
    pub async fn create(&self, form: &ShiftForm) -> Result<Shift, ApiError> {
        self.shifts.create(form).await
    }

    /// # Errors
    ///
    /// `ApiError::Validation` without a request if a field is blank.
    pub async fn update(&self, id: &EntityId, form: &ShiftForm) -> Result<Shift, ApiError> {
        self.shifts.update(id, form).await
    }

    /// # Errors
    ///
    /// Propagates request errors.
    pub async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.shifts.delete(id).await
    }

    // -------------------------------------------------------------------------
    // Assignments
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// `ApiError::Validation` without a request for a date in the past.
    pub async fn assign(&self, form: &AssignmentForm) -> Result<ShiftAssignment, ApiError> {
        form.validate()?;
        let request = ApiRequest::post(ASSIGN_PATH).with_json(form)?;
        self.client.json(&request).await
    }

    /// # Errors
    ///
    /// Propagates request errors.
    pub async fn unassign(&self, assignment_id: &EntityId) -> Result<(), ApiError> {
        self.client.empty(&ApiRequest::delete(format!("{ASSIGNMENTS_PATH}/{assignment_id}"))).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn assignments(&self) -> Result<Vec<ShiftAssignment>, ApiError> {
        self.client.json(&ApiRequest::get(ASSIGNMENTS_PATH)).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn assignments_for_user(&self, user_id: &EntityId) -> Result<Vec<ShiftAssignment>, ApiError> {
        self.client.json(&ApiRequest::get(format!("{ASSIGNMENTS_PATH}/user/{user_id}"))).await
    }

    // -------------------------------------------------------------------------
    // Attendance (acts on the logged-in principal)
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn check_in(&self) -> Result<ShiftAssignment, ApiError> {
        self.client.json(&ApiRequest::post(CHECKIN_PATH)).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn check_out(&self) -> Result<ShiftAssignment, ApiError> {
        self.client.json(&ApiRequest::post(CHECKOUT_PATH)).await
    }

    /// The caller's current shift, or `None` when off duty. The backend
    /// answers with an empty body or `null` in that case.
    ///
    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn active_shift(&self) -> Result<Option<ShiftAssignment>, ApiError> {
        let response = self.client.execute(&ApiRequest::get(ACTIVE_PATH)).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        response.json()
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn stats(&self) -> Result<Vec<ShiftStats>, ApiError> {
        self.client.json(&ApiRequest::get(STATS_PATH)).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn user_stats(&self, user_id: &EntityId) -> Result<ShiftStats, ApiError> {
        self.client.json(&ApiRequest::get(format!("{STATS_PATH}/{user_id}"))).await
    }

    /// # Errors
    ///
    /// `ApiError::Validation` if `end` precedes `start`, otherwise request
    /// and decode errors.
    pub async fn stats_between(&self, start: Date, end: Date) -> Result<Vec<ShiftStats>, ApiError> {
        if end < start {
            return Err(ApiError::validation("endDate", "must not be before start date"));
        }
        let request = ApiRequest::get(format!("{STATS_PATH}/filter"))
            .with_query("startDate", start)
            .with_query("endDate", end);
        self.client.json(&request).await
    }
}
