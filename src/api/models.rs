//! Request and response bodies of the EduLog backend

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::Role;
use crate::error::Error;

// ============================================================================
// Accounts & students
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Department primary key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetails {
    pub email: String,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub department: Option<i64>,
}

/// Search hit from the student lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub name: String,
    pub student_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Total {
    pub total: u64,
}

// ============================================================================
// Attendance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    /// Clocked in, not yet clocked out
    Pending,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            "pending" => Ok(AttendanceStatus::Pending),
            other => Err(Error::Other(format!("Unknown attendance status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockInResponse {
    pub message: String,
    pub is_clocked_in: bool,
    pub clock_in_time: String,
    #[serde(default)]
    pub updated_present_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockOutResponse {
    pub message: String,
    pub clock_out_time: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClockStatus {
    pub is_clocked_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total: u64,
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    pub percentage: f64,
}

/// Attendance record as listed on the records screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(rename = "clockInTime", default)]
    pub clock_in_time: Option<String>,
    #[serde(rename = "clockOutTime", default)]
    pub clock_out_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Attendance record as seen by the admin attendance screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAttendance {
    pub id: i64,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub clock_in_time: Option<String>,
    #[serde(default)]
    pub clock_out_time: Option<String>,
    #[serde(default)]
    pub user: Option<i64>,
}

/// Partial update; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttendanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_in_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_out_time: Option<String>,
}

impl AttendanceUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.status.is_none()
            && self.clock_in_time.is_none()
            && self.clock_out_time.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttendanceToday {
    #[serde(rename = "attendancePercentage")]
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AbsentToday {
    #[serde(rename = "absentCount")]
    pub absent_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPercentage {
    pub id: i64,
    pub username: String,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentLog {
    pub student_name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    pub date: String,
    pub status: String,
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub department: Option<String>,
    pub student_name: Option<String>,
}

impl ReportFilters {
    /// Query parameters understood by the report endpoint. The date range
    /// only applies when both ends are set.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            query.push(("startDate".to_string(), start.format("%Y-%m-%d").to_string()));
            query.push(("endDate".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(status) = self.status {
            query.push(("statusFilter".to_string(), status.to_string()));
        }
        if let Some(department) = &self.department {
            query.push(("departmentFilter".to_string(), department.clone()));
        }
        if let Some(name) = &self.student_name {
            query.push(("studentNameFilter".to_string(), name.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Latest attendance date, or "N/A"
    pub attendance_date: String,
    pub student_name: String,
    pub status: String,
    pub department: String,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFilterOptions {
    pub departments: Vec<String>,
    pub status_choices: Vec<String>,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
