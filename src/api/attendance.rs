//! Attendance endpoints: clocking, statistics and record maintenance

use chrono::NaiveDate;

use super::client::{ApiClient, PendingRequest};
use super::models::{
    AbsentToday, AdminAttendance, AttendanceRecord, AttendanceStats, AttendanceToday,
    AttendanceUpdate, ClockInResponse, ClockOutResponse, ClockStatus, NewAttendanceRecord,
    RecentLog, StudentPercentage,
};
use crate::error::Result;

const RECORDS_PATH: &str = "/api/attendance/records/";
const ADMIN_ATTENDANCE_PATH: &str = "/admin/attendance/";

impl ApiClient {
    pub async fn clock_in(&self) -> Result<ClockInResponse> {
        self.request_json(PendingRequest::post("/api/attendance/clock-in/"))
            .await
    }

    /// Fails with a 400 when there was no clock-in today
    pub async fn clock_out(&self) -> Result<ClockOutResponse> {
        self.request_json(PendingRequest::post("/api/attendance/clock-out/"))
            .await
    }

    pub async fn clock_status(&self, student_id: &str) -> Result<ClockStatus> {
        self.get_json(&format!("/api/attendance/{}/status/", student_id))
            .await
    }

    pub async fn attendance_stats(&self, student_id: &str) -> Result<AttendanceStats> {
        self.get_json(&format!("/api/attendance/{}/", student_id)).await
    }

    pub async fn list_records(&self) -> Result<Vec<AttendanceRecord>> {
        self.get_json(RECORDS_PATH).await
    }

    pub async fn get_record(&self, id: i64) -> Result<AttendanceRecord> {
        self.get_json(&format!("{}{}/", RECORDS_PATH, id)).await
    }

    pub async fn create_record(&self, record: &NewAttendanceRecord) -> Result<AttendanceRecord> {
        self.request_json(PendingRequest::post(RECORDS_PATH).json(record)?)
            .await
    }

    pub async fn update_record(&self, id: i64, update: &AttendanceUpdate) -> Result<AttendanceRecord> {
        self.request_json(PendingRequest::patch(format!("{}{}/", RECORDS_PATH, id)).json(update)?)
            .await
    }

    /// Student attendance, newest first, optionally bounded by date
    pub async fn admin_attendance(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AdminAttendance>> {
        let mut request = PendingRequest::get(ADMIN_ATTENDANCE_PATH);
        if let Some(from) = from {
            request = request.query("from_date", from.format("%Y-%m-%d"));
        }
        if let Some(to) = to {
            request = request.query("to_date", to.format("%Y-%m-%d"));
        }
        self.request_json(request).await
    }

    pub async fn update_attendance(&self, id: i64, update: &AttendanceUpdate) -> Result<AdminAttendance> {
        self.request_json(PendingRequest::put(format!("/api/attendance/update/{}/", id)).json(update)?)
            .await
    }

    pub async fn delete_attendance(&self, id: i64) -> Result<()> {
        self.request_empty(PendingRequest::delete(format!("{}{}/", ADMIN_ATTENDANCE_PATH, id)))
            .await
    }

    /// Share of students present today, in percent
    pub async fn attendance_today(&self) -> Result<f64> {
        let today: AttendanceToday = self
            .get_json("/api/attendance/stats/attendance-today/")
            .await?;
        Ok(today.attendance_percentage)
    }

    pub async fn absent_today(&self) -> Result<u64> {
        let absent: AbsentToday = self
            .get_json("/api/attendance/stats/absent-students/")
            .await?;
        Ok(absent.absent_count)
    }

    pub async fn attendance_percentages(&self) -> Result<Vec<StudentPercentage>> {
        self.get_json("/api/attendance/stats/percentage/").await
    }

    /// Latest attendance entries for the dashboard; empty if unavailable
    pub async fn recent_logs(&self) -> Vec<RecentLog> {
        self.get_list_or_empty("/api/attendance/recent-logs/").await
    }
}
