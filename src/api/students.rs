//! Student roster endpoints

use super::client::{ApiClient, PendingRequest};
use super::models::{Department, DepartmentStats, StudentDetails, StudentSummary, Total};
use crate::error::Result;

impl ApiClient {
    pub async fn student_details(&self, id: i64) -> Result<StudentDetails> {
        self.get_json(&format!("/api/students/{}/details/", id)).await
    }

    /// Match on name or student id; the backend returns at most ten hits
    pub async fn search_students(&self, query: &str) -> Result<Vec<StudentSummary>> {
        self.request_json(PendingRequest::get("/api/attendance/reports/students/").query("q", query))
            .await
    }

    pub async fn total_students(&self) -> Result<u64> {
        let total: Total = self.get_json("/api/attendance/stats/total-students/").await?;
        Ok(total.total)
    }

    pub async fn department_stats(&self) -> Result<Vec<DepartmentStats>> {
        self.get_json("/api/students/stats/department-wise/").await
    }

    pub async fn departments(&self) -> Result<Vec<Department>> {
        self.get_json("/departments/").await
    }
}
