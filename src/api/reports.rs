//! Attendance reports

use super::client::{ApiClient, PendingRequest};
use super::models::{ReportFilterOptions, ReportFilters, ReportRow};
use crate::error::Result;

impl ApiClient {
    pub async fn student_report(&self, filters: &ReportFilters) -> Result<Vec<ReportRow>> {
        let mut request = PendingRequest::get("/api/attendance/reports/");
        request.query = filters.to_query();
        self.request_json(request).await
    }

    pub async fn report_filter_options(&self) -> Result<ReportFilterOptions> {
        self.get_json("/api/attendance/reports/filters/").await
    }
}
