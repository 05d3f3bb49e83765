use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, Callback, Doctor, RecordFilter};

const DOCTORS_TABLE: &str = "doctors";
const APPOINTMENTS_TABLE: &str = "appointments";
const CALLBACKS_TABLE: &str = "callbacks";

/// Supabase's default PostgREST `max-rows`.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Read-only access to the booking tables the staff pages report on.
/// List reads page through the whole table so totals never stop at the
/// server's row cap.
pub struct StaffRecordsService {
    supabase: SupabaseClient,
    page_size: usize,
}

impl StaffRecordsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor list");

        self.supabase
            .select_all(
                DOCTORS_TABLE,
                "select=*&order=full_name.asc,id.asc",
                auth_token,
                self.page_size,
            )
            .await
    }

    pub async fn get_doctor(&self, doctor_id: i64, auth_token: &str) -> Result<Option<Doctor>> {
        debug!("Fetching doctor {}", doctor_id);

        let query = format!("select=*&id=eq.{}&limit=1", doctor_id);
        let doctors: Vec<Doctor> = self.supabase.select(DOCTORS_TABLE, &query, auth_token).await?;

        Ok(doctors.into_iter().next())
    }

    /// Newest day first.
    pub async fn list_appointments(
        &self,
        filter: &RecordFilter,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        debug!("Fetching appointments with filter: {:?}", filter);

        let query = build_query(filter, "appointment_day", "order=appointment_day.desc,id.desc");
        self.supabase
            .select_all(APPOINTMENTS_TABLE, &query, auth_token, self.page_size)
            .await
    }

    /// Newest date first. `doctor_id` in the filter is ignored.
    pub async fn list_callbacks(
        &self,
        filter: &RecordFilter,
        auth_token: &str,
    ) -> Result<Vec<Callback>> {
        debug!("Fetching callbacks with filter: {:?}", filter);

        let filter = RecordFilter { doctor_id: None, ..filter.clone() };
        let query = build_query(&filter, "date", "order=date.desc,id.desc");
        self.supabase
            .select_all(CALLBACKS_TABLE, &query, auth_token, self.page_size)
            .await
    }
}

fn iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// PostgREST query string for `filter`, matching days on `day_column`.
pub fn build_query(filter: &RecordFilter, day_column: &str, order: &str) -> String {
    let mut query_parts = vec!["select=*".to_string()];

    if let Some(doctor_id) = filter.doctor_id {
        query_parts.push(format!("doctor_id=eq.{}", doctor_id));
    }
    if let Some(day) = filter.day {
        query_parts.push(format!("{}=eq.{}", day_column, iso(day)));
    }
    if let Some(range) = filter.range {
        query_parts.push(format!("{}=gte.{}", day_column, iso(range.start)));
        query_parts.push(format!("{}=lt.{}", day_column, iso(range.end)));
    }

    query_parts.push(order.to_string());
    query_parts.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;

    #[test]
    fn unfiltered_query_only_orders() {
        let query = build_query(&RecordFilter::all(), "appointment_day", "order=id.desc");
        assert_eq!(query, "select=*&order=id.desc");
    }

    #[test]
    fn combined_filters() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let filter = RecordFilter::for_doctor(7)
            .with_day(Some(day))
            .within(DateRange::for_month(2024, 5).unwrap());

        let query = build_query(&filter, "appointment_day", "order=id.desc");
        assert_eq!(
            query,
            "select=*&doctor_id=eq.7&appointment_day=eq.2024-05-03\
             &appointment_day=gte.2024-05-01&appointment_day=lt.2024-06-01&order=id.desc"
        );
    }
}
