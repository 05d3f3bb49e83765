//! HTML page templates and the display rows they render.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use chrono::NaiveDate;

use crate::models::{
    Appointment, Callback, ClinicOverview, DateSelection, DayLine, Doctor, DoctorMonthLine,
    DoctorOverview, MonthReport, Totals,
};
use crate::services::Page;

pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn month_label(month_start: NaiveDate) -> String {
    month_start.format("%B %Y").to_string()
}

// ==============================================================================
// DISPLAY ROWS
// ==============================================================================

pub struct FilterForm {
    pub value: String,
    pub error: Option<String>,
}

impl From<&DateSelection> for FilterForm {
    fn from(selection: &DateSelection) -> Self {
        Self {
            value: selection.input_value(),
            error: selection.error.clone(),
        }
    }
}

pub struct PageNav {
    pub number: usize,
    pub num_pages: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: usize,
    pub next: usize,
    pub query_suffix: String,
}

impl PageNav {
    pub fn new<T>(page: &Page<T>, selection: &DateSelection) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            total_count: page.total_count,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.previous_number(),
            next: page.next_number(),
            query_suffix: selection.query_suffix(),
        }
    }
}

pub struct DoctorLink {
    pub id: i64,
    pub full_name: String,
    pub specialty: String,
    pub visit_price: String,
}

impl From<&Doctor> for DoctorLink {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            full_name: doctor.full_name.clone(),
            specialty: doctor.specialty.clone().unwrap_or_default(),
            visit_price: doctor.visit_price.map(money).unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn doctor_links(doctors: &[Doctor]) -> Vec<DoctorLink> {
    doctors.iter().map(DoctorLink::from).collect()
}

/// Doctor lookup used to label appointment rows.
pub struct DoctorDirectory<'a> {
    by_id: HashMap<i64, &'a Doctor>,
}

impl<'a> DoctorDirectory<'a> {
    pub fn new(doctors: &'a [Doctor]) -> Self {
        Self {
            by_id: doctors.iter().map(|doctor| (doctor.id, doctor)).collect(),
        }
    }

    pub fn rows(&self, appointments: &[Appointment]) -> Vec<AppointmentRow> {
        appointments
            .iter()
            .map(|appointment| {
                let doctor = self.by_id.get(&appointment.doctor_id);
                AppointmentRow {
                    id: appointment.id,
                    patient_name: appointment.patient_name.clone(),
                    patient_phone: appointment.patient_phone.clone().unwrap_or_default(),
                    day: appointment.appointment_day.format("%Y-%m-%d").to_string(),
                    time: appointment
                        .appointment_time
                        .map(|time| time.format("%H:%M").to_string())
                        .unwrap_or_default(),
                    doctor_id: appointment.doctor_id,
                    doctor_name: doctor
                        .map(|d| d.full_name.clone())
                        .unwrap_or_else(|| format!("Doctor #{}", appointment.doctor_id)),
                    price: doctor
                        .and_then(|d| d.visit_price)
                        .map(money)
                        .unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect()
    }
}

pub struct AppointmentRow {
    pub id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub day: String,
    pub time: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub price: String,
}

pub struct CallbackRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub date: String,
}

impl From<&Callback> for CallbackRow {
    fn from(callback: &Callback) -> Self {
        Self {
            id: callback.id,
            name: callback.name.clone(),
            phone: callback.phone.clone(),
            date: callback.date.format("%Y-%m-%d").to_string(),
        }
    }
}

pub struct TotalsView {
    pub appointments: usize,
    pub revenue: String,
}

impl From<Totals> for TotalsView {
    fn from(totals: Totals) -> Self {
        Self {
            appointments: totals.appointments,
            revenue: money(totals.revenue),
        }
    }
}

pub struct MonthLink {
    pub year: i32,
    pub month: u32,
    pub label: String,
}

pub struct DoctorMonthRow {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointments: usize,
    pub revenue: String,
}

impl From<&DoctorMonthLine> for DoctorMonthRow {
    fn from(line: &DoctorMonthLine) -> Self {
        Self {
            doctor_id: line.doctor_id,
            doctor_name: line.doctor_name.clone(),
            appointments: line.appointments,
            revenue: money(line.revenue),
        }
    }
}

pub struct DayRow {
    pub day: String,
    pub appointments: usize,
    pub revenue: String,
}

impl From<&DayLine> for DayRow {
    fn from(line: &DayLine) -> Self {
        Self {
            day: line.day.format("%Y-%m-%d").to_string(),
            appointments: line.appointments,
            revenue: money(line.revenue),
        }
    }
}

// ==============================================================================
// PAGES
// ==============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "main.html")]
pub struct MainPageTemplate {
    pub staff: String,
    pub filter: FilterForm,
    pub selected_day: String,
    pub day_totals: Option<TotalsView>,
    pub appointments: Vec<AppointmentRow>,
    pub page: PageNav,
    pub doctors: Vec<DoctorLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "appointment_history.html")]
pub struct AppointmentHistoryTemplate {
    pub staff: String,
    pub filter: FilterForm,
    pub totals: TotalsView,
    pub appointments: Vec<AppointmentRow>,
    pub page: PageNav,
    pub doctors: Vec<DoctorLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "callbacks.html")]
pub struct CallbacksTemplate {
    pub staff: String,
    pub filter: FilterForm,
    pub callbacks_on_day: usize,
    pub total_callbacks: usize,
    pub callbacks: Vec<CallbackRow>,
    pub page: PageNav,
}

#[derive(Template, WebTemplate)]
#[template(path = "doctor_appointments.html")]
pub struct DoctorAppointmentsTemplate {
    pub staff: String,
    pub doctor: DoctorLink,
    pub filter: FilterForm,
    pub totals: TotalsView,
    pub appointments: Vec<AppointmentRow>,
    pub doctors: Vec<DoctorLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub staff: String,
    pub totals: TotalsView,
    pub total_callbacks: usize,
    pub average_appointments_per_day: String,
    pub average_revenue_per_day: String,
    pub average_callbacks_per_day: String,
    pub month_label: String,
    pub month_appointments: usize,
    pub month_revenue: String,
    pub month_callbacks: usize,
    pub doctors: Vec<DoctorLink>,
}

impl AnalyticsTemplate {
    pub fn new(staff: String, overview: ClinicOverview, today: NaiveDate, doctors: &[Doctor]) -> Self {
        Self {
            staff,
            totals: overview.totals.into(),
            total_callbacks: overview.total_callbacks,
            average_appointments_per_day: one_decimal(overview.average_appointments_per_day),
            average_revenue_per_day: one_decimal(overview.average_revenue_per_day),
            average_callbacks_per_day: one_decimal(overview.average_callbacks_per_day),
            month_label: month_label(today),
            month_appointments: overview.this_month.appointments,
            month_revenue: money(overview.this_month.revenue),
            month_callbacks: overview.this_month.callbacks,
            doctors: doctor_links(doctors),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "doctor_analytics_list.html")]
pub struct DoctorAnalyticsListTemplate {
    pub staff: String,
    pub doctors: Vec<DoctorLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "doctor_analytics.html")]
pub struct DoctorAnalyticsTemplate {
    pub staff: String,
    pub doctor: DoctorLink,
    pub totals: TotalsView,
    pub average_appointments_per_day: String,
    pub average_revenue_per_day: String,
    pub month_label: String,
    pub month_totals: TotalsView,
    pub doctors: Vec<DoctorLink>,
}

impl DoctorAnalyticsTemplate {
    pub fn new(staff: String, overview: DoctorOverview, today: NaiveDate, doctors: &[Doctor]) -> Self {
        Self {
            staff,
            doctor: DoctorLink::from(&overview.doctor),
            totals: overview.totals.into(),
            average_appointments_per_day: one_decimal(overview.average_appointments_per_day),
            average_revenue_per_day: one_decimal(overview.average_revenue_per_day),
            month_label: month_label(today),
            month_totals: overview.this_month.into(),
            doctors: doctor_links(doctors),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "month_list.html")]
pub struct MonthListTemplate {
    pub staff: String,
    pub months: Vec<MonthLink>,
}

#[derive(Template, WebTemplate)]
#[template(path = "month_analytics.html")]
pub struct MonthAnalyticsTemplate {
    pub staff: String,
    pub month_label: String,
    pub appointments: usize,
    pub revenue: String,
    pub callbacks: usize,
    pub active_days: usize,
    pub average_appointments_per_day: String,
    pub average_revenue_per_day: String,
    pub average_callbacks_per_day: String,
    pub doctors: Vec<DoctorMonthRow>,
    pub days: Vec<DayRow>,
}

impl MonthAnalyticsTemplate {
    pub fn new(staff: String, report: MonthReport) -> Self {
        Self {
            staff,
            month_label: month_label(report.start),
            appointments: report.totals.appointments,
            revenue: money(report.totals.revenue),
            callbacks: report.totals.callbacks,
            active_days: report.active_days,
            average_appointments_per_day: one_decimal(report.average_appointments_per_day),
            average_revenue_per_day: one_decimal(report.average_revenue_per_day),
            average_callbacks_per_day: one_decimal(report.average_callbacks_per_day),
            doctors: report.doctors.iter().map(DoctorMonthRow::from).collect(),
            days: report.days.iter().map(DayRow::from).collect(),
        }
    }
}
