// libs/staff-cell/src/models.rs
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==============================================================================
// RECORDS (read from PostgREST)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub visit_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: Option<String>,
    pub appointment_day: NaiveDate,
    #[serde(default)]
    pub appointment_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Callback {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
}

// ==============================================================================
// REQUEST INPUT
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub selected_date: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateSelectForm {
    pub selected_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
}

/// Accepted input formats, each with its field separator, the index of the
/// year field and the exact number of year digits. chrono's `%Y` alone takes
/// one to four digits, so `05/01/24` would otherwise read as year 24.
const DATE_INPUT_FORMATS: [(&str, char, usize, usize); 3] = [
    ("%Y-%m-%d", '-', 0, 4),
    ("%m/%d/%Y", '/', 2, 4),
    ("%m/%d/%y", '/', 2, 2),
];

fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|&(format, separator, year_field, year_digits)| {
            let year = raw.split(separator).nth(year_field)?;
            if year.len() != year_digits || !year.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            NaiveDate::parse_from_str(raw, format).ok()
        })
}

pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date.";

/// The `selected_date` filter as typed by the user. An unparseable value is
/// kept for redisplay but never used as a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSelection {
    pub raw: String,
    pub date: Option<NaiveDate>,
    pub error: Option<String>,
}

impl DateSelection {
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Self::default();
        }

        let date = parse_input_date(raw);

        Self {
            raw: raw.to_string(),
            date,
            error: date.is_none().then(|| INVALID_DATE_MESSAGE.to_string()),
        }
    }

    /// Value for the `<input type="date">` field.
    pub fn input_value(&self) -> String {
        match self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.raw.clone(),
        }
    }

    /// Query string fragment that keeps the filter across page links.
    pub fn query_suffix(&self) -> String {
        match self.date {
            Some(date) => format!("&selected_date={}", date.format("%Y-%m-%d")),
            None => String::new(),
        }
    }
}

// ==============================================================================
// FILTERS
// ==============================================================================

/// Half-open `[start, end)` day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `None` when `month` is outside `1..=12` or the year is out of range.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self { start, end })
    }

    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub doctor_id: Option<i64>,
    pub day: Option<NaiveDate>,
    pub range: Option<DateRange>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn on_day(day: Option<NaiveDate>) -> Self {
        Self { day, ..Self::default() }
    }

    pub fn for_doctor(doctor_id: i64) -> Self {
        Self { doctor_id: Some(doctor_id), ..Self::default() }
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_day(mut self, day: Option<NaiveDate>) -> Self {
        self.day = day;
        self
    }
}

// ==============================================================================
// REPORTS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub appointments: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthTotals {
    pub appointments: usize,
    pub revenue: f64,
    pub callbacks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicOverview {
    pub totals: Totals,
    pub total_callbacks: usize,
    pub average_appointments_per_day: f64,
    pub average_revenue_per_day: f64,
    pub average_callbacks_per_day: f64,
    pub this_month: MonthTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorOverview {
    pub doctor: Doctor,
    pub totals: Totals,
    pub average_appointments_per_day: f64,
    pub average_revenue_per_day: f64,
    pub this_month: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorMonthLine {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointments: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLine {
    pub day: NaiveDate,
    pub appointments: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub start: NaiveDate,
    pub totals: MonthTotals,
    pub active_days: usize,
    pub average_appointments_per_day: f64,
    pub average_revenue_per_day: f64,
    pub average_callbacks_per_day: f64,
    pub doctors: Vec<DoctorMonthLine>,
    pub days: Vec<DayLine>,
}
