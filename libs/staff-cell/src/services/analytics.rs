use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::models::{
    Appointment, Callback, ClinicOverview, DateRange, DayLine, Doctor, DoctorMonthLine,
    DoctorOverview, MonthReport, MonthTotals, Totals,
};

/// Visit price per doctor id. Appointments whose doctor is unknown or has no
/// price contribute nothing to revenue.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: HashMap<i64, f64>,
}

impl PriceBook {
    pub fn from_doctors(doctors: &[Doctor]) -> Self {
        let prices = doctors
            .iter()
            .filter_map(|doctor| doctor.visit_price.map(|price| (doctor.id, price)))
            .collect();
        Self { prices }
    }

    pub fn price_of(&self, appointment: &Appointment) -> Option<f64> {
        self.prices.get(&appointment.doctor_id).copied()
    }
}

pub fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `total / days`, one decimal; zero when nothing happened on any day.
pub fn per_day_average(total: f64, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    round_one(total / days as f64)
}

pub fn totals<'a>(
    appointments: impl IntoIterator<Item = &'a Appointment>,
    prices: &PriceBook,
) -> Totals {
    appointments.into_iter().fold(Totals::default(), |mut acc, appointment| {
        acc.appointments += 1;
        acc.revenue += prices.price_of(appointment).unwrap_or(0.0);
        acc
    })
}

fn appointment_days(appointments: &[Appointment]) -> usize {
    appointments
        .iter()
        .map(|appointment| appointment.appointment_day)
        .collect::<BTreeSet<_>>()
        .len()
}

fn callback_days(callbacks: &[Callback]) -> usize {
    callbacks
        .iter()
        .map(|callback| callback.date)
        .collect::<BTreeSet<_>>()
        .len()
}

/// First day of every month that has at least one appointment, ascending.
pub fn distinct_months(appointments: &[Appointment]) -> Vec<NaiveDate> {
    appointments
        .iter()
        .filter_map(|appointment| appointment.appointment_day.with_day(1))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn clinic_overview(
    appointments: &[Appointment],
    callbacks: &[Callback],
    doctors: &[Doctor],
    today: NaiveDate,
) -> ClinicOverview {
    let prices = PriceBook::from_doctors(doctors);
    let all = totals(appointments, &prices);
    let days = appointment_days(appointments);
    let month = DateRange::month_of(today);

    let month_appointments = totals(
        appointments.iter().filter(|a| month.contains(a.appointment_day)),
        &prices,
    );

    ClinicOverview {
        totals: all,
        total_callbacks: callbacks.len(),
        average_appointments_per_day: per_day_average(all.appointments as f64, days),
        average_revenue_per_day: per_day_average(all.revenue, days),
        average_callbacks_per_day: per_day_average(callbacks.len() as f64, callback_days(callbacks)),
        this_month: MonthTotals {
            appointments: month_appointments.appointments,
            revenue: month_appointments.revenue,
            callbacks: callbacks.iter().filter(|c| month.contains(c.date)).count(),
        },
    }
}

/// `appointments` may contain other doctors' rows; only `doctor`'s count.
pub fn doctor_overview(
    doctor: &Doctor,
    appointments: &[Appointment],
    today: NaiveDate,
) -> DoctorOverview {
    let own: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.doctor_id == doctor.id)
        .cloned()
        .collect();

    let prices = PriceBook::from_doctors(std::slice::from_ref(doctor));
    let all = totals(&own, &prices);
    let days = appointment_days(&own);
    let month = DateRange::month_of(today);

    DoctorOverview {
        doctor: doctor.clone(),
        totals: all,
        average_appointments_per_day: per_day_average(all.appointments as f64, days),
        average_revenue_per_day: per_day_average(all.revenue, days),
        this_month: totals(own.iter().filter(|a| month.contains(a.appointment_day)), &prices),
    }
}

/// Report for the month `range`; rows outside it are ignored.
pub fn month_report(
    range: DateRange,
    appointments: &[Appointment],
    callbacks: &[Callback],
    doctors: &[Doctor],
) -> MonthReport {
    let prices = PriceBook::from_doctors(doctors);
    let in_month: Vec<Appointment> = appointments
        .iter()
        .filter(|a| range.contains(a.appointment_day))
        .cloned()
        .collect();
    let month_callbacks: Vec<Callback> = callbacks
        .iter()
        .filter(|c| range.contains(c.date))
        .cloned()
        .collect();

    let all = totals(&in_month, &prices);

    let mut per_day: BTreeMap<NaiveDate, DayLine> = BTreeMap::new();
    let mut per_doctor: BTreeMap<i64, (usize, f64)> = BTreeMap::new();
    for appointment in &in_month {
        let price = prices.price_of(appointment).unwrap_or(0.0);

        let line = per_day.entry(appointment.appointment_day).or_insert(DayLine {
            day: appointment.appointment_day,
            appointments: 0,
            revenue: 0.0,
        });
        line.appointments += 1;
        line.revenue += price;

        let entry = per_doctor.entry(appointment.doctor_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += price;
    }

    let names: HashMap<i64, &str> = doctors
        .iter()
        .map(|doctor| (doctor.id, doctor.full_name.as_str()))
        .collect();
    let mut doctor_lines: Vec<DoctorMonthLine> = per_doctor
        .into_iter()
        .map(|(doctor_id, (count, revenue))| DoctorMonthLine {
            doctor_id,
            doctor_name: names
                .get(&doctor_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("Doctor #{}", doctor_id)),
            appointments: count,
            revenue,
        })
        .collect();
    doctor_lines.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then(b.appointments.cmp(&a.appointments))
            .then(a.doctor_id.cmp(&b.doctor_id))
    });

    let active_days = per_day.len();

    MonthReport {
        start: range.start,
        totals: MonthTotals {
            appointments: all.appointments,
            revenue: all.revenue,
            callbacks: month_callbacks.len(),
        },
        active_days,
        average_appointments_per_day: per_day_average(all.appointments as f64, active_days),
        average_revenue_per_day: per_day_average(all.revenue, active_days),
        average_callbacks_per_day: per_day_average(
            month_callbacks.len() as f64,
            callback_days(&month_callbacks),
        ),
        doctors: doctor_lines,
        days: per_day.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doctor(id: i64, name: &str, price: Option<f64>) -> Doctor {
        Doctor {
            id,
            full_name: name.to_string(),
            specialty: None,
            visit_price: price,
        }
    }

    fn appointment(id: i64, doctor_id: i64, on: NaiveDate) -> Appointment {
        Appointment {
            id,
            doctor_id,
            patient_name: format!("Patient {}", id),
            patient_phone: None,
            appointment_day: on,
            appointment_time: None,
        }
    }

    fn callback(id: i64, on: NaiveDate) -> Callback {
        Callback {
            id,
            name: format!("Caller {}", id),
            phone: "555".to_string(),
            date: on,
        }
    }

    fn doctors() -> Vec<Doctor> {
        vec![
            doctor(1, "Dr. House", Some(100.0)),
            doctor(2, "Dr. Grey", Some(50.0)),
            doctor(3, "Dr. Volunteer", None),
        ]
    }

    #[test]
    fn averages_round_to_one_decimal() {
        assert_eq!(per_day_average(10.0, 3), 3.3);
        assert_eq!(per_day_average(5.0, 2), 2.5);
        assert_eq!(per_day_average(7.0, 0), 0.0);
    }

    #[test]
    fn revenue_skips_unpriced_and_unknown_doctors() {
        let prices = PriceBook::from_doctors(&doctors());
        let rows = vec![
            appointment(1, 1, day(2024, 5, 1)),
            appointment(2, 2, day(2024, 5, 1)),
            appointment(3, 3, day(2024, 5, 2)),
            appointment(4, 99, day(2024, 5, 2)),
        ];

        let summary = totals(&rows, &prices);
        assert_eq!(summary.appointments, 4);
        assert_eq!(summary.revenue, 150.0);
    }

    #[test]
    fn clinic_overview_counts_distinct_days_and_current_month() {
        let rows = vec![
            appointment(1, 1, day(2024, 4, 30)),
            appointment(2, 1, day(2024, 5, 1)),
            appointment(3, 2, day(2024, 5, 1)),
            appointment(4, 2, day(2024, 6, 1)),
        ];
        let calls = vec![
            callback(1, day(2024, 5, 3)),
            callback(2, day(2024, 5, 3)),
            callback(3, day(2024, 4, 1)),
        ];

        let overview = clinic_overview(&rows, &calls, &doctors(), day(2024, 5, 20));

        assert_eq!(overview.totals.appointments, 4);
        assert_eq!(overview.totals.revenue, 300.0);
        assert_eq!(overview.total_callbacks, 3);
        assert_eq!(overview.average_appointments_per_day, 1.3);
        assert_eq!(overview.average_revenue_per_day, 100.0);
        assert_eq!(overview.average_callbacks_per_day, 1.5);
        // The first of the next month is outside the current month.
        assert_eq!(overview.this_month.appointments, 2);
        assert_eq!(overview.this_month.revenue, 150.0);
        assert_eq!(overview.this_month.callbacks, 2);
    }

    #[test]
    fn clinic_overview_with_no_records_is_zeroed() {
        let overview = clinic_overview(&[], &[], &[], day(2024, 1, 1));
        assert_eq!(overview.totals, Totals::default());
        assert_eq!(overview.average_appointments_per_day, 0.0);
        assert_eq!(overview.average_revenue_per_day, 0.0);
        assert_eq!(overview.average_callbacks_per_day, 0.0);
        assert_eq!(overview.this_month, MonthTotals::default());
    }

    #[test]
    fn doctor_overview_ignores_other_doctors() {
        let rows = vec![
            appointment(1, 1, day(2024, 5, 1)),
            appointment(2, 1, day(2024, 5, 1)),
            appointment(3, 1, day(2024, 5, 9)),
            appointment(4, 2, day(2024, 5, 9)),
        ];
        let house = doctor(1, "Dr. House", Some(100.0));

        let overview = doctor_overview(&house, &rows, day(2024, 5, 15));
        assert_eq!(overview.totals.appointments, 3);
        assert_eq!(overview.totals.revenue, 300.0);
        assert_eq!(overview.average_appointments_per_day, 1.5);
        assert_eq!(overview.average_revenue_per_day, 150.0);
        assert_eq!(overview.this_month.appointments, 3);

        let later = doctor_overview(&house, &rows, day(2024, 7, 1));
        assert_eq!(later.this_month, Totals::default());
    }

    #[test]
    fn distinct_months_are_sorted_and_unique() {
        let rows = vec![
            appointment(1, 1, day(2024, 5, 9)),
            appointment(2, 1, day(2023, 12, 31)),
            appointment(3, 2, day(2024, 5, 1)),
        ];
        assert_eq!(distinct_months(&rows), vec![day(2023, 12, 1), day(2024, 5, 1)]);
        assert!(distinct_months(&[]).is_empty());
    }

    #[test]
    fn month_report_breaks_down_by_doctor_and_day() {
        let range = DateRange::for_month(2024, 5).unwrap();
        let rows = vec![
            appointment(1, 2, day(2024, 5, 2)),
            appointment(2, 1, day(2024, 5, 2)),
            appointment(3, 2, day(2024, 5, 10)),
            appointment(4, 2, day(2024, 5, 10)),
            appointment(5, 1, day(2024, 6, 1)),
        ];
        let calls = vec![callback(1, day(2024, 5, 2)), callback(2, day(2024, 6, 2))];

        let report = month_report(range, &rows, &calls, &doctors());

        assert_eq!(report.start, day(2024, 5, 1));
        assert_eq!(report.totals.appointments, 4);
        assert_eq!(report.totals.revenue, 250.0);
        assert_eq!(report.totals.callbacks, 1);
        assert_eq!(report.active_days, 2);
        assert_eq!(report.average_appointments_per_day, 2.0);
        assert_eq!(report.average_revenue_per_day, 125.0);
        assert_eq!(report.average_callbacks_per_day, 1.0);

        assert_eq!(report.doctors.len(), 2);
        assert_eq!(report.doctors[0].doctor_name, "Dr. Grey");
        assert_eq!(report.doctors[0].appointments, 3);
        assert_eq!(report.doctors[0].revenue, 150.0);
        assert_eq!(report.doctors[1].doctor_name, "Dr. House");

        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].day, day(2024, 5, 2));
        assert_eq!(report.days[0].revenue, 150.0);
        assert_eq!(report.days[1].appointments, 2);
    }

    #[test]
    fn month_report_names_missing_doctors() {
        let range = DateRange::for_month(2024, 5).unwrap();
        let rows = vec![appointment(1, 42, day(2024, 5, 2))];

        let report = month_report(range, &rows, &[], &doctors());
        assert_eq!(report.doctors[0].doctor_name, "Doctor #42");
        assert_eq!(report.totals.revenue, 0.0);
    }
}
