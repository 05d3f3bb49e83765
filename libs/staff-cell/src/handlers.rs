use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::TypedHeader;
use chrono::{Datelike, Local, NaiveDate};
use headers::{Authorization, authorization::Bearer};
use tracing::{info, instrument};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    DateRange, DateSelectForm, DateSelection, ListQuery, MonthQuery, RecordFilter,
};
use crate::services::{analytics, PageError, Paginator, StaffRecordsService};
use crate::templates::{
    doctor_links, month_label, AnalyticsTemplate, AppointmentHistoryTemplate, CallbackRow,
    CallbacksTemplate, DoctorAnalyticsListTemplate, DoctorAnalyticsTemplate,
    DoctorAppointmentsTemplate, DoctorDirectory, DoctorLink, FilterForm, MainPageTemplate,
    MonthAnalyticsTemplate, MonthLink, MonthListTemplate, PageNav, TotalsView,
};

pub const MAIN_PAGE_SIZE: usize = 3;
pub const HISTORY_PAGE_SIZE: usize = 10;
pub const CALLBACK_PAGE_SIZE: usize = 10;

fn database_error(e: anyhow::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn page_error(e: PageError) -> AppError {
    AppError::NotFound(e.to_string())
}

/// The clinic's calendar day, in the server's local time zone.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A valid submitted date redirects back to the page with the filter in the
/// query string; anything else re-renders the page.
fn redirect_for(selection: &DateSelection) -> Option<Redirect> {
    selection
        .date
        .map(|date| Redirect::to(&format!("?selected_date={}", date.format("%Y-%m-%d"))))
}

// ==============================================================================
// DAILY PAGE
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn main_page(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<MainPageTemplate, AppError> {
    let selection = DateSelection::parse(query.selected_date.as_deref());
    render_main_page(&state, auth.token(), &user, selection, query.page.as_deref()).await
}

#[instrument(skip(state, auth, user, form))]
pub async fn main_page_submit(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
    Form(form): Form<DateSelectForm>,
) -> Result<Response, AppError> {
    let selection = DateSelection::parse(form.selected_date.as_deref());
    if let Some(redirect) = redirect_for(&selection) {
        return Ok(redirect.into_response());
    }

    let page = render_main_page(&state, auth.token(), &user, selection, query.page.as_deref()).await?;
    Ok(page.into_response())
}

async fn render_main_page(
    state: &AppConfig,
    token: &str,
    user: &User,
    selection: DateSelection,
    page: Option<&str>,
) -> Result<MainPageTemplate, AppError> {
    let service = StaffRecordsService::new(state);
    let filter = RecordFilter::on_day(selection.date);

    let (appointments, doctors) = tokio::try_join!(
        service.list_appointments(&filter, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    // Day totals only make sense for a chosen day.
    let day_totals = selection.date.map(|_| {
        let prices = analytics::PriceBook::from_doctors(&doctors);
        TotalsView::from(analytics::totals(&appointments, &prices))
    });

    let page = Paginator::new(MAIN_PAGE_SIZE)
        .paginate(appointments, page)
        .map_err(page_error)?;

    Ok(MainPageTemplate {
        staff: user.display_name().to_string(),
        filter: FilterForm::from(&selection),
        selected_day: selection.input_value(),
        day_totals,
        appointments: DoctorDirectory::new(&doctors).rows(&page.items),
        page: PageNav::new(&page, &selection),
        doctors: doctor_links(&doctors),
    })
}

// ==============================================================================
// APPOINTMENT HISTORY
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn appointment_history(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<AppointmentHistoryTemplate, AppError> {
    let selection = DateSelection::parse(query.selected_date.as_deref());
    render_history(&state, auth.token(), &user, selection, query.page.as_deref()).await
}

#[instrument(skip(state, auth, user, form))]
pub async fn appointment_history_submit(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
    Form(form): Form<DateSelectForm>,
) -> Result<Response, AppError> {
    let selection = DateSelection::parse(form.selected_date.as_deref());
    if let Some(redirect) = redirect_for(&selection) {
        return Ok(redirect.into_response());
    }

    let page = render_history(&state, auth.token(), &user, selection, query.page.as_deref()).await?;
    Ok(page.into_response())
}

async fn render_history(
    state: &AppConfig,
    token: &str,
    user: &User,
    selection: DateSelection,
    page: Option<&str>,
) -> Result<AppointmentHistoryTemplate, AppError> {
    let service = StaffRecordsService::new(state);

    let filter = RecordFilter::all();
    let (appointments, doctors) = tokio::try_join!(
        service.list_appointments(&filter, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    // Totals cover the whole history regardless of the date filter.
    let prices = analytics::PriceBook::from_doctors(&doctors);
    let totals = analytics::totals(&appointments, &prices);

    let shown = match selection.date {
        Some(day) => appointments
            .into_iter()
            .filter(|appointment| appointment.appointment_day == day)
            .collect(),
        None => appointments,
    };

    let page = Paginator::new(HISTORY_PAGE_SIZE)
        .paginate(shown, page)
        .map_err(page_error)?;

    Ok(AppointmentHistoryTemplate {
        staff: user.display_name().to_string(),
        filter: FilterForm::from(&selection),
        totals: totals.into(),
        appointments: DoctorDirectory::new(&doctors).rows(&page.items),
        page: PageNav::new(&page, &selection),
        doctors: doctor_links(&doctors),
    })
}

// ==============================================================================
// CALLBACKS
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn callbacks(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<CallbacksTemplate, AppError> {
    let selection = DateSelection::parse(query.selected_date.as_deref());
    render_callbacks(&state, auth.token(), &user, selection, query.page.as_deref()).await
}

#[instrument(skip(state, auth, user, form))]
pub async fn callbacks_submit(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
    Form(form): Form<DateSelectForm>,
) -> Result<Response, AppError> {
    let selection = DateSelection::parse(form.selected_date.as_deref());
    if let Some(redirect) = redirect_for(&selection) {
        return Ok(redirect.into_response());
    }

    let page = render_callbacks(&state, auth.token(), &user, selection, query.page.as_deref()).await?;
    Ok(page.into_response())
}

async fn render_callbacks(
    state: &AppConfig,
    token: &str,
    user: &User,
    selection: DateSelection,
    page: Option<&str>,
) -> Result<CallbacksTemplate, AppError> {
    let service = StaffRecordsService::new(state);

    let all = service
        .list_callbacks(&RecordFilter::all(), token)
        .await
        .map_err(database_error)?;
    let total_callbacks = all.len();

    let (callbacks_on_day, shown) = match selection.date {
        Some(day) => {
            let on_day: Vec<_> = all.into_iter().filter(|callback| callback.date == day).collect();
            (on_day.len(), on_day)
        }
        None => (0, all),
    };

    let page = Paginator::new(CALLBACK_PAGE_SIZE)
        .paginate(shown, page)
        .map_err(page_error)?;

    Ok(CallbacksTemplate {
        staff: user.display_name().to_string(),
        filter: FilterForm::from(&selection),
        callbacks_on_day,
        total_callbacks,
        callbacks: page.items.iter().map(CallbackRow::from).collect(),
        page: PageNav::new(&page, &selection),
    })
}

// ==============================================================================
// PER-DOCTOR APPOINTMENTS
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<DoctorAppointmentsTemplate, AppError> {
    let token = auth.token();
    let service = StaffRecordsService::new(&state);
    let selection = DateSelection::parse(query.selected_date.as_deref());
    let filter = RecordFilter::for_doctor(doctor_id).with_day(selection.date);

    let (doctor, appointments, doctors) = tokio::try_join!(
        service.get_doctor(doctor_id, token),
        service.list_appointments(&filter, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    let doctor = doctor.ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let prices = analytics::PriceBook::from_doctors(std::slice::from_ref(&doctor));
    let totals = analytics::totals(&appointments, &prices);

    Ok(DoctorAppointmentsTemplate {
        staff: user.display_name().to_string(),
        doctor: DoctorLink::from(&doctor),
        filter: FilterForm::from(&selection),
        totals: totals.into(),
        appointments: DoctorDirectory::new(std::slice::from_ref(&doctor)).rows(&appointments),
        doctors: doctor_links(&doctors),
    })
}

// ==============================================================================
// ANALYTICS
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn analytics_overview(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<AnalyticsTemplate, AppError> {
    let token = auth.token();
    let service = StaffRecordsService::new(&state);
    let all = RecordFilter::all();

    let (appointments, callbacks, doctors) = tokio::try_join!(
        service.list_appointments(&all, token),
        service.list_callbacks(&all, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    let today = today();
    let overview = analytics::clinic_overview(&appointments, &callbacks, &doctors, today);
    info!(
        "Clinic analytics: {} appointments, {} callbacks",
        overview.totals.appointments, overview.total_callbacks
    );

    Ok(AnalyticsTemplate::new(
        user.display_name().to_string(),
        overview,
        today,
        &doctors,
    ))
}

#[instrument(skip(state, auth, user))]
pub async fn doctor_analytics_list(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<DoctorAnalyticsListTemplate, AppError> {
    let doctors = StaffRecordsService::new(&state)
        .list_doctors(auth.token())
        .await
        .map_err(database_error)?;

    Ok(DoctorAnalyticsListTemplate {
        staff: user.display_name().to_string(),
        doctors: doctor_links(&doctors),
    })
}

#[instrument(skip(state, auth, user))]
pub async fn doctor_analytics(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<DoctorAnalyticsTemplate, AppError> {
    let token = auth.token();
    let service = StaffRecordsService::new(&state);

    let filter = RecordFilter::for_doctor(doctor_id);
    let (doctor, appointments, doctors) = tokio::try_join!(
        service.get_doctor(doctor_id, token),
        service.list_appointments(&filter, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    let doctor = doctor.ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let today = today();
    let overview = analytics::doctor_overview(&doctor, &appointments, today);

    Ok(DoctorAnalyticsTemplate::new(
        user.display_name().to_string(),
        overview,
        today,
        &doctors,
    ))
}

// ==============================================================================
// MONTHS
// ==============================================================================

#[instrument(skip(state, auth, user))]
pub async fn month_list(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<MonthListTemplate, AppError> {
    let appointments = StaffRecordsService::new(&state)
        .list_appointments(&RecordFilter::all(), auth.token())
        .await
        .map_err(database_error)?;

    let months = analytics::distinct_months(&appointments)
        .into_iter()
        .map(|start| MonthLink {
            year: start.year(),
            month: start.month(),
            label: month_label(start),
        })
        .collect();

    Ok(MonthListTemplate {
        staff: user.display_name().to_string(),
        months,
    })
}

#[instrument(skip(state, auth, user))]
pub async fn monthly_analytics(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(month): Path<u32>,
    Query(query): Query<MonthQuery>,
) -> Result<MonthAnalyticsTemplate, AppError> {
    let year = query.year.unwrap_or_else(|| today().year());
    let range = DateRange::for_month(year, month)
        .ok_or_else(|| AppError::NotFound(format!("No such month: {}-{}", year, month)))?;

    let token = auth.token();
    let service = StaffRecordsService::new(&state);
    let filter = RecordFilter::all().within(range);

    let (appointments, callbacks, doctors) = tokio::try_join!(
        service.list_appointments(&filter, token),
        service.list_callbacks(&filter, token),
        service.list_doctors(token),
    )
    .map_err(database_error)?;

    let report = analytics::month_report(range, &appointments, &callbacks, &doctors);

    Ok(MonthAnalyticsTemplate::new(user.display_name().to_string(), report))
}
