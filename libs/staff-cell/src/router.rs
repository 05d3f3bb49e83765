use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_staff};

use crate::handlers;

pub fn staff_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/main/", get(handlers::main_page).post(handlers::main_page_submit))
        .route(
            "/appointment-history/",
            get(handlers::appointment_history).post(handlers::appointment_history_submit),
        )
        .route("/callback/", get(handlers::callbacks).post(handlers::callbacks_submit))
        .route("/doctor-appointments/{doctor_id}/", get(handlers::doctor_appointments))

        // Analytics
        .route("/analytics/", get(handlers::analytics_overview))
        .route("/doctor-analytics/", get(handlers::doctor_analytics_list))
        .route("/doctor-analytics/{doctor_id}/", get(handlers::doctor_analytics))
        .route("/month-list/", get(handlers::month_list))
        .route("/monthly-analytics/{month}", get(handlers::monthly_analytics))

        // The last layer added runs first: authenticate, then check the role.
        .layer(middleware::from_fn_with_state(state.clone(), require_staff))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
