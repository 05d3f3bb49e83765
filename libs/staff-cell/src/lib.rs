// =====================================================================================
// STAFF CELL - CLINIC STAFF DASHBOARDS
// =====================================================================================
//
// Server-rendered pages for front-desk staff:
// - daily appointments and appointment history with date filtering
// - callback request tracking
// - clinic, per-doctor and monthly analytics
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod templates;

pub use models::{Appointment, Callback, DateRange, DateSelection, Doctor, RecordFilter};
pub use router::staff_routes;
pub use services::StaffRecordsService;
