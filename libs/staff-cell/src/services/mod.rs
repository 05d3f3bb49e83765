pub mod analytics;
pub mod pagination;
pub mod records;

pub use pagination::{Page, PageError, Paginator};
pub use records::StaffRecordsService;
