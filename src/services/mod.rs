pub mod auth;
pub mod dashboard;
pub mod writes;

pub use auth::{AuthService, StoreAuthService};
pub use dashboard::DashboardSummary;
pub use writes::{WriteGateway, WriteTicket, wait_all};
