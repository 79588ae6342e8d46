//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod failed_login_repo;
pub mod plan_repo;
pub mod service_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use failed_login_repo::FailedLoginRepo;
pub use plan_repo::PlanRepo;
pub use service_repo::ServiceRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
