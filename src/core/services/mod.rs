pub mod auth_service;
pub mod card_service;
pub mod summary_service;
pub mod transaction_service;

pub use auth_service::{AuthProvider, AuthService, InMemoryAuth, JsonAuth};
pub use card_service::CardService;
pub use summary_service::{Dashboard, SummaryService};
pub use transaction_service::TransactionService;

use crate::errors::PlannerError;

pub type ServiceResult<T> = Result<T, PlannerError>;
