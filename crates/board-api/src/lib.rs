pub mod clock;
pub mod error;
pub mod messages;
pub mod routes;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use error::{ServiceError, ServiceResult};
pub use routes::{AppState, AppStateInner, router};
pub use service::MessageService;
