use board_types::models::Stamp;

/// Source of the date/hour stamped on new messages and comments.
pub trait Clock: Send + Sync {
    fn now(&self) -> Stamp;
}

/// Server wall clock in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Stamp {
        Stamp::from(chrono::Local::now().naive_local())
    }
}
