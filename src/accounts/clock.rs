use time::OffsetDateTime;
use uuid::Uuid;

/// Time and identifier source for new records.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
    fn next_user_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    // v7 is time-ordered, so ids still sort by creation.
    fn next_user_id(&self) -> String {
        format!("user-{}", Uuid::now_v7())
    }
}
