use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct MockClock(parking_lot::Mutex<DateTime<Utc>>);
#[cfg(test)]
impl MockClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(parking_lot::Mutex::new(time))
    }

    pub fn advance(&self, delta: chrono::Duration) {
        *self.0.lock() += delta;
    }
}
#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}
