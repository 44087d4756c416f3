//! Nullable sleeper: records waits and returns at once.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ballotlink_client::Sleeper;

use crate::lock;

#[derive(Default)]
pub struct NullSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl NullSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested wait, in order.
    pub fn slept(&self) -> Vec<Duration> {
        lock(&self.slept).clone()
    }
}

#[async_trait]
impl Sleeper for NullSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.slept).push(duration);
    }
}
