use std::sync::Arc;

use parking_lot::Mutex;

use crate::side_channel::{SharedSideChannel, SideChannel};

/// Side channel recording every report.
#[derive(Clone, Debug, Default)]
pub struct CollectingSideChannel {
    reports: Arc<Mutex<Vec<String>>>,
}

impl CollectingSideChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }

    pub fn shared(&self) -> SharedSideChannel {
        Arc::new(self.clone())
    }
}

impl SideChannel for CollectingSideChannel {
    fn report(&self, message: &str) {
        self.reports.lock().push(message.to_owned());
    }
}
