use std::sync::Arc;

use crate::application::BackendRegistry;
use crate::domain::BackendInfo;

pub struct ListBackendsUseCase {
    registry: Arc<BackendRegistry>,
}

impl ListBackendsUseCase {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// Sorted by name.
    pub fn execute(&self) -> Vec<BackendInfo> {
        self.registry.descriptors().map(|d| d.info()).collect()
    }
}
