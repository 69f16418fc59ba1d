use std::sync::Arc;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::store::Store;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<dyn Store>,
    redis: RedisHandle,
}

impl AppState {
    pub(crate) fn new(settings: Settings, store: Arc<dyn Store>, redis: RedisHandle) -> Self {
        Self { inner: Arc::new(InnerState { settings, store, redis }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }
}
