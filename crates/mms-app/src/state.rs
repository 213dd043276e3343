use std::sync::Arc;

use mms_dal::Pool;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner { pool }),
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool,
}
