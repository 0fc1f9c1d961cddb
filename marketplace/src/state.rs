// marketplace/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::Store;
use flowline::Flowline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flow: Arc<Flowline<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers all pipelines on a fresh registry.
  pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
    let flow = Flowline::<AppError>::new();
    pipelines::register_all_pipelines(&flow);
    Self {
      store,
      flow: Arc::new(flow),
      config: Arc::new(config),
    }
  }
}
