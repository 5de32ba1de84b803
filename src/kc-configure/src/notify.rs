use std::error::Error;
use std::sync::Arc;

use tracing::error;
use tracing::info;

/// where operator facing notifications go
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, title: &str, err: &(dyn Error + 'static), message: &str);
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// report notifications thru tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, title: &str, err: &(dyn Error + 'static), message: &str) {
        error!(%err, "{}: {}", title, message);
    }
}
