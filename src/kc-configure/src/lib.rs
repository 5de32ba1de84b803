mod error;
mod notify;
mod reconciler;
mod route;
mod store;

pub use self::error::{ConfigureError, PatchFailure};
pub use self::notify::{Notifier, SharedNotifier, TracingNotifier};
pub use self::reconciler::{ConfigurationReconciler, FormValues, ReconcilerState, SubmitReport};
pub use self::route::{
    parse_endpoint_id, resolve_endpoint, RouteError, RouteTarget, Router, SharedRouter,
    TracingRouter,
};
pub use self::store::EndpointStore;

pub use context::ConsoleContext;

mod context {

    use super::{EndpointStore, SharedNotifier, SharedRouter};

    /// collaborators shared by console views
    #[derive(Clone)]
    pub struct ConsoleContext {
        pub store: EndpointStore,
        pub notifier: SharedNotifier,
        pub router: SharedRouter,
    }

    impl ConsoleContext {
        pub fn new(store: EndpointStore, notifier: SharedNotifier, router: SharedRouter) -> Self {
            Self {
                store,
                notifier,
                router,
            }
        }
    }
}
