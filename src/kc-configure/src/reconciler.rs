use std::fmt;

use futures_util::future::{join, join_all};
use tracing::{debug, error, info, instrument};

use kc_client::{
    EndpointGateway, GatewayError, PatchResult, SharedClient, StorageClassGateway,
    StorageTransport,
};
use kc_types::endpoint::{Endpoint, EndpointId, StorageClassConfig};
use kc_types::storage::{AccessMode, StorageClass};

use crate::{ConfigureError, ConsoleContext, PatchFailure, RouteTarget};

const FAILURE_TITLE: &str = "Failure";
const RETRIEVE_FAILED: &str = "Unable to retrieve storage classes";
const UPDATE_FAILED: &str = "Unable to apply configuration";
const PATCH_FAILED: &str = "Unable to patch storage classes";
const APPLIED: &str = "Configuration successfully applied";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilerState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Submitting,
    Done,
}

impl fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Done => "done",
        };
        write!(f, "{}", state)
    }
}

/// cluster wide settings edited next to storage classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormValues {
    pub use_load_balancer: bool,
}

/// outcome of successful submit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// storage classes persisted in endpoint configuration
    pub configured: Vec<String>,
    /// storage classes where patch was sent to the cluster
    pub patched: Vec<String>,
}

/// Edits storage class configuration of single endpoint.
///
/// The endpoint record is the source of truth for which storage classes the console
/// exposes and which access modes they allow. Storage classes themselves are only
/// patched for what changed since they were loaded.
pub struct ConfigurationReconciler<C> {
    endpoint_id: EndpointId,
    client: SharedClient<C>,
    storage: StorageClassGateway<C>,
    context: ConsoleContext,
    state: ReconcilerState,
    endpoint: Option<Endpoint>,
    storage_classes: Vec<StorageClass>,
    baseline: Vec<StorageClass>,
    form_values: FormValues,
}

impl<C> ConfigurationReconciler<C>
where
    C: StorageTransport + EndpointGateway,
{
    pub fn new(endpoint_id: EndpointId, client: SharedClient<C>, context: ConsoleContext) -> Self {
        Self {
            endpoint_id,
            storage: StorageClassGateway::new(client.clone()),
            client,
            context,
            state: ReconcilerState::default(),
            endpoint: None,
            storage_classes: vec![],
            baseline: vec![],
            form_values: FormValues::default(),
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn endpoint_id(&self) -> EndpointId {
        self.endpoint_id
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn storage_classes(&self) -> &[StorageClass] {
        &self.storage_classes
    }

    /// storage classes as they were when loaded or last applied
    pub fn baseline(&self) -> &[StorageClass] {
        &self.baseline
    }

    pub fn form_values(&self) -> FormValues {
        self.form_values
    }

    pub fn storage_class_available(&self) -> bool {
        !self.storage_classes.is_empty()
    }

    /// every selected storage class must allow at least one access mode
    pub fn has_valid_configuration(&self) -> bool {
        self.storage_classes
            .iter()
            .filter(|class| class.selected)
            .all(|class| !class.access_modes.is_empty())
    }

    /// Load storage classes and endpoint configuration.
    ///
    /// Both are fetched concurrently. When either fails the endpoint is not kept so
    /// nothing can be submitted, storage classes which could be loaded are still shown.
    #[instrument(skip(self), fields(endpoint = %self.endpoint_id))]
    pub async fn initialize(&mut self) -> Result<(), ConfigureError> {
        self.state = ReconcilerState::Loading;
        self.form_values = FormValues::default();

        let (classes, endpoint) = join(
            self.storage.list(self.endpoint_id),
            self.client.retrieve_endpoint(self.endpoint_id),
        )
        .await;

        let result = match (classes, endpoint) {
            (Ok(classes), Ok(endpoint)) => {
                self.load(classes, Some(endpoint));
                Ok(())
            }
            (Ok(classes), Err(err)) => {
                self.load(classes, None);
                Err(ConfigureError::Endpoint(err))
            }
            (Err(err), endpoint) => {
                if let Err(endpoint_err) = endpoint {
                    error!(%endpoint_err, "endpoint could not be retrieved either");
                }
                self.load(vec![], None);
                Err(ConfigureError::Gateway(err))
            }
        };

        self.state = ReconcilerState::Ready;

        if let Err(err) = &result {
            self.context
                .notifier
                .error(FAILURE_TITLE, err, RETRIEVE_FAILED);
        } else {
            debug!(
                classes = self.storage_classes.len(),
                "storage configuration loaded"
            );
        }
        result
    }

    fn load(&mut self, mut classes: Vec<StorageClass>, endpoint: Option<Endpoint>) {
        for class in classes.iter_mut() {
            class.attach_access_policies();
            let configured = endpoint
                .as_ref()
                .and_then(|endpoint| endpoint.configuration().storage_class(&class.name));
            if let Some(config) = configured {
                class.selected = true;
                class.set_access_modes(config.known_access_modes());
            }
        }

        if let Some(endpoint) = &endpoint {
            self.form_values.use_load_balancer = endpoint.configuration().use_load_balancer;
        }

        // baseline keeps modes found on the cluster, patches are diffed against them.
        // classes the endpoint does not configure start with nothing chosen
        self.baseline = classes.clone();
        for class in classes.iter_mut().filter(|class| !class.selected) {
            class.set_access_modes([]);
        }
        self.storage_classes = classes;
        self.endpoint = endpoint;
    }

    fn ensure_ready(&self) -> Result<(), ConfigureError> {
        if self.state == ReconcilerState::Ready {
            Ok(())
        } else {
            Err(ConfigureError::NotReady(self.state))
        }
    }

    fn storage_class_mut(&mut self, name: &str) -> Result<&mut StorageClass, ConfigureError> {
        self.storage_classes
            .iter_mut()
            .find(|class| class.name == name)
            .ok_or_else(|| ConfigureError::UnknownStorageClass(name.to_owned()))
    }

    pub fn select_storage_class(&mut self, name: &str, selected: bool) -> Result<(), ConfigureError> {
        self.ensure_ready()?;
        self.storage_class_mut(name)?.selected = selected;
        Ok(())
    }

    pub fn set_access_mode(
        &mut self,
        name: &str,
        mode: AccessMode,
        enabled: bool,
    ) -> Result<(), ConfigureError> {
        self.ensure_ready()?;
        self.storage_class_mut(name)?
            .set_access_mode(mode, enabled);
        Ok(())
    }

    pub fn set_use_load_balancer(&mut self, enabled: bool) -> Result<(), ConfigureError> {
        self.ensure_ready()?;
        self.form_values.use_load_balancer = enabled;
        Ok(())
    }

    /// Persist configuration to the endpoint, then patch storage classes which changed.
    ///
    /// All patches are awaited. When some of them fail the endpoint configuration stays
    /// persisted, the reconciler returns to ready and the failed storage classes are reported.
    #[instrument(skip(self), fields(endpoint = %self.endpoint_id))]
    pub async fn submit(&mut self) -> Result<SubmitReport, ConfigureError> {
        self.ensure_ready()?;
        let mut endpoint = self
            .endpoint
            .clone()
            .ok_or(ConfigureError::EndpointNotLoaded)?;
        if !self.has_valid_configuration() {
            return Err(ConfigureError::InvalidConfiguration);
        }

        self.state = ReconcilerState::Submitting;

        let targets: Vec<StorageClass> = self
            .storage_classes
            .iter()
            .filter(|class| class.selected)
            .cloned()
            .collect();

        let configuration = endpoint.configuration_mut();
        configuration.storage_classes = targets.iter().map(StorageClassConfig::from).collect();
        configuration.use_load_balancer = self.form_values.use_load_balancer;

        if let Err(err) = self.client.update_endpoint(self.endpoint_id, &endpoint).await {
            self.context
                .notifier
                .error(FAILURE_TITLE, &err, UPDATE_FAILED);
            self.state = ReconcilerState::Ready;
            return Err(ConfigureError::Update(err));
        }
        debug!("endpoint configuration persisted");

        let outcomes = self.patch_targets(&targets).await;
        self.update_store(&endpoint);
        self.endpoint = Some(endpoint);

        let mut report = SubmitReport {
            configured: targets.iter().map(|class| class.name.clone()).collect(),
            patched: vec![],
        };
        let mut failures = vec![];
        for (class, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Some(Ok(result)) => {
                    if result == PatchResult::Patched {
                        report.patched.push(class.name.clone());
                    }
                    self.rebaseline(class);
                }
                Some(Err(error)) => failures.push(PatchFailure {
                    name: class.name.clone(),
                    error,
                }),
                None => {}
            }
        }

        if failures.is_empty() {
            info!(patched = report.patched.len(), "configuration applied");
            self.context.notifier.success(APPLIED);
            self.state = ReconcilerState::Done;
            self.context.router.go(RouteTarget::Home, false);
            Ok(report)
        } else {
            let err = ConfigureError::PatchFailures(failures);
            self.context.notifier.error(FAILURE_TITLE, &err, PATCH_FAILED);
            self.state = ReconcilerState::Ready;
            Err(err)
        }
    }

    /// patch every target which was present when loaded, outcomes keep order of targets.
    /// targets without baseline are only persisted in the endpoint
    async fn patch_targets(
        &self,
        targets: &[StorageClass],
    ) -> Vec<Option<Result<PatchResult, GatewayError>>> {
        let patches = targets.iter().map(|class| async move {
            let previous = self
                .baseline
                .iter()
                .find(|previous| previous.name == class.name)?;
            Some(
                self.storage
                    .apply_patch(self.endpoint_id, previous, class)
                    .await,
            )
        });
        join_all(patches).await
    }

    fn rebaseline(&mut self, class: &StorageClass) {
        if let Some(previous) = self
            .baseline
            .iter_mut()
            .find(|previous| previous.name == class.name)
        {
            previous.provisioner = class.provisioner.clone();
            previous.allow_volume_expansion = class.allow_volume_expansion;
            previous.set_access_modes(class.access_modes.iter().copied());
            previous.selected = class.selected;
        }
    }

    /// swap cached endpoint list for one carrying new configuration
    fn update_store(&self, endpoint: &Endpoint) {
        let mut endpoints = self.context.store.list();
        let Some(cached) = endpoints.iter_mut().find(|cached| cached.id == endpoint.id) else {
            debug!("endpoint not cached, store left as is");
            return;
        };
        let configuration = cached.configuration_mut();
        configuration.storage_classes = endpoint.configuration().storage_classes.clone();
        configuration.use_load_balancer = endpoint.configuration().use_load_balancer;
        self.context.store.replace(endpoints);
    }
}
