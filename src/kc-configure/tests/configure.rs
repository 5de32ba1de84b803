use std::error::Error;
use std::sync::{Arc, Mutex};

use serde_json::json;

use kc_client::InMemoryClient;
use kc_configure::{
    resolve_endpoint, ConfigurationReconciler, ConfigureError, ConsoleContext, EndpointStore,
    Notifier, ReconcilerState, RouteTarget, Router,
};
use kc_types::endpoint::{Endpoint, EndpointId, StorageClassConfig, EDGE_AGENT_ON_KUBERNETES};
use kc_types::storage::{AccessMode, StorageClassResource, ACCESS_MODES_ANNOTATION};
use kc_types::ApiObject;

const ID: EndpointId = EndpointId(3);

#[derive(Debug, Clone, PartialEq)]
enum Notification {
    Success(String),
    Error { title: String, message: String },
}

#[derive(Default)]
struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().expect("lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notifications
            .lock()
            .expect("lock")
            .push(Notification::Success(message.to_owned()));
    }

    fn error(&self, title: &str, _err: &(dyn Error + 'static), message: &str) {
        self.notifications
            .lock()
            .expect("lock")
            .push(Notification::Error {
                title: title.to_owned(),
                message: message.to_owned(),
            });
    }
}

#[derive(Default)]
struct RecordingRouter {
    transitions: Mutex<Vec<(RouteTarget, bool)>>,
}

impl RecordingRouter {
    fn transitions(&self) -> Vec<(RouteTarget, bool)> {
        self.transitions.lock().expect("lock").clone()
    }
}

impl Router for RecordingRouter {
    fn go(&self, target: RouteTarget, reload: bool) {
        self.transitions.lock().expect("lock").push((target, reload));
    }
}

struct Fixture {
    client: Arc<InMemoryClient>,
    store: EndpointStore,
    notifier: Arc<RecordingNotifier>,
    router: Arc<RecordingRouter>,
}

impl Fixture {
    /// endpoint with `fast` configured for RWO, cluster has `fast` and `slow`
    fn new() -> Self {
        let client = InMemoryClient::new();

        let mut endpoint = Endpoint::new(ID, "production");
        endpoint.configuration_mut().storage_classes = vec![StorageClassConfig {
            name: "fast".to_owned(),
            access_modes: vec!["RWO".to_owned()],
            provisioner: "kubernetes.io/aws-ebs".to_owned(),
            allow_volume_expansion: true,
        }];
        client.insert_endpoint(&endpoint).expect("endpoint");

        client
            .insert_storage_class(ID, &storage_class("fast", "kubernetes.io/aws-ebs", Some("RWO")))
            .expect("fast");
        client
            .insert_storage_class(ID, &storage_class("slow", "rancher.io/local-path", None))
            .expect("slow");

        Self {
            client: Arc::new(client),
            store: EndpointStore::new(vec![endpoint, Endpoint::new(EndpointId(9), "other")]),
            notifier: Arc::new(RecordingNotifier::default()),
            router: Arc::new(RecordingRouter::default()),
        }
    }

    fn context(&self) -> ConsoleContext {
        ConsoleContext::new(self.store.clone(), self.notifier.clone(), self.router.clone())
    }

    fn reconciler(&self) -> ConfigurationReconciler<InMemoryClient> {
        ConfigurationReconciler::new(ID, self.client.clone(), self.context())
    }
}

fn storage_class(
    name: &str,
    provisioner: &str,
    access_modes: Option<&str>,
) -> ApiObject<StorageClassResource> {
    let item = ApiObject::new(
        name,
        StorageClassResource {
            provisioner: provisioner.to_owned(),
            allow_volume_expansion: Some(provisioner == "kubernetes.io/aws-ebs"),
            ..Default::default()
        },
    );
    match access_modes {
        Some(modes) => item.with_annotation(ACCESS_MODES_ANNOTATION, modes),
        None => item,
    }
}

#[fluvio_future::test]
async fn test_submit_persists_and_patches_changes() {
    let fixture = Fixture::new();
    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");

    reconciler
        .set_access_mode("fast", AccessMode::ReadWriteMany, true)
        .expect("mode");
    reconciler.select_storage_class("slow", true).expect("select");
    reconciler
        .set_access_mode("slow", AccessMode::ReadWriteOnce, true)
        .expect("mode");
    reconciler.set_use_load_balancer(true).expect("lb");

    let report = reconciler.submit().await.expect("submit");
    assert_eq!(report.configured, vec!["fast", "slow"]);
    assert_eq!(report.patched, vec!["fast", "slow"]);
    assert_eq!(reconciler.state(), ReconcilerState::Done);

    let endpoint = fixture.client.endpoint(ID).expect("endpoint");
    let configuration = endpoint.configuration();
    assert!(configuration.use_load_balancer);
    assert_eq!(configuration.storage_classes.len(), 2);
    assert_eq!(
        configuration.storage_classes[0].access_modes,
        vec!["RWO", "RWX"]
    );
    assert_eq!(configuration.storage_classes[1].name, "slow");
    assert_eq!(configuration.storage_classes[1].access_modes, vec!["RWO"]);

    let patches = fixture.client.patches().expect("patches");
    assert_eq!(patches.len(), 2);
    let fast = patches
        .iter()
        .find(|patch| patch.name == "fast")
        .expect("fast patch");
    assert_eq!(fast.endpoint, ID);
    assert_eq!(
        fast.patch,
        json!({ "metadata": { "annotations": { "console.kube.io/access-modes": "RWO,RWX" }}})
    );

    let slow = fixture.client.storage_class(ID, "slow").expect("slow");
    assert_eq!(slow.metadata.annotation(ACCESS_MODES_ANNOTATION), Some("RWO"));

    let cached = fixture.store.list();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].configuration().storage_classes.len(), 2);
    assert!(cached[0].configuration().use_load_balancer);
    assert!(cached[1].configuration().storage_classes.is_empty());

    assert_eq!(
        fixture.notifier.notifications(),
        vec![Notification::Success(
            "Configuration successfully applied".to_owned()
        )]
    );
    assert_eq!(fixture.router.transitions(), vec![(RouteTarget::Home, false)]);
}

#[fluvio_future::test]
async fn test_unchanged_class_is_not_patched() {
    let fixture = Fixture::new();
    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");

    let report = reconciler.submit().await.expect("submit");
    assert_eq!(report.configured, vec!["fast"]);
    assert!(report.patched.is_empty());
    assert!(fixture.client.patches().expect("patches").is_empty());
    assert_eq!(fixture.client.endpoint_updates().expect("updates"), 1);
}

#[fluvio_future::test]
async fn test_deselected_class_is_dropped_from_configuration() {
    let fixture = Fixture::new();
    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");

    reconciler.select_storage_class("fast", false).expect("deselect");
    let report = reconciler.submit().await.expect("submit");
    assert!(report.configured.is_empty());

    let endpoint = fixture.client.endpoint(ID).expect("endpoint");
    assert!(endpoint.configuration().storage_classes.is_empty());
    assert!(fixture.client.patches().expect("patches").is_empty());
}

#[fluvio_future::test]
async fn test_patch_failures_are_reported() {
    let fixture = Fixture::new();
    fixture.client.fail_patch_for("slow").expect("inject");

    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");
    reconciler
        .set_access_mode("fast", AccessMode::ReadWriteMany, true)
        .expect("mode");
    reconciler.select_storage_class("slow", true).expect("select");
    reconciler
        .set_access_mode("slow", AccessMode::ReadWriteMany, true)
        .expect("mode");

    match reconciler.submit().await {
        Err(ConfigureError::PatchFailures(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "slow");
        }
        other => panic!("expected patch failures, got {:?}", other),
    }
    assert_eq!(reconciler.state(), ReconcilerState::Ready);

    // endpoint configuration is kept even though patch failed
    let endpoint = fixture.client.endpoint(ID).expect("endpoint");
    assert_eq!(endpoint.configuration().storage_classes.len(), 2);

    // fast was applied, only slow differs from baseline now
    let fast = reconciler
        .baseline()
        .iter()
        .find(|class| class.name == "fast")
        .expect("fast");
    assert_eq!(
        fast.access_modes,
        vec![AccessMode::ReadWriteOnce, AccessMode::ReadWriteMany]
    );

    assert_eq!(
        fixture.notifier.notifications(),
        vec![Notification::Error {
            title: "Failure".to_owned(),
            message: "Unable to patch storage classes".to_owned()
        }]
    );
    assert!(fixture.router.transitions().is_empty());
}

#[fluvio_future::test]
async fn test_endpoint_update_failure_skips_patches() {
    let fixture = Fixture::new();
    fixture.client.fail_endpoint_update(true).expect("inject");

    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");
    reconciler
        .set_access_mode("fast", AccessMode::ReadWriteMany, true)
        .expect("mode");

    assert!(matches!(
        reconciler.submit().await,
        Err(ConfigureError::Update(_))
    ));
    assert_eq!(reconciler.state(), ReconcilerState::Ready);
    assert!(fixture.client.patches().expect("patches").is_empty());
    assert_eq!(
        fixture.notifier.notifications(),
        vec![Notification::Error {
            title: "Failure".to_owned(),
            message: "Unable to apply configuration".to_owned()
        }]
    );

    // retry once API recovers
    fixture.client.fail_endpoint_update(false).expect("recover");
    reconciler.submit().await.expect("submit");
    assert_eq!(fixture.client.patches().expect("patches").len(), 1);
}

#[fluvio_future::test]
async fn test_load_failure_blocks_submit() {
    let fixture = Fixture::new();
    fixture.client.fail_storage_list(true).expect("inject");

    let mut reconciler = fixture.reconciler();
    assert!(matches!(
        reconciler.initialize().await,
        Err(ConfigureError::Gateway(_))
    ));
    assert_eq!(reconciler.state(), ReconcilerState::Ready);
    assert!(!reconciler.storage_class_available());
    assert_eq!(
        fixture.notifier.notifications(),
        vec![Notification::Error {
            title: "Failure".to_owned(),
            message: "Unable to retrieve storage classes".to_owned()
        }]
    );

    assert!(matches!(
        reconciler.submit().await,
        Err(ConfigureError::EndpointNotLoaded)
    ));
    assert_eq!(fixture.client.endpoint_updates().expect("updates"), 0);
}

#[fluvio_future::test]
async fn test_endpoint_failure_keeps_storage_classes() {
    let fixture = Fixture::new();
    fixture.client.fail_endpoint_retrieve(true).expect("inject");

    let mut reconciler = fixture.reconciler();
    assert!(matches!(
        reconciler.initialize().await,
        Err(ConfigureError::Endpoint(_))
    ));
    assert_eq!(reconciler.storage_classes().len(), 2);
    assert!(reconciler.storage_classes().iter().all(|class| !class.selected));
    assert!(reconciler.endpoint().is_none());
}

#[fluvio_future::test]
async fn test_unconfigured_class_starts_without_modes() {
    let fixture = Fixture::new();
    fixture
        .client
        .insert_storage_class(
            ID,
            &storage_class("shared", "nfs.csi.k8s.io", Some("RWO,RWX")),
        )
        .expect("shared");

    let mut reconciler = fixture.reconciler();
    reconciler.initialize().await.expect("initialize");

    let shared = reconciler
        .storage_classes()
        .iter()
        .find(|class| class.name == "shared")
        .expect("shared");
    assert!(!shared.selected);
    assert!(shared.access_modes.is_empty());
    assert_eq!(shared.available_access_modes.len(), 2);
    assert!(shared
        .available_access_modes
        .iter()
        .all(|policy| !policy.selected));

    // selecting alone does not pick the modes found on the cluster
    reconciler.select_storage_class("shared", true).expect("select");
    assert!(!reconciler.has_valid_configuration());
    assert!(matches!(
        reconciler.submit().await,
        Err(ConfigureError::InvalidConfiguration)
    ));

    reconciler
        .set_access_mode("shared", AccessMode::ReadWriteMany, true)
        .expect("mode");
    reconciler.submit().await.expect("submit");

    // diffed against what the cluster had
    let patches = fixture.client.patches().expect("patches");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].name, "shared");
    assert_eq!(
        patches[0].patch,
        json!({ "metadata": { "annotations": { "console.kube.io/access-modes": "RWX" }}})
    );
}

#[fluvio_future::test]
async fn test_resolve_endpoint() {
    let fixture = Fixture::new();
    let mut edge = Endpoint::new(EndpointId(7), "edge");
    edge.endpoint_type = EDGE_AGENT_ON_KUBERNETES;
    fixture.client.insert_endpoint(&edge).expect("edge");

    let client = fixture.client.as_ref();
    let notifier = fixture.notifier.as_ref();
    let router = fixture.router.as_ref();

    let endpoint = resolve_endpoint(client, notifier, router, "3").await;
    assert_eq!(endpoint.map(|endpoint| endpoint.id), Some(ID));
    assert!(fixture.router.transitions().is_empty());

    assert!(resolve_endpoint(client, notifier, router, "7").await.is_none());
    assert!(resolve_endpoint(client, notifier, router, "42").await.is_none());
    assert!(resolve_endpoint(client, notifier, router, "abc").await.is_none());

    assert_eq!(
        fixture.router.transitions(),
        vec![
            (RouteTarget::EndpointEdit(EndpointId(7)), false),
            (RouteTarget::Home, true),
            (RouteTarget::Home, true),
        ]
    );
    let failed = Notification::Error {
        title: "Failure".to_owned(),
        message: "Failed loading endpoint".to_owned(),
    };
    assert_eq!(fixture.notifier.notifications(), vec![failed.clone(), failed]);
}
