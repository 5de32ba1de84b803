use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use kc_client::{HttpClient, StorageClassGateway};
use kc_config::{ConsoleConfig, Profile, ProfileDetail};
use kc_configure::{
    resolve_endpoint, ConfigurationReconciler, ConsoleContext, EndpointStore, RouteTarget,
    TracingNotifier, TracingRouter,
};
use kc_types::endpoint::EndpointId;
use kc_types::options::ListOptions;
use kc_types::storage::{AccessMode, StorageClass};

#[derive(Debug, Parser)]
#[command(name = "kc-ctl", about = "configure storage classes exposed by kube console")]
pub struct CtlOpt {
    /// profile to use instead of current one
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    cmd: CtlCmd,
}

#[derive(Debug, Subcommand)]
enum CtlCmd {
    /// inspect storage classes of an endpoint
    #[command(subcommand)]
    Storage(StorageCmd),

    /// select storage classes and access modes, then apply them
    Configure(ConfigureOpt),

    /// manage console profiles
    #[command(subcommand)]
    Profile(ProfileCmd),
}

#[derive(Debug, Subcommand)]
enum StorageCmd {
    /// list storage classes with their access modes
    List {
        #[arg(long)]
        endpoint: Option<String>,

        /// label selector, ex: tier=fast
        #[arg(long)]
        selector: Option<String>,
    },
}

#[derive(Debug, Parser)]
struct ConfigureOpt {
    #[arg(long)]
    endpoint: Option<String>,

    /// expose storage class with access modes, ex: fast=RWO,RWX
    #[arg(long = "select", value_parser = parse_selection)]
    selections: Vec<StorageSelection>,

    /// stop exposing storage class
    #[arg(long = "deselect")]
    deselections: Vec<String>,

    #[arg(long)]
    load_balancer: Option<bool>,
}

#[derive(Debug, Subcommand)]
enum ProfileCmd {
    /// add or replace profile and make it current
    Add {
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        endpoint: Option<u32>,
    },
    /// switch current profile
    Use { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StorageSelection {
    name: String,
    modes: Vec<AccessMode>,
}

fn parse_selection(raw: &str) -> Result<StorageSelection, String> {
    let (name, modes) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MODES, got {raw}"))?;
    if name.is_empty() {
        return Err(format!("missing storage class name in {raw}"));
    }
    let modes = modes
        .split(',')
        .filter(|mode| !mode.is_empty())
        .map(|mode| mode.parse::<AccessMode>().map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    if modes.is_empty() {
        return Err(format!("{name} needs at least one access mode"));
    }
    Ok(StorageSelection {
        name: name.to_owned(),
        modes,
    })
}

impl CtlOpt {
    pub async fn process(self) -> Result<()> {
        let mut config = ConsoleConfig::load_or_default()?;

        match self.cmd {
            CtlCmd::Profile(cmd) => process_profile(&mut config, cmd),
            CtlCmd::Storage(StorageCmd::List { endpoint, selector }) => {
                let profile = select_profile(&config, self.profile.as_deref())?;
                list_storage_classes(profile, endpoint, selector).await
            }
            CtlCmd::Configure(opt) => {
                let profile = select_profile(&config, self.profile.as_deref())?;
                configure(profile, opt).await
            }
        }
    }
}

fn select_profile<'a>(config: &'a ConsoleConfig, name: Option<&str>) -> Result<&'a ProfileDetail> {
    match name {
        Some(name) => config
            .profile(name)
            .map(|profile| &profile.profile)
            .ok_or_else(|| anyhow!("no profile named {name}")),
        None => Ok(config.active_profile()?),
    }
}

/// endpoint given on command line, otherwise profile default
fn endpoint_arg(profile: &ProfileDetail, endpoint: Option<String>) -> Result<String> {
    endpoint
        .or_else(|| profile.endpoint.map(|id| id.to_string()))
        .ok_or_else(|| anyhow!("no endpoint given and profile has no default endpoint"))
}

fn process_profile(config: &mut ConsoleConfig, cmd: ProfileCmd) -> Result<()> {
    match cmd {
        ProfileCmd::Add {
            name,
            url,
            token,
            endpoint,
        } => {
            config.put_profile(Profile {
                name: name.clone(),
                profile: ProfileDetail {
                    url,
                    token,
                    endpoint,
                },
            });
            config.set_current_profile(name)?;
        }
        ProfileCmd::Use { name } => config.set_current_profile(name)?,
    }
    config.save()?;
    println!("current profile: {}", config.current_profile);
    Ok(())
}

async fn list_storage_classes(
    profile: &ProfileDetail,
    endpoint: Option<String>,
    selector: Option<String>,
) -> Result<()> {
    let endpoint: EndpointId = endpoint_arg(profile, endpoint)?.parse()?;
    let gateway = StorageClassGateway::new(Arc::new(HttpClient::new(profile)));
    let options = selector.map(|selector| ListOptions {
        label_selector: Some(selector),
        ..Default::default()
    });

    let classes = gateway.list_with_option(endpoint, options).await?;
    print_storage_classes(&classes);
    Ok(())
}

async fn configure(profile: &ProfileDetail, opt: ConfigureOpt) -> Result<()> {
    let raw_id = endpoint_arg(profile, opt.endpoint)?;
    let client = Arc::new(HttpClient::new(profile));
    let context = ConsoleContext::new(
        EndpointStore::default(),
        Arc::new(TracingNotifier),
        Arc::new(TracingRouter),
    );

    let Some(endpoint) = resolve_endpoint(
        client.as_ref(),
        context.notifier.as_ref(),
        context.router.as_ref(),
        &raw_id,
    )
    .await
    else {
        bail!("endpoint {raw_id} can not be configured");
    };
    debug!(id = %endpoint.id, name = %endpoint.name, "endpoint resolved");

    let id = endpoint.id;
    context.store.replace(vec![endpoint]);
    context.router.go(RouteTarget::Configure(id), false);
    let mut reconciler = ConfigurationReconciler::new(id, client, context);
    reconciler.initialize().await?;

    for selection in opt.selections {
        reconciler.select_storage_class(&selection.name, true)?;
        for mode in [AccessMode::ReadWriteOnce, AccessMode::ReadWriteMany] {
            reconciler.set_access_mode(&selection.name, mode, selection.modes.contains(&mode))?;
        }
    }
    for name in opt.deselections {
        reconciler.select_storage_class(&name, false)?;
    }
    if let Some(enabled) = opt.load_balancer {
        reconciler.set_use_load_balancer(enabled)?;
    }

    let report = reconciler.submit().await?;
    println!(
        "configured: [{}], patched: [{}]",
        report.configured.join(", "),
        report.patched.join(", ")
    );
    print_storage_classes(reconciler.storage_classes());
    Ok(())
}

fn print_storage_classes(classes: &[StorageClass]) {
    if classes.is_empty() {
        println!("no storage classes");
        return;
    }
    println!(
        "{:<24} {:<32} {:<10} {:<9} ACCESS MODES",
        "NAME", "PROVISIONER", "EXPANSION", "SELECTED"
    );
    for class in classes {
        println!(
            "{:<24} {:<32} {:<10} {:<9} {}",
            class.name,
            class.provisioner,
            class.allow_volume_expansion,
            class.selected,
            AccessMode::join(&class.access_modes)
        );
    }
}
