use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// annotation carrying the access modes the console configured on a storage class
pub const ACCESS_MODES_ANNOTATION: &str = "console.kube.io/access-modes";

/// how a volume provisioned from a storage class may be mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessMode {
    #[serde(rename = "RWO")]
    ReadWriteOnce,
    #[serde(rename = "RWX")]
    ReadWriteMany,
}

impl AccessMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "RWO",
            Self::ReadWriteMany => "RWX",
        }
    }

    /// parse comma separated list of mode names.
    /// unknown names are skipped, result follows policy order
    pub fn parse_list(raw: &str) -> Vec<AccessMode> {
        let mut modes: Vec<AccessMode> = raw
            .split(',')
            .filter_map(|name| name.trim().parse().ok())
            .collect();
        modes.sort();
        modes.dedup();
        modes
    }

    pub fn join(modes: &[AccessMode]) -> String {
        modes
            .iter()
            .map(|mode| mode.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAccessMode(pub String);

impl fmt::Display for UnknownAccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown access mode: {}", self.0)
    }
}

impl std::error::Error for UnknownAccessMode {}

impl FromStr for AccessMode {
    type Err = UnknownAccessMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RWO" => Ok(Self::ReadWriteOnce),
            "RWX" => Ok(Self::ReadWriteMany),
            other => Err(UnknownAccessMode(other.to_owned())),
        }
    }
}

/// entry of the access policy table offered for selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub mode: AccessMode,
    pub description: &'static str,
    pub selected: bool,
}

/// fixed access policy table, every policy unselected
pub fn access_policies() -> Vec<AccessPolicy> {
    vec![
        AccessPolicy {
            mode: AccessMode::ReadWriteOnce,
            description: "Allow read-write from a single pod only (RWO)",
            selected: false,
        },
        AccessPolicy {
            mode: AccessMode::ReadWriteMany,
            description: "Allow read-write access from one or more pods concurrently (RWX)",
            selected: false,
        },
    ]
}

/// Storage class as the console edits it.
///
/// `access_modes` and the `selected` flags of `available_access_modes` always agree,
/// as long as modes are changed through [`StorageClass::set_access_mode`] or
/// [`StorageClass::set_access_modes`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StorageClass {
    pub name: String,
    pub provisioner: String,
    pub allow_volume_expansion: bool,
    pub access_modes: Vec<AccessMode>,
    pub available_access_modes: Vec<AccessPolicy>,
    pub selected: bool,
}

impl StorageClass {
    pub fn new<N, P>(name: N, provisioner: P) -> Self
    where
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            provisioner: provisioner.into(),
            ..Default::default()
        }
    }

    /// replace available modes with fresh policy table matching current access modes
    pub fn attach_access_policies(&mut self) {
        self.available_access_modes = access_policies();
        self.sync_policies();
    }

    pub fn has_access_mode(&self, mode: AccessMode) -> bool {
        self.access_modes.contains(&mode)
    }

    pub fn set_access_mode(&mut self, mode: AccessMode, enabled: bool) {
        if enabled {
            if !self.has_access_mode(mode) {
                self.access_modes.push(mode);
                self.access_modes.sort();
            }
        } else {
            self.access_modes.retain(|current| *current != mode);
        }
        self.sync_policies();
    }

    pub fn set_access_modes<I>(&mut self, modes: I)
    where
        I: IntoIterator<Item = AccessMode>,
    {
        let mut modes: Vec<AccessMode> = modes.into_iter().collect();
        modes.sort();
        modes.dedup();
        self.access_modes = modes;
        self.sync_policies();
    }

    fn sync_policies(&mut self) {
        for policy in self.available_access_modes.iter_mut() {
            policy.selected = self.access_modes.contains(&policy.mode);
        }
    }
}

#[cfg(test)]
mod test {

    use super::{access_policies, AccessMode, StorageClass};

    #[test]
    fn test_parse_access_modes() {
        assert_eq!(
            AccessMode::parse_list("RWX, RWO,RWX,ROX"),
            vec![AccessMode::ReadWriteOnce, AccessMode::ReadWriteMany]
        );
        assert!(AccessMode::parse_list("").is_empty());
        assert_eq!(
            AccessMode::join(&[AccessMode::ReadWriteOnce, AccessMode::ReadWriteMany]),
            "RWO,RWX"
        );
        assert!("ROX".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_policy_table() {
        let policies = access_policies();
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0].mode, AccessMode::ReadWriteOnce);
        assert!(policies.iter().all(|policy| !policy.selected));
    }

    #[test]
    fn test_access_modes_follow_policies() {
        let mut class = StorageClass::new("fast", "csi.example.com");
        class.attach_access_policies();

        class.set_access_mode(AccessMode::ReadWriteMany, true);
        class.set_access_mode(AccessMode::ReadWriteOnce, true);
        class.set_access_mode(AccessMode::ReadWriteOnce, true);
        assert_eq!(
            class.access_modes,
            vec![AccessMode::ReadWriteOnce, AccessMode::ReadWriteMany]
        );
        assert!(class.available_access_modes.iter().all(|policy| policy.selected));

        class.set_access_mode(AccessMode::ReadWriteOnce, false);
        assert_eq!(class.access_modes, vec![AccessMode::ReadWriteMany]);
        assert!(!class.available_access_modes[0].selected);
        assert!(class.available_access_modes[1].selected);
    }

    #[test]
    fn test_attach_policies_keeps_existing_modes() {
        let mut class = StorageClass::new("fast", "csi.example.com");
        class.access_modes = vec![AccessMode::ReadWriteMany];
        class.attach_access_policies();
        assert!(!class.available_access_modes[0].selected);
        assert!(class.available_access_modes[1].selected);
    }
}
