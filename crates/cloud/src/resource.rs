//! Declarative resource descriptions.
//!
//! A [`ResourceSpec`] is immutable once built: the kind, the identity and the
//! parameters handed verbatim to the provider on create.

use std::fmt;

/// Kinds of resources the bootstrap knows how to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// A platform API that must be enabled on the project.
    Api,
    /// An IAM service account.
    ServiceAccount,
    /// A Cloud Storage bucket.
    Bucket,
    /// An Artifact Registry repository.
    ArtifactRepository,
    /// A project-level IAM role binding for one member.
    IamBinding,
    /// A VPC network.
    Network,
    /// A VPC firewall rule.
    Firewall,
    /// A Cloud Router.
    Router,
    /// A Cloud NAT gateway attached to a router.
    Nat,
    /// A container image built from a local context.
    ContainerImage,
    /// A Cloud Workstations cluster.
    WorkstationCluster,
    /// A Cloud Workstations configuration.
    WorkstationConfig,
    /// A single workstation instance.
    Workstation,
}

impl ResourceKind {
    /// Parent qualifiers a spec of this kind must carry to be addressable.
    #[must_use]
    pub fn required_parents(self) -> &'static [&'static str] {
        match self {
            Self::IamBinding => &["member"],
            Self::Nat => &["router"],
            Self::WorkstationConfig => &["cluster"],
            Self::Workstation => &["cluster", "config"],
            _ => &[],
        }
    }

    /// Whether a spec of this kind must carry a location.
    #[must_use]
    pub fn requires_location(self) -> bool {
        matches!(
            self,
            Self::Bucket
                | Self::ArtifactRepository
                | Self::Router
                | Self::Nat
                | Self::ContainerImage
                | Self::WorkstationCluster
                | Self::WorkstationConfig
                | Self::Workstation
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Api => "api",
            Self::ServiceAccount => "service account",
            Self::Bucket => "bucket",
            Self::ArtifactRepository => "artifact repository",
            Self::IamBinding => "iam binding",
            Self::Network => "network",
            Self::Firewall => "firewall rule",
            Self::Router => "router",
            Self::Nat => "nat",
            Self::ContainerImage => "container image",
            Self::WorkstationCluster => "workstation cluster",
            Self::WorkstationConfig => "workstation config",
            Self::Workstation => "workstation",
        };
        f.write_str(label)
    }
}

/// Identity of a remote resource.
///
/// Two specs with equal ids refer to the same remote object. Uniqueness is
/// enforced by the provider, never locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource name as the provider knows it.
    pub name: String,
    /// Region or multi-region, if the kind is location-scoped.
    pub location: Option<String>,
    /// Qualifiers such as the owning router or cluster, in declaration order.
    pub parents: Vec<(String, String)>,
}

impl ResourceId {
    /// Look up a parent qualifier by key.
    #[must_use]
    pub fn parent(&self, key: &str) -> Option<&str> {
        self.parents
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)?;
        if let Some(location) = &self.location {
            write!(f, " in {location}")?;
        }
        if !self.parents.is_empty() {
            let parents: Vec<String> = self
                .parents
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, " ({})", parents.join(", "))?;
        }
        Ok(())
    }
}

/// A single `--flag[=value]` create parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Flag name without leading dashes.
    pub flag: String,
    /// Flag value; `None` for boolean switches.
    pub value: Option<String>,
}

impl Param {
    /// Render as a command-line argument.
    #[must_use]
    pub fn to_arg(&self) -> String {
        match &self.value {
            Some(value) => format!("--{}={value}", self.flag),
            None => format!("--{}", self.flag),
        }
    }
}

/// Fully-specified desired resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    id: ResourceId,
    args: Vec<String>,
    params: Vec<Param>,
}

impl ResourceSpec {
    /// Start a spec with the given kind and name.
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId {
                kind,
                name: name.into(),
                location: None,
                parents: Vec::new(),
            },
            args: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Scope the resource to a region or location.
    #[must_use]
    pub fn in_location(mut self, location: impl Into<String>) -> Self {
        self.id.location = Some(location.into());
        self
    }

    /// Add an identity qualifier (e.g. the router that owns a NAT).
    #[must_use]
    pub fn with_parent(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.id.parents.push((key.into(), value.into()));
        self
    }

    /// Add a `--flag=value` create parameter.
    #[must_use]
    pub fn with_param(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param {
            flag: flag.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Add a boolean `--flag` create parameter.
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.params.push(Param {
            flag: flag.into(),
            value: None,
        });
        self
    }

    /// Add a positional create argument (e.g. a build context directory).
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.id.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.id.name
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.id.location.as_deref()
    }

    #[must_use]
    pub fn parent(&self, key: &str) -> Option<&str> {
        self.id.parent(key)
    }

    /// Positional create arguments, in declaration order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Create parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Look up the value of a create parameter.
    #[must_use]
    pub fn param(&self, flag: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.flag == flag)
            .and_then(|p| p.value.as_deref())
    }
}
