//! Error types for the deployer
//!
//! Failures coming back from the cluster API are classified once, here, and
//! carry the operation and resource they belong to.

use std::fmt;

use thiserror::Error;

use crate::crd::ResourceKind;
use crate::lifecycle::{Phase, Transition};

/// Lifecycle operation issued against the cluster API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Patch,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// The operation and resource identity an error is reported against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationContext {
    pub operation: Operation,
    pub namespace: String,
    pub kind: ResourceKind,
    /// Absent for collection calls
    pub name: Option<String>,
}

impl OperationContext {
    pub fn new(operation: Operation, namespace: &str, kind: ResourceKind, name: Option<&str>) -> Self {
        Self {
            operation,
            namespace: namespace.to_string(),
            kind,
            name: name.map(String::from),
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {} {}/{}", self.operation, self.kind, self.namespace, name),
            None => write!(f, "{} {} in {}", self.operation, self.kind, self.namespace),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{context}: not found: {source}")]
    NotFound {
        context: OperationContext,
        #[source]
        source: kube::Error,
    },

    #[error("{context}: already exists: {source}")]
    AlreadyExists {
        context: OperationContext,
        #[source]
        source: kube::Error,
    },

    #[error("{context}: stale resource version: {source}")]
    Conflict {
        context: OperationContext,
        #[source]
        source: kube::Error,
    },

    #[error("{context}: rejected by the cluster: {source}")]
    Invalid {
        context: OperationContext,
        #[source]
        source: kube::Error,
    },

    #[error("{context}: transport failure: {source}")]
    Transport {
        context: OperationContext,
        #[source]
        source: kube::Error,
    },

    #[error("{context}: malformed document: {source}")]
    Serialization {
        context: OperationContext,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot {transition} {name} while it is {phase}")]
    InvalidTransition {
        name: String,
        phase: Phase,
        transition: Transition,
    },

    #[error("Resource kind {0} is registered more than once")]
    DuplicateKind(String),

    #[error("Resource kind {0} is not registered")]
    UnregisteredKind(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Kubernetes error: {0}")]
    KubeError(#[from] kube::Error),
}

impl Error {
    /// Classify a failure returned by the cluster API
    pub fn from_kube(context: OperationContext, source: kube::Error) -> Self {
        let (code, reason) = match &source {
            kube::Error::Api(response) => (response.code, response.reason.clone()),
            _ => (0, String::new()),
        };
        match (code, reason.as_str()) {
            (404, _) => Error::NotFound { context, source },
            (409, "AlreadyExists") => Error::AlreadyExists { context, source },
            (409, _) => Error::Conflict { context, source },
            (400, _) | (422, _) => Error::Invalid { context, source },
            _ => Error::Transport { context, source },
        }
    }

    /// Operation and resource the error was reported against, if any
    pub fn context(&self) -> Option<&OperationContext> {
        match self {
            Error::NotFound { context, .. }
            | Error::AlreadyExists { context, .. }
            | Error::Conflict { context, .. }
            | Error::Invalid { context, .. }
            | Error::Transport { context, .. }
            | Error::Serialization { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status equivalent surfaced to deployer clients
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::AlreadyExists { .. } | Error::Conflict { .. } | Error::InvalidTransition { .. } => {
                409
            }
            Error::Invalid { .. } | Error::ValidationError(_) => 400,
            _ => 500,
        }
    }

    /// Short machine-readable name of the error class
    pub fn reason(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NotFound",
            Error::AlreadyExists { .. } => "AlreadyExists",
            Error::Conflict { .. } => "Conflict",
            Error::Invalid { .. } | Error::ValidationError(_) => "ValidationError",
            Error::InvalidTransition { .. } => "InvalidTransition",
            Error::Transport { .. } | Error::KubeError(_) => "TransportError",
            _ => "InternalError",
        }
    }

    /// Transport failures may succeed when the caller tries again
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::KubeError(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
