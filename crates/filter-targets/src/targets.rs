//! Caller-facing view of by-name filters.

use crate::matcher::{target_hosts, target_services};
use filter_expr::{ConstantTable, Expr};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Host,
    Service,
}

impl TargetKind {
    /// The variable a filter indexes for this kind, as in `host.name`.
    pub fn keyword(self) -> &'static str {
        match self {
            TargetKind::Host => "host",
            TargetKind::Service => "service",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for TargetKind {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" | "hosts" => Ok(TargetKind::Host),
            "service" | "services" => Ok(TargetKind::Service),
            _ => Err(TargetError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("filter `{filter}` does not select {kind} objects by name")]
    NotByName { kind: TargetKind, filter: String },
    #[error("filter `{0}` does not select objects by name")]
    NoTargets(String),
    #[error("unknown target kind '{0}' (expected 'host' or 'service')")]
    UnknownKind(String),
}

/// Names a by-name filter selects, borrowed from the filter or its constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets<'a> {
    Hosts(Vec<&'a str>),
    /// `(host, service)` pairs
    Services(Vec<(&'a str, &'a str)>),
}

impl<'a> Targets<'a> {
    /// Recognizes either shape, preferring host+service pairs.
    pub fn extract(expr: &'a Expr, constants: Option<&'a ConstantTable>) -> Option<Self> {
        if let Some(services) = target_services(expr, constants) {
            return Some(Targets::Services(services));
        }
        target_hosts(expr, constants).map(Targets::Hosts)
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Targets::Hosts(_) => TargetKind::Host,
            Targets::Services(_) => TargetKind::Service,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Targets::Hosts(hosts) => hosts.len(),
            Targets::Services(services) => services.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts targets of `kind`, for callers that only work with by-name
/// filters.
pub fn require_targets<'a>(
    expr: &'a Expr,
    constants: Option<&'a ConstantTable>,
    kind: TargetKind,
) -> Result<Targets<'a>, TargetError> {
    let targets = match kind {
        TargetKind::Host => target_hosts(expr, constants).map(Targets::Hosts),
        TargetKind::Service => target_services(expr, constants).map(Targets::Services),
    };

    targets.ok_or_else(|| TargetError::NotByName {
        kind,
        filter: expr.to_string(),
    })
}
