//! Dependency ledger: merges every plugin's package requirements into one
//! deduplicated install plan.
//!
//! # Merge rules
//!
//! When two plugins declare the same package:
//!
//! - identical constraints merge
//! - an unconstrained declaration yields to a constrained one
//! - an exact version wins if the other range accepts it
//! - two ranges of the same operator (`^`, `~`, `>=`) keep the stricter one
//!   if its lower bound satisfies the other
//! - other overlapping ranges are intersected (`>=1.2 <1.5`)
//! - ranges with no common version are a [`DomainError::DependencyConflict`]
//!
//! A package is a runtime dependency if any plugin needs it at runtime.
//! Non-semver specifiers (dist-tags, git URLs, `npm:` aliases) only merge with
//! themselves.

use semver::{Comparator, Op, Version, VersionReq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{
    entities::{config_context::ConfigContext, plugin::PackageSpec, plugin::PluginDescriptor},
    error::DomainError,
    value_objects::{DependencyKind, PluginId},
};

// ── VersionConstraint ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// No constraint: install the latest version.
    Any,
    /// A semver range, kept in the npm spelling it was declared with.
    Range { raw: String, req: VersionReq },
    /// Anything that is not a semver range.
    Tag(String),
}

impl VersionConstraint {
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            None | Some("" | "*" | "latest" | "x") => return Self::Any,
            Some(r) => r,
        };
        if raw.contains("||") {
            return Self::Tag(raw.to_string());
        }
        match VersionReq::parse(&to_semver_syntax(raw)) {
            Ok(req) if req.comparators.is_empty() => Self::Any,
            Ok(req) => Self::Range {
                raw: raw.to_string(),
                req,
            },
            Err(_) => Self::Tag(raw.to_string()),
        }
    }

    /// Text after `name@` in an install argument, if any.
    pub fn as_install_suffix(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Range { raw, .. } | Self::Tag(raw) => Some(raw),
        }
    }

    /// Combine two constraints into one satisfying both, if possible.
    fn merge(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Any, x) | (x, Self::Any) => Some(x.clone()),
            (Self::Tag(a), Self::Tag(b)) if a == b => Some(self.clone()),
            (Self::Tag(_), _) | (_, Self::Tag(_)) => None,
            (Self::Range { raw: ra, req: a }, Self::Range { raw: rb, req: b }) => {
                if ra == rb || a == b {
                    return Some(self.clone());
                }
                if let Some(v) = exact_version(a) {
                    return b.matches(&v).then(|| self.clone());
                }
                if let Some(v) = exact_version(b) {
                    return a.matches(&v).then(|| other.clone());
                }
                if let (Some(op_a), Some(op_b)) = (single_op(a), single_op(b)) {
                    if op_a == op_b && matches!(op_a, Op::Caret | Op::Tilde | Op::GreaterEq) {
                        let (hi, lo, hi_c) = if lower_bound(a) >= lower_bound(b) {
                            (a, b, self)
                        } else {
                            (b, a, other)
                        };
                        if let Some(bound) = lower_bound(hi) {
                            if lo.matches(&bound) {
                                return Some(hi_c.clone());
                            }
                        }
                    }
                }

                let witnesses = [lower_bound(a), lower_bound(b), Some(Version::new(0, 0, 0))];
                let overlap = witnesses
                    .iter()
                    .flatten()
                    .any(|v| a.matches(v) && b.matches(v));
                if !overlap {
                    return None;
                }
                let raw = format!("{ra} {rb}");
                let req = VersionReq::parse(&to_semver_syntax(&raw)).ok()?;
                Some(Self::Range { raw, req })
            }
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("latest"),
            Self::Range { raw, .. } | Self::Tag(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// npm writes intersections space-separated and a bare version means exact;
/// the semver crate wants commas and reads a bare version as `^`.
fn to_semver_syntax(raw: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in raw.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op.push_str(token);
            continue;
        }
        let token = token.strip_prefix('v').unwrap_or(token);
        let comparator = if pending_op.is_empty() && token.starts_with(|c: char| c.is_ascii_digit()) {
            if token.contains(['x', 'X', '*']) {
                token.to_string()
            } else {
                format!("={token}")
            }
        } else {
            format!("{pending_op}{token}")
        };
        pending_op.clear();
        parts.push(comparator);
    }
    parts.join(", ")
}

fn single_op(req: &VersionReq) -> Option<Op> {
    match req.comparators.as_slice() {
        [only] => Some(only.op),
        _ => None,
    }
}

fn exact_version(req: &VersionReq) -> Option<Version> {
    match req.comparators.as_slice() {
        [
            Comparator {
                op: Op::Exact,
                major,
                minor: Some(minor),
                patch: Some(patch),
                pre,
                ..
            },
        ] => Some(Version {
            major: *major,
            minor: *minor,
            patch: *patch,
            pre: pre.clone(),
            build: semver::BuildMetadata::EMPTY,
        }),
        _ => None,
    }
}

/// Smallest version a requirement can accept, if it has a lower bound.
fn lower_bound(req: &VersionReq) -> Option<Version> {
    req.comparators.iter().filter_map(comparator_floor).max()
}

fn comparator_floor(c: &Comparator) -> Option<Version> {
    let minor = c.minor.unwrap_or(0);
    let patch = c.patch.unwrap_or(0);
    let mut v = match c.op {
        Op::Exact | Op::GreaterEq | Op::Tilde | Op::Caret | Op::Wildcard => {
            Version::new(c.major, minor, patch)
        }
        Op::Greater => match (c.minor, c.patch) {
            (Some(minor), Some(patch)) => Version::new(c.major, minor, patch + 1),
            (Some(minor), None) => Version::new(c.major, minor + 1, 0),
            _ => Version::new(c.major + 1, 0, 0),
        },
        _ => return None,
    };
    if matches!(c.op, Op::Exact | Op::GreaterEq | Op::Tilde | Op::Caret) {
        v.pre = c.pre.clone();
    }
    Some(v)
}

// ── Ledger ────────────────────────────────────────────────────────────────────

/// One deduplicated package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub constraint: VersionConstraint,
    pub kind: DependencyKind,
    /// Plugins that declared the package, in declaration order.
    pub declared_by: Vec<PluginId>,
}

impl LedgerEntry {
    /// `name` or `name@range` as passed to a package manager.
    pub fn install_arg(&self) -> String {
        match self.constraint.as_install_suffix() {
            Some(range) => format!("{}@{range}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Every package of a run, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl DependencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `plugin` needs `spec`.
    ///
    /// On conflict the ledger keeps the earlier constraint.
    pub fn declare(&mut self, plugin: &PluginId, spec: &PackageSpec) -> Result<(), DomainError> {
        let incoming = VersionConstraint::parse(spec.constraint.as_deref());

        let Some(entry) = self.entries.get_mut(&spec.name) else {
            self.entries.insert(
                spec.name.clone(),
                LedgerEntry {
                    name: spec.name.clone(),
                    constraint: incoming,
                    kind: spec.kind,
                    declared_by: vec![plugin.clone()],
                },
            );
            return Ok(());
        };

        let merged = entry
            .constraint
            .merge(&incoming)
            .ok_or_else(|| DomainError::DependencyConflict {
                package: spec.name.clone(),
                existing: entry.constraint.to_string(),
                requested: incoming.to_string(),
                declared_by: entry
                    .declared_by
                    .iter()
                    .map(PluginId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        entry.constraint = merged;
        if spec.kind == DependencyKind::Runtime {
            entry.kind = DependencyKind::Runtime;
        }
        if !entry.declared_by.contains(plugin) {
            entry.declared_by.push(plugin.clone());
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    /// Entries of one kind, sorted by name.
    pub fn of_kind(&self, kind: DependencyKind) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values().filter(move |e| e.kind == kind)
    }

    /// Install arguments for one kind, sorted by name.
    pub fn install_args(&self, kind: DependencyKind) -> Vec<String> {
        self.of_kind(kind).map(LedgerEntry::install_arg).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a ledger from the plugins of a run.
pub struct DependencyAggregator;

impl DependencyAggregator {
    /// Declare every package of every plugin, in plugin order.
    ///
    /// Conflicts are returned next to the ledger, never abort aggregation.
    pub fn aggregate<'a>(
        ctx: &ConfigContext,
        plugins: impl IntoIterator<Item = &'a PluginDescriptor>,
    ) -> (DependencyLedger, Vec<(PluginId, DomainError)>) {
        let mut ledger = DependencyLedger::new();
        let mut conflicts = Vec::new();
        for plugin in plugins {
            for spec in plugin.dependencies(ctx) {
                if let Err(e) = ledger.declare(&plugin.id, &spec) {
                    conflicts.push((plugin.id.clone(), e));
                }
            }
        }
        (ledger, conflicts)
    }
}
