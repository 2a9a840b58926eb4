//!
//! # Netlist Extraction
//!
//! Connectivity of a resolved hierarchy, inferred from the world-space locations,
//! orientations, and types of its ports.
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Crates.io
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// Local imports
use crate::config::NetlistConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::geom::{Point, Transform};
use crate::library::{ComponentKey, Library};
use crate::port::Port;
use crate::resolve::{InstancePath, ResolveOptions};
use crate::utils::SerdeFile;

/// Relative difference above which connected port widths are reported as mismatched
const WIDTH_RTOL: f64 = 1e-6;

/// # Netlist Node Identifier
/// A port, by the instance path which defines it and its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub path: InstancePath,
    pub port: String,
}
impl NodeId {
    pub fn new(path: impl Into<InstancePath>, port: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            port: port.into(),
        }
    }
}
impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.port)
        } else {
            write!(f, "{}.{}", self.path, self.port)
        }
    }
}

/// A resolved port and its defining component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub component: String,
    /// Port, in root coordinates
    pub port: Port,
}
/// A detected connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub a: NodeId,
    pub b: NodeId,
}
/// Connectivity rule violations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// Three or more coincident, compatible ports, or a port with more than one partner
    Ambiguous { location: Point, ports: Vec<NodeId> },
    /// Coincident, facing ports of incompatible types
    TypeMismatch { a: NodeId, b: NodeId },
}
impl Violation {
    /// Convert to the corresponding [LayoutError]
    pub fn to_error(&self) -> LayoutError {
        match self {
            Self::Ambiguous { location, ports } => LayoutError::AmbiguousConnection {
                location: *location,
                ports: ports.iter().map(|p| p.to_string()).collect(),
            },
            Self::TypeMismatch { a, b } => LayoutError::TypeMismatch {
                a: a.to_string(),
                b: b.to_string(),
            },
        }
    }
}
/// An instance in the netlisted hierarchy, with its accumulated transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub path: InstancePath,
    pub component: String,
    pub transform: Transform,
}

/// # Netlist
///
/// Nodes are resolved ports; connections are coincident, facing, compatible pairs.
/// Dangling ports are data, not errors.
/// Callers decide whether they are acceptable, e.g. for top-level I/O.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    /// Root component name
    pub root: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    /// Nodes in no connection and no violation
    pub dangling: Vec<NodeId>,
    pub violations: Vec<Violation>,
    pub instances: Vec<Instance>,
}
impl SerdeFile for Netlist {}

impl Netlist {
    /// Extract the connectivity of everything under `root`
    pub fn extract(lib: &Library, root: ComponentKey, config: &NetlistConfig) -> LayoutResult<Self> {
        config.validate()?;
        let opts = ResolveOptions {
            include_polygons: false,
            ..Default::default()
        };
        let resolved = lib.resolve_with(root, &opts)?;
        let nodes: Vec<Node> = resolved
            .ports
            .into_iter()
            .map(|p| Node {
                id: NodeId::new(p.path, p.port.name.clone()),
                component: p.component,
                port: p.port,
            })
            .collect();
        let instances = resolved
            .instances
            .into_iter()
            .map(|i| Instance {
                path: i.path,
                component: i.component,
                transform: i.transform,
            })
            .collect();
        let mut netlist = Self {
            root: resolved.root,
            nodes,
            instances,
            ..Default::default()
        };
        netlist.connect(config);
        debug!(
            "Netlist of `{}`: {} nodes, {} connections, {} dangling, {} violations",
            netlist.root,
            netlist.nodes.len(),
            netlist.connections.len(),
            netlist.dangling.len(),
            netlist.violations.len()
        );
        Ok(netlist)
    }
    /// Extract, and fail on the first violation
    pub fn extract_checked(
        lib: &Library,
        root: ComponentKey,
        config: &NetlistConfig,
    ) -> LayoutResult<Self> {
        let netlist = Self::extract(lib, root, config)?;
        netlist.check()?;
        Ok(netlist)
    }
    /// Convert our first violation, if any, into an error
    pub fn check(&self) -> LayoutResult<()> {
        match self.violations.first() {
            Some(v) => Err(v.to_error()),
            None => Ok(()),
        }
    }
    /// Get the node identified by `id`
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }
    /// Get the node connected to `id`, if any
    pub fn connected_to(&self, id: &NodeId) -> Option<&NodeId> {
        self.connections.iter().find_map(|c| {
            if &c.a == id {
                Some(&c.b)
            } else if &c.b == id {
                Some(&c.a)
            } else {
                None
            }
        })
    }
    /// Boolean indication of whether `a` and `b` are connected
    pub fn is_connected(&self, a: &NodeId, b: &NodeId) -> bool {
        self.connected_to(a) == Some(b)
    }
    /// Boolean indication of whether `id` is dangling
    pub fn is_dangling(&self, id: &NodeId) -> bool {
        self.dangling.contains(id)
    }

    /// Sort our nodes into connections, violations, and dangling ports
    fn connect(&mut self, config: &NetlistConfig) {
        let tol = config.position_tolerance;
        let n = self.nodes.len();

        // Bucket by location, floored to the tolerance grid. Pairs within `tol`
        // of each other land in the same or an adjacent bucket.
        // Keys saturate for huge coordinates; exact distances are checked below.
        let bucket_of = |p: &Point| ((p.x / tol).floor() as i64, (p.y / tol).floor() as i64);
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            buckets.entry(bucket_of(&node.port.loc)).or_default().push(idx);
        }

        // Coincident, compatible ports are grouped.
        // Coincident and facing but incompatible pairs are type mismatches.
        let mut coincident: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut mismatches: Vec<(usize, usize)> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            let (bx, by) = bucket_of(&node.port.loc);
            let mut near: Vec<usize> = Vec::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let key = (bx.saturating_add(dx), by.saturating_add(dy));
                    if let Some(b) = buckets.get(&key) {
                        near.extend(b.iter().copied().filter(|j| *j != i));
                    }
                }
            }
            near.sort_unstable();
            near.dedup();
            for j in near {
                let other = &self.nodes[j].port;
                if node.port.distance(other) > tol {
                    continue;
                }
                if node.port.port_type.is_compatible(&other.port_type) {
                    coincident[i].push(j);
                } else if i < j && node.port.is_facing(other, config.angle_tolerance) {
                    mismatches.push((i, j));
                }
            }
        }

        let mut involved: HashSet<usize> = HashSet::new();
        let mut visited = vec![false; n];
        for start in 0..n {
            if visited[start] || coincident[start].is_empty() {
                continue;
            }
            // Collect the coincidence graph's connected group around `start`
            let mut group = vec![start];
            visited[start] = true;
            let mut k = 0;
            while k < group.len() {
                for &j in coincident[group[k]].iter() {
                    if !visited[j] {
                        visited[j] = true;
                        group.push(j);
                    }
                }
                k += 1;
            }
            group.sort_unstable();

            if group.len() > 2 {
                involved.extend(group.iter().copied());
                let ports: Vec<NodeId> = group.iter().map(|i| self.nodes[*i].id.clone()).collect();
                let location = self.nodes[group[0]].port.loc;
                warn!(
                    "Ambiguous connection at ({}, {}) between {} ports",
                    location.x,
                    location.y,
                    ports.len()
                );
                self.violations.push(Violation::Ambiguous { location, ports });
                continue;
            }
            let (a, b) = (&self.nodes[group[0]], &self.nodes[group[1]]);
            if !a.port.is_facing(&b.port, config.angle_tolerance) {
                // Coincident, but pointing the same way or askew
                continue;
            }
            involved.extend(group.iter().copied());
            let wmax = a.port.width.abs().max(b.port.width.abs());
            if (a.port.width - b.port.width).abs() > WIDTH_RTOL * wmax {
                warn!(
                    "Width mismatch between connected ports {} ({}) and {} ({})",
                    a.id, a.port.width, b.id, b.port.width
                );
            }
            self.connections.push(Connection {
                a: a.id.clone(),
                b: b.id.clone(),
            });
        }
        for (i, j) in mismatches {
            involved.insert(i);
            involved.insert(j);
            let (a, b) = (&self.nodes[i], &self.nodes[j]);
            warn!(
                "Port type mismatch between {} ({}) and {} ({})",
                a.id, a.port.port_type, b.id, b.port.port_type
            );
            self.violations.push(Violation::TypeMismatch {
                a: a.id.clone(),
                b: b.id.clone(),
            });
        }
        self.dangling = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| !involved.contains(i))
            .map(|(_, node)| node.id.clone())
            .collect();
    }
}
