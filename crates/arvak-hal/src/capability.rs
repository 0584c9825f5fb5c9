//! Backend capability introspection.
//!
//! Static descriptors of what a backend can run: qubit count, supported
//! gates and connectivity. The external compiler reads these to legalize
//! circuits before submission; backends read them to validate what they are
//! given.
//!
//! All edges in [`Topology`] are bidirectional: if `(a, b)` is present,
//! both `a → b` and `b → a` are valid two-qubit interactions.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend device.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set, named as on the wire.
    pub gate_set: GateSet,
    /// Qubit connectivity topology. All edges are bidirectional.
    pub topology: Topology,
    /// Whether this is a simulator (`true`) vs real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, e.g. `"ion_trap"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for an IonQ trapped-ion device.
    ///
    /// IonQ devices have all-to-all connectivity.
    pub fn ionq(name: impl Into<String>, num_qubits: u32, is_simulator: bool) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ionq(),
            topology: Topology::full(num_qubits),
            is_simulator,
            features: vec!["ion_trap".into()],
        }
    }
}

/// Gate set supported by a backend.
///
/// The `native` list identifies gates that execute without decomposition.
/// If `native` is empty, all supported gates are considered native.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Native gates (execute without decomposition on this backend).
    pub native: Vec<String>,
}

impl GateSet {
    /// IonQ JSON circuit gate set.
    ///
    /// The service accepts the Clifford+T family, arbitrary-angle `rx`/`ry`/
    /// `rz`, `cnot`, `swap` and the Mølmer-Sørensen style `xx`/`yy`/`zz`
    /// rotations; `xx` is the hardware-native entangler.
    pub fn ionq() -> Self {
        let single = ["x", "y", "z", "h", "s", "si", "t", "ti", "v", "vi", "rx", "ry", "rz"];
        let two = ["cnot", "swap", "xx", "yy", "zz"];
        Self {
            single_qubit: single.iter().map(|s| (*s).to_string()).collect(),
            two_qubit: two.iter().map(|s| (*s).to_string()).collect(),
            native: ["rx", "ry", "rz", "xx"].iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native to the hardware.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges (pairs of connected qubits). Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Check if two qubits are connected.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_ionq() {
        let caps = Capabilities::ionq("qpu", 11, false);
        assert_eq!(caps.num_qubits, 11);
        assert!(!caps.is_simulator);
        assert_eq!(caps.topology.kind, TopologyKind::FullyConnected);
        // 11 choose 2
        assert_eq!(caps.topology.edges.len(), 55);
        assert!(caps.features.contains(&"ion_trap".to_string()));
    }

    #[test]
    fn test_topology_full_is_all_to_all() {
        let topo = Topology::full(4);
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    assert!(topo.is_connected(a, b));
                }
            }
        }
        assert!(!topo.is_connected(0, 4));
    }

    #[test]
    fn test_gate_set_ionq() {
        let gs = GateSet::ionq();
        assert!(gs.contains("cnot"));
        assert!(gs.contains("vi"));
        assert!(!gs.contains("cz"));
        assert!(gs.is_native("xx"));
        assert!(!gs.is_native("h"));
    }
}
