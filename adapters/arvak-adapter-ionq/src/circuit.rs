//! IonQ-native circuit representation.
//!
//! Circuits arrive already compiled to the IonQ JSON gate format; this
//! module only types that format and records which qubits are measured.

use serde::{Deserialize, Serialize};

/// One gate in the IonQ JSON circuit format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum IonqGate {
    X { target: u32 },
    Y { target: u32 },
    Z { target: u32 },
    H { target: u32 },
    S { target: u32 },
    Si { target: u32 },
    T { target: u32 },
    Ti { target: u32 },
    V { target: u32 },
    Vi { target: u32 },
    Rx { target: u32, rotation: f64 },
    Ry { target: u32, rotation: f64 },
    Rz { target: u32, rotation: f64 },
    Cnot { control: u32, target: u32 },
    Swap { targets: [u32; 2] },
    Xx { targets: [u32; 2], rotation: f64 },
    Yy { targets: [u32; 2], rotation: f64 },
    Zz { targets: [u32; 2], rotation: f64 },
}

impl IonqGate {
    /// Wire name of the gate.
    pub fn name(&self) -> &'static str {
        match self {
            IonqGate::X { .. } => "x",
            IonqGate::Y { .. } => "y",
            IonqGate::Z { .. } => "z",
            IonqGate::H { .. } => "h",
            IonqGate::S { .. } => "s",
            IonqGate::Si { .. } => "si",
            IonqGate::T { .. } => "t",
            IonqGate::Ti { .. } => "ti",
            IonqGate::V { .. } => "v",
            IonqGate::Vi { .. } => "vi",
            IonqGate::Rx { .. } => "rx",
            IonqGate::Ry { .. } => "ry",
            IonqGate::Rz { .. } => "rz",
            IonqGate::Cnot { .. } => "cnot",
            IonqGate::Swap { .. } => "swap",
            IonqGate::Xx { .. } => "xx",
            IonqGate::Yy { .. } => "yy",
            IonqGate::Zz { .. } => "zz",
        }
    }

    /// Qubits the gate acts on.
    pub fn qubits(&self) -> Vec<u32> {
        match *self {
            IonqGate::X { target }
            | IonqGate::Y { target }
            | IonqGate::Z { target }
            | IonqGate::H { target }
            | IonqGate::S { target }
            | IonqGate::Si { target }
            | IonqGate::T { target }
            | IonqGate::Ti { target }
            | IonqGate::V { target }
            | IonqGate::Vi { target }
            | IonqGate::Rx { target, .. }
            | IonqGate::Ry { target, .. }
            | IonqGate::Rz { target, .. } => vec![target],
            IonqGate::Cnot { control, target } => vec![control, target],
            IonqGate::Swap { targets }
            | IonqGate::Xx { targets, .. }
            | IonqGate::Yy { targets, .. }
            | IonqGate::Zz { targets, .. } => targets.to_vec(),
        }
    }

    /// Rotation angle, for parameterized gates.
    pub fn rotation(&self) -> Option<f64> {
        match *self {
            IonqGate::Rx { rotation, .. }
            | IonqGate::Ry { rotation, .. }
            | IonqGate::Rz { rotation, .. }
            | IonqGate::Xx { rotation, .. }
            | IonqGate::Yy { rotation, .. }
            | IonqGate::Zz { rotation, .. } => Some(rotation),
            _ => None,
        }
    }
}

/// Body of a job submission: `{"qubits": n, "circuit": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonqCircuit {
    pub qubits: u32,
    pub circuit: Vec<IonqGate>,
}

impl IonqCircuit {
    pub fn new(qubits: u32, circuit: Vec<IonqGate>) -> Self {
        Self { qubits, circuit }
    }
}

/// A circuit ready for submission, with its measurement layout.
///
/// `measurements[i]` is the circuit qubit whose value becomes bit `i` of
/// every decoded outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCircuit {
    /// Job name; the backend derives one when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub body: IonqCircuit,
    #[serde(default)]
    pub measurements: Vec<usize>,
    /// Opaque post-processing descriptor attached to the result.
    #[serde(default)]
    pub postprocess: Option<String>,
}

impl CompiledCircuit {
    pub fn new(body: IonqCircuit, measurements: Vec<usize>) -> Self {
        Self {
            name: None,
            body,
            measurements,
            postprocess: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_postprocess(mut self, descriptor: impl Into<String>) -> Self {
        self.postprocess = Some(descriptor.into());
        self
    }

    /// Number of qubits the circuit declares.
    pub fn num_qubits(&self) -> u32 {
        self.body.qubits
    }

    /// Structural problems that would make IonQ reject the circuit.
    pub fn problems(&self, max_qubits: u32) -> Vec<String> {
        let mut reasons = Vec::new();
        let n = self.body.qubits;

        if n == 0 {
            reasons.push("circuit declares no qubits".to_string());
        }
        if n > max_qubits {
            reasons.push(format!(
                "circuit uses {n} qubits, device supports {max_qubits}"
            ));
        }

        for (i, gate) in self.body.circuit.iter().enumerate() {
            let qubits = gate.qubits();
            if let Some(q) = qubits.iter().find(|&&q| q >= n) {
                reasons.push(format!(
                    "gate {i} ({}) targets qubit {q} outside 0..{n}",
                    gate.name()
                ));
            }
            if qubits.len() == 2 && qubits[0] == qubits[1] {
                reasons.push(format!(
                    "gate {i} ({}) acts twice on qubit {}",
                    gate.name(),
                    qubits[0]
                ));
            }
            if gate.rotation().is_some_and(|r| !r.is_finite()) {
                reasons.push(format!("gate {i} ({}) has a non-finite rotation", gate.name()));
            }
        }

        let mut seen = vec![false; n as usize];
        for &q in &self.measurements {
            match seen.get_mut(q) {
                None => reasons.push(format!("measured qubit {q} outside 0..{n}")),
                Some(true) => reasons.push(format!("qubit {q} measured twice")),
                Some(flag) => *flag = true,
            }
        }

        reasons
    }
}
