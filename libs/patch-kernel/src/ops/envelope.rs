//! JSON wire form of an operation list.

use super::{ExtrudeParams, HoleParams, Operation, OperationKind, ADD_HOLE, EXTRUDE_REGION};
use crate::error::{KernelError, KernelResult};
use crate::geometry::UvBox;
use config::constants::SUPPORTED_SCHEMA_VERSION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Versioned list of operations, as sent by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEnvelope {
    /// Schema version of the envelope
    pub schema_version: u32,
    /// Operations in caller order
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

/// One operation on the wire. `params` is decoded once `type` is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    /// Operation identifier
    pub op_id: String,
    /// Operation type, e.g. `add_hole`
    #[serde(rename = "type")]
    pub kind: String,
    /// Region selector
    pub target: TargetSpec,
    /// Type-specific parameters
    #[serde(default)]
    pub params: Value,
    /// Execution order, ascending
    #[serde(default)]
    pub priority: i64,
    /// Declared dependencies
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Operation target on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSpec {
    /// Axis-aligned UV box
    UvRegion {
        /// The box
        #[serde(rename = "uvBox")]
        uv_box: UvBox,
    },
}

impl OperationEnvelope {
    /// Decodes an envelope and checks its schema version.
    ///
    /// # Example
    ///
    /// ```rust
    /// use patch_kernel::ops::OperationEnvelope;
    ///
    /// let json = r#"{"schemaVersion": 1, "operations": [{
    ///     "opId": "h1", "type": "add_hole",
    ///     "target": {"kind": "uv_region", "uvBox": {"uMin": 0.4, "uMax": 0.6, "vMin": 0.4, "vMax": 0.6}},
    ///     "params": {"shape": "circular", "diameterMm": 10, "throughAll": true, "normalDirection": "normal"}
    /// }]}"#;
    /// let operations = OperationEnvelope::from_json(json)?.into_operations()?;
    /// assert_eq!(operations[0].kind.name(), "add_hole");
    /// # Ok::<(), patch_kernel::KernelError>(())
    /// ```
    pub fn from_json(json: &str) -> KernelResult<Self> {
        let envelope: Self = serde_json::from_str(json)?;
        envelope.check_version()?;
        Ok(envelope)
    }

    /// Rejects envelopes newer than this kernel understands.
    pub fn check_version(&self) -> KernelResult<()> {
        if self.schema_version > SUPPORTED_SCHEMA_VERSION {
            return Err(KernelError::UnsupportedSchemaVersion {
                found: self.schema_version,
                supported: SUPPORTED_SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Converts every wire operation into a typed one.
    pub fn into_operations(self) -> KernelResult<Vec<Operation>> {
        self.check_version()?;
        let operations = self
            .operations
            .into_iter()
            .map(Operation::try_from)
            .collect::<KernelResult<Vec<_>>>()?;
        debug!("Decoded {} operations", operations.len());
        Ok(operations)
    }
}

impl TryFrom<OperationSpec> for Operation {
    type Error = KernelError;

    fn try_from(spec: OperationSpec) -> KernelResult<Self> {
        let kind = match spec.kind.as_str() {
            ADD_HOLE => OperationKind::AddHole(decode_params::<HoleParams>(&spec.op_id, spec.params)?),
            EXTRUDE_REGION => {
                OperationKind::ExtrudeRegion(decode_params::<ExtrudeParams>(&spec.op_id, spec.params)?)
            }
            _ => OperationKind::Unsupported { kind: spec.kind },
        };
        let TargetSpec::UvRegion { uv_box } = spec.target;

        Ok(Operation {
            id: spec.op_id,
            target: uv_box,
            kind,
            priority: spec.priority,
            depends_on: spec.depends_on,
            notes: spec.notes,
        })
    }
}

fn decode_params<T: DeserializeOwned>(op_id: &str, params: Value) -> KernelResult<T> {
    serde_json::from_value(params).map_err(|e| KernelError::malformed_params(op_id, e.to_string()))
}
