//! # Mesh Operations
//!
//! Typed edit operations and the executor that applies them to a cloned
//! mesh.
//!
//! ## Structure
//!
//! - `envelope` - JSON wire form and its conversion into [`Operation`]s
//! - `hole` - circular through-holes cut in UV space
//! - `extrude` - solid extrusion of a region with optional taper
//! - `polygon` - 2D boolean difference and triangulation glue
//! - `executor` - ordering, region resolution and dispatch

mod envelope;
mod executor;
mod extrude;
mod hole;
mod polygon;


pub use envelope::{OperationEnvelope, OperationSpec, TargetSpec};
pub use executor::{
    apply_envelope, execute_operations, parametrize_and_execute, EditSummary, Execution,
    ExecutionReport, ExecutorConfig, OrderingPolicy, SkipReason, SkippedOperation,
};

use crate::geometry::UvBox;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Wire name of the hole operation.
pub const ADD_HOLE: &str = "add_hole";

/// Wire name of the extrude operation.
pub const EXTRUDE_REGION: &str = "extrude_region";

// =============================================================================
// PARAMETER TYPES
// =============================================================================

/// A surface-relative or world-axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Along the region's average normal
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Against the region's average normal
    #[serde(rename = "reverse_normal")]
    ReverseNormal,
    /// World +X
    #[serde(rename = "+x")]
    PosX,
    /// World -X
    #[serde(rename = "-x")]
    NegX,
    /// World +Y
    #[serde(rename = "+y")]
    PosY,
    /// World -Y
    #[serde(rename = "-y")]
    NegY,
    /// World +Z
    #[serde(rename = "+z")]
    PosZ,
    /// World -Z
    #[serde(rename = "-z")]
    NegZ,
}

impl Direction {
    /// Resolves to a unit vector given the region normal.
    pub fn resolve(self, normal: DVec3) -> DVec3 {
        match self {
            Direction::Normal => normal,
            Direction::ReverseNormal => -normal,
            Direction::PosX => DVec3::X,
            Direction::NegX => DVec3::NEG_X,
            Direction::PosY => DVec3::Y,
            Direction::NegY => DVec3::NEG_Y,
            Direction::PosZ => DVec3::Z,
            Direction::NegZ => DVec3::NEG_Z,
        }
    }
}

/// Outline of a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleShape {
    /// Circle of the given diameter
    Circular,
    /// Axis-aligned rectangle (not executed)
    Rectangular,
    /// Caller-supplied outline (not executed)
    Custom,
}

/// In-plane offset in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsetMm {
    /// Offset along u
    pub x: f64,
    /// Offset along v
    pub y: f64,
}

/// Parameters of `add_hole`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleParams {
    /// Outline
    pub shape: HoleShape,
    /// Diameter in millimetres
    pub diameter_mm: f64,
    /// Cut through the whole patch
    pub through_all: bool,
    /// Drilling direction (informational for through-holes)
    #[serde(default)]
    pub normal_direction: Direction,
    /// Offset of the hole centre from the region centre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_from_region_center_mm: Option<OffsetMm>,
    /// Entrance chamfer (accepted, not executed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamfer_entrance_mm: Option<f64>,
    /// Exit chamfer (accepted, not executed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamfer_exit_mm: Option<f64>,
}

impl HoleParams {
    /// A circular through-hole.
    pub fn circular(diameter_mm: f64) -> Self {
        Self {
            shape: HoleShape::Circular,
            diameter_mm,
            through_all: true,
            normal_direction: Direction::Normal,
            offset_from_region_center_mm: None,
            chamfer_entrance_mm: None,
            chamfer_exit_mm: None,
        }
    }

    /// Sets the centre offset.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_from_region_center_mm = Some(OffsetMm { x, y });
        self
    }
}

/// Extrusion body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrudeMode {
    /// Closed solid
    Solid,
    /// Hollow shell (not executed)
    Shell,
}

/// Shape of the extrusion's top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapType {
    /// Flat copy of the region
    #[default]
    Flat,
    /// Rounded cap (not executed)
    Rounded,
}

/// Parameters of `extrude_region`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrudeParams {
    /// Body type
    pub mode: ExtrudeMode,
    /// Extrusion direction
    #[serde(default)]
    pub direction: Direction,
    /// Extrusion height in millimetres
    pub height_mm: f64,
    /// Taper of the side walls in degrees; positive widens the top
    #[serde(default)]
    pub taper_angle_degrees: f64,
    /// Top shape
    #[serde(default)]
    pub cap_type: CapType,
}

impl ExtrudeParams {
    /// A straight solid extrusion with a flat cap.
    pub fn solid(direction: Direction, height_mm: f64) -> Self {
        Self {
            mode: ExtrudeMode::Solid,
            direction,
            height_mm,
            taper_angle_degrees: 0.0,
            cap_type: CapType::Flat,
        }
    }

    /// Sets the taper angle.
    pub fn with_taper(mut self, degrees: f64) -> Self {
        self.taper_angle_degrees = degrees;
        self
    }
}

// =============================================================================
// OPERATION
// =============================================================================

/// What an operation does.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    /// Cut a hole
    AddHole(HoleParams),
    /// Extrude the region
    ExtrudeRegion(ExtrudeParams),
    /// An operation type this kernel does not know; skipped
    Unsupported {
        /// The wire `type` string
        kind: String,
    },
}

impl OperationKind {
    /// Wire name of the operation type.
    pub fn name(&self) -> &str {
        match self {
            OperationKind::AddHole(_) => ADD_HOLE,
            OperationKind::ExtrudeRegion(_) => EXTRUDE_REGION,
            OperationKind::Unsupported { kind } => kind,
        }
    }
}

/// A typed edit aimed at a UV box.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Caller-chosen identifier
    pub id: String,
    /// Region selector
    pub target: UvBox,
    /// The edit
    pub kind: OperationKind,
    /// Execution order, ascending
    pub priority: i64,
    /// Ids this operation declares it depends on
    pub depends_on: Vec<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl Operation {
    /// Creates an operation with priority 0 and no dependencies.
    pub fn new(id: impl Into<String>, target: UvBox, kind: OperationKind) -> Self {
        Self {
            id: id.into(),
            target,
            kind,
            priority: 0,
            depends_on: Vec::new(),
            notes: None,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a dependency.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }
}
