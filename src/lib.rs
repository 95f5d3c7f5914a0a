//! # gearmatrix — Gear Train Propagation
//!
//! Steady-state speed, torque and direction propagation through a gear train
//! described as a directed graph, driven from a single root gear.
//!
//! ## Design Principles
//!
//! 1. **Pure core**: `engine::run` owns its graph for one calculation and
//!    touches nothing else
//! 2. **Clean DTOs**: `CalculationRequest` in, `CalculationReport` out, both
//!    plain serde types
//! 3. **Trait-first storage**: `ConfigStore` is the contract for saved payloads
//! 4. **Transport-agnostic service**: routing and status mapping live in
//!    `service`, with no HTTP stack attached
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gearmatrix::{CalculationRequest, GearRecord, Workbench};
//!
//! # async fn example() -> gearmatrix::Result<()> {
//! let bench = Workbench::open_memory();
//!
//! let request = CalculationRequest::new(1000.0, 10.0)
//!     .with_gear(GearRecord::new("Spur", 20, 10.0).connects([1]))
//!     .with_gear(GearRecord::new("Spur", 40, 20.0))
//!     .with_edge_efficiency(0, 1, 0.95);
//!
//! let report = bench.calculate(&request)?;
//! for row in &report.results {
//!     println!("{} -> {}: {} rpm", row.from, row.to, row.rpm);
//! }
//!
//! bench.save(Some("two-spur"), &serde_json::to_value(&request)?).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Config Stores
//!
//! | Store  | `StoreConfig`  | Description                         |
//! |--------|----------------|-------------------------------------|
//! | Memory | `Memory`       | In-memory for testing/embedding     |
//! | File   | `Directory`    | One `<name>.json` per saved payload |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod graph;
pub mod engine;
pub mod storage;
pub mod export;
pub mod service;

use std::io::Write;

use serde_json::Value as Json;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    GearId, GearType, Direction, GearNode, PropagatedState, MeshEdge, HelixHand, MeshRole,
    LengthUnit, TorqueUnit,
    CalculationRequest, GearRecord, EdgeRecord,
    CalculationReport, EdgeResult, GearStateView, ModuleSummary,
};

// ============================================================================
// Re-exports: Config, Storage, Service
// ============================================================================

pub use config::{EngineConfig, StoreConfig};
pub use storage::{ConfigStore, SavedConfig, MemoryStore, FileStore};
pub use service::{GearService, Method, ServiceRequest, ServiceResponse};

// ============================================================================
// Top-level Workbench handle
// ============================================================================

/// The primary entry point. A `Workbench` pairs an engine configuration with
/// a config store.
pub struct Workbench<S: ConfigStore> {
    store: S,
    config: EngineConfig,
}

impl<S: ConfigStore> Workbench<S> {
    pub fn with_store(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Run one calculation.
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationReport> {
        engine::run(request, &self.config)
    }

    /// Decode a raw payload and run it.
    pub fn calculate_json(&self, payload: &Json) -> Result<CalculationReport> {
        engine::run_json(payload, &self.config)
    }

    /// Save a raw payload, under `name` or a generated one.
    pub async fn save(&self, name: Option<&str>, payload: &Json) -> Result<SavedConfig> {
        match name {
            Some(name) => self.store.save(name, payload).await,
            None => self.store.save_generated(payload).await,
        }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.list().await
    }

    pub async fn load(&self, name: &str) -> Result<Json> {
        self.store.load(name).await
    }

    /// Load a saved payload and calculate it.
    pub async fn recalculate(&self, name: &str) -> Result<CalculationReport> {
        let payload = self.store.load(name).await?;
        self.calculate_json(&payload)
    }

    /// Write `report` as CSV.
    pub fn export_csv(&self, report: &CalculationReport, writer: &mut dyn Write) -> Result<()> {
        export::export_csv(report, writer)
    }
}

/// In-memory workbench for testing and embedding.
impl Workbench<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new(), EngineConfig::default())
    }
}

impl Workbench<FileStore> {
    pub async fn open_dir(dir: impl AsRef<std::path::Path>, config: EngineConfig) -> Result<Self> {
        Ok(Self::with_store(FileStore::open(dir).await?, config))
    }
}

impl Workbench<Box<dyn ConfigStore>> {
    /// Build from configuration, choosing the store at runtime.
    pub async fn open(config: EngineConfig, store: &StoreConfig) -> Result<Self> {
        Ok(Self::with_store(storage::open(store).await?, config))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Structural error: {0}")]
    StructuralError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::ValidationError(_)
            | Error::StructuralError(_)
            | Error::ComputationError(_)
            | Error::Json(_) => 400,
            Error::NotFound(_) => 404,
            Error::StorageError(_) | Error::Io(_) => 500,
        }
    }

    /// Short machine-readable label.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ValidationError(_) => "validation_error",
            Error::StructuralError(_) => "structural_error",
            Error::ComputationError(_) => "computation_error",
            Error::NotFound(_) => "not_found",
            Error::StorageError(_) => "storage_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "invalid_json",
        }
    }

    /// Whether the caller caused this error.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

pub type Result<T> = std::result::Result<T, Error>;
