// ============================================================================
// SESSION — the front end's state: loaded source, current settings, result
// ============================================================================
//
// The engine is stateless; whatever must survive between updates lives here
// and is handed to `engine::apply` explicitly on every recompute.

use std::path::{Path, PathBuf};

use crate::engine::{self, OperationKind, ParameterSet, TransformOutput};
use crate::io::{self, LoadError, SaveError, SaveFormat};
use crate::raster::Raster;

#[derive(Debug, Default)]
pub struct Session {
    source: Option<Raster>,
    source_path: Option<PathBuf>,
    operation: OperationKind,
    params: ParameterSet,
    result: Option<TransformOutput>,
}

impl Session {
    pub fn new(operation: OperationKind, params: ParameterSet) -> Self {
        Self {
            operation,
            params,
            ..Default::default()
        }
    }

    /// Load `path` as the new source and recompute.
    /// On failure the previous source and result are kept.
    pub fn open(&mut self, path: &Path) -> Result<&TransformOutput, LoadError> {
        let raster = match io::load_image(path) {
            Ok(r) => r,
            Err(e) => {
                log_err!("Failed to load {}: {}", path.display(), e);
                return Err(e);
            }
        };
        self.source_path = Some(path.to_path_buf());
        Ok(self.set_source(raster))
    }

    /// Replace the source with an in-memory image and recompute.
    pub fn set_source(&mut self, raster: Raster) -> &TransformOutput {
        let out = engine::apply(&raster, self.operation, self.params);
        self.source = Some(raster);
        self.store(out)
    }

    pub fn set_operation(&mut self, op: OperationKind) -> Option<&TransformOutput> {
        self.operation = op;
        self.refresh()
    }

    pub fn set_params(&mut self, params: ParameterSet) -> Option<&TransformOutput> {
        self.params = params;
        self.refresh()
    }

    /// Recompute from the current state. No-op without a source.
    pub fn refresh(&mut self) -> Option<&TransformOutput> {
        let out = engine::apply(self.source.as_ref()?, self.operation, self.params);
        Some(self.store(out))
    }

    fn store(&mut self, out: TransformOutput) -> &TransformOutput {
        log_info!(
            "Applied {} (t1={}, t2={}, k={}) -> {}x{}, {} channel(s)",
            self.operation,
            self.params.threshold1,
            self.params.threshold2,
            self.params.effective_kernel(),
            out.image.width(),
            out.image.height(),
            out.image.channels()
        );
        self.result.insert(out)
    }

    /// Write the current result, format chosen by extension.
    pub fn export(&self, path: &Path) -> Result<(), SaveError> {
        self.export_with(path, SaveFormat::from_path(path), io::DEFAULT_QUALITY)
    }

    pub fn export_with(&self, path: &Path, format: SaveFormat, quality: u8) -> Result<(), SaveError> {
        let out = self.result.as_ref().ok_or(SaveError::NothingToSave)?;
        io::save_image_with(&out.image, path, format, quality).inspect_err(|e| {
            log_err!("Failed to save {}: {}", path.display(), e);
        })
    }

    pub fn source(&self) -> Option<&Raster> {
        self.source.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn result(&self) -> Option<&TransformOutput> {
        self.result.as_ref()
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn params(&self) -> ParameterSet {
        self.params
    }
}
