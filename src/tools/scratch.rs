// Scratch space for compiler intermediates
//
// Each wrapper invocation gets its own directory holding the fixed
// intermediate names (a.spv, a.wgsl). The directory is removed when the
// Scratch is dropped, so a failing tool never leaves files behind.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{Error, Result};

const SPIRV_NAME: &str = "a.spv";
const WGSL_NAME: &str = "a.wgsl";

pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("shader-embed-")
            .tempdir()
            .map_err(Error::Scratch)?;
        log::trace!("Scratch directory {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Compiler output, C-array text or SPIR-V binary depending on mode.
    pub fn spirv_path(&self) -> PathBuf {
        self.path().join(SPIRV_NAME)
    }

    /// Translator output.
    pub fn wgsl_path(&self) -> PathBuf {
        self.path().join(WGSL_NAME)
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.dir.close().map_err(Error::Scratch)
    }
}
