// Embed module - turns shaders into generated constant declarations
//
// Flow is strictly linear and single threaded:
//   compile/read -> strip/format -> concatenate -> write
// Nothing is written until every input has been processed.

pub mod batch;
pub mod compile;
pub mod declaration;
pub mod wgsl;

pub use batch::embed_shaders;
pub use compile::{ShaderCompiler, ShaderJob, Translator};
pub use wgsl::embed_wgsl;

use std::path::Path;

use crate::error::{Error, Result};

/// Read a shader or fragment as text. A missing file is a NotFound read error.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::read(path, e))
}

/// Create or overwrite a generated file in one write.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::write(path, e))
}
