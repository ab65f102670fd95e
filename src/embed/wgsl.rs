// Pre-translated WGSL embedder
//
// No tools are run. Each listed .wgsl file is read as is; files that open
// with the include marker get the shared utility fragment glued in front.

use std::path::PathBuf;

use super::declaration::{text_name, Declaration};
use super::{read_source, write_output};
use crate::config::Manifest;
use crate::error::Result;

pub fn embed_wgsl(manifest: &Manifest) -> Result<PathBuf> {
    let contents = render_wgsl(manifest)?;
    let output = manifest.resolve(&manifest.wgsl.output);
    write_output(&output, &contents)?;
    log::info!(
        "Wrote {} WGSL shaders to {}",
        manifest.wgsl.shaders.len(),
        output.display()
    );
    Ok(output)
}

pub fn render_wgsl(manifest: &Manifest) -> Result<String> {
    let wgsl = &manifest.wgsl;
    let util = read_source(&manifest.resolve(&wgsl.util))?;

    let mut contents = String::new();
    for shader in &wgsl.shaders {
        let name = text_name(shader)?;
        let mut code = read_source(&manifest.resolve(shader))?;
        if code.starts_with(&wgsl.include_marker) {
            log::debug!("{} includes {}", shader.display(), wgsl.util.display());
            code.insert_str(0, &util);
        }
        log::info!("Embedding {} as {}", shader.display(), name);
        contents.push_str(&Declaration::text(name, code).to_string());
    }
    Ok(contents)
}
