// Batch embedder
//
// Compiles every manifest shader in order and writes one generated file:
//
//   const ScanBlockSize = <block_size>;
//   const SortChunkSize = <sort_chunk_size>;
//   <compiled shaders, manifest order>
//   <prebuilt shaders, manifest order>
//
// Consumers may index the constants by position, so order is fixed.

use std::path::{Path, PathBuf};

use super::compile::{ShaderCompiler, ShaderJob};
use super::declaration::{compiled_name, integer_constant, Declaration};
use super::{read_source, write_output};
use crate::config::Manifest;
use crate::error::{Error, Result};

pub const BLOCK_SIZE_CONSTANT: &str = "ScanBlockSize";
pub const CHUNK_SIZE_CONSTANT: &str = "SortChunkSize";

/// Preprocessor defines handed to every compiler invocation.
pub fn shared_flags(block_size: u32, sort_chunk_size: u32, fog: bool) -> Vec<String> {
    let mut flags = vec![
        format!("-DBLOCK_SIZE={}", block_size),
        format!("-DSORT_CHUNK_SIZE={}", sort_chunk_size),
    ];
    if fog {
        flags.push("-DDRAW_FOG=1".to_string());
    }
    flags
}

/// Build the generated file and write it to the manifest's output path.
///
/// A stale output is removed first, so a failing run leaves no file behind
/// rather than an outdated one.
pub fn embed_shaders(compiler: &ShaderCompiler<'_>, manifest: &Manifest) -> Result<PathBuf> {
    let output = manifest.resolve(&manifest.embed.output);
    remove_stale(&output)?;

    let contents = render_batch(compiler, manifest)?;
    write_output(&output, &contents)?;
    log::info!(
        "Wrote {} shaders to {}",
        manifest.embed.shaders.len() + manifest.embed.prebuilt.len(),
        output.display()
    );
    Ok(output)
}

pub fn render_batch(compiler: &ShaderCompiler<'_>, manifest: &Manifest) -> Result<String> {
    let flags = shared_flags(manifest.block_size, manifest.sort_chunk_size, manifest.fog);

    let mut contents = String::new();
    contents.push_str(&integer_constant(BLOCK_SIZE_CONSTANT, manifest.block_size));
    contents.push_str(&integer_constant(CHUNK_SIZE_CONSTANT, manifest.sort_chunk_size));

    for entry in &manifest.embed.shaders {
        let name = compiled_name(entry.path())?;
        log::info!("Embedding {} as {}", entry.path().display(), name);

        let mut job_flags = flags.clone();
        job_flags.extend(entry.flags().iter().cloned());
        let job = ShaderJob {
            shader: manifest.resolve(entry.path()),
            name,
            flags: job_flags,
        };
        contents.push_str(&compiler.compile(&job)?.to_string());
    }

    for path in &manifest.embed.prebuilt {
        let name = compiled_name(path)?;
        log::info!("Embedding prebuilt {} as {}", path.display(), name);
        let text = read_source(&manifest.resolve(path))?;
        contents.push_str(&Declaration::text(name, text).to_string());
    }

    Ok(contents)
}

fn remove_stale(output: &Path) -> Result<()> {
    match std::fs::remove_file(output) {
        Ok(()) => {
            log::debug!("Removed stale {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::write(output, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbedConfig, ShaderEntry};
    use crate::tools::runner::fake::FakeRunner;
    use crate::tools::ToolError;
    use std::path::Path;

    /// glslc stand-in whose array holds the shader's file name length,
    /// tagged so tests can tell shaders apart.
    fn tagging_glslc() -> FakeRunner {
        FakeRunner::new().with("glslc", |args| {
            let shader = Path::new(&args[0]).file_name()?.to_string_lossy().into_owned();
            Some(format!("{{0x{:x}}}\n", shader.len()))
        })
    }

    fn manifest(dir: &Path, shaders: &[&str], prebuilt: &[&str]) -> Manifest {
        Manifest {
            shader_dir: dir.to_path_buf(),
            embed: EmbedConfig {
                output: PathBuf::from("embedded_shaders.js"),
                shaders: shaders.iter().map(|s| ShaderEntry::Path(s.into())).collect(),
                prebuilt: prebuilt.iter().map(PathBuf::from).collect(),
            },
            ..Manifest::default()
        }
    }

    #[test]
    fn output_has_header_then_shaders_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.wgsl"), "fn f() {}\n").unwrap();
        let runner = tagging_glslc();
        let compiler = ShaderCompiler::new(&runner, "glslc");
        let m = manifest(dir.path(), &["b.comp", "a.vert", "prefix_sum.comp"], &["extra.wgsl"]);

        let output = embed_shaders(&compiler, &m).unwrap();
        let text = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            text,
            "const ScanBlockSize = 512;\n\
             const SortChunkSize = 64;\n\
             const b_comp_spv = new Uint32Array([0x6]);\n\
             const a_vert_spv = new Uint32Array([0x6]);\n\
             const prefix_sum_comp_spv = new Uint32Array([0xf]);\n\
             const extra_wgsl_spv = `fn f() {}\n`;\n"
        );
    }

    #[test]
    fn translator_batch_embeds_text_in_order() {
        use crate::embed::Translator;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.wgsl"), "fn extra() {}\n").unwrap();

        // glslc writes the shader's file name as its "SPIR-V",
        // naga turns that into a distinct WGSL body
        let runner = FakeRunner::new()
            .with("glslc", |args| {
                let shader = Path::new(&args[0]).file_name()?.to_string_lossy().into_owned();
                Some(shader)
            })
            .with("naga", |args| {
                let shader = std::fs::read_to_string(&args[0]).ok()?;
                Some(format!("// {}\nfn main() {{}}\n", shader))
            });
        let compiler = ShaderCompiler::new(&runner, "glslc").with_translator(Translator {
            path: PathBuf::from("naga"),
            args: vec!["{input}".to_string(), "{output}".to_string()],
        });
        let m = manifest(dir.path(), &["a.comp", "b.vert"], &["extra.wgsl"]);

        let output = embed_shaders(&compiler, &m).unwrap();
        let text = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            text,
            "const ScanBlockSize = 512;\n\
             const SortChunkSize = 64;\n\
             const a_comp_spv = `// a.comp\nfn main() {}\n`;\n\
             const b_vert_spv = `// b.vert\nfn main() {}\n`;\n\
             const extra_wgsl_spv = `fn extra() {}\n`;\n"
        );

        let calls = runner.calls();
        let tools: Vec<_> = calls.iter().map(|(tool, _)| tool.to_string_lossy().into_owned()).collect();
        assert_eq!(tools, ["glslc", "naga", "glslc", "naga"]);
        assert!(!calls[0].1.iter().any(|a| a == "-mfmt=c"));
    }

    #[test]
    fn shared_flags_reach_every_compile() {
        let dir = tempfile::tempdir().unwrap();
        let runner = tagging_glslc();
        let compiler = ShaderCompiler::new(&runner, "glslc");
        let mut m = manifest(dir.path(), &["a.comp"], &[]);
        m.embed.shaders.push(ShaderEntry::Detailed {
            path: "b.comp".into(),
            flags: vec!["-O".to_string()],
        });
        m.block_size = 256;
        m.sort_chunk_size = 32;
        m.fog = true;

        render_batch(&compiler, &m).unwrap();
        let calls = runner.calls();
        assert_eq!(
            &calls[0].1[4..],
            ["-DBLOCK_SIZE=256", "-DSORT_CHUNK_SIZE=32", "-DDRAW_FOG=1"]
        );
        assert_eq!(
            &calls[1].1[4..],
            ["-DBLOCK_SIZE=256", "-DSORT_CHUNK_SIZE=32", "-DDRAW_FOG=1", "-O"]
        );
        assert_eq!(calls[1].1[0], dir.path().join("b.comp").to_string_lossy());
    }

    #[test]
    fn fog_flag_absent_by_default() {
        assert_eq!(
            shared_flags(512, 64, false),
            ["-DBLOCK_SIZE=512", "-DSORT_CHUNK_SIZE=64"]
        );
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let runner = tagging_glslc();
        let compiler = ShaderCompiler::new(&runner, "glslc");
        let m = manifest(dir.path(), &["x.comp", "y.frag"], &[]);

        let first = std::fs::read(embed_shaders(&compiler, &m).unwrap()).unwrap();
        let second = std::fs::read(embed_shaders(&compiler, &m).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_compile_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("embedded_shaders.js");
        std::fs::write(&out, "stale").unwrap();

        let runner = FakeRunner::new().with("glslc", |args| {
            if args[0].ends_with("bad.comp") {
                None
            } else {
                Some("{1}\n".to_string())
            }
        });
        let compiler = ShaderCompiler::new(&runner, "glslc");
        let m = manifest(dir.path(), &["ok.comp", "bad.comp", "never.comp"], &[]);

        let err = embed_shaders(&compiler, &m).unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Failed { .. })));
        assert!(!out.exists());
        // no compile after the failing one
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn missing_prebuilt_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let runner = tagging_glslc();
        let compiler = ShaderCompiler::new(&runner, "glslc");
        let m = manifest(dir.path(), &["a.comp"], &["missing.wgsl"]);

        let err = embed_shaders(&compiler, &m).unwrap_err();
        assert!(err.is_not_found());
        assert!(!dir.path().join("embedded_shaders.js").exists());
    }
}
