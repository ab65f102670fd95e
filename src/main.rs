// =============================================================================
// SHADER EMBEDDER - Compile shaders and embed them in generated source
// =============================================================================
//
// Build-time utility for a WebGPU renderer. Shaders are compiled with glslc
// (optionally translated to WGSL) and written out as constant declarations
// the renderer loads directly.
//
// ENTRY POINTS:
// ┌─────────────────────────────────────────────────────────────────┐
// │  compile     one shader -> Uint32Array declaration on stdout    │
// │  translate   one shader -> WGSL template string on stdout       │
// │  embed       manifest shaders -> embedded_shaders.js            │
// │  embed-wgsl  hand-written WGSL -> wgsl.js                       │
// └─────────────────────────────────────────────────────────────────┘
//
// Everything runs sequentially. Each tool call blocks until the tool exits.
//
// =============================================================================

mod config;
mod embed;
mod error;
mod tools;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{Manifest, DEFAULT_MANIFEST};
use embed::{ShaderCompiler, ShaderJob, Translator};
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::PathBuf;
use tools::ProcessRunner;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Shader manifest (built-in lists are used if it does not exist)
    #[arg(long, global = true, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Override the manifest's shader directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile one shader and print it as a Uint32Array constant
    Compile {
        compiler: PathBuf,
        shader: PathBuf,
        name: String,
        /// Extra compiler flags
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Compile one shader, translate it to WGSL and print it as a string constant
    Translate {
        compiler: PathBuf,
        translator: PathBuf,
        shader: PathBuf,
        name: String,
        /// Extra compiler flags
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Compile every manifest shader into one generated file
    Embed {
        compiler: PathBuf,
        /// Translate to WGSL and embed text instead of SPIR-V words
        translator: Option<PathBuf>,
        /// Build the fog-rendering variant
        #[arg(long)]
        fog: bool,
        #[arg(long)]
        block_size: Option<u32>,
        #[arg(long)]
        chunk_size: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Embed pre-translated WGSL files without running any tool
    EmbedWgsl {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    init_logging(cli.verbose);
    run(cli)
}

/// Initialize logging. Logs go to stderr; stdout carries generated code.
fn init_logging(verbose: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.init();
}

const SUBCOMMANDS: [&str; 4] = ["compile", "translate", "embed", "embed-wgsl"];

/// The fog switch has always been spelled `-fog`; clap wants `--fog`.
/// Only `embed` arguments are rewritten, compiler flags pass through untouched.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut subcommand: Option<OsString> = None;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i > 0 && subcommand.is_none() && SUBCOMMANDS.iter().any(|s| arg == *s) {
                subcommand = Some(arg.clone());
                arg
            } else if arg == "-fog" && subcommand.as_deref() == Some(OsStr::new("embed")) {
                "--fog".into()
            } else {
                arg
            }
        })
        .collect()
}

fn run(cli: Cli) -> Result<()> {
    let runner = ProcessRunner;

    match cli.command {
        Command::Compile {
            compiler,
            shader,
            name,
            flags,
        } => {
            let job = ShaderJob {
                shader,
                name,
                flags,
            };
            let decl = ShaderCompiler::new(&runner, compiler)
                .compile(&job)
                .with_context(|| format!("Failed to compile {:?}", job.shader))?;
            print_declaration(&decl.to_string())
        }

        Command::Translate {
            compiler,
            translator,
            shader,
            name,
            flags,
        } => {
            let manifest = load_manifest(&cli.manifest, cli.dir)?;
            let job = ShaderJob {
                shader,
                name,
                flags,
            };
            let decl = ShaderCompiler::new(&runner, compiler)
                .with_translator(Translator {
                    path: translator,
                    args: manifest.tools.translator_args,
                })
                .compile(&job)
                .with_context(|| format!("Failed to compile {:?}", job.shader))?;
            print_declaration(&decl.to_string())
        }

        Command::Embed {
            compiler,
            translator,
            fog,
            block_size,
            chunk_size,
            output,
        } => {
            let mut manifest = load_manifest(&cli.manifest, cli.dir)?;
            let overrides = EmbedOverrides {
                fog,
                block_size,
                chunk_size,
                output,
            };
            overrides.apply(&mut manifest)?;

            let mut compiler = ShaderCompiler::new(&runner, compiler);
            if let Some(path) = translator {
                compiler = compiler.with_translator(Translator {
                    path,
                    args: manifest.tools.translator_args.clone(),
                });
            }
            embed::embed_shaders(&compiler, &manifest)
                .map_err(|e| hint_missing(e, &manifest))
                .context("Shader embedding failed")?;
            Ok(())
        }

        Command::EmbedWgsl { output } => {
            let mut manifest = load_manifest(&cli.manifest, cli.dir)?;
            if let Some(output) = output {
                manifest.wgsl.output = from_current_dir(output)?;
            }
            embed::embed_wgsl(&manifest)
                .map_err(|e| hint_missing(e, &manifest))
                .context("WGSL embedding failed")?;
            Ok(())
        }
    }
}

fn load_manifest(path: &std::path::Path, dir: Option<PathBuf>) -> Result<Manifest> {
    let mut manifest = Manifest::load_from_path(path)?;
    if let Some(dir) = dir {
        manifest.shader_dir = dir;
    }
    Ok(manifest)
}

/// Command-line settings layered over the manifest for `embed`.
struct EmbedOverrides {
    fog: bool,
    block_size: Option<u32>,
    chunk_size: Option<u32>,
    output: Option<PathBuf>,
}

impl EmbedOverrides {
    fn apply(self, manifest: &mut Manifest) -> Result<()> {
        manifest.fog |= self.fog;
        if let Some(size) = self.block_size {
            manifest.block_size = size;
        }
        if let Some(size) = self.chunk_size {
            manifest.sort_chunk_size = size;
        }
        if let Some(output) = self.output {
            manifest.embed.output = from_current_dir(output)?;
        }
        manifest.validate()
    }
}

/// `--output` is relative to where the tool runs, not to shader_dir.
fn from_current_dir(path: PathBuf) -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(path))
}

fn hint_missing(err: error::Error, manifest: &Manifest) -> error::Error {
    if err.is_not_found() {
        log::error!(
            "Input missing under {:?}; pass --dir to point at the shader directory",
            manifest.shader_dir
        );
    }
    err
}

fn print_declaration(decl: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(decl.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
