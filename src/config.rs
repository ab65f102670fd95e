// =============================================================================
// SHADER MANIFEST - Load the embedding manifest from embed.toml
// =============================================================================
//
// This module handles loading and parsing the shader manifest.
// Provides the stock shader lists as defaults if the file is missing.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST: &str = "embed.toml";

/// Root manifest structure
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Base directory for every relative path below
    pub shader_dir: PathBuf,
    pub block_size: u32,
    pub sort_chunk_size: u32,
    /// Compile the fog-rendering variant (-DDRAW_FOG=1)
    pub fog: bool,
    pub embed: EmbedConfig,
    pub wgsl: WgslConfig,
    pub tools: ToolsConfig,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("."),
            block_size: 512,
            sort_chunk_size: 64,
            fog: false,
            embed: EmbedConfig::default(),
            wgsl: WgslConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Shaders compiled by the batch embedder
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub output: PathBuf,
    pub shaders: Vec<ShaderEntry>,
    /// Already-translated text, embedded after the compiled shaders
    pub prebuilt: Vec<PathBuf>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("embedded_shaders.js"),
            shaders: [
                "prefix_sum.comp",
                "block_prefix_sum.comp",
                "add_block_sums.comp",
                "stream_compact.comp",
                "compute_initial_rays.vert",
                "compute_initial_rays.frag",
                "zfp_compute_block_range.comp",
                "zfp_decompress_block.comp",
                "lru_cache_init.comp",
                "lru_cache_mark_new_items.comp",
                "lru_cache_update.comp",
                "lru_copy_available_slot_age.comp",
                "lru_cache_age_slots.comp",
                "lru_cache_extract_slot_available.comp",
                "macro_traverse.comp",
                "radix_sort_chunk.comp",
                "reverse_buffer.comp",
                "merge_sorted_chunks.comp",
            ]
            .into_iter()
            .map(|s| ShaderEntry::Path(PathBuf::from(s)))
            .collect(),
            prebuilt: Vec::new(),
        }
    }
}

/// A manifest shader: either a bare path or a table with extra flags
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ShaderEntry {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        flags: Vec<String>,
    },
}

impl ShaderEntry {
    pub fn path(&self) -> &Path {
        match self {
            ShaderEntry::Path(path) | ShaderEntry::Detailed { path, .. } => path,
        }
    }

    pub fn flags(&self) -> &[String] {
        match self {
            ShaderEntry::Path(_) => &[],
            ShaderEntry::Detailed { flags, .. } => flags,
        }
    }
}

/// Hand-written WGSL embedded without any compiler
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WgslConfig {
    pub output: PathBuf,
    pub util: PathBuf,
    pub include_marker: String,
    pub shaders: Vec<PathBuf>,
}

impl Default for WgslConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("../js/wgsl.js"),
            util: PathBuf::from("util.wgsl"),
            include_marker: "//include util.wgsl".to_string(),
            shaders: [
                "add_block_sums.wgsl",
                "block_prefix_sum.wgsl",
                "combine_block_information.wgsl",
                "compute_initial_rays_frag.wgsl",
                "compute_initial_rays_vert.wgsl",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

/// External tool settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Translator arguments; {input} and {output} are substituted
    pub translator_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            translator_args: vec!["{input}".to_string(), "{output}".to_string()],
        }
    }
}

impl Manifest {
    /// Load the manifest, falling back to defaults if the file does not exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::warn!("Manifest not found at {:?}, using built-in shader lists", path);
            return Ok(Manifest::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;

        let manifest = Self::parse(&content)
            .with_context(|| format!("Failed to parse manifest: {:?}", path))?;

        log::info!("Loaded manifest from {:?}", path);
        log::debug!("Manifest: {:?}", manifest);

        Ok(manifest)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            bail!("block_size must be non-zero");
        }
        if self.sort_chunk_size == 0 {
            bail!("sort_chunk_size must be non-zero");
        }
        Ok(())
    }

    /// Resolve a manifest path against shader_dir
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.shader_dir.join(path)
    }
}
