// Constant declarations in the generated source file
//
// Two literal shapes are emitted, and the consuming renderer depends on
// them byte for byte:
//
//   const NAME = new Uint32Array([BODY]);     (compiled SPIR-V words)
//   const NAME = `TEXT`;                      (WGSL text)
//
// Every rendered declaration ends with exactly one newline.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Suffix marking a constant that holds compiler output.
const COMPILED_SUFFIX: &str = "spv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Comma separated words, already stripped of the compiler's braces
    U32Array(String),
    /// Verbatim shader text
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub literal: Literal,
}

impl Declaration {
    pub fn array(name: impl Into<String>, words: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            literal: Literal::U32Array(words.into()),
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            literal: Literal::Text(text.into()),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Literal::U32Array(words) => {
                writeln!(f, "const {} = new Uint32Array([{}]);", self.name, words)
            }
            Literal::Text(text) => writeln!(f, "const {} = `{}`;", self.name, text),
        }
    }
}

/// Integer constant placed ahead of the shaders, e.g. `const ScanBlockSize = 512;`.
pub fn integer_constant(name: &str, value: u32) -> String {
    format!("const {} = {};\n", name, value)
}

/// Strip the C-array framing from `glslc -mfmt=c` output.
///
/// Exactly the first character and the last two characters are removed
/// (the opening brace, and the closing brace plus trailing newline).
/// Nothing else in between is touched.
pub fn strip_array_framing<'a>(raw: &'a str, path: &Path) -> Result<&'a str> {
    let mut chars = raw.char_indices();
    let start = match chars.next() {
        Some((_, c)) => c.len_utf8(),
        None => return Err(malformed(path)),
    };
    let mut tail = raw.char_indices().rev();
    let end = match (tail.next(), tail.next()) {
        (Some(_), Some((i, _))) => i,
        _ => return Err(malformed(path)),
    };
    if end < start {
        return Err(malformed(path));
    }
    Ok(&raw[start..end])
}

fn malformed(path: &Path) -> Error {
    Error::MalformedArtifact {
        path: path.to_path_buf(),
    }
}

/// `prefix_sum.comp` -> `prefix_sum_comp_spv`
pub fn compiled_name(shader: &Path) -> Result<String> {
    let stem = shader
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidName(shader.to_path_buf()))?;
    let ext = shader
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    Ok(format!("{}_{}_{}", stem, ext, COMPILED_SUFFIX))
}

/// `add_block_sums.wgsl` -> `add_block_sums`
pub fn text_name(shader: &Path) -> Result<String> {
    shader
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidName(shader.to_path_buf()))
}
