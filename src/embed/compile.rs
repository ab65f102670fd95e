// Single-shader wrapper
//
// glslc -> (optional translator) -> read intermediate -> one declaration.
// Intermediates live in a Scratch directory and are gone by the time
// compile() returns, whether it succeeded or not.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::declaration::{strip_array_framing, Declaration};
use crate::error::{Error, Result};
use crate::tools::{Scratch, ToolRunner};

/// Placeholders in the translator argument template.
const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// One shader to compile into one named constant.
#[derive(Debug, Clone)]
pub struct ShaderJob {
    pub shader: PathBuf,
    pub name: String,
    /// Extra compiler flags, appended after the output arguments
    pub flags: Vec<String>,
}

/// SPIR-V to WGSL translator and how to call it.
#[derive(Debug, Clone)]
pub struct Translator {
    pub path: PathBuf,
    pub args: Vec<String>,
}

impl Translator {
    fn args_for(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
                    .into()
            })
            .collect()
    }
}

pub struct ShaderCompiler<'a> {
    runner: &'a dyn ToolRunner,
    compiler: PathBuf,
    translator: Option<Translator>,
}

impl<'a> ShaderCompiler<'a> {
    /// Array mode: the compiler's C-array output becomes a Uint32Array.
    pub fn new(runner: &'a dyn ToolRunner, compiler: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            compiler: compiler.into(),
            translator: None,
        }
    }

    /// Text mode: SPIR-V is translated and embedded as a template string.
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn compile(&self, job: &ShaderJob) -> Result<Declaration> {
        let scratch = Scratch::new()?;
        let decl = match &self.translator {
            None => self.compile_array(job, &scratch)?,
            Some(translator) => self.compile_text(job, translator, &scratch)?,
        };
        scratch.close()?;
        Ok(decl)
    }

    fn compile_array(&self, job: &ShaderJob, scratch: &Scratch) -> Result<Declaration> {
        let spirv = scratch.spirv_path();
        let mut args: Vec<OsString> = vec![
            job.shader.clone().into(),
            "-mfmt=c".into(),
            "-o".into(),
            spirv.clone().into(),
        ];
        args.extend(job.flags.iter().map(OsString::from));
        self.runner.run(&self.compiler, &args)?;

        let raw = std::fs::read_to_string(&spirv).map_err(|e| Error::read(&spirv, e))?;
        let words = strip_array_framing(&raw, &spirv)?;
        Ok(Declaration::array(job.name.clone(), words))
    }

    fn compile_text(
        &self,
        job: &ShaderJob,
        translator: &Translator,
        scratch: &Scratch,
    ) -> Result<Declaration> {
        let spirv = scratch.spirv_path();
        let wgsl = scratch.wgsl_path();

        let mut args: Vec<OsString> =
            vec![job.shader.clone().into(), "-o".into(), spirv.clone().into()];
        args.extend(job.flags.iter().map(OsString::from));
        self.runner.run(&self.compiler, &args)?;

        self.runner
            .run(&translator.path, &translator.args_for(&spirv, &wgsl))?;

        let text = std::fs::read_to_string(&wgsl).map_err(|e| Error::read(&wgsl, e))?;
        Ok(Declaration::text(job.name.clone(), text))
    }
}
