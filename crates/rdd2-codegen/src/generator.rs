//! Batch C code generator
//!
//! Collects named functions and writes them into one source file plus an
//! optional header. Everything is rendered in memory before the first byte
//! is written, so a failing function leaves the destination untouched.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use rdd2_core::sym::Function;

use crate::emitter;
use crate::error::CodegenError;
use crate::options::CodegenOptions;

/// Rendered source and header text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub source: String,
    pub header: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CodeGenerator {
    filename: String,
    stem: String,
    options: CodegenOptions,
    functions: Vec<Function>,
}

impl CodeGenerator {
    /// # Arguments
    /// * `filename` - Bare source file name, `<stem>.c` (or `<stem>.cpp` with `cpp`)
    /// * `options` - Backend options, validated here
    pub fn new(filename: impl Into<String>, options: CodegenOptions) -> Result<Self, CodegenError> {
        options.validate()?;

        let filename = filename.into();
        let suffix = format!(".{}", options.source_extension());
        let stem = match filename.strip_suffix(&suffix) {
            Some(stem) if is_bare_stem(stem) => stem.to_string(),
            _ => return Err(CodegenError::InvalidFilename(filename)),
        };

        Ok(Self {
            filename,
            stem,
            options,
            functions: Vec::new(),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn header_filename(&self) -> String {
        format!("{}.h", self.stem)
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Queue a function; names must be unique within the batch
    pub fn add(&mut self, function: Function) -> Result<(), CodegenError> {
        if self.functions.iter().any(|f| f.name() == function.name()) {
            return Err(CodegenError::DuplicateFunction(function.name().to_string()));
        }
        log::debug!(
            "queued {} ({} instructions)",
            function.name(),
            function.tape().len()
        );
        self.functions.push(function);
        Ok(())
    }

    /// Render the source and, with `with_header`, the header
    pub fn render(&self) -> Result<GeneratedSource, CodegenError> {
        let mut source = String::new();
        writeln!(source, "/* This file was automatically generated by rdd2-codegen */")?;
        writeln!(source)?;
        writeln!(source, "#ifdef __cplusplus")?;
        writeln!(source, "extern \"C\" {{")?;
        writeln!(source, "#endif")?;
        writeln!(source)?;
        if self.options.include_math {
            writeln!(source, "#include <math.h>")?;
            writeln!(source)?;
        }
        emitter::preamble(&mut source, &self.options)?;
        for function in &self.functions {
            emitter::definition(&mut source, function, &self.options)?;
        }
        writeln!(source, "#ifdef __cplusplus")?;
        writeln!(source, "}} /* extern \"C\" */")?;
        writeln!(source, "#endif")?;

        let header = if self.options.with_header {
            Some(self.render_header()?)
        } else {
            None
        };

        Ok(GeneratedSource { source, header })
    }

    fn render_header(&self) -> Result<String, CodegenError> {
        let guard = header_guard(&self.stem);
        let mut header = String::new();
        writeln!(header, "/* This file was automatically generated by rdd2-codegen */")?;
        writeln!(header, "#ifndef {guard}")?;
        writeln!(header, "#define {guard}")?;
        writeln!(header)?;
        writeln!(header, "#ifdef __cplusplus")?;
        writeln!(header, "extern \"C\" {{")?;
        writeln!(header, "#endif")?;
        writeln!(header)?;
        emitter::preamble(&mut header, &self.options)?;
        for function in &self.functions {
            emitter::declarations(&mut header, function, &self.options)?;
        }
        writeln!(header, "#ifdef __cplusplus")?;
        writeln!(header, "}} /* extern \"C\" */")?;
        writeln!(header, "#endif")?;
        writeln!(header)?;
        writeln!(header, "#endif /* {guard} */")?;
        Ok(header)
    }

    /// Render everything, then write it into `dir`
    ///
    /// Each artifact is staged under a hidden temporary name and renamed into
    /// place once every write has succeeded. A failed rename removes the
    /// artifacts this call created. Returns the paths written, source first.
    pub fn generate(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CodegenError> {
        let rendered = self.render()?;

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut files = vec![(self.filename.clone(), rendered.source)];
        if let Some(header) = rendered.header {
            files.push((self.header_filename(), header));
        }

        let mut staged = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let artifact = Artifact {
                staging: dir.join(format!(".{name}.tmp")),
                existed: dir.join(&name).exists(),
                path: dir.join(name),
            };
            if let Err(err) = std::fs::write(&artifact.staging, contents) {
                let _ = std::fs::remove_file(&artifact.staging);
                discard(&staged);
                return Err(err.into());
            }
            staged.push(artifact);
        }

        for (i, artifact) in staged.iter().enumerate() {
            if artifact.existed {
                log::warn!("overwriting {}", artifact.path.display());
            }
            if let Err(err) = std::fs::rename(&artifact.staging, &artifact.path) {
                discard(&staged[i..]);
                for done in staged[..i].iter().filter(|a| !a.existed) {
                    let _ = std::fs::remove_file(&done.path);
                }
                return Err(err.into());
            }
            log::info!("wrote {}", artifact.path.display());
        }

        Ok(staged.into_iter().map(|a| a.path).collect())
    }
}

/// Output file staged next to its destination
struct Artifact {
    staging: PathBuf,
    path: PathBuf,
    existed: bool,
}

fn discard(staged: &[Artifact]) {
    for artifact in staged {
        let _ = std::fs::remove_file(&artifact.staging);
    }
}

/// Non-empty file stem without directory components
fn is_bare_stem(stem: &str) -> bool {
    !stem.is_empty() && !stem.contains(['/', '\\']) && stem != "." && stem != ".."
}

fn header_guard(stem: &str) -> String {
    let body: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("RDD2_{body}_H")
}
