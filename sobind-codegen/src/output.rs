//! Output tree assembly, writing and cleaning.
//!
//! The generator produces the complete artifact set in memory first, then
//! writes it below an output root. Every run regenerates everything; the
//! clean step removes exactly the trees a run creates.

use std::fs;
use std::path::{Path, PathBuf};

use sobind_schema::ir::SchemaIr;
use tracing::{debug, info};

use crate::c::{HeaderGenerator, SourceGenerator};
use crate::error::CodegenError;
use crate::fortran::FortranGenerator;
use crate::r::{ClassGenerator, NamespaceGenerator, NativeGenerator, RegistrationGenerator};

/// One generated artifact, addressed relative to the output root.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Path relative to the output root.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Options controlling artifact assembly.
#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    /// License boilerplate prepended to every artifact, commented per
    /// target language. The text is supplied by the caller; the generator
    /// has no license of its own to impose.
    pub license_header: Option<String>,
}

/// Comment styles for the license boilerplate.
enum CommentStyle {
    C,
    Hash,
    Bang,
}

fn license_comment(text: &str, style: &CommentStyle) -> String {
    let mut out = String::new();
    match style {
        CommentStyle::C => {
            out.push_str("/*");
            for line in text.lines() {
                out.push_str(&format!("\n * {line}"));
            }
            out.push_str("\n */\n\n");
        }
        CommentStyle::Hash => {
            for line in text.lines() {
                out.push_str(&format!("# {line}\n"));
            }
            out.push('\n');
        }
        CommentStyle::Bang => {
            for line in text.lines() {
                out.push_str(&format!("! {line}\n"));
            }
            out.push('\n');
        }
    }
    out
}

/// Generator assembling the complete artifact set for a resolved schema.
pub struct Generator<'a> {
    ir: &'a SchemaIr,
    options: CodegenOptions,
}

impl<'a> Generator<'a> {
    /// Creates a new generator with default options.
    #[must_use]
    pub fn new(ir: &'a SchemaIr) -> Self {
        Self {
            ir,
            options: CodegenOptions::default(),
        }
    }

    /// Creates a new generator with explicit options.
    #[must_use]
    pub fn with_options(ir: &'a SchemaIr, options: CodegenOptions) -> Self {
        Self { ir, options }
    }

    /// Assembles every artifact for the schema.
    ///
    /// # Errors
    /// Returns a [`CodegenError`] when Fortran name shortening fails.
    pub fn generate_files(&self) -> Result<Vec<GeneratedFile>, CodegenError> {
        let mut files = Vec::new();

        for entity in &self.ir.entities {
            debug!(entity = %entity.name, "generating artifacts");
            let ns = &entity.namespace;
            let headers = HeaderGenerator::new(entity);
            files.push(self.file(
                PathBuf::from("gen").join(format!("{}.c", entity.name)),
                SourceGenerator::new(entity).generate(),
                &CommentStyle::C,
            ));
            files.push(self.file(
                PathBuf::from("include").join(ns).join(format!("{}.h", entity.name)),
                headers.generate_public(),
                &CommentStyle::C,
            ));
            files.push(self.file(
                PathBuf::from("include")
                    .join(ns)
                    .join("private")
                    .join(format!("{}.h", entity.name)),
                headers.generate_private(),
                &CommentStyle::C,
            ));
            files.push(self.file(
                PathBuf::from("R/src").join(format!("gen-{}.c", entity.name)),
                NativeGenerator::new(entity).generate(),
                &CommentStyle::C,
            ));
            files.push(self.file(
                PathBuf::from("R/R").join(format!("gen-{}.R", entity.name)),
                ClassGenerator::new(entity).generate(),
                &CommentStyle::Hash,
            ));
        }

        files.push(self.file(
            PathBuf::from("R/src/gen-init.c"),
            RegistrationGenerator::new(self.ir).generate(),
            &CommentStyle::C,
        ));
        files.push(self.file(
            PathBuf::from("R/NAMESPACE"),
            NamespaceGenerator::new(self.ir).generate(),
            &CommentStyle::Hash,
        ));
        files.push(self.file(
            PathBuf::from("fortran/soc.f03"),
            FortranGenerator::new(self.ir).generate()?,
            &CommentStyle::Bang,
        ));

        info!(files = files.len(), "assembled artifact set");
        Ok(files)
    }

    fn file(&self, path: PathBuf, contents: String, style: &CommentStyle) -> GeneratedFile {
        let contents = match &self.options.license_header {
            Some(header) => format!("{}{contents}", license_comment(header, style)),
            None => contents,
        };
        GeneratedFile { path, contents }
    }
}

/// Writes an artifact set below the output root.
///
/// # Errors
/// Returns a [`CodegenError::Io`] on any filesystem error.
pub fn write_files(files: &[GeneratedFile], root: &Path) -> Result<(), CodegenError> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
    }
    info!(root = %root.display(), files = files.len(), "wrote artifact set");
    Ok(())
}

/// Removes every tree a generation run creates below the output root.
///
/// Missing trees are not an error; clean is idempotent.
///
/// # Errors
/// Returns a [`CodegenError::Io`] on any other filesystem error.
pub fn clean(root: &Path) -> Result<(), CodegenError> {
    for dir in ["gen", "include", "R", "fortran"] {
        match fs::remove_dir_all(root.join(dir)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    info!(root = %root.display(), "cleaned output tree");
    Ok(())
}
