//! Template installer

use std::io::Read;

use crate::error::{Result, fs as fs_error};
use crate::manifest::File;
use crate::record::InstallFile;
use crate::template::{RenderContext, Renderer};

use super::{InstallContext, Installer, file_ops};

/// Renders `src` against the package context and writes the output to
/// `dest` the same way a plain file is written
#[derive(Debug, Clone, Default)]
pub struct TemplateInstaller {
    renderer: Renderer,
}

impl TemplateInstaller {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Installer for TemplateInstaller {
    fn install(&self, file: &File, context: &InstallContext<'_>) -> Result<Vec<InstallFile>> {
        let src = context.src_path(file);
        let mut source = String::new();
        file_ops::open_source(&src)?
            .read_to_string(&mut source)
            .map_err(|e| fs_error::read_failed(&src, e))?;

        let render_context = RenderContext::new(
            context.name,
            context.version,
            context.dest_root,
            context.values,
        );
        let rendered = self.renderer.render(&file.src, &source, &render_context)?;

        let installed =
            file_ops::materialize(file, context.dest_path(file), &mut rendered.as_bytes())?;
        Ok(vec![installed])
    }
}
