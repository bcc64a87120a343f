use std::path::PathBuf;

use anyhow::Context;

use crate::{
    foundation::error::{CollageError, CollageResult},
    render::backend::FlattenedImage,
};

/// Receiver of a finished export, e.g. a photo-library writer.
///
/// An `Err` is reported to the caller as [`CollageError::ExportFailed`] carrying the error's
/// message. Sinks are never retried by the session.
pub trait ExportSink {
    /// Persist or hand off the flattened image.
    fn save(&mut self, image: &FlattenedImage) -> CollageResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    saved: Vec<FlattenedImage>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Images saved so far, oldest first.
    pub fn saved(&self) -> &[FlattenedImage] {
        &self.saved
    }
}

impl ExportSink for InMemorySink {
    fn save(&mut self, image: &FlattenedImage) -> CollageResult<()> {
        self.saved.push(image.clone());
        Ok(())
    }
}

/// Writes the export as a straight-alpha PNG file.
#[derive(Clone, Debug)]
pub struct PngFileSink {
    path: PathBuf,
    overwrite: bool,
}

impl PngFileSink {
    /// Sink writing to `path`, replacing an existing file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overwrite: true,
        }
    }

    /// Refuse to replace an existing file.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Output path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ExportSink for PngFileSink {
    fn save(&mut self, image: &FlattenedImage) -> CollageResult<()> {
        if !self.overwrite && self.path.exists() {
            return Err(CollageError::export_failed(format!(
                "'{}' already exists",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }

        let rgba = image.to_straight_rgba8();
        image::save_buffer_with_format(
            &self.path,
            &rgba,
            image.width,
            image.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "wrote png");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
