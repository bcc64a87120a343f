use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    assets::decode::load_image,
    compose::plan::TextStyle,
    foundation::{
        core::Size,
        error::{CollageError, CollageResult},
    },
    overlay::command::OverlayCommand,
    session::editor::EditorSession,
};

/// A recorded editing session: the base image, the viewport it was shown in and the gestures
/// applied to it, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    /// Base image path, relative to the project file.
    pub image: String,
    /// Display viewport size in points.
    pub viewport: Size,
    /// Text style for preview and export.
    #[serde(default)]
    pub style: TextStyle,
    /// Commands replayed after the image is loaded.
    #[serde(default)]
    pub commands: Vec<OverlayCommand>,
}

impl Project {
    /// Check the image path, viewport and style.
    pub fn validate(&self) -> CollageResult<()> {
        normalize_rel_path(&self.image)?;
        let Size { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CollageError::invalid_argument(
                "viewport width/height must be finite and > 0",
            ));
        }
        self.style.validate()
    }

    /// Load the base image relative to `root` and replay every command into a new session.
    ///
    /// Replay stops at the first failing command.
    pub fn open_session(&self, root: &Path) -> CollageResult<EditorSession> {
        self.validate()?;
        let image_path = root.join(normalize_rel_path(&self.image)?);
        let base = load_image(&image_path)?;

        let mut session = EditorSession::new(self.style);
        session.load_image(base, self.viewport)?;
        for (i, cmd) in self.commands.iter().enumerate() {
            session
                .apply(cmd)
                .map_err(|e| anyhow::Error::new(e).context(format!("replay command {i}")))?;
        }
        tracing::debug!(
            commands = self.commands.len(),
            overlays = session.overlays().len(),
            "project replayed"
        );
        Ok(session)
    }
}

/// Read and validate a project JSON file.
pub fn load_project(path: impl AsRef<Path>) -> CollageResult<Project> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let project: Project = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse project JSON '{}'", path.display()))?;
    project.validate()?;
    Ok(project)
}

fn normalize_rel_path(source: &str) -> CollageResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(CollageError::invalid_argument("image path must be non-empty"));
    }
    if s.starts_with('/') {
        return Err(CollageError::invalid_argument("image path must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CollageError::invalid_argument(
                "image path must not contain '..'",
            ));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(CollageError::invalid_argument(
            "image path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;
