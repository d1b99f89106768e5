//! Scoped, single-use photo picker.
//!
//! A picker surface is attached, triggered once and detached. Detaching
//! happens in [`PickerSession`]'s `Drop`, so it runs whether the user picked
//! files, cancelled, or the surface failed.

use crate::media::UploadedFile;
use crate::media::detection::detect_media_type;
use std::path::PathBuf;
use tracing::debug;

/// How one trigger of a picker surface ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(Vec<UploadedFile>),
    Cancelled,
    Failed(String),
}

/// A selection dialog that must be attached before use and detached after.
pub trait PickerSurface {
    fn attach(&mut self) -> Result<(), String>;

    fn trigger(&mut self) -> PickerOutcome;

    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

/// Guard over an attached surface. Consumed by [`PickerSession::run`].
pub struct PickerSession<'a> {
    surface: &'a mut dyn PickerSurface,
}

impl<'a> PickerSession<'a> {
    /// Attach `surface`. On failure the guard is already armed, so the
    /// surface is detached before the error is returned.
    pub fn open(surface: &'a mut dyn PickerSurface) -> Result<Self, String> {
        let mut session = Self { surface };
        session.surface.attach()?;
        Ok(session)
    }

    pub fn run(mut self) -> PickerOutcome {
        self.surface.trigger()
    }
}

impl Drop for PickerSession<'_> {
    fn drop(&mut self) {
        self.surface.detach();
        debug!("picker detached");
    }
}

/// Open a session on `surface`, trigger it once and release it.
pub fn pick_once(surface: &mut dyn PickerSurface) -> PickerOutcome {
    match PickerSession::open(surface) {
        Ok(session) => session.run(),
        Err(reason) => PickerOutcome::Failed(reason),
    }
}

/// Picker backed by a list of paths on disk, used by the CLI.
#[derive(Debug, Default)]
pub struct PathPicker {
    paths: Vec<PathBuf>,
    attached: bool,
}

impl PathPicker {
    #[must_use]
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            attached: false,
        }
    }
}

impl PickerSurface for PathPicker {
    fn attach(&mut self) -> Result<(), String> {
        if self.attached {
            return Err("picker already attached".into());
        }
        self.attached = true;
        Ok(())
    }

    fn trigger(&mut self) -> PickerOutcome {
        if self.paths.is_empty() {
            return PickerOutcome::Cancelled;
        }

        let mut files = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(e) => return PickerOutcome::Failed(format!("{}: {e}", path.display())),
            };
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let (mime_type, _) = detect_media_type(&data, Some(&name));
            files.push(UploadedFile::from_bytes(name, mime_type, data));
        }
        PickerOutcome::Selected(files)
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Surface that replays a fixed outcome and records its lifecycle.
    pub struct ScriptedSurface {
        pub outcome: PickerOutcome,
        pub fail_attach: bool,
        pub attached: bool,
        pub attach_calls: usize,
        pub detach_calls: usize,
        pub attached_during_trigger: bool,
    }

    impl ScriptedSurface {
        pub fn new(outcome: PickerOutcome) -> Self {
            Self {
                outcome,
                fail_attach: false,
                attached: false,
                attach_calls: 0,
                detach_calls: 0,
                attached_during_trigger: false,
            }
        }
    }

    impl PickerSurface for ScriptedSurface {
        fn attach(&mut self) -> Result<(), String> {
            self.attach_calls += 1;
            if self.fail_attach {
                return Err("surface unavailable".into());
            }
            self.attached = true;
            Ok(())
        }

        fn trigger(&mut self) -> PickerOutcome {
            self.attached_during_trigger = self.attached;
            self.outcome.clone()
        }

        fn detach(&mut self) {
            self.detach_calls += 1;
            self.attached = false;
        }

        fn is_attached(&self) -> bool {
            self.attached
        }
    }
}
