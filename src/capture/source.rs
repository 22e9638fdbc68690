use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use crate::foundation::error::{PhotostripError, PhotostripResult};

/// Frame acquisition collaborator: a camera, a folder of stills, or a scripted feed.
pub trait FrameSource {
    fn describe(&self) -> String;

    /// Encoded image bytes of one frame, or `CaptureUnavailable`.
    fn capture(&mut self) -> PhotostripResult<Vec<u8>>;
}

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Serves the image files of one directory in file-name order.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    cycle: bool,
}

impl DirectorySource {
    pub fn open(dir: &Path) -> PhotostripResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PhotostripError::capture_unavailable(format!("read dir '{}': {e}", dir.display()))
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| PhotostripError::capture_unavailable(e.to_string()))?
                .path();
            let is_frame = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && is_frame {
                files.push(path);
            }
        }
        files.sort();
        if files.is_empty() {
            return Err(PhotostripError::capture_unavailable(format!(
                "no image files in '{}'",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            next: 0,
            cycle: false,
        })
    }

    /// Start over from the first file instead of failing once exhausted.
    pub fn cycling(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory '{}'", self.dir.display())
    }

    fn capture(&mut self) -> PhotostripResult<Vec<u8>> {
        if self.next >= self.files.len() {
            if !self.cycle {
                return Err(PhotostripError::capture_unavailable(format!(
                    "{} has no more frames",
                    self.describe()
                )));
            }
            self.next = 0;
        }
        let path = &self.files[self.next];
        self.next += 1;
        std::fs::read(path).map_err(|e| {
            PhotostripError::capture_unavailable(format!("read '{}': {e}", path.display()))
        })
    }
}

#[derive(Clone, Debug)]
pub enum ScriptedFrame {
    Bytes(Vec<u8>),
    Unavailable(String),
}

/// In-memory frame queue; an empty queue reports the camera as unavailable.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<ScriptedFrame>,
    captured: usize,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = ScriptedFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            captured: 0,
        }
    }

    pub fn push_frame(&mut self, bytes: Vec<u8>) {
        self.frames.push_back(ScriptedFrame::Bytes(bytes));
    }

    pub fn push_unavailable(&mut self, reason: impl Into<String>) {
        self.frames.push_back(ScriptedFrame::Unavailable(reason.into()));
    }

    /// Number of successful captures served so far.
    pub fn captured(&self) -> usize {
        self.captured
    }
}

impl FrameSource for ScriptedSource {
    fn describe(&self) -> String {
        "scripted source".to_string()
    }

    fn capture(&mut self) -> PhotostripResult<Vec<u8>> {
        match self.frames.pop_front() {
            Some(ScriptedFrame::Bytes(b)) => {
                self.captured += 1;
                Ok(b)
            }
            Some(ScriptedFrame::Unavailable(reason)) => {
                Err(PhotostripError::capture_unavailable(reason))
            }
            None => Err(PhotostripError::capture_unavailable("camera is not accessible")),
        }
    }
}
