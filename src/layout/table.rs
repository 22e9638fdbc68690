use crate::foundation::{
    core::{Canvas, PixelRect},
    error::{PhotostripError, PhotostripResult},
};

/// One of the fixed photo-strip arrangements.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Layout {
    #[default]
    #[serde(rename = "2pose")]
    TwoPose,
    #[serde(rename = "3pose")]
    ThreePose,
    #[serde(rename = "4pose")]
    FourPose,
    #[serde(rename = "6pose")]
    SixPose,
}

/// A row of the published layout table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutSpec {
    pub layout: Layout,
    pub name: &'static str,
    pub count: usize,
    pub cols: u32,
    pub rows: u32,
}

/// The layout table shared between UI and core. Adding a layout means adding a row here.
pub const LAYOUTS: [LayoutSpec; 4] = [
    LayoutSpec {
        layout: Layout::TwoPose,
        name: "2pose",
        count: 2,
        cols: 1,
        rows: 2,
    },
    LayoutSpec {
        layout: Layout::ThreePose,
        name: "3pose",
        count: 3,
        cols: 1,
        rows: 3,
    },
    LayoutSpec {
        layout: Layout::FourPose,
        name: "4pose",
        count: 4,
        cols: 2,
        rows: 2,
    },
    LayoutSpec {
        layout: Layout::SixPose,
        name: "6pose",
        count: 6,
        cols: 2,
        rows: 3,
    },
];

impl Layout {
    pub fn all() -> impl Iterator<Item = Layout> {
        LAYOUTS.iter().map(|s| s.layout)
    }

    pub fn spec(self) -> &'static LayoutSpec {
        match self {
            Layout::TwoPose => &LAYOUTS[0],
            Layout::ThreePose => &LAYOUTS[1],
            Layout::FourPose => &LAYOUTS[2],
            Layout::SixPose => &LAYOUTS[3],
        }
    }

    pub fn from_name(name: &str) -> PhotostripResult<Self> {
        let name = name.trim();
        LAYOUTS
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| s.layout)
            .ok_or_else(|| {
                PhotostripError::validation(format!(
                    "unknown layout \"{name}\" (expected one of 2pose, 3pose, 4pose, 6pose)"
                ))
            })
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Number of photos required before the strip can be composed.
    pub fn count(self) -> usize {
        self.spec().count
    }

    pub fn grid(self) -> (u32, u32) {
        let s = self.spec();
        (s.cols, s.rows)
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Layout {
    type Err = PhotostripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Largest canvas edge any layout may produce.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Fixed pixel geometry of a frame graphic and the strip grid around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameGeometry {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Photo window carved out of the frame, relative to the frame's top-left corner.
    pub window_x: u32,
    pub window_y: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub margin: u32,
    pub gap: u32,
    /// Vertical space reserved below the grid for the caption.
    pub caption_band: u32,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            frame_width: 700,
            frame_height: 540,
            window_x: 30,
            window_y: 90,
            window_width: 640,
            window_height: 360,
            margin: 40,
            gap: 20,
            caption_band: 80,
        }
    }
}

impl FrameGeometry {
    pub fn validate(&self) -> PhotostripResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(PhotostripError::validation(
                "frame width and height must be > 0",
            ));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(PhotostripError::validation(
                "photo window width and height must be > 0",
            ));
        }
        let fits = |offset: u32, len: u32, outer: u32| {
            offset.checked_add(len).is_some_and(|end| end <= outer)
        };
        if !fits(self.window_x, self.window_width, self.frame_width)
            || !fits(self.window_y, self.window_height, self.frame_height)
        {
            return Err(PhotostripError::validation(
                "photo window must lie inside the frame",
            ));
        }
        for layout in Layout::all() {
            let canvas = self.checked_canvas_for(layout).filter(|c| {
                c.width <= MAX_CANVAS_SIDE && c.height <= MAX_CANVAS_SIDE
            });
            if canvas.is_none() {
                return Err(PhotostripError::validation(format!(
                    "{layout} canvas would exceed {MAX_CANVAS_SIDE}x{MAX_CANVAS_SIDE} px"
                )));
            }
        }
        Ok(())
    }

    fn checked_canvas_for(&self, layout: Layout) -> Option<Canvas> {
        let (cols, rows) = layout.grid();
        let span = |n: u32, cell: u32| {
            n.checked_mul(cell)?
                .checked_add((n - 1).checked_mul(self.gap)?)?
                .checked_add(self.margin.checked_mul(2)?)
        };
        Some(Canvas {
            width: span(cols, self.frame_width)?,
            height: span(rows, self.frame_height)?.checked_add(self.caption_band)?,
        })
    }

    pub fn frame_size(&self) -> Canvas {
        Canvas {
            width: self.frame_width,
            height: self.frame_height,
        }
    }

    /// `cols*Fw + (cols-1)*G + 2*M` by `rows*Fh + (rows-1)*G + 2*M + band`.
    ///
    /// Exact for validated geometry; saturates at `u32::MAX` otherwise.
    pub fn canvas_for(&self, layout: Layout) -> Canvas {
        self.checked_canvas_for(layout).unwrap_or(Canvas {
            width: u32::MAX,
            height: u32::MAX,
        })
    }

    /// Frame-cell rectangle for the photo at `index` (row-major fill).
    pub fn cell_rect(&self, layout: Layout, index: usize) -> PixelRect {
        let (cols, _) = layout.grid();
        let col = (index as u32) % cols;
        let row = (index as u32) / cols;
        PixelRect::new(
            i64::from(self.margin + col * (self.frame_width + self.gap)),
            i64::from(self.margin + row * (self.frame_height + self.gap)),
            self.frame_width,
            self.frame_height,
        )
    }

    pub fn window_rect(&self, layout: Layout, index: usize) -> PixelRect {
        let cell = self.cell_rect(layout, index);
        PixelRect::new(
            cell.x + i64::from(self.window_x),
            cell.y + i64::from(self.window_y),
            self.window_width,
            self.window_height,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/table.rs"]
mod tests;
