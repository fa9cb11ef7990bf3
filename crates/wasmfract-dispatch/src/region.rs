//! Regions of the complex plane a worker renders.

use serde::{Deserialize, Serialize};

/// One image to render.
///
/// `origin_x`/`origin_y` locate the image in the complex plane and `zoom` is
/// pixels per unit. A Julia region also carries the Mandelbrot-plane point
/// whose Julia set it draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Region {
    Mandel {
        width: u32,
        height: u32,
        origin_x: f64,
        origin_y: f64,
        zoom: f64,
    },
    Julia {
        width: u32,
        height: u32,
        origin_x: f64,
        origin_y: f64,
        mandel_x: f64,
        mandel_y: f64,
        zoom: f64,
    },
}

impl Region {
    #[must_use]
    pub fn mandel(width: u32, height: u32, origin_x: f64, origin_y: f64, zoom: f64) -> Self {
        Self::Mandel {
            width,
            height,
            origin_x,
            origin_y,
            zoom,
        }
    }

    /// The Julia set of `seed` drawn over the same viewport as `self`.
    #[must_use]
    pub fn to_julia(self, mandel_x: f64, mandel_y: f64) -> Self {
        let (width, height) = self.size();
        let (origin_x, origin_y, zoom) = self.viewport();
        Self::Julia {
            width,
            height,
            origin_x,
            origin_y,
            mandel_x,
            mandel_y,
            zoom,
        }
    }

    /// Name reported back in completion messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandel { .. } => "mandel",
            Self::Julia { .. } => "julia",
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        match *self {
            Self::Mandel { width, height, .. } | Self::Julia { width, height, .. } => {
                (width, height)
            }
        }
    }

    fn viewport(&self) -> (f64, f64, f64) {
        match *self {
            Self::Mandel {
                origin_x,
                origin_y,
                zoom,
                ..
            }
            | Self::Julia {
                origin_x,
                origin_y,
                zoom,
                ..
            } => (origin_x, origin_y, zoom),
        }
    }

    /// Entry point that renders this region.
    #[must_use]
    pub fn entry_point(&self) -> &'static str {
        match self {
            Self::Mandel { .. } => "mandel_plot",
            Self::Julia { .. } => "julia_plot",
        }
    }

    /// Arguments for [`Self::entry_point`], in parameter order.
    #[must_use]
    pub fn plot_args(&self, max_iters: u32) -> Vec<f64> {
        match *self {
            Self::Mandel {
                width,
                height,
                origin_x,
                origin_y,
                zoom,
            } => vec![
                f64::from(width),
                f64::from(height),
                origin_x,
                origin_y,
                zoom,
                f64::from(max_iters),
            ],
            Self::Julia {
                width,
                height,
                origin_x,
                origin_y,
                mandel_x,
                mandel_y,
                zoom,
            } => vec![
                f64::from(width),
                f64::from(height),
                origin_x,
                origin_y,
                mandel_x,
                mandel_y,
                zoom,
                f64::from(max_iters),
            ],
        }
    }
}
