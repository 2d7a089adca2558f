mod frame;
mod heatmap;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use heatmap::{
    DurationColormap, DurationRange, HeatmapStyle, build_heatmap_frame, heatmap_canvas,
    heatmap_file_name, heatmap_title, render_heatmap,
};
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive, TextVAlign,
};

use crate::error::JatosResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code never
/// sees trial data.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> JatosResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
