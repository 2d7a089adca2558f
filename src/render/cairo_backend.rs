use std::f64::consts::{FRAC_PI_2, PI};
use std::fs::File;
use std::path::Path;

use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use tracing::debug;

use crate::core::Canvas;
use crate::error::{JatosError, JatosResult};
use crate::render::{
    Color, LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
    TextVAlign,
};

/// Primitive counts of the last completed draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
}

/// Renderers that can also paint into a caller-owned Cairo context.
pub trait CairoContextRenderer {
    fn render_on_cairo_context(&mut self, context: &Context, frame: &RenderFrame)
    -> JatosResult<()>;
}

/// Offscreen Cairo/Pango renderer producing PNG heatmaps.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    canvas: Canvas,
    background: Color,
    font_family: String,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(canvas: Canvas) -> JatosResult<Self> {
        if !canvas.is_valid() {
            return Err(JatosError::InvalidArgument(format!(
                "cairo surface needs a non-empty canvas, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        let surface = ImageSurface::create(
            Format::ARgb32,
            surface_dimension(canvas.width)?,
            surface_dimension(canvas.height)?,
        )
        .map_err(|err| cairo_error("create surface", err))?;

        Ok(Self {
            surface,
            canvas,
            background: Color::WHITE,
            font_family: "Sans".to_owned(),
            last_stats: CairoRenderStats::default(),
        })
    }

    /// Pango family used for every label, e.g. `"DejaVu Sans"`.
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Writes the surface as it stands after the last pass.
    pub fn write_png(&self, path: impl AsRef<Path>) -> JatosResult<()> {
        let path = path.as_ref();
        self.surface.flush();
        let mut file = File::create(path).map_err(|err| JatosError::io(path, err))?;
        self.surface.write_to_png(&mut file).map_err(|err| {
            JatosError::InvalidData(format!("failed to encode png `{}`: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "wrote heatmap png");
        Ok(())
    }

    fn draw(&mut self, context: &Context, frame: &RenderFrame) -> JatosResult<()> {
        frame.validate()?;

        set_source(context, self.background);
        context
            .paint()
            .map_err(|err| cairo_error("paint background", err))?;

        // Boxes go under the colorbar outline and all labels.
        for rect in &frame.rects {
            fill_rect(context, rect)?;
        }
        for line in &frame.lines {
            stroke_line(context, line)?;
        }
        let mut font = FontDescription::from_string(&self.font_family);
        for text in &frame.texts {
            show_text(context, &mut font, text);
        }

        self.last_stats = CairoRenderStats {
            lines_drawn: frame.lines.len(),
            rects_drawn: frame.rects.len(),
            texts_drawn: frame.texts.len(),
        };
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> JatosResult<()> {
        if frame.canvas != self.canvas {
            return Err(JatosError::InvalidArgument(format!(
                "frame canvas {}x{} does not match surface {}x{}",
                frame.canvas.width, frame.canvas.height, self.canvas.width, self.canvas.height
            )));
        }
        let context =
            Context::new(&self.surface).map_err(|err| cairo_error("create context", err))?;
        self.draw(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> JatosResult<()> {
        self.draw(context, frame)
    }
}

fn surface_dimension(px: u32) -> JatosResult<i32> {
    i32::try_from(px).map_err(|_| {
        JatosError::InvalidArgument(format!("cairo surface dimension {px} is too large"))
    })
}

fn set_source(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn fill_rect(context: &Context, rect: &RectPrimitive) -> JatosResult<()> {
    rect_path(context, rect);
    set_source(context, rect.fill_color);
    if rect.border_width <= 0.0 {
        return context.fill().map_err(|err| cairo_error("fill rect", err));
    }
    context
        .fill_preserve()
        .map_err(|err| cairo_error("fill rect", err))?;
    set_source(context, rect.border_color);
    context.set_line_width(rect.border_width);
    context
        .stroke()
        .map_err(|err| cairo_error("stroke rect border", err))
}

fn rect_path(context: &Context, rect: &RectPrimitive) {
    let radius = rect
        .corner_radius
        .min(rect.width / 2.0)
        .min(rect.height / 2.0);
    if radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let (left, top) = (rect.x + radius, rect.y + radius);
    let (right, bottom) = (rect.x + rect.width - radius, rect.y + rect.height - radius);
    context.new_sub_path();
    context.arc(right, top, radius, -FRAC_PI_2, 0.0);
    context.arc(right, bottom, radius, 0.0, FRAC_PI_2);
    context.arc(left, bottom, radius, FRAC_PI_2, PI);
    context.arc(left, top, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn stroke_line(context: &Context, line: &LinePrimitive) -> JatosResult<()> {
    set_source(context, line.color);
    context.set_line_width(line.stroke_width);
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    context.stroke().map_err(|err| cairo_error("stroke line", err))
}

fn show_text(context: &Context, font: &mut FontDescription, text: &TextPrimitive) {
    font.set_absolute_size(text.font_size_px * f64::from(pango::SCALE));
    let layout = pangocairo::functions::create_layout(context);
    layout.set_font_description(Some(&*font));
    layout.set_text(&text.text);

    let (width, height) = layout.pixel_size();
    let x = match text.h_align {
        TextHAlign::Left => text.x,
        TextHAlign::Center => text.x - f64::from(width) / 2.0,
        TextHAlign::Right => text.x - f64::from(width),
    };
    let y = match text.v_align {
        TextVAlign::Top => text.y,
        TextVAlign::Middle => text.y - f64::from(height) / 2.0,
    };

    set_source(context, text.color);
    context.move_to(x, y);
    pangocairo::functions::show_layout(context, &layout);
}

fn cairo_error(action: &str, err: cairo::Error) -> JatosError {
    JatosError::InvalidData(format!("cairo failed to {action}: {err}"))
}
