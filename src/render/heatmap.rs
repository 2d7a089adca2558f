use serde::{Deserialize, Serialize};

use crate::api::TrialAnalysis;
use crate::core::Canvas;
use crate::error::{JatosError, JatosResult};
use crate::render::{
    Color, LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
    TextVAlign,
};

/// Visual parameters of a dwell-time heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    /// Colormap stops from shortest to longest dwell time, `#rrggbb`.
    pub colors: Vec<String>,
    /// Distance from a word's y position up to the top of its box.
    pub box_top_offset_px: f64,
    pub box_height_px: f64,
    pub box_corner_radius_px: f64,
    pub word_font_size_px: f64,
    pub title_font_size_px: f64,
    /// Characters of the trial text quoted in the title.
    pub title_preview_chars: usize,
    pub title_band_px: f64,
    pub colorbar_band_px: f64,
    pub colorbar_height_px: f64,
    pub colorbar_steps: usize,
    pub label_font_size_px: f64,
    pub text_color: String,
    /// Font family passed to the drawing backend.
    pub font_family: String,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            colors: ["#ffffff", "#fff3e0", "#ffcc80", "#ff9800", "#f44336", "#b71c1c"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            box_top_offset_px: 20.0,
            box_height_px: 24.0,
            box_corner_radius_px: 0.0,
            word_font_size_px: 12.0,
            title_font_size_px: 15.0,
            title_preview_chars: 40,
            title_band_px: 52.0,
            colorbar_band_px: 56.0,
            colorbar_height_px: 12.0,
            colorbar_steps: 64,
            label_font_size_px: 11.0,
            text_color: "#000000".to_owned(),
            font_family: "Sans".to_owned(),
        }
    }
}

impl HeatmapStyle {
    pub fn validate(&self) -> JatosResult<()> {
        DurationColormap::from_hex_stops(&self.colors)?;
        Color::from_hex(&self.text_color)?;
        for (name, value) in [
            ("box_height_px", self.box_height_px),
            ("word_font_size_px", self.word_font_size_px),
            ("title_font_size_px", self.title_font_size_px),
            ("colorbar_height_px", self.colorbar_height_px),
            ("label_font_size_px", self.label_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(JatosError::Config(format!(
                    "heatmap `{name}` must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("box_top_offset_px", self.box_top_offset_px),
            ("box_corner_radius_px", self.box_corner_radius_px),
            ("title_band_px", self.title_band_px),
            ("colorbar_band_px", self.colorbar_band_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(JatosError::Config(format!(
                    "heatmap `{name}` must be finite and >= 0"
                )));
            }
        }
        if self.font_family.trim().is_empty() {
            return Err(JatosError::Config(
                "heatmap `font_family` must not be empty".to_owned(),
            ));
        }
        if self.colorbar_steps == 0 {
            return Err(JatosError::Config(
                "heatmap `colorbar_steps` must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Piecewise-linear colormap over evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationColormap {
    stops: Vec<Color>,
}

impl DurationColormap {
    pub fn new(stops: Vec<Color>) -> JatosResult<Self> {
        if stops.len() < 2 {
            return Err(JatosError::InvalidArgument(
                "colormap needs at least two stops".to_owned(),
            ));
        }
        for stop in &stops {
            stop.validate()?;
        }
        Ok(Self { stops })
    }

    pub fn from_hex_stops<S: AsRef<str>>(hex_stops: &[S]) -> JatosResult<Self> {
        let stops = hex_stops
            .iter()
            .map(|hex| Color::from_hex(hex.as_ref()))
            .collect::<JatosResult<Vec<_>>>()?;
        Self::new(stops)
    }

    /// Color at `t` in 0..=1; out-of-range values clamp to the end stops.
    #[must_use]
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let segments = self.stops.len() - 1;
        let scaled = t * segments as f64;
        let index = (scaled.floor() as usize).min(segments - 1);
        self.stops[index].lerp(self.stops[index + 1], scaled - index as f64)
    }
}

/// Maps durations onto 0..=1 relative to the trial's own range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationRange {
    pub min: f64,
    pub max: f64,
}

impl DurationRange {
    pub fn from_durations(durations: impl IntoIterator<Item = f64>) -> Option<Self> {
        durations.into_iter().fold(None, |range, value| match range {
            None => Some(Self {
                min: value,
                max: value,
            }),
            Some(range) => Some(Self {
                min: range.min.min(value),
                max: range.max.max(value),
            }),
        })
    }

    /// Normalized position of `value`; a flat range divides by 1 so every word maps to 0.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        let span = if self.max == self.min {
            1.0
        } else {
            self.max - self.min
        };
        (value - self.min) / span
    }
}

/// Two-line title: participant and trial, then a quoted preview of the text.
#[must_use]
pub fn heatmap_title(analysis: &TrialAnalysis, preview_chars: usize) -> (String, String) {
    let heading = format!("{} - Trial {}", analysis.participant_id, analysis.trial_num);
    let preview = if analysis.text_content.chars().count() > preview_chars {
        let head: String = analysis.text_content.chars().take(preview_chars).collect();
        format!("{head}...")
    } else {
        analysis.text_content.clone()
    };
    (heading, format!("\"{preview}\""))
}

/// PNG name keyed by source file, so components of one participant never collide.
///
/// Falls back to the participant id when the analysis has no source file.
#[must_use]
pub fn heatmap_file_name(analysis: &TrialAnalysis) -> String {
    let stem = if analysis.source.is_empty() {
        &analysis.participant_id
    } else {
        &analysis.source
    };
    format!("{stem}_trial{}.png", analysis.trial_num)
}

/// Canvas of the full figure: title band, experiment canvas, colorbar band.
#[must_use]
pub fn heatmap_canvas(analysis: &TrialAnalysis, style: &HeatmapStyle) -> Canvas {
    let height = style.title_band_px + f64::from(analysis.canvas_height) + style.colorbar_band_px;
    Canvas::new(analysis.canvas_width, height.ceil() as u32)
}

/// Builds the heatmap scene: one colored box and label per word over the
/// experiment canvas, a title above and a horizontal colorbar below.
pub fn build_heatmap_frame(
    analysis: &TrialAnalysis,
    style: &HeatmapStyle,
) -> JatosResult<RenderFrame> {
    if analysis.canvas_width == 0 {
        return Err(JatosError::InvalidArgument(
            "canvas width must be > 0".to_owned(),
        ));
    }
    let colormap = DurationColormap::from_hex_stops(&style.colors)?;
    let text_color = Color::from_hex(&style.text_color)?;
    let range = DurationRange::from_durations(
        analysis.word_durations.iter().map(|word| word.duration_ms),
    )
    .ok_or_else(|| JatosError::InvalidArgument("no word durations to plot".to_owned()))?;

    let width = f64::from(analysis.canvas_width);
    let plot_top = style.title_band_px;
    let mut frame = RenderFrame::new(heatmap_canvas(analysis, style));

    let (heading, preview) = heatmap_title(analysis, style.title_preview_chars);
    let title_y = (style.title_band_px - 2.0 * style.title_font_size_px).max(0.0) / 3.0;
    frame.texts.push(TextPrimitive::new(
        heading,
        width / 2.0,
        title_y,
        style.title_font_size_px,
        text_color,
        TextHAlign::Center,
    ));
    frame.texts.push(TextPrimitive::new(
        preview,
        width / 2.0,
        title_y + style.title_font_size_px * 1.3,
        style.title_font_size_px,
        text_color,
        TextHAlign::Center,
    ));

    for word in &analysis.word_durations {
        let color = colormap.color_at(range.normalize(word.duration_ms));
        let mut rect = RectPrimitive::filled(
            word.x_start,
            plot_top + word.y_position - style.box_top_offset_px,
            word.x_end - word.x_start,
            style.box_height_px,
            color,
        );
        rect.corner_radius = style.box_corner_radius_px;
        frame.rects.push(rect);

        if !word.word.is_empty() {
            frame.texts.push(
                TextPrimitive::new(
                    word.word.clone(),
                    (word.x_start + word.x_end) / 2.0,
                    plot_top + word.y_position,
                    style.word_font_size_px,
                    text_color,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Middle),
            );
        }
    }

    push_colorbar(&mut frame, analysis, style, &colormap, range, text_color);
    Ok(frame)
}

/// Builds and renders a heatmap in one step.
pub fn render_heatmap<R: Renderer + ?Sized>(
    renderer: &mut R,
    analysis: &TrialAnalysis,
    style: &HeatmapStyle,
) -> JatosResult<RenderFrame> {
    let frame = build_heatmap_frame(analysis, style)?;
    renderer.render(&frame)?;
    Ok(frame)
}

fn push_colorbar(
    frame: &mut RenderFrame,
    analysis: &TrialAnalysis,
    style: &HeatmapStyle,
    colormap: &DurationColormap,
    range: DurationRange,
    text_color: Color,
) {
    let width = f64::from(analysis.canvas_width);
    let left = width * 0.1;
    let right = width * 0.9;
    let top = style.title_band_px + f64::from(analysis.canvas_height) + 6.0;
    let bottom = top + style.colorbar_height_px;
    let step_width = (right - left) / style.colorbar_steps as f64;

    for step in 0..style.colorbar_steps {
        let t = (step as f64 + 0.5) / style.colorbar_steps as f64;
        frame.rects.push(RectPrimitive::filled(
            left + step as f64 * step_width,
            top,
            step_width,
            style.colorbar_height_px,
            colormap.color_at(t),
        ));
    }

    for (x1, y1, x2, y2) in [
        (left, top, right, top),
        (right, top, right, bottom),
        (right, bottom, left, bottom),
        (left, bottom, left, top),
    ] {
        frame
            .lines
            .push(LinePrimitive::new(x1, y1, x2, y2, 1.0, text_color));
    }

    let label_y = bottom + 3.0;
    frame.texts.push(TextPrimitive::new(
        format_duration_tick(range.min),
        left,
        label_y,
        style.label_font_size_px,
        text_color,
        TextHAlign::Center,
    ));
    frame.texts.push(TextPrimitive::new(
        format_duration_tick(range.max),
        right,
        label_y,
        style.label_font_size_px,
        text_color,
        TextHAlign::Center,
    ));
    frame.texts.push(TextPrimitive::new(
        "Duration (ms)",
        width / 2.0,
        label_y + style.label_font_size_px * 1.4,
        style.label_font_size_px,
        text_color,
        TextHAlign::Center,
    ));
}

fn format_duration_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
