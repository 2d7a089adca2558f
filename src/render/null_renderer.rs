use crate::core::Canvas;
use crate::error::JatosResult;
use crate::render::{RenderFrame, Renderer};

/// Renderer that draws nothing; used by tests and builds without a backend.
///
/// Every frame is still validated, and the counts of the last one are kept.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_canvas: Option<Canvas>,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> JatosResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_canvas = Some(frame.canvas);
        self.last_line_count = frame.lines.len();
        self.last_rect_count = frame.rects.len();
        self.last_text_count = frame.texts.len();
        Ok(())
    }
}
