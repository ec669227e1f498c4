use super::{FramePreprocessor, Render};
use crate::error::{DqnError, Result};
use crate::observation::Frame;

/// Renders the environment at a fixed resolution and rescales the pixels into
/// `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPreprocessor {
    height: usize,
    width: usize,
}

impl ScreenPreprocessor {
    pub fn new(height: usize, width: usize) -> Self {
        ScreenPreprocessor { height, width }
    }
}

impl<E: Render + ?Sized> FramePreprocessor<E> for ScreenPreprocessor {
    fn frame_shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn capture(&mut self, env: &E) -> Result<Frame> {
        let mut frame = env.render(self.height, self.width);
        if frame.dim() != (self.height, self.width) {
            return Err(DqnError::dimension_mismatch(
                format!("rendered frame {:?}", (self.height, self.width)),
                format!("rendered frame {:?}", frame.dim()),
            ));
        }

        let max = frame.iter().copied().fold(0.0_f32, f32::max);
        if max > 1.0 {
            frame.mapv_inplace(|v| v / max);
        }
        frame.mapv_inplace(|v| v.max(0.0).min(1.0));
        Ok(frame)
    }
}
