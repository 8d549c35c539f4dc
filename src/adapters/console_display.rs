//! Console display adapter.
//!
//! Renders the status line and a text level meter through the logger.
//! The meter is a fixed-width bar scaled so that the threshold sits at
//! the midpoint; anything at or beyond twice the threshold fills it.

use log::info;

use crate::app::ports::DisplaySink;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    status: String,
    level: f32,
    threshold: f32,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Fixed-width meter, e.g. `[#####|     ]`, with `|` marking the
    /// threshold.
    pub fn render_bar(&self) -> String {
        render_bar(self.level, self.threshold)
    }
}

fn render_bar(level: f32, threshold: f32) -> String {
    let full_scale = threshold * 2.0;
    let filled = if full_scale > 0.0 && level.is_finite() {
        ((level / full_scale) * BAR_WIDTH as f32).clamp(0.0, BAR_WIDTH as f32) as usize
    } else {
        0
    };

    let mut bar = String::with_capacity(BAR_WIDTH + 3);
    bar.push('[');
    for i in 0..BAR_WIDTH {
        if i == BAR_WIDTH / 2 {
            bar.push('|');
        }
        bar.push(if i < filled { '#' } else { ' ' });
    }
    bar.push(']');
    bar
}

impl DisplaySink for ConsoleDisplay {
    fn set_status(&mut self, status: &str) {
        if self.status != status {
            info!("STATUS | {}", status);
        }
        self.status.clear();
        self.status.push_str(status);
    }

    fn set_level(&mut self, level: f32, threshold: f32) {
        self.level = level;
        self.threshold = threshold;
        info!("LEVEL  | {} {:.2}/{:.2}", render_bar(level, threshold), level, threshold);
    }
}
