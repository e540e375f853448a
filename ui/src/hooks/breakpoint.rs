//! Coarse viewport classification. Only used to decide between the share
//! sheet and a plain download; layout itself is left to CSS.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width_px: f64) -> Self {
        if width_px < 640.0 {
            Self::Mobile
        } else if width_px < 1024.0 {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }
}
