use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Basketball,
    Football,
}

const BASKETBALL_MARK: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64"><circle cx="32" cy="32" r="30" fill="#ea580c"/><path d="M2 32h60M32 2v60M10 10c12 10 12 34 0 44M54 10c-12 10-12 34 0 44" stroke="#1f2937" stroke-width="3" fill="none"/></svg>"##;

const FOOTBALL_MARK: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64"><ellipse cx="32" cy="32" rx="30" ry="18" fill="#78350f" transform="rotate(-30 32 32)"/><path d="M22 42l20-20M26 30l4 4M30 26l4 4M34 22l4 4" stroke="#f9fafb" stroke-width="3" fill="none"/></svg>"##;

impl Sport {
    /// Pick the sport from a route path; anything not under a football route is basketball.
    pub fn from_path(path: &str) -> Self {
        let is_football = path
            .split('/')
            .any(|segment| segment.eq_ignore_ascii_case("football"));
        if is_football {
            Sport::Football
        } else {
            Sport::Basketball
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sport::Basketball => "Basketball",
            Sport::Football => "Football",
        }
    }

    pub fn path_prefix(&self) -> &'static str {
        match self {
            Sport::Basketball => "/basketball",
            Sport::Football => "/football",
        }
    }

    /// Short name of the win-value metric the backend computes for this sport.
    pub fn value_metric(&self) -> &'static str {
        match self {
            Sport::Basketball => "CWV",
            Sport::Football => "TWV",
        }
    }

    pub fn bid_label(&self) -> &'static str {
        match self {
            Sport::Basketball => "NCAA bid",
            Sport::Football => "CFP bid",
        }
    }

    /// Class on the standings table; capture options select on it.
    pub fn table_class(&self) -> &'static str {
        match self {
            Sport::Basketball => "cwv-table",
            Sport::Football => "twv-table",
        }
    }

    /// Brand mark stamped in the export header.
    pub fn brand_logo_svg(&self) -> &'static str {
        match self {
            Sport::Basketball => BASKETBALL_MARK,
            Sport::Football => FOOTBALL_MARK,
        }
    }
}
