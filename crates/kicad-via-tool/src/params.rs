use crate::board::ViaDimension;
use crate::error::ViaToolError;
use crate::units::{mm_to_nm, nm_to_mm};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Net name the user picks to mean "every net".
pub const ALL_NETS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetFilter {
    All,
    Named(String),
}

impl From<&str> for NetFilter {
    fn from(name: &str) -> Self {
        if name == ALL_NETS {
            NetFilter::All
        } else {
            NetFilter::Named(name.to_string())
        }
    }
}

impl Serialize for NetFilter {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl fmt::Display for NetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetFilter::All => f.write_str(ALL_NETS),
            NetFilter::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    Highlight,
    Delete,
    ChangeSize { diameter_mm: f64, drill_mm: f64 },
}

impl Action {
    pub fn mutates_board(&self) -> bool {
        !matches!(self, Action::Highlight)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Highlight => f.write_str("Highlight"),
            Action::Delete => f.write_str("Delete"),
            Action::ChangeSize {
                diameter_mm,
                drill_mm,
            } => write!(f, "Change Size ({diameter_mm} / {drill_mm} mm)"),
        }
    }
}

/// A via size typed by the user as `diameter/drill`, e.g. `0.6/0.3` or
/// `0.600 / 0.300 mm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    pub diameter_mm: f64,
    pub drill_mm: f64,
}

impl FromStr for SizeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (diameter, drill) = s
            .split_once('/')
            .ok_or_else(|| format!("expected DIAMETER/DRILL, got '{s}'"))?;
        let parse = |part: &str, what: &str| -> Result<f64, String> {
            let part = part.trim();
            let part = part.strip_suffix("mm").unwrap_or(part).trim();
            part.parse::<f64>()
                .map_err(|_| format!("invalid {what} '{part}'"))
        };
        Ok(SizeSpec {
            diameter_mm: parse(diameter, "diameter")?,
            drill_mm: parse(drill, "drill")?,
        })
    }
}

impl From<ViaDimension> for SizeSpec {
    fn from(preset: ViaDimension) -> Self {
        SizeSpec {
            diameter_mm: nm_to_mm(preset.diameter),
            drill_mm: nm_to_mm(preset.drill),
        }
    }
}

/// Everything one pass of the engine needs from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterParams {
    pub net: NetFilter,
    pub use_zone: bool,
    pub min_size_mm: f64,
    pub max_size_mm: f64,
    pub action: Action,
}

impl FilterParams {
    pub fn validate(&self) -> Result<(), ViaToolError> {
        let invalid = |msg: String| Err(ViaToolError::InvalidParameters(msg));

        if !self.min_size_mm.is_finite() || self.min_size_mm < 0.0 {
            return invalid(format!("minimum size {} mm", self.min_size_mm));
        }
        if self.max_size_mm.is_nan() || self.max_size_mm < 0.0 {
            return invalid(format!("maximum size {} mm", self.max_size_mm));
        }
        if self.min_size_mm > self.max_size_mm {
            return invalid(format!(
                "minimum size {} mm exceeds maximum size {} mm",
                self.min_size_mm, self.max_size_mm
            ));
        }
        if let Action::ChangeSize {
            diameter_mm,
            drill_mm,
        } = self.action
        {
            if !(diameter_mm.is_finite() && diameter_mm > 0.0) {
                return invalid(format!("new diameter {diameter_mm} mm"));
            }
            if !(drill_mm.is_finite() && drill_mm > 0.0) {
                return invalid(format!("new drill {drill_mm} mm"));
            }
            if mm_to_nm(drill_mm) >= mm_to_nm(diameter_mm) {
                return invalid(format!(
                    "new drill {drill_mm} mm must be smaller than diameter {diameter_mm} mm"
                ));
            }
        }
        Ok(())
    }
}

/// Default `[min, max]` size range: the smallest and largest preset
/// diameters, or everything when the board defines no presets.
pub fn default_size_range(presets: &[ViaDimension]) -> (f64, f64) {
    let diameters = presets.iter().map(|p| p.diameter);
    match (diameters.clone().min(), diameters.max()) {
        (Some(min), Some(max)) => (nm_to_mm(min), nm_to_mm(max)),
        _ => (0.0, f64::INFINITY),
    }
}

/// Whether a size is one of the board's presets.
pub fn is_preset(presets: &[ViaDimension], size: SizeSpec) -> bool {
    let wanted = ViaDimension::from_mm(size.diameter_mm, size.drill_mm);
    presets.contains(&wanted)
}
