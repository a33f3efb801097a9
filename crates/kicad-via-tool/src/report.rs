use crate::board::ItemId;
use crate::params::Action;
use serde::{Serialize, Serializer};
use std::fmt;

/// Round a float to N decimal places.
pub fn round_f64(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

fn serialize_f64_rounded<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_f64(*v, 6))
}

fn serialize_opt_f64_rounded<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(val) => s.serialize_some(&round_f64(*val, 6)),
        None => s.serialize_none(),
    }
}

fn serialize_opt_point<S: Serializer>(p: &Option<[f64; 2]>, s: S) -> Result<S::Ok, S::Error> {
    match p {
        Some(pt) => s.serialize_some(&[round_f64(pt[0], 6), round_f64(pt[1], 6)]),
        None => s.serialize_none(),
    }
}

/// A via the engine acted on, as it looks after the action.
#[derive(Debug, Clone, Serialize)]
pub struct ViaSummary {
    pub id: ItemId,
    pub net: String,
    #[serde(serialize_with = "serialize_opt_point")]
    pub position_mm: Option<[f64; 2]>,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub diameter_mm: f64,
    #[serde(serialize_with = "serialize_opt_f64_rounded")]
    pub drill_mm: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub id: ItemId,
    pub reason: String,
}

/// Outcome of one pass over the board.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub action: Action,
    pub examined: usize,
    pub matched: Vec<ViaSummary>,
    pub skipped: Vec<SkippedItem>,
}

impl ActionReport {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            examined: 0,
            matched: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Whether the board differs from before the pass.
    pub fn mutated(&self) -> bool {
        self.action.mutates_board() && !self.matched.is_empty()
    }
}

impl fmt::Display for ActionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} of {} vias matched",
            self.action,
            self.matched.len(),
            self.examined
        )?;
        for via in &self.matched {
            let pos = via
                .position_mm
                .map(|[x, y]| format!("({x:.4}, {y:.4})"))
                .unwrap_or_else(|| "(?)".to_string());
            let drill = via
                .drill_mm
                .map(|d| format!("{d:.3}"))
                .unwrap_or_else(|| "?".to_string());
            writeln!(
                f,
                "  {} {} at {} size {:.3} / {} mm",
                via.id, via.net, pos, via.diameter_mm, drill
            )?;
        }
        for item in &self.skipped {
            writeln!(f, "  skipped {}: {}", item.id, item.reason)?;
        }
        Ok(())
    }
}
