//! Conversions between the millimetres users work in and the integer
//! nanometres the board model stores.

/// Board-internal length unit.
pub type Nm = i64;

pub const NM_PER_MM: f64 = 1e6;

pub fn mm_to_nm(mm: f64) -> Nm {
    (mm * NM_PER_MM).round() as Nm
}

pub fn nm_to_mm(nm: Nm) -> f64 {
    nm as f64 / NM_PER_MM
}

/// Format a length the way KiCad writes it: millimetres, at most six
/// decimals, no trailing zeros.
pub fn format_mm(nm: Nm) -> String {
    let s = format!("{:.6}", nm_to_mm(nm));
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
