//! Via filtering and the actions applied to the matches.

use crate::board::{Board, BoardItem, ItemId, NetCode, Via, Zone, ZoneId};
use crate::error::ViaToolError;
use crate::params::{Action, FilterParams, NetFilter};
use crate::report::{ActionReport, SkippedItem, ViaSummary};
use crate::units::{mm_to_nm, nm_to_mm};
use crate::zone::{selected_zone, zone_contains, ContainmentMode};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Net codes a filter applies to.
pub fn resolve_nets(board: &Board, net: &NetFilter) -> Result<BTreeSet<NetCode>, ViaToolError> {
    match net {
        NetFilter::All => Ok(board.nets.values().copied().collect()),
        NetFilter::Named(name) => board
            .net_code(name)
            .map(|code| BTreeSet::from([code]))
            .ok_or_else(|| ViaToolError::NetNotFound(name.clone())),
    }
}

/// Resolve the zone restriction, then run one pass. With `use_zone` set the
/// board must have exactly one selected zone, otherwise nothing runs.
pub fn run(
    board: &mut Board,
    params: &FilterParams,
    mode: ContainmentMode,
) -> Result<ActionReport, ViaToolError> {
    let zone = if params.use_zone {
        Some(selected_zone(board)?)
    } else {
        None
    };
    info!(
        "Running selection: net={}, use_zone={}, size=[{}, {}] mm, action={}",
        params.net, params.use_zone, params.min_size_mm, params.max_size_mm, params.action
    );
    select_vias(board, params, zone, mode)
}

/// One pass over the board's items: filter the vias, select every match,
/// then delete or resize it according to the action. Items that cannot be
/// read are skipped and reported. Deletions take effect when the pass ends.
pub fn select_vias(
    board: &mut Board,
    params: &FilterParams,
    zone: Option<ZoneId>,
    mode: ContainmentMode,
) -> Result<ActionReport, ViaToolError> {
    params.validate()?;
    let nets = resolve_nets(board, &params.net)?;

    let zone: Option<Zone> = match (params.use_zone, zone) {
        (false, _) => None,
        (true, None) => return Err(ViaToolError::NoZoneSelected),
        (true, Some(id)) => Some(
            board
                .zone(id)
                .cloned()
                .ok_or(ViaToolError::NoZoneSelected)?,
        ),
    };

    let mut report = ActionReport::new(params.action);
    let mut matched: Vec<ItemId> = Vec::new();
    let mut removed: Vec<ItemId> = Vec::new();

    for item in board.items.iter_mut() {
        let via = match item {
            BoardItem::Via(via) => via,
            BoardItem::Track(_) => continue,
        };
        report.examined += 1;

        match via_matches(via, &nets, params, zone.as_ref(), mode) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Skipping {}: {e}", via.id);
                report.skipped.push(SkippedItem {
                    id: via.id,
                    reason: e.to_string(),
                });
                continue;
            }
        }

        via.set_selected();
        matched.push(via.id);
        match params.action {
            Action::Highlight => {}
            Action::Delete => {
                info!("Via {} at {:?} deleted", via.id, via.position);
                removed.push(via.id);
            }
            Action::ChangeSize {
                diameter_mm,
                drill_mm,
            } => {
                via.set_size(mm_to_nm(diameter_mm), mm_to_nm(drill_mm));
                info!(
                    "Via {} at {:?} updated to diameter {diameter_mm} mm, drill {drill_mm} mm",
                    via.id, via.position
                );
            }
        }
    }

    report.matched = matched
        .iter()
        .filter_map(|id| board.via(*id))
        .map(|via| summarize(via, board))
        .collect();
    if !removed.is_empty() {
        board.remove_items(&removed);
    }
    board.request_refresh();
    info!(
        "{} of {} vias matched, {} skipped",
        report.matched.len(),
        report.examined,
        report.skipped.len()
    );
    Ok(report)
}

fn via_matches(
    via: &Via,
    nets: &BTreeSet<NetCode>,
    params: &FilterParams,
    zone: Option<&Zone>,
    mode: ContainmentMode,
) -> Result<bool, ViaToolError> {
    if !nets.contains(&via.net()?) {
        return Ok(false);
    }
    let size_mm = nm_to_mm(via.diameter()?);
    debug!("Checking via {} at {:?}: size {size_mm} mm", via.id, via.position);
    if size_mm < params.min_size_mm || size_mm > params.max_size_mm {
        return Ok(false);
    }
    match zone {
        Some(zone) => Ok(zone_contains(zone, via.position()?, mode)),
        None => Ok(true),
    }
}

fn summarize(via: &Via, board: &Board) -> ViaSummary {
    ViaSummary {
        id: via.id,
        net: via
            .net
            .and_then(|code| board.net_name(code))
            .map(str::to_string)
            .unwrap_or_default(),
        position_mm: via.position.map(|p| p.to_mm()),
        diameter_mm: via.diameter.map(nm_to_mm).unwrap_or_default(),
        drill_mm: via.drill.map(nm_to_mm),
    }
}
