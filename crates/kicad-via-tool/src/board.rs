use crate::error::ViaToolError;
use crate::geometry::Point;
use crate::units::{mm_to_nm, nm_to_mm, Nm};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub type NetCode = i32;

/// Stable handle of a board item, assigned in file order when the board is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ZoneId(pub usize);

// ─── Items ───────────────────────────────────────────────────────────

/// A via as read from the board. Attributes a malformed file may omit are
/// optional here and reported through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    pub id: ItemId,
    pub uuid: Option<String>,
    pub position: Option<Point>,
    pub diameter: Option<Nm>,
    pub drill: Option<Nm>,
    pub net: Option<NetCode>,
    pub selected: bool,
}

impl Via {
    pub fn new(id: ItemId, position: Point, diameter: Nm, drill: Nm, net: NetCode) -> Self {
        Self {
            id,
            uuid: None,
            position: Some(position),
            diameter: Some(diameter),
            drill: Some(drill),
            net: Some(net),
            selected: false,
        }
    }

    pub fn position(&self) -> Result<Point, ViaToolError> {
        self.position.ok_or_else(|| self.missing("position"))
    }

    /// Outer copper diameter.
    pub fn diameter(&self) -> Result<Nm, ViaToolError> {
        self.diameter.ok_or_else(|| self.missing("size"))
    }

    pub fn net(&self) -> Result<NetCode, ViaToolError> {
        self.net.ok_or_else(|| self.missing("net"))
    }

    pub fn set_selected(&mut self) {
        self.selected = true;
    }

    pub fn set_size(&mut self, diameter: Nm, drill: Nm) {
        self.diameter = Some(diameter);
        self.drill = Some(drill);
    }

    fn missing(&self, what: &str) -> ViaToolError {
        ViaToolError::ItemAccess {
            item: format!("via {}", self.id),
            reason: format!("missing {what}"),
        }
    }
}

/// Track segment or arc. Carried so the item collection mirrors the board,
/// never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: ItemId,
    pub net: Option<NetCode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardItem {
    Via(Via),
    Track(Track),
}

impl BoardItem {
    pub fn id(&self) -> ItemId {
        match self {
            BoardItem::Via(via) => via.id,
            BoardItem::Track(track) => track.id,
        }
    }
}

// ─── Zones ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub net_name: String,
    pub layers: Vec<String>,
    /// Closed loops, no winding order assumed.
    pub outline: Vec<Vec<Point>>,
    pub selected: bool,
}

impl Zone {
    /// Human-readable label for listings and log lines.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{name} ({})", self.net_name),
            _ if !self.net_name.is_empty() => format!("zone {} ({})", self.id.0, self.net_name),
            _ => format!("zone {}", self.id.0),
        }
    }

    fn matches_name_or_uuid(&self, selector: &str) -> bool {
        self.name.as_deref() == Some(selector) || self.uuid.as_deref() == Some(selector)
    }
}

// ─── Design settings ─────────────────────────────────────────────────

/// A standard via size from the design settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViaDimension {
    pub diameter: Nm,
    pub drill: Nm,
}

impl ViaDimension {
    pub fn from_mm(diameter_mm: f64, drill_mm: f64) -> Self {
        Self {
            diameter: mm_to_nm(diameter_mm),
            drill: mm_to_nm(drill_mm),
        }
    }
}

impl fmt::Display for ViaDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} / {:.3} mm",
            nm_to_mm(self.diameter),
            nm_to_mm(self.drill)
        )
    }
}

// ─── Board ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Board {
    pub nets: BTreeMap<String, NetCode>,
    pub items: Vec<BoardItem>,
    pub zones: Vec<Zone>,
    pub via_presets: Vec<ViaDimension>,
    refresh_requests: usize,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn net_code(&self, name: &str) -> Option<NetCode> {
        self.nets.get(name).copied()
    }

    pub fn net_name(&self, code: NetCode) -> Option<&str> {
        self.nets
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(name, _)| name.as_str())
    }

    pub fn vias(&self) -> impl Iterator<Item = &Via> {
        self.items.iter().filter_map(|item| match item {
            BoardItem::Via(via) => Some(via),
            BoardItem::Track(_) => None,
        })
    }

    pub fn via(&self, id: ItemId) -> Option<&Via> {
        self.vias().find(|via| via.id == id)
    }

    pub fn via_count(&self) -> usize {
        self.vias().count()
    }

    /// Remove items from the board. Returns how many were present.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id()));
        before - self.items.len()
    }

    pub fn clear_selection(&mut self) {
        for zone in &mut self.zones {
            zone.selected = false;
        }
        for item in &mut self.items {
            if let BoardItem::Via(via) = item {
                via.selected = false;
            }
        }
    }

    /// Select the zones matching `selector`, replacing any previous
    /// selection. Names and uuids take precedence over a zone index.
    pub fn select_zones(&mut self, selector: &str) -> Result<usize, ViaToolError> {
        self.clear_selection();
        let mut count = 0;
        for zone in &mut self.zones {
            if zone.matches_name_or_uuid(selector) {
                zone.selected = true;
                count += 1;
            }
        }
        if count == 0 {
            let index = selector.parse::<usize>().ok().map(ZoneId);
            if let Some(zone) = self.zones.iter_mut().find(|zone| Some(zone.id) == index) {
                zone.selected = true;
                count = 1;
            }
        }
        if count == 0 {
            return Err(ViaToolError::ZoneNotFound(selector.to_string()));
        }
        Ok(count)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requests += 1;
    }

    pub fn refresh_requests(&self) -> usize {
        self.refresh_requests
    }

    fn next_item_id(&self) -> ItemId {
        ItemId(
            self.items
                .iter()
                .map(|item| item.id().0 + 1)
                .max()
                .unwrap_or(0),
        )
    }

    pub fn add_via(&mut self, position: Point, diameter: Nm, drill: Nm, net: NetCode) -> ItemId {
        let id = self.next_item_id();
        self.items
            .push(BoardItem::Via(Via::new(id, position, diameter, drill, net)));
        id
    }

    pub fn add_track(&mut self, net: NetCode) -> ItemId {
        let id = self.next_item_id();
        self.items.push(BoardItem::Track(Track { id, net: Some(net) }));
        id
    }

    pub fn add_zone(&mut self, name: &str, outline: Vec<Vec<Point>>) -> ZoneId {
        let id = ZoneId(self.zones.len());
        self.zones.push(Zone {
            id,
            uuid: None,
            name: Some(name.to_string()),
            net_name: String::new(),
            layers: Vec::new(),
            outline,
            selected: false,
        });
        id
    }
}
