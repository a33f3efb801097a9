use crate::board::{Board, BoardItem, ItemId, NetCode, Track, Via, ViaDimension, Zone, ZoneId};
use crate::error::ViaToolError;
use crate::geometry::Point;
use crate::parsers::kicad_sexpr::{self, SExpr, Span};
use crate::units::{mm_to_nm, Nm};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Where a via lives in the source text and what it held when loaded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ViaOrigin {
    pub span: Span,
    pub size: Option<Span>,
    pub drill: Option<Span>,
    pub diameter: Option<Nm>,
    pub drill_nm: Option<Nm>,
}

/// A parsed `.kicad_pcb` file: the original text plus enough bookkeeping to
/// write the board back with only the changed vias touched.
#[derive(Debug, Clone)]
pub struct KicadPcb {
    pub(crate) source: Vec<u8>,
    pub(crate) vias: BTreeMap<ItemId, ViaOrigin>,
}

/// Parse a KiCad .kicad_pcb file from bytes into the board model.
pub fn parse(data: &[u8]) -> Result<(KicadPcb, Board), ViaToolError> {
    let root = kicad_sexpr::parse(data)
        .map_err(|e| ViaToolError::ParseError(format!("S-expression parse error: {e}")))?;

    if root.tag() != Some("kicad_pcb") {
        return Err(ViaToolError::ParseError("not a kicad_pcb file".to_string()));
    }

    let mut nets = NetTable::from_root(&root);
    let mut items = Vec::new();
    let mut zones = Vec::new();
    let mut origins = BTreeMap::new();

    for child in root.children() {
        match child.tag() {
            Some("via") => {
                let id = ItemId(items.len());
                let (via, origin) = parse_via(child, id, &mut nets);
                origins.insert(id, origin);
                items.push(BoardItem::Via(via));
            }
            Some("segment") | Some("arc") => {
                let id = ItemId(items.len());
                items.push(BoardItem::Track(Track {
                    id,
                    net: net_ref(child, &mut nets),
                }));
            }
            Some("zone") => {
                let zone = parse_zone(child, ZoneId(zones.len()));
                zones.push(zone);
            }
            _ => {}
        }
    }

    let mut board = Board::new();
    board.nets = nets.by_name;
    board.items = items;
    board.zones = zones;
    board.via_presets = parse_setup_presets(&root);
    debug!(
        "Loaded board: {} nets, {} vias, {} zones",
        board.nets.len(),
        board.via_count(),
        board.zones.len()
    );

    Ok((
        KicadPcb {
            source: data.to_vec(),
            vias: origins,
        },
        board,
    ))
}

// ─── Nets ────────────────────────────────────────────────────────────

/// Net declarations, grown on the fly when items reference nets by name.
struct NetTable {
    by_name: BTreeMap<String, NetCode>,
}

impl NetTable {
    fn from_root(root: &SExpr) -> Self {
        let mut by_name = BTreeMap::new();
        for child in root.find_all("net") {
            let code = child.atom_at(0).and_then(|c| c.parse::<NetCode>().ok());
            let name = child.atom_at(1);
            match (code, name) {
                (Some(code), Some(name)) => {
                    by_name.entry(name.to_string()).or_insert(code);
                }
                _ => warn!("Ignoring malformed net declaration"),
            }
        }
        Self { by_name }
    }

    /// Code of a net referenced by name, assigning a fresh one if undeclared.
    fn resolve_name(&mut self, name: &str) -> NetCode {
        if let Some(code) = self.by_name.get(name) {
            return *code;
        }
        let code = self.by_name.values().max().map_or(0, |max| max + 1);
        self.by_name.insert(name.to_string(), code);
        code
    }
}

/// A `(net ..)` reference: a bare net code, or a quoted net name in newer files.
fn net_ref(node: &SExpr, nets: &mut NetTable) -> Option<NetCode> {
    match node.find("net")?.children().first()? {
        SExpr::Atom(token) => match token.parse::<NetCode>() {
            Ok(code) => Some(code),
            Err(_) => Some(nets.resolve_name(token)),
        },
        SExpr::Str(name) => Some(nets.resolve_name(name)),
        SExpr::List { .. } => None,
    }
}

// ─── Items ───────────────────────────────────────────────────────────

fn parse_xy(node: &SExpr, tag: &str) -> Option<Point> {
    node.find(tag).and_then(point_of)
}

fn point_of(node: &SExpr) -> Option<Point> {
    Some(Point::new(
        mm_to_nm(node.f64_at(0)?),
        mm_to_nm(node.f64_at(1)?),
    ))
}

fn parse_via(node: &SExpr, id: ItemId, nets: &mut NetTable) -> (Via, ViaOrigin) {
    let size = node.find("size");
    let drill = node.find("drill");
    let diameter = node.value_f64("size").map(mm_to_nm);
    let drill_nm = node.value_f64("drill").map(mm_to_nm);

    let via = Via {
        id,
        uuid: node
            .value("uuid")
            .or_else(|| node.value("tstamp"))
            .map(str::to_string),
        position: parse_xy(node, "at"),
        diameter,
        drill: drill_nm,
        net: net_ref(node, nets),
        selected: false,
    };
    let origin = ViaOrigin {
        span: node.span().unwrap_or_default(),
        size: size.and_then(SExpr::span),
        drill: drill.and_then(SExpr::span),
        diameter,
        drill_nm,
    };
    (via, origin)
}

// ─── Zones ───────────────────────────────────────────────────────────

fn parse_zone(node: &SExpr, id: ZoneId) -> Zone {
    let layers = match node.find("layers") {
        Some(layers) => layers
            .children()
            .iter()
            .filter_map(SExpr::as_atom)
            .map(str::to_string)
            .collect(),
        None => node.value("layer").map(str::to_string).into_iter().collect(),
    };

    let outline = node
        .find_all("polygon")
        .into_iter()
        .filter_map(|polygon| polygon.find("pts"))
        .map(parse_pts)
        .filter(|pts| !pts.is_empty())
        .collect();

    Zone {
        id,
        uuid: node
            .value("uuid")
            .or_else(|| node.value("tstamp"))
            .map(str::to_string),
        name: node.value("name").map(str::to_string),
        net_name: node.value("net_name").unwrap_or("").to_string(),
        layers,
        outline,
        selected: false,
    }
}

/// Points of a `(pts ..)` list. Arcs contribute their start, mid and end points.
fn parse_pts(pts: &SExpr) -> Vec<Point> {
    let mut points = Vec::new();
    for child in pts.children() {
        match child.tag() {
            Some("xy") => points.extend(point_of(child)),
            Some("arc") => {
                points.extend(["start", "mid", "end"].iter().filter_map(|t| parse_xy(child, t)))
            }
            _ => {}
        }
    }
    points
}

// ─── Design settings ─────────────────────────────────────────────────

/// Via presets stored in the board file itself by older KiCad versions:
/// `(user_via DIAMETER DRILL)` entries and the default `via_size`/`via_drill`.
fn parse_setup_presets(root: &SExpr) -> Vec<ViaDimension> {
    let Some(setup) = root.find("setup") else {
        return Vec::new();
    };
    let default = setup
        .value_f64("via_size")
        .zip(setup.value_f64("via_drill"));
    let user = setup
        .find_all("user_via")
        .into_iter()
        .filter_map(|v| v.f64_at(0).zip(v.f64_at(1)));

    let mut presets: Vec<ViaDimension> = Vec::new();
    for (size, drill) in default.into_iter().chain(user) {
        let preset = ViaDimension::from_mm(size, drill);
        if preset.diameter > 0 && preset.drill > 0 && !presets.contains(&preset) {
            presets.push(preset);
        }
    }
    presets
}
