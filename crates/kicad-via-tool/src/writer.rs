//! Writes a board back into its original `.kicad_pcb` text. Only the vias
//! that were deleted or resized change; every other byte is kept.

use crate::board::{Board, ItemId};
use crate::parsers::kicad::KicadPcb;
use crate::parsers::kicad_sexpr::Span;
use crate::units::{format_mm, Nm};
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

pub fn render(pcb: &KicadPcb, board: &Board) -> Vec<u8> {
    let current: BTreeMap<ItemId, (Option<Nm>, Option<Nm>)> = board
        .vias()
        .map(|via| (via.id, (via.diameter, via.drill)))
        .collect();

    let mut edits = Vec::new();
    for (id, origin) in &pcb.vias {
        let Some(&(diameter, drill)) = current.get(id) else {
            debug!("Removing via {id} from file");
            edits.push(Edit {
                span: whole_line(&pcb.source, origin.span.clone()),
                text: String::new(),
            });
            continue;
        };
        // Before the closing paren of the via, for attributes it never had
        let append_at = origin.span.end.saturating_sub(1)..origin.span.end.saturating_sub(1);

        if diameter != origin.diameter {
            if let Some(nm) = diameter {
                edits.push(attribute_edit("size", nm, origin.size.clone(), &append_at));
            }
        }
        if drill != origin.drill_nm {
            if let Some(nm) = drill {
                edits.push(attribute_edit("drill", nm, origin.drill.clone(), &append_at));
            }
        }
    }
    splice(&pcb.source, edits)
}

fn attribute_edit(tag: &str, nm: Nm, existing: Option<Span>, append_at: &Span) -> Edit {
    match existing {
        Some(span) => Edit {
            span,
            text: format!("({tag} {})", format_mm(nm)),
        },
        None => Edit {
            span: append_at.clone(),
            text: format!(" ({tag} {})", format_mm(nm)),
        },
    }
}

/// Widen a span to swallow its leading indentation and line break when the
/// node sits alone on its line.
fn whole_line(source: &[u8], span: Span) -> Span {
    let mut start = span.start;
    while start > 0 && matches!(source[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    let mut end = span.end;
    while end < source.len() && matches!(source[end], b' ' | b'\t' | b'\r') {
        end += 1;
    }
    let line_start = start == 0 || source[start - 1] == b'\n';
    let line_end = end == source.len() || source[end] == b'\n';
    if line_start && line_end {
        if end < source.len() {
            end += 1;
        }
        start..end
    } else {
        span
    }
}

fn splice(source: &[u8], mut edits: Vec<Edit>) -> Vec<u8> {
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));
    let mut out = Vec::with_capacity(source.len());
    let mut pos = 0;
    for edit in edits {
        if edit.span.start < pos {
            // Inside a via that is already being removed
            continue;
        }
        out.extend_from_slice(&source[pos..edit.span.start]);
        out.extend_from_slice(edit.text.as_bytes());
        pos = edit.span.end;
    }
    out.extend_from_slice(&source[pos..]);
    out
}
