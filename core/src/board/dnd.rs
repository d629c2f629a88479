//! Drag-and-drop plumbing for the board.
//!
//! A drag carries exactly one item: the record id as text. Where it lands is
//! decided by a [`HitTree`] the renderer fills in each frame. Drop resolution
//! starts at the innermost node under the pointer and walks up the parent
//! chain until it reaches a column body. If there is none, the drop is ignored.

use crate::record::RecordId;
use crate::record::Status;

/// Text payload of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPayload(pub RecordId);

impl DragPayload {
    pub fn encode(self) -> String {
        self.0.to_string()
    }

    /// Parse a payload; anything but an integer id yields `None`.
    pub fn decode(text: &str) -> Option<Self> {
        text.parse::<RecordId>().ok().map(DragPayload)
    }
}

/// Screen rectangle in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && u32::from(column) < u32::from(self.x) + u32::from(self.width)
            && u32::from(row) < u32::from(self.y) + u32::from(self.height)
    }
}

/// What a rendered region is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Board,
    Column(Status),
    ColumnHeader(Status),
    /// Drop target. Carries the destination status.
    ColumnBody(Status),
    Card(RecordId),
    /// Any decoration inside a card (title, tags, date).
    CardPart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct HitNode {
    kind: NodeKind,
    area: Area,
    parent: Option<NodeId>,
}

/// Containment hierarchy of the last rendered frame.
#[derive(Debug, Clone, Default)]
pub struct HitTree {
    nodes: Vec<HitNode>,
}

impl HitTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a node. Children must be pushed after their parent.
    pub fn push(&mut self, kind: NodeKind, area: Area, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(HitNode { kind, area, parent });
        NodeId(self.nodes.len() - 1)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    /// Innermost node containing the point (the last one pushed).
    pub fn hit(&self, column: u16, row: u16) -> Option<NodeId> {
        self.nodes
            .iter()
            .rposition(|node| node.area.contains(column, row))
            .map(NodeId)
    }

    /// `id` followed by each of its ancestors.
    pub fn ancestry(&self, id: NodeId) -> impl Iterator<Item = &NodeKind> + '_ {
        let mut cursor = Some(id);
        std::iter::from_fn(move || {
            let node = self.nodes.get(cursor?.0)?;
            cursor = node.parent;
            Some(&node.kind)
        })
    }

    /// Destination status for a drop at the point, if it lands in a column body.
    pub fn resolve_drop(&self, column: u16, row: u16) -> Option<Status> {
        let start = self.hit(column, row)?;
        self.ancestry(start).find_map(|kind| match kind {
            NodeKind::ColumnBody(status) => Some(status.clone()),
            _ => None,
        })
    }

    /// Card under the point, if any.
    pub fn card_at(&self, column: u16, row: u16) -> Option<RecordId> {
        let start = self.hit(column, row)?;
        self.ancestry(start).find_map(|kind| match kind {
            NodeKind::Card(id) => Some(*id),
            _ => None,
        })
    }
}
