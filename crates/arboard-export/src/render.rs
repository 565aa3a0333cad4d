//! Board → primitive projection.
//!
//! Connections come first so that nodes drawn afterwards cover the line ends.

use arboard_core::{Board, BoardId, Connection, ConnectionId, ConnectionType, Node, NodeId, Selection};
use arboard_geometry::{
    edge_points, label_box, midpoint, text_baseline, truncate, LabelBox, Point, Truncated,
    DEFAULT_LABEL_MAX, DEFAULT_NODE_NAME_MAX, DEFAULT_NODE_RADIUS,
};
use serde::{Deserialize, Serialize};

/// Sizes used when projecting a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Radius shared by every node circle
    pub node_radius: f64,
    /// Longest node name drawn before truncation
    pub node_name_max: usize,
    /// Longest connection label drawn before truncation
    pub label_max: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_radius: DEFAULT_NODE_RADIUS,
            node_name_max: DEFAULT_NODE_NAME_MAX,
            label_max: DEFAULT_LABEL_MAX,
        }
    }
}

/// Where arrowheads go on a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// Single arrowhead at the target end
    End,
    /// Arrowheads at both ends
    Both,
}

impl ArrowStyle {
    pub fn for_type(connection_type: ConnectionType) -> Self {
        match connection_type {
            ConnectionType::Unidirectional => ArrowStyle::End,
            ConnectionType::Bidirectional => ArrowStyle::Both,
        }
    }

    pub fn at_start(self) -> bool {
        self == ArrowStyle::Both
    }
}

/// Label drawn at the middle of a connector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionLabel {
    pub text: Truncated,
    /// Midpoint of the clipped connector
    pub anchor: Point,
    pub background: LabelBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionPrimitive {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    /// On the source circle
    pub start: Point,
    /// On the target circle
    pub end: Point,
    pub arrows: ArrowStyle,
    pub dashed: bool,
    pub label: Option<ConnectionLabel>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePrimitive {
    pub id: NodeId,
    pub center: Point,
    pub radius: f64,
    pub name: Truncated,
    /// Baseline position for the centered name
    pub name_anchor: Point,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Connection(ConnectionPrimitive),
    Node(NodePrimitive),
}

/// Ordered drawing instructions for one board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub board: BoardId,
    pub primitives: Vec<Primitive>,
}

impl RenderPlan {
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Connection(c) => Some(c),
            Primitive::Node(_) => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodePrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Node(n) => Some(n),
            Primitive::Connection(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Bounding box of everything drawn, as (min, max) corners
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut include = |p: Point| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        };

        for primitive in &self.primitives {
            match primitive {
                Primitive::Node(n) => {
                    include(Point::new(n.center.x - n.radius, n.center.y - n.radius));
                    include(Point::new(n.center.x + n.radius, n.center.y + n.radius));
                }
                Primitive::Connection(c) => {
                    include(c.start);
                    include(c.end);
                    if let Some(label) = &c.label {
                        let b = label.background;
                        include(b.origin);
                        include(Point::new(b.origin.x + b.width, b.origin.y + b.height));
                    }
                }
            }
        }

        (!self.primitives.is_empty()).then_some((min, max))
    }
}

/// Project `board` onto drawing primitives.
///
/// Pure: neither the board nor the selection is modified. Connections whose
/// endpoints are not on the board are skipped.
pub fn render(board: &Board, selection: Option<&Selection>, config: &RenderConfig) -> RenderPlan {
    let mut primitives = Vec::with_capacity(board.nodes.len() + board.connections.len());

    for connection in &board.connections {
        let (Some(source), Some(target)) = (board.node(&connection.source), board.node(&connection.target))
        else {
            continue;
        };
        let highlighted = selection.is_some_and(|s| s.is_connection(&connection.id));
        primitives.push(Primitive::Connection(connection_primitive(
            connection,
            source,
            target,
            highlighted,
            config,
        )));
    }

    for node in &board.nodes {
        let highlighted = selection.is_some_and(|s| s.is_node(&node.id));
        primitives.push(Primitive::Node(node_primitive(node, highlighted, config)));
    }

    RenderPlan {
        board: board.id.clone(),
        primitives,
    }
}

fn connection_primitive(
    connection: &Connection,
    source: &Node,
    target: &Node,
    highlighted: bool,
    config: &RenderConfig,
) -> ConnectionPrimitive {
    let (start, end) = edge_points(
        Point::new(source.x, source.y),
        Point::new(target.x, target.y),
        config.node_radius,
    );

    let label = (!connection.label.is_empty()).then(|| {
        let text = truncate(&connection.label, config.label_max);
        let anchor = midpoint(start, end);
        let background = label_box(anchor, &text.display);
        ConnectionLabel {
            text,
            anchor,
            background,
        }
    });

    let arrows = ArrowStyle::for_type(connection.connection_type);
    ConnectionPrimitive {
        id: connection.id.clone(),
        source: connection.source.clone(),
        target: connection.target.clone(),
        start,
        end,
        arrows,
        dashed: connection.connection_type.is_bidirectional(),
        label,
        highlighted,
    }
}

fn node_primitive(node: &Node, highlighted: bool, config: &RenderConfig) -> NodePrimitive {
    let center = Point::new(node.x, node.y);
    NodePrimitive {
        id: node.id.clone(),
        center,
        radius: config.node_radius,
        name: truncate(&node.name, config.node_name_max),
        name_anchor: text_baseline(center),
        highlighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arboard_core::{GraphStore, Metadata};

    fn friends() -> (GraphStore, NodeId, NodeId, ConnectionId) {
        let mut store = GraphStore::new();
        let alice = store.add_node("Alice", 50.0, 50.0, Metadata::default()).unwrap().id.clone();
        let bob = store.add_node("Bob", 150.0, 50.0, Metadata::default()).unwrap().id.clone();
        let conn = store
            .add_connection(&alice, &bob, "Friend", Metadata::default(), ConnectionType::Unidirectional)
            .unwrap()
            .id
            .clone();
        (store, alice, bob, conn)
    }

    #[test]
    fn connections_are_drawn_before_nodes() {
        let (store, ..) = friends();
        let plan = render(store.current_board(), None, &RenderConfig::default());
        assert_eq!(plan.len(), 3);
        assert!(matches!(plan.primitives[0], Primitive::Connection(_)));
        assert!(matches!(plan.primitives[1], Primitive::Node(_)));
        assert!(matches!(plan.primitives[2], Primitive::Node(_)));
    }

    #[test]
    fn unidirectional_connector_is_clipped_with_single_arrow() {
        let (store, alice, bob, _) = friends();
        let plan = render(store.current_board(), None, &RenderConfig::default());
        let conn = plan.connections().next().unwrap();

        assert_eq!((conn.source.clone(), conn.target.clone()), (alice, bob));
        assert!((conn.start.x - 80.0).abs() < 1e-9 && (conn.start.y - 50.0).abs() < 1e-9);
        assert!((conn.end.x - 120.0).abs() < 1e-9 && (conn.end.y - 50.0).abs() < 1e-9);
        assert_eq!(conn.arrows, ArrowStyle::End);
        assert!(!conn.arrows.at_start());
        assert!(!conn.dashed);

        let label = conn.label.as_ref().unwrap();
        assert_eq!(label.text.display, "Friend");
        assert!((label.anchor.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bidirectional_connector_is_dashed_with_two_arrows() {
        let (mut store, _, _, conn) = friends();
        store.update_connection(
            &conn,
            arboard_core::ConnectionUpdate {
                connection_type: Some(ConnectionType::Bidirectional),
                ..Default::default()
            },
        );
        let plan = render(store.current_board(), None, &RenderConfig::default());
        let conn = plan.connections().next().unwrap();
        assert_eq!(conn.arrows, ArrowStyle::Both);
        assert!(conn.arrows.at_start());
        assert!(conn.dashed);
    }

    #[test]
    fn empty_label_draws_no_label() {
        let mut store = GraphStore::new();
        let a = store.add_node("A", 0.0, 0.0, Metadata::default()).unwrap().id.clone();
        let b = store.add_node("B", 0.0, 100.0, Metadata::default()).unwrap().id.clone();
        store
            .add_connection(&a, &b, "", Metadata::default(), ConnectionType::default())
            .unwrap();
        let plan = render(store.current_board(), None, &RenderConfig::default());
        assert!(plan.connections().next().unwrap().label.is_none());
    }

    #[test]
    fn long_texts_are_truncated_with_tooltips() {
        let mut store = GraphStore::new();
        let a = store
            .add_node("Maximilian Augustus", 0.0, 0.0, Metadata::default())
            .unwrap()
            .id
            .clone();
        let b = store.add_node("Bo", 200.0, 0.0, Metadata::default()).unwrap().id.clone();
        store
            .add_connection(&a, &b, "Former business partner", Metadata::default(), ConnectionType::default())
            .unwrap();

        let plan = render(store.current_board(), None, &RenderConfig::default());
        let node = plan.nodes().find(|n| n.id == a).unwrap();
        assert_eq!(node.name.display.chars().count(), 10);
        assert_eq!(node.name.tooltip(), Some("Maximilian Augustus"));

        let short = plan.nodes().find(|n| n.id == b).unwrap();
        assert_eq!(short.name.tooltip(), None);

        let label = &plan.connections().next().unwrap().label.as_ref().unwrap().text;
        assert_eq!(label.display.chars().count(), 15);
        assert_eq!(label.tooltip(), Some("Former business partner"));
    }

    #[test]
    fn selection_highlights_only_the_selected_primitive() {
        let (store, alice, bob, conn) = friends();
        let config = RenderConfig::default();

        let sel = Selection::Node(alice.clone());
        let plan = render(store.current_board(), Some(&sel), &config);
        assert!(plan.nodes().find(|n| n.id == alice).unwrap().highlighted);
        assert!(!plan.nodes().find(|n| n.id == bob).unwrap().highlighted);
        assert!(!plan.connections().next().unwrap().highlighted);

        let sel = Selection::Connection(conn);
        let plan = render(store.current_board(), Some(&sel), &config);
        assert!(plan.connections().next().unwrap().highlighted);
        assert!(plan.nodes().all(|n| !n.highlighted));
    }

    #[test]
    fn custom_radius_changes_clipping() {
        let (store, ..) = friends();
        let config = RenderConfig {
            node_radius: 10.0,
            ..Default::default()
        };
        let plan = render(store.current_board(), None, &config);
        let conn = plan.connections().next().unwrap();
        assert!((conn.start.x - 60.0).abs() < 1e-9);
        assert_eq!(plan.nodes().next().unwrap().radius, 10.0);
    }

    #[test]
    fn bounds_cover_node_circles() {
        let (store, ..) = friends();
        let plan = render(store.current_board(), None, &RenderConfig::default());
        let (min, max) = plan.bounds().unwrap();
        assert_eq!((min.x, min.y), (20.0, 20.0));
        assert_eq!((max.x, max.y), (180.0, 80.0));

        let empty = render(&Board::new("Empty"), None, &RenderConfig::default());
        assert!(empty.is_empty());
        assert!(empty.bounds().is_none());
    }

    #[test]
    fn plan_serializes_with_kind_tags() {
        let (store, ..) = friends();
        let plan = render(store.current_board(), None, &RenderConfig::default());
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["primitives"][0]["kind"], "connection");
        assert_eq!(value["primitives"][0]["arrows"], "end");
        assert_eq!(value["primitives"][1]["kind"], "node");
    }
}
