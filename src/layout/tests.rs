//! Tests for the layout engine
//!
//! Includes:
//! - Geometry: bounds, safe zone, collision search
//! - Strategy behaviour and fallbacks
//! - Non-overlap across whole batches

use super::*;

fn node(id: &str) -> LayoutNode {
    LayoutNode::new(id, "function")
}

fn all_points(existing: &[Point], result: &LayoutResult) -> Vec<Point> {
    existing
        .iter()
        .copied()
        .chain(result.positions.iter().map(|p| Point::new(p.x, p.y)))
        .collect()
}

fn assert_no_overlaps(config: &LayoutConfig, points: &[Point]) {
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            assert!(!config.collides(*a, *b), "{:?} overlaps {:?}", a, b);
        }
    }
}

fn position<'a>(result: &'a LayoutResult, id: &str) -> &'a PlacedNode {
    result.positions.iter().find(|p| p.id == id).unwrap()
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_bounds_of_empty_canvas() {
    assert!(WorkspaceBounds::from_points(&[]).is_none());

    let config = LayoutConfig::default();
    let zone = SafeZone::compute(None, &config);
    assert_eq!(zone.anchor(), Point::new(100, 100));
}

#[test]
fn test_safe_zone_below_existing_content() {
    let config = LayoutConfig::default();
    let existing = [Point::new(50, 120), Point::new(400, 400), Point::new(250, 60)];

    let bounds = WorkspaceBounds::from_points(&existing).unwrap();
    assert_eq!(
        bounds,
        WorkspaceBounds { min_x: 50, max_x: 400, min_y: 60, max_y: 400 }
    );

    let zone = SafeZone::compute(Some(&bounds), &config);
    assert_eq!(zone.start_x, 100, "left edge never goes below the default margin");
    assert_eq!(zone.start_y, 500);

    let shifted = WorkspaceBounds::from_points(&[Point::new(300, 200)]).unwrap();
    assert_eq!(SafeZone::compute(Some(&shifted), &config).start_x, 300);
}

#[test]
fn test_collision_relocates_off_close_pair() {
    let config = LayoutConfig::default();
    let zone = SafeZone { start_x: 100, start_y: 100 };
    let existing = [Point::new(300, 300), Point::new(310, 300)];
    let mut canvas = Canvas::new(&config, zone, &existing);

    let first = canvas.place(Point::new(300, 300));
    let second = canvas.place(Point::new(310, 300));

    assert!(first.relocated);
    assert!(second.relocated);
    for placed in [first.point, second.point] {
        assert!(zone.contains(placed));
    }

    // The two existing points overlap each other; only check the new ones against them
    for new in [first.point, second.point] {
        for old in existing {
            assert!(!config.collides(new, old));
        }
    }
    assert!(!config.collides(first.point, second.point));
}

#[test]
fn test_free_preferred_position_is_kept() {
    let config = LayoutConfig::default();
    let zone = SafeZone { start_x: 100, start_y: 100 };
    let mut canvas = Canvas::new(&config, zone, &[Point::new(100, 100)]);

    let placement = canvas.place(Point::new(500, 100));
    assert_eq!(placement.point, Point::new(500, 100));
    assert!(!placement.relocated);
}

#[test]
fn test_exhausted_search_appends_below_content() {
    let config = LayoutConfig {
        max_search_radius: 0,
        ..Default::default()
    };
    let zone = SafeZone { start_x: 100, start_y: 100 };
    let mut canvas = Canvas::new(&config, zone, &[Point::new(100, 100)]);

    assert!(canvas.search(Point::new(100, 100)).is_none());
    let placement = canvas.place(Point::new(100, 100));
    assert_eq!(placement.point, Point::new(100, 180));
    assert!(placement.relocated);
    assert!(canvas.is_free(Point::new(100, 300)));
}

#[test]
fn test_far_away_content_does_not_overflow() {
    let config = LayoutConfig::default();
    let existing = [Point::new(i64::MAX, i64::MAX), Point::new(i64::MIN, 0)];

    let bounds = WorkspaceBounds::from_points(&existing).unwrap();
    let zone = SafeZone::compute(Some(&bounds), &config);
    assert_eq!(zone.start_y, i64::MAX);
    assert!(!config.collides(existing[0], existing[1]));

    let mut canvas = Canvas::new(&config, zone, &existing);
    let placement = canvas.place(Point::new(100, 100));
    assert!(zone.contains(placement.point));
}

#[test]
fn test_every_strategy_survives_huge_coordinates() {
    let engine = LayoutEngine::default();
    let existing = [Point::new(i64::MAX, i64::MAX)];
    let nodes = vec![node("a").wired_to(["b"]), node("b"), node("c")];

    for strategy in [
        LayoutStrategy::CollisionFree,
        LayoutStrategy::Grid,
        LayoutStrategy::DagreLr,
        LayoutStrategy::SemanticArticle,
    ] {
        let result = engine.layout(&existing, &nodes, strategy);
        assert_eq!(result.positions.len(), 3, "{:?}", strategy);
    }
}

// ============================================================================
// Strategies
// ============================================================================

#[test]
fn test_collision_free_wraps_rows() {
    let engine = LayoutEngine::default();
    let nodes: Vec<_> = (0..7).map(|i| node(&format!("n{}", i))).collect();

    let result = engine.layout(&[], &nodes, LayoutStrategy::CollisionFree);

    let xs: Vec<i64> = result.positions.iter().map(|p| p.x).collect();
    let ys: Vec<i64> = result.positions.iter().map(|p| p.y).collect();
    assert_eq!(xs, vec![100, 300, 500, 700, 900, 100, 300]);
    assert_eq!(ys, vec![100, 100, 100, 100, 100, 180, 180]);
    assert_eq!(result.stats.relocated, 0);
    assert_eq!(result.stats.applied, LayoutStrategy::CollisionFree);
}

#[test]
fn test_grid_is_deterministic() {
    let engine = LayoutEngine::default();
    let existing = [Point::new(120, 80), Point::new(320, 80), Point::new(200, 160)];
    let nodes: Vec<_> = (0..9).map(|i| node(&format!("g{}", i))).collect();

    let first = engine.layout(&existing, &nodes, LayoutStrategy::Grid);
    let second = engine.layout(&existing, &nodes, LayoutStrategy::Grid);

    assert_eq!(first.positions, second.positions);
    assert_eq!(position(&first, "g6").y, first.stats.safe_zone.start_y + 80);
}

#[test]
fn test_every_strategy_avoids_dense_canvas() {
    let engine = LayoutEngine::default();
    // New nodes must clear the existing block and each other
    let existing: Vec<Point> = (0..6)
        .flat_map(|row| (0..6).map(move |col| Point::new(100 + col * 150, 100 + row * 55)))
        .collect();
    let nodes = vec![
        LayoutNode::new("a", "inject").wired_to(["b"]),
        node("b").wired_to(["c", "d"]),
        node("c").wired_to(["e"]),
        node("d").wired_to(["e"]),
        LayoutNode::new("e", "debug"),
        node("f"),
        node("g"),
        node("h"),
    ];

    for strategy in [
        LayoutStrategy::CollisionFree,
        LayoutStrategy::Grid,
        LayoutStrategy::DagreLr,
        LayoutStrategy::SemanticArticle,
        LayoutStrategy::Auto,
    ] {
        let result = engine.layout(&existing, &nodes, strategy);
        assert_eq!(result.positions.len(), nodes.len());
        assert_no_overlaps(engine.config(), &all_points(&[], &result));
        for placed in &result.positions {
            for old in &existing {
                assert!(
                    !engine.config().collides(Point::new(placed.x, placed.y), *old),
                    "{:?}: {} overlaps existing {:?}",
                    strategy,
                    placed.id,
                    old
                );
            }
        }
    }
}

#[test]
fn test_chain_layout_rows() {
    let engine = LayoutEngine::default();
    let nodes = vec![
        node("A").wired_to(["B"]),
        node("B").wired_to(["C"]),
        node("C"),
        node("D"),
    ];

    let result = engine.layout(&[], &nodes, LayoutStrategy::SemanticArticle);

    let (a, b, c, d) = (
        position(&result, "A"),
        position(&result, "B"),
        position(&result, "C"),
        position(&result, "D"),
    );
    assert_eq!(a.y, b.y);
    assert_eq!(b.y, c.y);
    assert!(a.x < b.x && b.x < c.x);
    assert!(d.y > a.y);
    assert_eq!(d.x, result.stats.safe_zone.start_x);
    assert_eq!(result.stats.rows, Some(2));
}

#[test]
fn test_chain_branch_targets_end_the_chain() {
    let nodes = vec![
        LayoutNode::new("in", "http in").wired_to(["switch"]),
        node("switch").wired_to(["left"]).wired_to(["right"]),
        node("left").wired_to(["after"]),
        node("right"),
        node("after"),
    ];
    let graph = ConnectionGraph::build(&nodes);
    let chains = graph.chains(&nodes);

    assert_eq!(chains, vec![vec![0, 1, 2, 3], vec![4]]);
}

#[test]
fn test_trigger_node_starts_its_own_chain() {
    let nodes = vec![
        node("fn").wired_to(["tick"]),
        LayoutNode::new("tick", "inject").wired_to(["out"]),
        node("out"),
    ];
    let graph = ConnectionGraph::build(&nodes);

    // "fn" comes first and traces through "tick" before tick's own turn
    assert_eq!(graph.chains(&nodes), vec![vec![0, 1, 2]]);

    let reordered = vec![nodes[1].clone(), nodes[2].clone(), nodes[0].clone()];
    let graph = ConnectionGraph::build(&reordered);
    assert_eq!(graph.chains(&reordered), vec![vec![0, 1], vec![2]]);
}

#[test]
fn test_hierarchical_uses_longest_path() {
    let engine = LayoutEngine::default();
    let nodes = vec![
        node("a").wired_to(["b", "d"]),
        node("b").wired_to(["c"]),
        node("c").wired_to(["d"]),
        node("d"),
    ];

    let layers = ConnectionGraph::build(&nodes).layers().unwrap();
    assert_eq!(layers, vec![0, 1, 2, 3]);

    let result = engine.layout(&[], &nodes, LayoutStrategy::DagreLr);
    assert_eq!(result.stats.applied, LayoutStrategy::DagreLr);
    assert_eq!(result.stats.layers, Some(4));
    let xs: Vec<i64> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| position(&result, id).x)
        .collect();
    assert_eq!(xs, vec![100, 320, 540, 760]);
}

#[test]
fn test_hierarchical_unreachable_nodes_trail() {
    let nodes = vec![
        node("root").wired_to(["leaf"]),
        node("leaf"),
        node("x").wired_to(["y"]),
        node("y").wired_to(["x"]),
    ];

    let layers = ConnectionGraph::build(&nodes).layers().unwrap();
    assert_eq!(layers, vec![0, 1, 2, 2]);
}

#[test]
fn test_hierarchical_closed_loop_keeps_strategy() {
    let engine = LayoutEngine::default();
    let nodes = vec![node("a").wired_to(["b"]), node("b").wired_to(["a"])];

    assert_eq!(ConnectionGraph::build(&nodes).layers().unwrap(), vec![0, 1]);

    let result = engine.layout(&[], &nodes, LayoutStrategy::DagreLr);
    assert_eq!(result.stats.requested, LayoutStrategy::DagreLr);
    assert_eq!(result.stats.applied, LayoutStrategy::DagreLr);
    assert!(result.stats.fallback.is_none());
    assert_eq!(result.positions.len(), 2);
}

#[test]
fn test_hierarchical_retry_loop_is_layered() {
    let engine = LayoutEngine::default();
    let nodes = vec![
        node("in").wired_to(["work"]),
        node("work").wired_to(["retry", "out"]),
        node("retry").wired_to(["work"]),
        node("out"),
    ];

    let layers = ConnectionGraph::build(&nodes).layers().unwrap();
    assert_eq!(layers, vec![0, 1, 2, 2]);

    let result = engine.layout(&[], &nodes, LayoutStrategy::DagreLr);
    assert_eq!(result.stats.applied, LayoutStrategy::DagreLr);
    assert!(result.stats.fallback.is_none());
    assert_eq!(result.stats.layers, Some(3));
    assert_eq!(position(&result, "in").x, 100);
    assert_eq!(position(&result, "work").x, 320);
    assert_eq!(position(&result, "retry").x, 540);
    assert_eq!(position(&result, "out").x, 540);
    assert_no_overlaps(engine.config(), &all_points(&[], &result));
}

#[test]
fn test_auto_picks_by_wiring() {
    let engine = LayoutEngine::default();

    let loose = vec![node("a"), node("b")];
    let result = engine.layout(&[], &loose, LayoutStrategy::Auto);
    assert_eq!(result.stats.applied, LayoutStrategy::CollisionFree);

    let wired = vec![node("a").wired_to(["b"]), node("b")];
    let result = engine.layout(&[], &wired, LayoutStrategy::Auto);
    assert_eq!(result.stats.applied, LayoutStrategy::SemanticArticle);
}

#[test]
fn test_wires_outside_batch_are_ignored() {
    let nodes = vec![node("a").wired_to(["existing-node", "a"]), node("b")];
    let graph = ConnectionGraph::build(&nodes);
    assert!(!graph.has_edges());
    assert_eq!(graph.roots(), vec![0, 1]);
}

#[test]
fn test_strategy_wire_names() {
    let names: Vec<String> = [
        LayoutStrategy::CollisionFree,
        LayoutStrategy::DagreLr,
        LayoutStrategy::Grid,
        LayoutStrategy::SemanticArticle,
        LayoutStrategy::Auto,
    ]
    .iter()
    .map(|s| serde_json::to_value(s).unwrap().as_str().unwrap().to_string())
    .collect();

    assert_eq!(
        names,
        vec!["collision_free", "dagre_lr", "grid", "semantic_article", "auto"]
    );
}
