//! Sprite containment graph.
//!
//! Sprites are supposed to form a DAG (sprite → child sprites through their
//! instances). Nothing upstream guarantees it, so datasets are checked here
//! and the compositor guards its own recursion as well.

use crate::id::CharId;
use crate::model::{Shape, Sprite};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;

/// Build the sprite → child-sprite graph. Edges to non-sprite ids are dropped,
/// and so are edges to ids that are also shapes: those resolve to the shape.
pub fn sprite_graph(shapes: &[Shape], sprites: &[Sprite]) -> DiGraphMap<CharId, ()> {
    let shape_ids: HashSet<CharId> = shapes.iter().map(|s| s.char_id).collect();
    let mut graph = DiGraphMap::new();
    for sprite in sprites {
        graph.add_node(sprite.sprite_id);
    }
    for sprite in sprites {
        for inst in sprite.frames.iter().flatten() {
            if graph.contains_node(inst.char_id) && !shape_ids.contains(&inst.char_id) {
                graph.add_edge(sprite.sprite_id, inst.char_id, ());
            }
        }
    }
    graph
}

/// Every set of sprites that (in)directly contain each other.
///
/// Each cycle is sorted by id; the list is sorted by its first id.
pub fn sprite_cycles(shapes: &[Shape], sprites: &[Sprite]) -> Vec<Vec<CharId>> {
    let graph = sprite_graph(shapes, sprites);
    let mut cycles: Vec<Vec<CharId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    cycles.sort();
    cycles
}
