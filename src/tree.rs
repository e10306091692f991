use ratatui::prelude::Rect;

use crate::pane::Pane;
use crate::types::{AppState, Node, SplitKind};

pub fn node_at_mut<'a>(node: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    let mut cur = node;
    for &idx in path {
        match cur {
            Node::Split { children, .. } => cur = children.get_mut(idx)?,
            Node::Leaf(_) => return None,
        }
    }
    Some(cur)
}

pub fn pane_at_mut<'a>(node: &'a mut Node, path: &[usize]) -> Option<&'a mut Pane> {
    match node_at_mut(node, path) {
        Some(Node::Leaf(p)) => Some(p),
        _ => None,
    }
}

pub fn pane_at<'a>(node: &'a Node, path: &[usize]) -> Option<&'a Pane> {
    let mut cur = node;
    for &idx in path {
        match cur {
            Node::Split { children, .. } => cur = children.get(idx)?,
            Node::Leaf(_) => return None,
        }
    }
    match cur {
        Node::Leaf(p) => Some(p),
        _ => None,
    }
}

pub fn active_pane_mut<'a>(app: &'a mut AppState) -> Option<&'a mut Pane> {
    let path = app.active_path.clone();
    pane_at_mut(&mut app.root, &path)
}

/// Split orientation for a leaf of the given rectangle: wide leaves split
/// into side-by-side columns, everything else stacks.
pub fn heuristic_kind(rect: Rect) -> SplitKind {
    if rect.width > 3 * rect.height {
        SplitKind::Vertical
    } else {
        SplitKind::Horizontal
    }
}

/// Promote the leaf at `path` to a split: the existing pane becomes child 0,
/// `new_pane` child 1. Returns the path of the new leaf.
pub fn split_leaf(root: &mut Node, path: &[usize], kind: SplitKind, new_pane: Pane) -> Vec<usize> {
    if let Some(target) = node_at_mut(root, path) {
        if matches!(target, Node::Leaf(_)) {
            let old = std::mem::replace(
                target,
                Node::Split { kind, ratio: 0.5, children: Vec::new() },
            );
            if let Node::Split { children, .. } = target {
                children.push(old);
                children.push(Node::Leaf(new_pane));
            }
        }
    }
    let mut new_path = path.to_vec();
    new_path.push(1);
    new_path
}

/// Unlink the leaf at `path` and promote its sibling in place: the sibling
/// replaces the parent split (or becomes the root). Returns the removed
/// pane; `None` when `path` does not name a non-root leaf.
pub fn detach_leaf(root: &mut Node, path: &[usize]) -> Option<Pane> {
    if path.is_empty() {
        return None; // the root leaf cannot be detached
    }
    let (parent_path, leaf_idx) = (&path[..path.len() - 1], path[path.len() - 1]);
    let parent = node_at_mut(root, parent_path)?;
    match parent {
        Node::Split { children, .. }
            if children.len() == 2 && matches!(children.get(leaf_idx), Some(Node::Leaf(_))) => {}
        _ => return None,
    }
    let old = std::mem::replace(
        parent,
        Node::Split { kind: SplitKind::Horizontal, ratio: 0.5, children: Vec::new() },
    );
    let Node::Split { mut children, .. } = old else { return None };
    let removed = children.remove(leaf_idx);
    let sibling = children.remove(0);
    *parent = sibling;
    match removed {
        Node::Leaf(pane) => Some(pane),
        Node::Split { .. } => None,
    }
}

/// Path of the first leaf reachable by always descending child 0.
pub fn first_leaf_path(node: &Node) -> Vec<usize> {
    let mut path = Vec::new();
    let mut cur = node;
    while let Node::Split { children, .. } = cur {
        path.push(0);
        cur = &children[0];
    }
    path
}

/// In-order paths of every leaf.
pub fn leaf_paths(node: &Node) -> Vec<Vec<usize>> {
    fn rec(node: &Node, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        match node {
            Node::Leaf(_) => out.push(path.clone()),
            Node::Split { children, .. } => {
                for (i, child) in children.iter().enumerate() {
                    path.push(i);
                    rec(child, path, out);
                    path.pop();
                }
            }
        }
    }
    let mut out = Vec::new();
    rec(node, &mut Vec::new(), &mut out);
    out
}

pub fn find_pane_mut(node: &mut Node, id: u32) -> Option<&mut Pane> {
    match node {
        Node::Leaf(p) => (p.id == id).then_some(p),
        Node::Split { children, .. } => children.iter_mut().find_map(|c| find_pane_mut(c, id)),
    }
}

pub fn leaf_count(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 1,
        Node::Split { children, .. } => children.iter().map(leaf_count).sum(),
    }
}

pub fn for_each_pane_mut(node: &mut Node, f: &mut impl FnMut(&mut Pane)) {
    match node {
        Node::Leaf(p) => f(p),
        Node::Split { children, .. } => {
            for child in children.iter_mut() {
                for_each_pane_mut(child, f);
            }
        }
    }
}

/// Split `area` for a two-child split, reserving one cell between the
/// children for the divider. Returns (child 0, child 1, divider).
pub fn split_rects(kind: SplitKind, ratio: f32, area: Rect) -> (Rect, Rect, Rect) {
    let ratio = ratio.clamp(0.05, 0.95);
    match kind {
        SplitKind::Vertical => {
            let aw = (area.width as f32 * ratio).floor() as u16;
            let a = Rect { width: aw, ..area };
            let divider = Rect { x: area.x + aw, width: area.width.saturating_sub(aw).min(1), ..area };
            let b = Rect {
                x: area.x + aw + 1,
                width: area.width.saturating_sub(aw + 1),
                ..area
            };
            (a, b, divider)
        }
        SplitKind::Horizontal => {
            let ah = (area.height as f32 * ratio).floor() as u16;
            let a = Rect { height: ah, ..area };
            let divider = Rect { y: area.y + ah, height: area.height.saturating_sub(ah).min(1), ..area };
            let b = Rect {
                y: area.y + ah + 1,
                height: area.height.saturating_sub(ah + 1),
                ..area
            };
            (a, b, divider)
        }
    }
}

/// Rectangles of every leaf, in-order, for the given total area.
pub fn compute_rects(node: &Node, area: Rect, out: &mut Vec<(Vec<usize>, Rect)>) {
    fn rec(node: &Node, area: Rect, path: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, Rect)>) {
        match node {
            Node::Leaf(_) => out.push((path.clone(), area)),
            Node::Split { kind, ratio, children } => {
                let (a, b, _) = split_rects(*kind, *ratio, area);
                let rects = [a, b];
                for (i, child) in children.iter().enumerate() {
                    path.push(i);
                    rec(child, rects.get(i).copied().unwrap_or(area), path, out);
                    path.pop();
                }
            }
        }
    }
    let mut path = Vec::new();
    rec(node, area, &mut path, out);
}

/// Rect of a single leaf, if it exists.
pub fn rect_of(node: &Node, area: Rect, path: &[usize]) -> Option<Rect> {
    let mut rects = Vec::new();
    compute_rects(node, area, &mut rects);
    rects.into_iter().find(|(p, _)| p == path).map(|(_, r)| r)
}

/// After any structural change or terminal resize: recompute rectangles
/// root-down and resize every leaf's grid to its rectangle.
pub fn resize_all(app: &mut AppState) {
    let area = app.last_area;
    if area.width == 0 || area.height == 0 {
        return;
    }
    let mut rects = Vec::new();
    compute_rects(&app.root, area, &mut rects);
    for (path, rect) in rects {
        if let Some(pane) = pane_at_mut(&mut app.root, &path) {
            pane.resize(rect.width as usize, rect.height as usize);
        }
    }
}
