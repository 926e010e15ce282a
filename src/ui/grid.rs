use ratatui::layout::{Direction, Rect};

/// Weighted row/column tree. Weights are relative within one level.
#[derive(Debug, Clone)]
pub enum GridNode<T> {
    Leaf(T),
    Split {
        direction: Direction,
        children: Vec<(f64, GridNode<T>)>,
    },
}

/// Vertical stack of rows.
pub fn rows<T>(children: Vec<(f64, GridNode<T>)>) -> GridNode<T> {
    GridNode::Split {
        direction: Direction::Vertical,
        children,
    }
}

/// A row of `weight` whose children are laid out side by side.
pub fn row<T>(weight: f64, cols: Vec<(f64, GridNode<T>)>) -> (f64, GridNode<T>) {
    (
        weight,
        GridNode::Split {
            direction: Direction::Horizontal,
            children: cols,
        },
    )
}

pub fn col<T>(weight: f64, node: GridNode<T>) -> (f64, GridNode<T>) {
    (weight, node)
}

pub fn leaf<T>(item: T) -> GridNode<T> {
    GridNode::Leaf(item)
}

impl<T: Copy> GridNode<T> {
    /// Assign a rectangle to every leaf.
    pub fn layout(&self, area: Rect) -> Vec<(T, Rect)> {
        let mut out = Vec::new();
        self.layout_into(area, &mut out);
        out
    }

    fn layout_into(&self, area: Rect, out: &mut Vec<(T, Rect)>) {
        match self {
            GridNode::Leaf(item) => out.push((*item, area)),
            GridNode::Split {
                direction,
                children,
            } => {
                let weights: Vec<f64> = children.iter().map(|(w, _)| *w).collect();
                let total = match direction {
                    Direction::Horizontal => area.width,
                    Direction::Vertical => area.height,
                };
                let spans = partition(total, &weights);
                for ((start, len), (_, child)) in spans.into_iter().zip(children) {
                    let rect = match direction {
                        Direction::Horizontal => Rect::new(area.x + start, area.y, len, area.height),
                        Direction::Vertical => Rect::new(area.x, area.y + start, area.width, len),
                    };
                    child.layout_into(rect, out);
                }
            }
        }
    }
}

/// Split `total` cells into `(offset, length)` spans proportional to `weights`.
///
/// Boundaries are rounded from cumulative sums so the spans always tile
/// `total` exactly. Non-finite or negative weights count as zero; if every
/// weight is zero the split is even.
pub fn partition(total: u16, weights: &[f64]) -> Vec<(u16, u16)> {
    if weights.is_empty() {
        return Vec::new();
    }
    let clean: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let sum: f64 = clean.iter().sum();
    let clean = if sum > 0.0 {
        clean
    } else {
        vec![1.0; weights.len()]
    };
    let sum: f64 = clean.iter().sum();

    let mut spans = Vec::with_capacity(clean.len());
    let mut acc = 0.0;
    let mut start = 0u16;
    for (i, w) in clean.iter().enumerate() {
        acc += w;
        let end = if i + 1 == clean.len() {
            total
        } else {
            ((acc / sum) * total as f64).round().min(total as f64) as u16
        };
        let end = end.max(start);
        spans.push((start, end - start));
        start = end;
    }
    spans
}
