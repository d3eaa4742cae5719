use std::collections::HashMap;

use ndarray::Array2;

use crate::region::PixelRegion;

/// A connected foreground region of a binary mask.
#[derive(Clone, Debug)]
pub struct Component {
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box as a half-open region.
    pub bbox: PixelRegion,
}

impl Component {
    /// Long side over short side of the bounding box.
    pub fn aspect_ratio(&self) -> f32 {
        let w = self.bbox.width().max(1) as f32;
        let h = self.bbox.height().max(1) as f32;
        w.max(h) / w.min(h)
    }

    /// Share of the bounding box covered by the component.
    pub fn fill_ratio(&self) -> f32 {
        self.area as f32 / self.bbox.area().max(1) as f32
    }

    pub fn touches_border(&self, width: usize, height: usize) -> bool {
        self.bbox.ulx == 0 || self.bbox.uly == 0 || self.bbox.lrx >= width || self.bbox.lry >= height
    }
}

/// Two-pass 4-connected labeling with union-find.
///
/// Returns components sorted by area, largest first.
pub fn connected_components(mask: &Array2<bool>) -> Vec<Component> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    // parent[0] is unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            let up = if row > 0 { labels[[row - 1, col]] } else { 0 };
            let left = if col > 0 { labels[[row, col - 1]] } else { 0 };

            labels[[row, col]] = match (up, left) {
                (0, 0) => {
                    let label = parent.len() as u32;
                    parent.push(label);
                    label
                }
                (l, 0) | (0, l) => l,
                (a, b) => {
                    union(&mut parent, a, b);
                    a.min(b)
                }
            };
        }
    }

    let mut by_root: HashMap<u32, Component> = HashMap::new();
    for row in 0..h {
        for col in 0..w {
            let label = labels[[row, col]];
            if label == 0 {
                continue;
            }
            let root = find(&parent, label);
            let entry = by_root.entry(root).or_insert(Component {
                area: 0,
                bbox: PixelRegion::new(col, row, col + 1, row + 1),
            });
            entry.area += 1;
            entry.bbox.ulx = entry.bbox.ulx.min(col);
            entry.bbox.uly = entry.bbox.uly.min(row);
            entry.bbox.lrx = entry.bbox.lrx.max(col + 1);
            entry.bbox.lry = entry.bbox.lry.max(row + 1);
        }
    }

    let mut components: Vec<Component> = by_root.into_values().collect();
    components.sort_unstable_by(|a, b| b.area.cmp(&a.area));
    components
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
