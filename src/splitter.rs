//! Proportional sizing of splitter children under minimum-size constraints.
//!
//! Sizes are stored in pixels rather than ratios: a pixel vector can be re-derived
//! exactly after any resize, ratios are computed from it on demand.

use egui::Rect;

use crate::container::Orientation;
use crate::error::{DockError, DockResult};
use crate::node::NodeId;

#[derive(Clone, Debug, PartialEq)]
pub struct SplitterSizing {
    orientation: Orientation,
    bar_size: f32,
    bounds: Rect,
    children: Vec<NodeId>,
    container_sizes: Vec<f32>,
}

impl SplitterSizing {
    /// Create a splitter over `children`, splitting `bounds` evenly.
    ///
    /// # Errors
    /// [`DockError::InsufficientChildren`] if fewer than two children are given.
    pub fn new(
        orientation: Orientation,
        bar_size: f32,
        children: Vec<NodeId>,
        bounds: Rect,
    ) -> DockResult<Self> {
        if children.len() < 2 {
            return Err(DockError::InsufficientChildren(children.len()));
        }
        let mut sizing = Self {
            orientation,
            bar_size: bar_size.max(0.0),
            bounds,
            children,
            container_sizes: Vec::new(),
        };
        sizing.distribute_evenly();
        Ok(sizing)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn bar_size(&self) -> f32 {
        self.bar_size
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Change the bounds without touching the stored sizes.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn container_sizes(&self) -> &[f32] {
        &self.container_sizes
    }

    pub fn total_bar_size(&self) -> f32 {
        self.bar_size * self.children.len().saturating_sub(1) as f32
    }

    /// Space left for children along the axis once the bars are subtracted.
    pub fn available_size(&self) -> f32 {
        (self.orientation.varying(self.bounds.size()) - self.total_bar_size()).max(0.0)
    }

    /// Rescale every child proportionally to fit `rect`.
    pub fn resize(&mut self, rect: Rect, min_sizes: &[f32]) -> Vec<Rect> {
        self.bounds = rect;
        let total: f32 = self.container_sizes.iter().sum();
        if total <= f32::EPSILON {
            self.distribute_evenly();
        } else {
            let scale = self.available_size() / total;
            for size in &mut self.container_sizes {
                *size *= scale;
            }
        }
        log::trace!(
            "splitter resize to {rect:?}: sizes={:?}",
            self.container_sizes
        );
        self.update_layout(min_sizes)
    }

    /// Current share of the available space per child.
    pub fn ratios(&self) -> Vec<f32> {
        let available = self.available_size();
        if available <= f32::EPSILON {
            let n = self.container_sizes.len().max(1) as f32;
            return vec![1.0 / n; self.container_sizes.len()];
        }
        self.container_sizes
            .iter()
            .map(|size| size / available)
            .collect()
    }

    /// Apply a ratio vector. The ratios are expected to sum to 1.
    pub fn set_ratios(&mut self, ratios: &[f32], min_sizes: &[f32]) -> Vec<Rect> {
        let available = self.available_size();
        self.container_sizes = (0..self.children.len())
            .map(|i| ratios.get(i).copied().unwrap_or(0.0).max(0.0) * available)
            .collect();
        self.update_layout(min_sizes)
    }

    /// Give `child` the share `ratio`, splitting the rest evenly among the others.
    ///
    /// Returns `None` if `child` is not managed by this splitter.
    pub fn set_child_ratio(
        &mut self,
        child: NodeId,
        ratio: f32,
        min_sizes: &[f32],
    ) -> Option<Vec<Rect>> {
        let index = self.children.iter().position(|&c| c == child)?;
        let ratio = ratio.clamp(0.0, 1.0);
        let others = (self.children.len() - 1) as f32;
        let ratios: Vec<f32> = (0..self.children.len())
            .map(|i| if i == index { ratio } else { (1.0 - ratio) / others })
            .collect();
        Some(self.set_ratios(&ratios, min_sizes))
    }

    /// Adopt a new child list.
    ///
    /// Keeps the pixel sizes when the child count is unchanged, otherwise splits evenly.
    ///
    /// # Errors
    /// [`DockError::InsufficientChildren`] if fewer than two children are given.
    pub fn perform_layout(
        &mut self,
        children: &[NodeId],
        min_sizes: &[f32],
        relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>> {
        if self.children == children && !relayout_even_if_equal {
            return Ok(None);
        }
        if children.len() < 2 {
            return Err(DockError::InsufficientChildren(children.len()));
        }

        let keep_sizes = children.len() == self.container_sizes.len();
        self.children = children.to_vec();
        if !keep_sizes {
            self.distribute_evenly();
        }
        Ok(Some(self.update_layout(min_sizes)))
    }

    /// Move bar `bar` (between child `bar` and `bar + 1`) by `delta` pixels,
    /// never pushing either neighbour below its minimum.
    pub fn drag_bar(&mut self, bar: usize, delta: f32, min_sizes: &[f32]) -> Option<Vec<Rect>> {
        if bar + 1 >= self.container_sizes.len() {
            return None;
        }
        let prev = self.container_sizes[bar];
        let next = self.container_sizes[bar + 1];
        let lowest = min_of(min_sizes, bar) - prev;
        let highest = next - min_of(min_sizes, bar + 1);
        let delta = if lowest > highest {
            0.0
        } else {
            delta.clamp(lowest, highest)
        };
        self.container_sizes[bar] = prev + delta;
        self.container_sizes[bar + 1] = next - delta;
        Some(self.child_rects())
    }

    /// One rect per child: running offset along the axis, fixed axis from the bounds.
    pub fn child_rects(&self) -> Vec<Rect> {
        let mut offset = self.orientation.varying_pos(self.bounds.min);
        self.container_sizes
            .iter()
            .map(|&size| {
                let rect = self.orientation.slice(self.bounds, offset, size);
                offset += size + self.bar_size;
                rect
            })
            .collect()
    }

    /// Rects of the bars between the children.
    pub fn bar_rects(&self) -> Vec<Rect> {
        let mut offset = self.orientation.varying_pos(self.bounds.min);
        let count = self.container_sizes.len().saturating_sub(1);
        self.container_sizes[..count]
            .iter()
            .map(|&size| {
                offset += size;
                let rect = self.orientation.slice(self.bounds, offset, self.bar_size);
                offset += self.bar_size;
                rect
            })
            .collect()
    }

    /// Restore pixel sizes from persisted child extents, then fit them to the bounds.
    pub fn load_sizes(&mut self, sizes: &[f32], min_sizes: &[f32]) -> Vec<Rect> {
        if sizes.len() == self.children.len() {
            self.container_sizes = sizes.to_vec();
        }
        let bounds = self.bounds;
        self.resize(bounds, min_sizes)
    }

    pub(crate) fn clear(&mut self) {
        self.children.clear();
        self.container_sizes.clear();
    }

    fn distribute_evenly(&mut self) {
        let count = self.children.len();
        let size = self.available_size() / count.max(1) as f32;
        self.container_sizes = vec![size; count];
    }

    fn update_layout(&mut self, min_sizes: &[f32]) -> Vec<Rect> {
        let available = self.available_size();
        let total_minimum: f32 = (0..self.container_sizes.len())
            .map(|i| min_of(min_sizes, i))
            .sum();

        if total_minimum >= available {
            self.scale_to_minimum_sizes(min_sizes, total_minimum, available);
        } else {
            self.clamp_to_minimum_sizes(min_sizes, available);
        }
        self.child_rects()
    }

    /// Not everyone fits: share the space in proportion to the minimums.
    fn scale_to_minimum_sizes(&mut self, min_sizes: &[f32], total_minimum: f32, available: f32) {
        let count = self.container_sizes.len().max(1) as f32;
        for (i, size) in self.container_sizes.iter_mut().enumerate() {
            *size = if total_minimum > f32::EPSILON {
                min_of(min_sizes, i) / total_minimum * available
            } else {
                available / count
            };
        }
    }

    /// Clamp undersized children up to their minimum and take the excess from the
    /// others in proportion to their size, repeating until nobody is below minimum.
    fn clamp_to_minimum_sizes(&mut self, min_sizes: &[f32], available: f32) {
        let count = self.container_sizes.len();
        let mut clamped = vec![false; count];

        for _ in 0..count {
            let mut clamped_any = false;
            for (i, size) in self.container_sizes.iter_mut().enumerate() {
                let minimum = min_of(min_sizes, i);
                if !clamped[i] && *size < minimum {
                    *size = minimum;
                    clamped[i] = true;
                    clamped_any = true;
                }
            }
            if !clamped_any {
                break;
            }

            let excess = self.container_sizes.iter().sum::<f32>() - available;
            let free: f32 = self
                .container_sizes
                .iter()
                .zip(&clamped)
                .filter(|(_, clamped)| !**clamped)
                .map(|(size, _)| size)
                .sum();
            let free_count = clamped.iter().filter(|c| !**c).count();
            if free_count == 0 {
                break;
            }

            for (size, _) in self
                .container_sizes
                .iter_mut()
                .zip(&clamped)
                .filter(|(_, clamped)| !**clamped)
            {
                if free > f32::EPSILON {
                    *size -= *size / free * excess;
                } else {
                    *size -= excess / free_count as f32;
                }
            }
        }
    }
}

fn min_of(min_sizes: &[f32], index: usize) -> f32 {
    min_sizes.get(index).copied().unwrap_or(0.0).max(0.0)
}
