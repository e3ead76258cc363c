use super::shape::Aabb;

/// Sweep-and-prune along the x axis.
///
/// The sorted order is kept between steps; bodies barely move per step so
/// the insertion sort is close to linear.
#[derive(Debug, Clone, Default)]
pub struct SweepAndPrune {
    order: Vec<usize>,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate pairs `(low, high)` whose boxes overlap on every axis.
    /// `None` slots are ignored.
    pub fn find_pairs(&mut self, aabbs: &[Option<Aabb>]) -> Vec<(usize, usize)> {
        self.order
            .retain(|&i| matches!(aabbs.get(i), Some(Some(_))));

        let mut tracked = vec![false; aabbs.len()];
        for &i in &self.order {
            tracked[i] = true;
        }
        for (i, aabb) in aabbs.iter().enumerate() {
            if aabb.is_some() && !tracked[i] {
                self.order.push(i);
            }
        }

        let min_x = |i: usize| aabbs[i].map_or(f32::INFINITY, |a| a.min.x);
        for i in 1..self.order.len() {
            let mut j = i;
            while j > 0 && min_x(self.order[j - 1]) > min_x(self.order[j]) {
                self.order.swap(j - 1, j);
                j -= 1;
            }
        }

        let mut pairs = Vec::new();
        for (pos, &i) in self.order.iter().enumerate() {
            let Some(a) = aabbs[i] else { continue };
            for &j in &self.order[pos + 1..] {
                let Some(b) = aabbs[j] else { continue };
                if b.min.x > a.max.x {
                    break;
                }
                if a.overlaps(&b) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
        }
        pairs
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
