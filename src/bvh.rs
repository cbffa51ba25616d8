use crate::aabb::Aabb;
use crate::ray::{HitRecord, PrimIndex, Ray};
use crate::triangle::Triangle;

enum NodeKind {
    Leaf(PrimIndex),
    Interior { left: u32, right: u32 },
}

struct Node {
    bbox: Aabb,
    kind: NodeKind,
}

/// An arena-backed bounding volume hierarchy over a flat triangle slice.
/// Nodes are indexed by `u32` into `Vec<Node>` rather than linked through
/// `Box`/pointers, so the whole tree is one contiguous allocation with no
/// per-node heap churn.
///
/// Built by recursive median split on the widest axis of the current node's
/// bounding box. Traversal visits the nearer child box first and can skip
/// the farther subtree entirely when the nearer subtree already produced a
/// closer hit than the farther box's own near-t.
pub struct Bvh {
    nodes: Vec<Node>,
    root: Option<u32>,
}

impl Bvh {
    /// Builds a BVH over `triangles`. An empty slice produces a BVH with
    /// no root node, whose `hit` always returns `None` rather than panicking.
    pub fn build(triangles: &[Triangle]) -> Self {
        if triangles.is_empty() {
            return Self { nodes: Vec::new(), root: None };
        }
        let mut indices: Vec<u32> = (0..triangles.len() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * triangles.len());
        let root = Self::build_recursive(&mut nodes, &mut indices, triangles);
        Self { nodes, root: Some(root) }
    }

    fn build_recursive(nodes: &mut Vec<Node>, indices: &mut [u32], triangles: &[Triangle]) -> u32 {
        if indices.len() == 1 {
            let bbox = triangles[indices[0] as usize].bbox();
            nodes.push(Node {
                bbox,
                kind: NodeKind::Leaf(indices[0]),
            });
            return (nodes.len() - 1) as u32;
        }

        let mut bbox = Aabb::empty();
        for &i in indices.iter() {
            bbox = Aabb::union(&bbox, &triangles[i as usize].bbox());
        }
        let axis = bbox.longest_axis();
        indices.sort_by(|&a, &b| {
            let ca = triangles[a as usize].bbox().min[axis];
            let cb = triangles[b as usize].bbox().min[axis];
            ca.partial_cmp(&cb).expect("triangle bbox coordinate is NaN")
        });

        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = Self::build_recursive(nodes, left_indices, triangles);
        let right = Self::build_recursive(nodes, right_indices, triangles);
        let bbox = Aabb::union(&nodes[left as usize].bbox, &nodes[right as usize].bbox);
        nodes.push(Node {
            bbox,
            kind: NodeKind::Interior { left, right },
        });
        (nodes.len() - 1) as u32
    }

    pub fn hit(&self, triangles: &[Triangle], ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let root = self.root?;
        self.hit_node(root, triangles, ray, t_min, t_max)
    }

    fn hit_node(
        &self,
        node_idx: u32,
        triangles: &[Triangle],
        ray: &Ray,
        t_min: f32,
        t_max: f32,
    ) -> Option<HitRecord> {
        let node = &self.nodes[node_idx as usize];
        node.bbox.hit(ray, t_min, t_max)?;

        match node.kind {
            NodeKind::Leaf(prim) => triangles[prim as usize].hit(ray, t_min, t_max, prim),
            NodeKind::Interior { left, right } => {
                let left_t = self.nodes[left as usize].bbox.hit(ray, t_min, t_max);
                let right_t = self.nodes[right as usize].bbox.hit(ray, t_min, t_max);

                let (near, far) = match (left_t, right_t) {
                    (Some(lt), Some(rt)) if lt <= rt => (left, Some((right, rt))),
                    (Some(lt), Some(_)) => (right, Some((left, lt))),
                    (Some(_), None) => (left, None),
                    (None, Some(_)) => (right, None),
                    (None, None) => return None,
                };

                let near_hit = self.hit_node(near, triangles, ray, t_min, t_max);
                let Some((far_idx, far_box_t)) = far else {
                    return near_hit;
                };
                // The farther child's box can't contain anything closer than
                // its own near-t, so a near-hit already beating that bound
                // makes descending into the far subtree pointless.
                if let Some(h) = &near_hit {
                    if h.t <= far_box_t {
                        return near_hit;
                    }
                }
                let far_hit = self.hit_node(far_idx, triangles, ray, t_min, t_max);
                match (near_hit, far_hit) {
                    (Some(a), Some(b)) => Some(if a.t < b.t { a } else { b }),
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::math::{Point3, Vec3};

    fn grid_of_triangles(n: usize) -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..n {
            let x = i as f32 * 2.0;
            tris.push(Triangle::new(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
                0,
            ));
        }
        tris
    }

    fn brute_force_hit(triangles: &[Triangle], ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let mut best: Option<HitRecord> = None;
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(h) = tri.hit(ray, t_min, best.as_ref().map_or(t_max, |b| b.t), i as u32) {
                best = Some(h);
            }
        }
        best
    }

    #[test]
    fn bvh_agrees_with_brute_force_on_a_scattered_grid() {
        let tris = grid_of_triangles(40);
        let bvh = Bvh::build(&tris);
        for i in 0..40 {
            let x = i as f32 * 2.0 + 0.25;
            let ray = Ray::new(Point3::new(x, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
            let bvh_hit = bvh.hit(&tris, &ray, 0.0, f32::INFINITY);
            let brute_hit = brute_force_hit(&tris, &ray, 0.0, f32::INFINITY);
            match (bvh_hit, brute_hit) {
                (Some(a), Some(b)) => assert_relative_eq!(a.t, b.t, epsilon = 1e-3),
                (None, None) => {}
                other => panic!("BVH and brute force disagree: {other:?}"),
            }
        }
    }

    #[test]
    fn bvh_miss_when_no_triangle_is_in_the_ray_path() {
        let tris = grid_of_triangles(10);
        let bvh = Bvh::build(&tris);
        let ray = Ray::new(Point3::new(1000.0, 1000.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&tris, &ray, 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn bvh_over_zero_triangles_always_misses() {
        let tris: Vec<Triangle> = Vec::new();
        let bvh = Bvh::build(&tris);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&tris, &ray, 0.0, f32::INFINITY).is_none());
    }
}
