use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Obstacle descriptor handed in by the scene, already in priority order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    /// Infinite plane `dot(normal, x) + offset = 0`
    Plane { normal: Vec3, offset: f32, friction: f32 },
    Sphere { center: Vec3, radius: f32 },
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
    /// Visual-only obstacle, contributes no collision primitive
    Cube { center: Vec3, half_extents: Vec3 },
}

impl Obstacle {
    /// Plane through `point`; `normal` need not be unit length
    pub fn plane_through(point: Vec3, normal: Vec3, friction: f32) -> Self {
        let normal = normal.normalize();
        Obstacle::Plane {
            normal,
            offset: -normal.dot(point),
            friction,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self {
            Obstacle::Plane { .. } => ObstacleKind::Plane,
            Obstacle::Sphere { .. } => ObstacleKind::Sphere,
            Obstacle::Triangle { .. } => ObstacleKind::Triangle,
            Obstacle::Cube { .. } => ObstacleKind::Cube,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Plane,
    Sphere,
    Triangle,
    Cube,
}

/// Packed plane primitive read by the collision kernel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanePrimitive {
    /// Unit normal
    pub normal: Vec3,
    /// Signed offset, `dot(normal, x) + d = 0`
    pub d: f32,
    /// Tangential velocity damping on contact
    pub friction: f32,
}

impl PlanePrimitive {
    pub fn new(normal: Vec3, d: f32, friction: f32) -> Self {
        Self { normal, d, friction }
    }

    /// Signed distance of `point` to the plane
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Sphere collision slot. Carries no data until sphere response exists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpherePrimitive;

/// Triangle collision slot. Carries no data until triangle response exists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrianglePrimitive;

/// Collision primitives converted from the obstacle list.
///
/// Arrays are sized on the first `update` after construction or
/// `invalidate`; later updates only refill plane values. Growing the obstacle
/// set without invalidating clips the extra planes.
#[derive(Debug, Default)]
pub struct ObstacleCache {
    planes: Vec<PlanePrimitive>,
    spheres: Vec<SpherePrimitive>,
    triangles: Vec<TrianglePrimitive>,
    allocated: bool,
}

impl ObstacleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next `update` to recount and reallocate
    pub fn invalidate(&mut self) {
        self.allocated = false;
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Convert `obstacles` into primitives
    pub fn update(&mut self, obstacles: &[Obstacle]) {
        if !self.allocated {
            self.allocate(obstacles);
        }

        let mut plane_index = 0;
        let mut clipped = 0;
        for obstacle in obstacles {
            if let Obstacle::Plane { normal, offset, friction } = *obstacle {
                match self.planes.get_mut(plane_index) {
                    Some(slot) => *slot = PlanePrimitive::new(normal, offset, friction),
                    None => clipped += 1,
                }
                plane_index += 1;
            }
        }

        if clipped > 0 {
            log::warn!(
                "[ObstacleCache] {} plane(s) ignored, cache sized for {}; call invalidate() after changing obstacles",
                clipped,
                self.planes.len()
            );
        }
    }

    fn allocate(&mut self, obstacles: &[Obstacle]) {
        let (mut planes, mut spheres, mut triangles, mut cubes) = (0, 0, 0, 0);
        for obstacle in obstacles {
            match obstacle.kind() {
                ObstacleKind::Plane => planes += 1,
                ObstacleKind::Sphere => spheres += 1,
                ObstacleKind::Triangle => triangles += 1,
                ObstacleKind::Cube => cubes += 1,
            }
        }

        self.planes = vec![PlanePrimitive::default(); planes];
        self.spheres = vec![SpherePrimitive; spheres];
        self.triangles = vec![TrianglePrimitive; triangles];
        self.allocated = true;

        log::debug!(
            "[ObstacleCache] allocated {} planes, {} spheres, {} triangles ({} cubes skipped)",
            planes,
            spheres,
            triangles,
            cubes
        );
    }

    pub fn planes(&self) -> &[PlanePrimitive] {
        &self.planes
    }

    pub fn spheres(&self) -> &[SpherePrimitive] {
        &self.spheres
    }

    pub fn triangles(&self) -> &[TrianglePrimitive] {
        &self.triangles
    }

    /// Free all primitive arrays. Calling it again is a no-op.
    pub fn release(&mut self) {
        self.planes = Vec::new();
        self.spheres = Vec::new();
        self.triangles = Vec::new();
        self.allocated = false;
    }
}
