pub mod collision;
pub mod forces;
pub mod integration;
pub mod obstacle;

pub use collision::{collide_particle, solve_collisions};
pub use forces::{solve_chain_forces, spring_force, SpringParams};
pub use integration::{integrate, SolverKind};
pub use obstacle::{Obstacle, ObstacleCache, ObstacleKind, PlanePrimitive, SpherePrimitive, TrianglePrimitive};
