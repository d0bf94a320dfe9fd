//! Ember spring chain: a rope of spheres hanging from a fixed anchor.
//!
//! Demonstrates:
//!   1. Building a per-frame arena
//!   2. Creating an arena-backed ConstraintSolver
//!   3. Connecting bodies with springs at offset anchors
//!   4. Stepping the simulation and reading debug segments
//!   5. Tearing the whole scene down with a single arena reset
//!
//! Run with:
//!   RUST_LOG=debug cargo run -p ember --example spring_chain

use ember::prelude::*;

const LINKS: usize = 6;
const STEPS: usize = 240;

fn build_chain<'a>(solver: &mut ConstraintSolver<'a>) -> Result<Vec<BodyId>, PhysicsError> {
    let mut ids = vec![solver.add_body(RigidBody::fixed(Vec3::ZERO))];
    for i in 1..=LINKS {
        let centre = Vec3::new(i as f32 * 0.5, -(i as f32), 0.0);
        let id = solver.add_body(RigidBody::sphere(centre, 1.0, 0.2)?);
        let prev = ids[ids.len() - 1];
        let top_of_link = centre + Vec3::new(0.0, 0.2, 0.0);
        let bottom_of_prev = solver.body(prev)?.position - Vec3::new(0.0, 0.2, 0.0);
        solver.add_spring_with_anchors(prev, id, bottom_of_prev, top_of_link, 0.6, 0.02)?;
        ids.push(id);
    }
    Ok(ids)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut arena = Arena::new(ArenaConfig::new(16 * 1024))?;

    for round in 0..2 {
        {
            let mut solver = ConstraintSolver::new_in(SolverConfig::default(), &arena)?;
            let ids = build_chain(&mut solver)?;
            let tip = ids[ids.len() - 1];
            solver.body_mut(tip)?.linear_velocity = Vec3::new(2.0, 0.0, 0.0);

            for step in 0..STEPS {
                solver.step();
                if step % 60 == 0 {
                    let p = solver.body(tip)?.position;
                    log::info!(
                        "round {round} step {step:3}: tip at ({:.3}, {:.3}, {:.3})",
                        p.x,
                        p.y,
                        p.z
                    );
                }
            }

            for (i, (a, b)) in solver.debug_segments().iter().enumerate() {
                log::info!("segment {i}: |ab| = {:.3}", (*b - *a).length());
            }
            log::info!(
                "arena holds {} bytes in {} segments",
                arena.used_bytes(),
                arena.segment_count()
            );
        }
        arena.reset();
    }

    Ok(())
}
