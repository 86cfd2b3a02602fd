//! Impulse-based contact resolution strategies.

use glam::Vec2;

use crate::{
    collision::contact::ContactManifold,
    core::rigidbody::RigidBody,
    utils::math::{cross, nearly_equal_vec},
};

/// Turns a filled manifold into velocity changes on the two bodies.
///
/// Implementations must leave static bodies untouched and do nothing when the
/// bodies are already separating along the normal.
pub trait CollisionResolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve_collisions(
        &self,
        manifold: &mut ContactManifold,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    );
}

/// Linear-only resolution: treats both bodies as point masses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleResolver;

impl CollisionResolver for SimpleResolver {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn resolve_collisions(
        &self,
        manifold: &mut ContactManifold,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let normal = manifold.normal;
        let relative_velocity = body_b.linear_velocity - body_a.linear_velocity;
        let contact_velocity = relative_velocity.dot(normal);
        if contact_velocity > 0.0 {
            return;
        }

        let inverse_mass_sum = body_a.inverse_mass() + body_b.inverse_mass();
        if inverse_mass_sum <= f32::EPSILON {
            return;
        }

        let restitution = body_a.material.combine(&body_b.material).restitution;
        let j = -(1.0 + restitution) * contact_velocity / inverse_mass_sum;
        let impulse = normal * j;

        apply_linear(body_a, -impulse);
        apply_linear(body_b, impulse);
        manifold.impulse = impulse;
    }
}

/// Resolution with angular response at each contact point.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotationResolver;

impl CollisionResolver for RotationResolver {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn resolve_collisions(
        &self,
        manifold: &mut ContactManifold,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let restitution = body_a.material.combine(&body_b.material).restitution;
        let solved = solve_normal(manifold, body_a, body_b, restitution);
        apply_contact_impulses(&solved.impulses[..solved.count], &solved.arms, body_a, body_b);
        manifold.impulse = solved.total();
    }
}

/// Rotation-aware resolution plus Coulomb friction along the contact tangent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrictionResolver;

impl CollisionResolver for FrictionResolver {
    fn name(&self) -> &'static str {
        "rotation+friction"
    }

    fn resolve_collisions(
        &self,
        manifold: &mut ContactManifold,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let material = body_a.material.combine(&body_b.material);
        let solved = solve_normal(manifold, body_a, body_b, material.restitution);
        apply_contact_impulses(&solved.impulses[..solved.count], &solved.arms, body_a, body_b);
        manifold.impulse = solved.total();

        let count = manifold.contact_count.min(2);
        let mut friction = [Vec2::ZERO; 2];
        let mut arms = [(Vec2::ZERO, Vec2::ZERO); 2];

        for i in 0..count {
            let point = manifold.points[i];
            let ra = point - body_a.position();
            let rb = point - body_b.position();
            arms[i] = (ra, rb);

            let relative_velocity = body_b.velocity_at_point(point) - body_a.velocity_at_point(point);
            let tangent = relative_velocity - manifold.normal * relative_velocity.dot(manifold.normal);
            if nearly_equal_vec(tangent, Vec2::ZERO) {
                continue;
            }
            let tangent = tangent.normalize();

            let denominator = effective_mass_denominator(body_a, body_b, ra, rb, tangent);
            if denominator <= f32::EPSILON {
                continue;
            }
            let jt = -relative_velocity.dot(tangent) / denominator / count as f32;
            let j = solved.magnitudes[i];

            friction[i] = if jt.abs() <= j * material.static_friction {
                tangent * jt
            } else {
                tangent * (-j * material.dynamic_friction)
            };
        }

        apply_contact_impulses(&friction[..count], &arms, body_a, body_b);
    }
}

struct NormalSolution {
    impulses: [Vec2; 2],
    magnitudes: [f32; 2],
    arms: [(Vec2, Vec2); 2],
    count: usize,
}

impl NormalSolution {
    fn total(&self) -> Vec2 {
        self.impulses[..self.count].iter().copied().sum()
    }
}

/// Normal impulse per contact point, split evenly across the contact count.
/// Velocities are read before any impulse is applied.
fn solve_normal(
    manifold: &ContactManifold,
    body_a: &RigidBody,
    body_b: &RigidBody,
    restitution: f32,
) -> NormalSolution {
    let count = manifold.contact_count.min(2);
    let normal = manifold.normal;
    let mut solution = NormalSolution {
        impulses: [Vec2::ZERO; 2],
        magnitudes: [0.0; 2],
        arms: [(Vec2::ZERO, Vec2::ZERO); 2],
        count,
    };

    for i in 0..count {
        let point = manifold.points[i];
        let ra = point - body_a.position();
        let rb = point - body_b.position();
        solution.arms[i] = (ra, rb);

        let relative_velocity = body_b.velocity_at_point(point) - body_a.velocity_at_point(point);
        let contact_velocity = relative_velocity.dot(normal);
        if contact_velocity > 0.0 {
            continue;
        }

        let denominator = effective_mass_denominator(body_a, body_b, ra, rb, normal);
        if denominator <= f32::EPSILON {
            continue;
        }
        let j = -(1.0 + restitution) * contact_velocity / denominator / count as f32;
        solution.magnitudes[i] = j;
        solution.impulses[i] = normal * j;
    }

    solution
}

fn effective_mass_denominator(
    body_a: &RigidBody,
    body_b: &RigidBody,
    ra: Vec2,
    rb: Vec2,
    direction: Vec2,
) -> f32 {
    let ra_perp = Vec2::new(-ra.y, ra.x).dot(direction);
    let rb_perp = Vec2::new(-rb.y, rb.x).dot(direction);
    body_a.inverse_mass()
        + body_b.inverse_mass()
        + ra_perp * ra_perp * body_a.inverse_inertia()
        + rb_perp * rb_perp * body_b.inverse_inertia()
}

fn apply_contact_impulses(
    impulses: &[Vec2],
    arms: &[(Vec2, Vec2); 2],
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
) {
    for (impulse, (ra, rb)) in impulses.iter().zip(arms) {
        if !body_a.is_static() {
            body_a.linear_velocity -= *impulse * body_a.inverse_mass();
            body_a.angular_velocity -= cross(*ra, *impulse) * body_a.inverse_inertia();
        }
        if !body_b.is_static() {
            body_b.linear_velocity += *impulse * body_b.inverse_mass();
            body_b.angular_velocity += cross(*rb, *impulse) * body_b.inverse_inertia();
        }
    }
}

fn apply_linear(body: &mut RigidBody, impulse: Vec2) {
    if body.is_static() {
        return;
    }
    body.linear_velocity += impulse * body.inverse_mass();
}
