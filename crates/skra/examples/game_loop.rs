//! Frame-loop demo — projectiles that retire once they leave the arena.

use std::cell::Cell;
use std::rc::Rc;

use skra::prelude::*;

const POSITION: ComponentTag = ComponentTag::new(1);
const VELOCITY: ComponentTag = ComponentTag::new(2);

const ARENA_RADIUS: f32 = 100.0;

/// World-space position. `Cell` because payloads are shared between the
/// registry's tables and any caller-held handles.
struct Position(Cell<Vec2>);

/// Units per frame. Fixed for a projectile's lifetime, so no `Cell` needed.
struct Velocity(Vec2);

fn main() {
    env_logger::init();

    let mut registry = Registry::new();
    spawn_projectiles(&mut registry, 32);

    for frame in 1..=120 {
        step(&mut registry);
        if frame % 30 == 0 {
            println!(
                "frame {frame:3}: {} projectiles in flight",
                registry.entity_count()
            );
        }
    }
}

/// Launch `count` projectiles from the origin, fanned around a full turn at
/// staggered speeds.
fn spawn_projectiles(registry: &mut Registry, count: u32) {
    for i in 0..count {
        let id = registry.create();
        if !id.is_valid() {
            log::warn!("could not create projectile {i}");
            continue;
        }
        let angle = i as f32 / count as f32 * std::f32::consts::TAU;
        let speed = 1.0 + i as f32 * 0.1;
        registry.attach(id, POSITION, Rc::new(Position(Cell::new(Vec2::ZERO))));
        registry.attach(id, VELOCITY, Rc::new(Velocity(Vec2::from_angle(angle) * speed)));
    }
}

/// One simulation step: integrate every moving entity, mark the ones that
/// left the arena, purge once the pass is over.
fn step(registry: &mut Registry) {
    let movers = registry.entity_nodes(VELOCITY);
    {
        let view = movers.borrow();
        for (&id, component) in view.iter() {
            let Some(velocity) = component_as::<Velocity>(component) else {
                continue;
            };
            let Some(position) = registry.get(id, POSITION) else {
                continue;
            };
            let Some(position) = component_as::<Position>(&position) else {
                continue;
            };

            let next = position.0.get() + velocity.0;
            position.0.set(next);

            if next.length() > ARENA_RADIUS {
                registry.mark_for_removal(id);
            }
        }
    }
    registry.purge();
}
