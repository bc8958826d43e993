use std::f32::consts::FRAC_PI_4;

use glam::Vec2;

use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::ball::{BallKind, BallView};

use super::SPAWNER;

/// Drops a fresh standard ball next to its host on contact.
#[derive(Debug, Default)]
pub struct Spawner {
    spawned: u32,
}

impl Accessory for Spawner {
    fn id(&self) -> AccessoryId {
        SPAWNER
    }

    fn on_contact(&mut self, me: &BallView, _other: &BallView, ctx: &mut AccessoryContext) {
        if self.spawned >= ctx.tunables().spawner_max_spawns {
            return;
        }
        if let Some(pos) = find_spawn_position(me.pos, me.radius, ctx) {
            ctx.commands.spawn(BallKind::Standard, pos);
            self.spawned += 1;
        }
    }
}

/// Find a free spot on the felt for a ball of `radius` near `origin`.
///
/// Tries the eight compass directions first (clamped to the table), then
/// uniform samples over the table, then the raw first direction. Spawns
/// already queued this frame count as occupied.
pub fn find_spawn_position(origin: Vec2, radius: f32, ctx: &mut AccessoryContext) -> Option<Vec2> {
    let distance = radius * ctx.tunables().spawner_distance;
    let attempts = ctx.tunables().spawner_random_attempts;

    let Some(felt) = ctx.host.felt() else {
        log::warn!("no felt lookup, cannot place spawn near {:?}", origin);
        return None;
    };
    let pending: Vec<Vec2> = ctx.commands.pending_spawns().collect();
    let on_felt = |p: Vec2| felt.is_felt(p) && !felt.is_hole(p);
    let free = |p: Vec2| {
        ctx.balls.iter().all(|b| b.pos.distance(p) >= b.radius + radius)
            && pending.iter().all(|q| q.distance(p) >= 2.0 * radius)
    };

    let first = origin + Vec2::X * distance;
    for i in 0..8 {
        let dir = Vec2::from_angle(i as f32 * FRAC_PI_4);
        let p = ctx.table.clamp(origin + dir * distance, radius);
        if on_felt(p) && free(p) {
            return Some(p);
        }
    }

    let lo = ctx.table.min() + Vec2::splat(radius);
    let hi = (ctx.table.max() - Vec2::splat(radius)).max(lo);
    for _ in 0..attempts {
        let p = Vec2::new(ctx.rng.range(lo.x, hi.x), ctx.rng.range(lo.y, hi.y));
        if on_felt(p) && free(p) {
            return Some(p);
        }
    }

    if on_felt(first) {
        log::debug!("spawn search exhausted, falling back to {:?}", first);
        return Some(first);
    }

    log::warn!("no spawn position found near {:?}", origin);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::Command;
    use crate::host::{FeltCell, FeltGrid};
    use crate::testing::Rig;

    fn spawns(rig: &Rig) -> Vec<Vec2> {
        rig.commands.pending_spawns().collect()
    }

    #[test]
    fn first_direction_on_open_felt() {
        let mut rig = Rig::new();
        rig.spawn(BallKind::Spawner, Vec2::new(500.0, 250.0));
        let p = rig.with_ctx(|ctx| find_spawn_position(Vec2::new(500.0, 250.0), 12.0, ctx));
        assert_eq!(p, Some(Vec2::new(530.0, 250.0)));
    }

    #[test]
    fn occupied_direction_is_skipped() {
        let mut rig = Rig::new();
        rig.spawn(BallKind::Spawner, Vec2::new(500.0, 250.0));
        rig.spawn(BallKind::Standard, Vec2::new(530.0, 250.0));
        let p = rig
            .with_ctx(|ctx| find_spawn_position(Vec2::new(500.0, 250.0), 12.0, ctx))
            .unwrap();
        assert!(p.distance(Vec2::new(530.0, 250.0)) >= 24.0);
        assert!((p.distance(Vec2::new(500.0, 250.0)) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn candidates_are_clamped_to_the_table() {
        let mut rig = Rig::new();
        rig.spawn(BallKind::Spawner, Vec2::new(985.0, 250.0));
        let p = rig
            .with_ctx(|ctx| find_spawn_position(Vec2::new(985.0, 250.0), 12.0, ctx))
            .unwrap();
        assert!(p.x <= 988.0);
    }

    #[test]
    fn random_search_finds_distant_felt() {
        let mut rig = Rig::new();
        let mut grid = FeltGrid::new(50, 25, 20.0);
        grid.fill_rect(0, 0, 25, 25, FeltCell::Rail);
        rig.host.set_felt(Some(Box::new(grid)));
        let p = rig
            .with_ctx(|ctx| find_spawn_position(Vec2::new(100.0, 250.0), 12.0, ctx))
            .unwrap();
        assert!(p.x >= 500.0, "landed on rail at {:?}", p);
    }

    #[test]
    fn gives_up_without_felt() {
        let mut rig = Rig::new();
        let mut grid = FeltGrid::new(50, 25, 20.0);
        grid.fill_rect(0, 0, 50, 25, FeltCell::Hole);
        rig.host.set_felt(Some(Box::new(grid)));
        let p = rig.with_ctx(|ctx| find_spawn_position(Vec2::new(500.0, 250.0), 12.0, ctx));
        assert_eq!(p, None);

        rig.host.set_felt(None);
        let p = rig.with_ctx(|ctx| find_spawn_position(Vec2::new(500.0, 250.0), 12.0, ctx));
        assert_eq!(p, None);
    }

    #[test]
    fn contact_queues_spawns_up_to_the_limit() {
        let mut rig = Rig::new();
        let a = rig.spawn(BallKind::Spawner, Vec2::new(500.0, 250.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(470.0, 250.0));
        let mut s = Spawner::default();
        for _ in 0..5 {
            let (me, them) = (rig.view(a), rig.view(b));
            rig.with_ctx(|ctx| s.on_contact(&me, &them, ctx));
        }
        let queued = spawns(&rig);
        assert_eq!(queued.len(), 3);
        for (i, p) in queued.iter().enumerate() {
            for q in &queued[i + 1..] {
                assert!(p.distance(*q) >= 24.0, "queued spawns overlap");
            }
        }
        assert!(rig.commands.iter().all(|c| matches!(c, Command::Spawn { kind: BallKind::Standard, .. })));
    }
}
