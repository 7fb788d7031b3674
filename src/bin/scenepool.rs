use scenepool::{
    util::{boxed_err, BoxedError},
    Factory, NodeId, ObjectPool, PoolConfig, PoolRegistry, SceneGraph,
};
use serde::Deserialize;

use log::LevelFilter;
use std::env;

const FRAMES: usize = 120;
/// Frames a projectile stays alive after being fired.
const PROJECTILE_LIFETIME: usize = 30;
/// Fire a new projectile every this many frames.
const FIRE_INTERVAL: usize = 4;

#[derive(Debug, Deserialize)]
struct ProjectileConfig {
    label: String,
    speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> ProjectileConfig {
        ProjectileConfig {
            label: "projectile".to_string(),
            speed: 1.0,
        }
    }
}

#[derive(Default)]
struct ProjectileFactory {
    config: ProjectileConfig,
    spawned: usize,
}

impl Factory for ProjectileFactory {
    type Config = ProjectileConfig;

    fn set_config(&mut self, config: ProjectileConfig) {
        self.config = config;
    }

    fn create_object(&mut self, scene: &mut SceneGraph) -> Result<NodeId, BoxedError> {
        if !self.config.speed.is_finite() || self.config.speed <= 0.0 {
            return boxed_err(format!("Bad projectile speed: {}", self.config.speed));
        }
        self.spawned += 1;
        Ok(scene.spawn(format!("{} #{}", self.config.label, self.spawned)))
    }
}

fn main() -> Result<(), BoxedError> {
    env_logger::builder()
        .filter_level(LevelFilter::Error)
        .filter_module("scenepool", LevelFilter::Debug)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => PoolConfig::load(path)?,
        None => PoolConfig::new(ProjectileConfig::default()).with_amount(4),
    };

    let mut scene = SceneGraph::new();
    let mut registry = PoolRegistry::new();

    let mut pool = ObjectPool::new(&mut scene, ProjectileFactory::default(), config);
    pool.activate(&mut scene)?;
    let pool = registry.install(&mut scene, pool);

    // (projectile, frame it was fired on)
    let mut in_flight: Vec<(NodeId, usize)> = Vec::new();

    for frame in 0..FRAMES {
        let mut expired = Vec::new();
        in_flight.retain(|(id, fired)| {
            let alive = frame - fired < PROJECTILE_LIFETIME;
            if !alive {
                expired.push(*id);
            }
            alive
        });
        for id in expired {
            pool.return_to_pool(&mut scene, id)?;
        }

        if frame % FIRE_INTERVAL == 0 {
            let id = if frame % (FIRE_INTERVAL * 2) == 0 {
                pool.get_pooled_object(&mut scene)?
            } else {
                pool.get_random_pooled_object(&mut scene)?
            };
            scene.set_active(id, true)?;
            in_flight.push((id, frame));
        }

        if frame % 30 == 0 {
            log::info!(
                "frame {}: {} pooled, {} free, {} in flight",
                frame,
                pool.len(),
                pool.available(&scene),
                in_flight.len()
            );
        }
    }

    log::info!(
        "Done: factory spawned {} projectile(s) for {} shots",
        pool.factory().spawned,
        FRAMES / FIRE_INTERVAL
    );
    Ok(())
}
