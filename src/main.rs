use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use biphase::{scenario::ScenarioLoader, Action, Entity};

const GRAVITY: f64 = 200.0;
const BOUNCE_LOSS_Y: f64 = 0.90;
const DRAG_LOSS_X: f64 = 0.99;
const REST_SPEED: f64 = 1.0;

#[derive(Debug, Parser)]
#[command(author, version, about = "Bouncing particles demo runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/bounce.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let mut manager = scenario.build_manager();
    let seed = cli.seed.unwrap_or(scenario.seed);

    let floor = scenario
        .spawn
        .as_ref()
        .map(|spawn| spawn.bounds.height)
        .unwrap_or(600.0);

    if let Some(spawn) = &scenario.spawn {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..spawn.particles {
            manager.spawn([
                (
                    "position",
                    json!({
                        "x": rng.gen_range(0.0..spawn.bounds.width),
                        "y": rng.gen_range(0.0..spawn.bounds.height / 2.0),
                    }),
                ),
                ("speed", json!({ "x": rng.gen_range(-60.0..60.0), "y": 0.0 })),
            ]);
        }
    }

    manager.register_processor(move |manager, delta| {
        for entity in manager.entities_by_types(&["position", "speed"]) {
            let (x, y) = vec2(manager.get_component(entity, "position"))?;
            let (vx, vy) = vec2(manager.get_component(entity, "speed"))?;

            let mut next_x = x + vx * delta;
            let mut next_y = y + vy * delta;
            let mut next_vx = vx * DRAG_LOSS_X;
            let mut next_vy = vy + GRAVITY * delta;

            if next_y >= floor {
                next_y = floor;
                next_vy = -next_vy * BOUNCE_LOSS_Y;
            }
            if next_x < 0.0 {
                next_x = 0.0;
                next_vx = -next_vx;
            }

            let at_rest =
                next_y >= floor - f64::EPSILON && next_vy.abs() < REST_SPEED && next_vx.abs() < REST_SPEED;
            if at_rest {
                manager.publish(json!({ "type": "DESPAWN", "entity": entity.raw() }))?;
            } else {
                manager.publish(json!({
                    "type": "MOVE",
                    "entity": entity.raw(),
                    "position": { "x": next_x, "y": next_y },
                    "speed": { "x": next_vx, "y": next_vy },
                }))?;
            }
        }
        Ok(())
    });

    manager.register_mutator_on("MOVE", |manager, action| {
        let entity = entity_of(action)?;
        manager.set_component(entity, "position", action["position"].clone())?;
        manager.set_component(entity, "speed", action["speed"].clone())?;
        Ok(())
    });

    manager.register_mutator_on("DESPAWN", |manager, action| {
        manager.kill_entity(entity_of(action)?)?;
        Ok(())
    });

    let ticks = scenario.ticks(cli.ticks);
    let mut completed = 0;
    for tick in 0..ticks {
        if manager.entity_count() == 0 {
            break;
        }
        manager.update(scenario.dt)?;
        manager.mutate()?;
        completed = tick + 1;
        if tick % 60 == 0 {
            println!("tick {}: {} particles in flight", tick, manager.entity_count());
        }
    }

    println!(
        "Scenario '{}' completed after {} ticks. Particles still in flight: {}",
        scenario.name,
        completed,
        manager.entity_count()
    );
    Ok(())
}

/// Entity identifier carried in an action payload.
fn entity_of(action: &Action) -> Result<Entity> {
    action
        .get("entity")
        .and_then(Value::as_u64)
        .map(Entity::from_raw)
        .ok_or_else(|| anyhow!("action is missing an 'entity' field"))
}

/// Read an `{ x, y }` component value.
fn vec2(value: Option<&Value>) -> Result<(f64, f64)> {
    let value = value.ok_or_else(|| anyhow!("component vanished mid-tick"))?;
    let x = value["x"].as_f64().unwrap_or(0.0);
    let y = value["y"].as_f64().unwrap_or(0.0);
    Ok((x, y))
}
