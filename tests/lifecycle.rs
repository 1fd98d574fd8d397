//! Life-and-death of a single entity, driven end to end through the
//! two-phase tick: an aging processor publishes CHANGE_AGE every tick
//! and KILL once life expectancy is exceeded.

use serde_json::json;

use biphase::{Entity, Manager};

fn build_manager() -> (Manager, Entity) {
    let mut manager = Manager::new();
    let person = manager.spawn([
        ("name", json!("John Doe")),
        ("age", json!(0.0)),
        ("life_expectancy", json!(3.0)),
    ]);

    manager.register_processor(|manager, delta| {
        let Some(person) = manager.entities_by_type("age").next() else {
            return Ok(());
        };
        let age = manager
            .get_component(person, "age")
            .and_then(|age| age.as_f64())
            .unwrap_or(0.0);
        let life_expectancy = manager
            .get_component(person, "life_expectancy")
            .and_then(|expectancy| expectancy.as_f64())
            .unwrap_or(0.0);

        let next_age = age + delta;
        manager.publish(json!({
            "type": "CHANGE_AGE",
            "person": person.raw(),
            "age": next_age,
        }))?;
        if next_age > life_expectancy {
            manager.publish(json!({ "type": "KILL", "person": person.raw() }))?;
        }
        Ok(())
    });

    manager.register_mutator_on("CHANGE_AGE", |manager, action| {
        let person = Entity::from_raw(action["person"].as_u64().unwrap_or(0));
        manager.set_component(person, "age", action["age"].clone())?;
        Ok(())
    });
    manager.register_mutator_on("KILL", |manager, action| {
        let person = Entity::from_raw(action["person"].as_u64().unwrap_or(0));
        manager.kill_entity(person)?;
        Ok(())
    });

    (manager, person)
}

#[test]
fn entity_ages_every_tick_and_dies_past_its_life_expectancy() {
    let (mut manager, person) = build_manager();

    for _ in 0..3 {
        manager.update(1.0).unwrap();
        manager.mutate().unwrap();
    }
    assert_eq!(
        manager.get_component(person, "age"),
        Some(&json!(3.0)),
        "three ticks of aging should be committed"
    );
    assert_eq!(manager.entity_count(), 1);

    // Fourth tick pushes age past expectancy; KILL cascades in the same
    // commit phase.
    manager.update(1.0).unwrap();
    manager.mutate().unwrap();

    assert_eq!(manager.entity_count(), 0);
    assert_eq!(manager.get_component(person, "age"), None);
    assert_eq!(manager.entities_by_type("age").count(), 0);
}

#[test]
fn host_loop_can_stop_when_no_entities_remain() {
    let (mut manager, _person) = build_manager();

    let mut completed = 0;
    for _ in 0..100 {
        if manager.entity_count() == 0 {
            break;
        }
        manager.update(1.0).unwrap();
        manager.mutate().unwrap();
        completed += 1;
    }

    assert_eq!(completed, 4, "loop should stop right after the entity dies");
}
