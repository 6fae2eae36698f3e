use std::time::Duration;

use arena_core::{Aabb, Archetype, Command, EnemyId, Event, Vec3};
use arena_system_steering::{Config, Steering};
use arena_world::{self as world, query, World, WorldConfig, ENEMY_RADIUS};

const FRAME: Duration = Duration::from_nanos(16_666_667);

fn spawn(world: &mut World, position: Vec3) -> EnemyId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            archetype: Archetype::Regular,
            position,
        },
        &mut events,
    );
    events
        .into_iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(enemy),
            _ => None,
        })
        .expect("enemy spawned")
}

/// Runs one frame and returns the commands the steering system produced.
fn step(world: &mut World, steering: &mut Steering) -> Vec<Command> {
    step_by(world, steering, FRAME)
}

fn step_by(world: &mut World, steering: &mut Steering, dt: Duration) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    steering.handle(
        &events,
        &query::enemy_view(world),
        &query::player(world),
        query::geometry(world),
        query::elapsed(world),
        &mut commands,
    );
    for command in commands.clone() {
        world::apply(world, command, &mut events);
    }
    commands
}

#[test]
fn enemies_route_around_a_wall_without_entering_it() {
    let mut world = World::new(WorldConfig {
        seed: 5,
        volumes: vec![Aabb::from_footprint(0.0, -6.0, 8.0, 1.0, 4.0)],
        ..WorldConfig::default()
    });
    let enemy = spawn(&mut world, Vec3::new(0.0, 1.0, -12.0));
    let mut steering = Steering::new(Config::new(17));

    let mut closest = f32::MAX;
    for _ in 0..1_200 {
        let _ = step(&mut world, &mut steering);
        let view = query::enemy_view(&world);
        let position = view.get(enemy).expect("enemy alive").position;
        assert!(
            query::geometry(&world).is_position_valid(position, ENEMY_RADIUS),
            "enemy entered geometry at {position}"
        );
        closest = closest.min(position.distance(query::player(&world).position));
    }

    assert!(closest < 3.0, "enemy never reached the player: {closest}");
}

#[test]
fn boxed_in_enemy_escapes_exactly_once() {
    let walls = vec![
        Aabb::new(Vec3::new(20.505, 0.0, -1.0), Vec3::new(21.0, 3.0, 1.0)),
        Aabb::new(Vec3::new(19.0, 0.0, -1.0), Vec3::new(19.495, 3.0, 1.0)),
        Aabb::new(Vec3::new(19.0, 0.0, 0.505), Vec3::new(21.0, 3.0, 1.0)),
        Aabb::new(Vec3::new(19.0, 0.0, -1.0), Vec3::new(21.0, 3.0, -0.505)),
    ];
    let mut world = World::new(WorldConfig {
        volumes: walls,
        ..WorldConfig::default()
    });
    let enemy = spawn(&mut world, Vec3::new(20.0, 1.0, 0.0));
    let mut steering = Steering::new(Config::new(23));

    let mut escapes = 0;
    for _ in 0..600 {
        let commands = step(&mut world, &mut steering);
        let teleported = commands
            .iter()
            .any(|command| matches!(command, Command::TeleportEnemy { .. }));
        if teleported {
            escapes += 1;
            break;
        }
        let view = query::enemy_view(&world);
        let snapshot = view.get(enemy).expect("enemy alive");
        assert_eq!(snapshot.position, Vec3::new(20.0, 1.0, 0.0));
    }

    assert_eq!(escapes, 1);
    let view = query::enemy_view(&world);
    let snapshot = view.get(enemy).expect("enemy alive");
    assert_eq!(snapshot.pathing.stuck_time, 0.0);
    assert!(snapshot.position.distance(Vec3::new(0.0, 1.0, 0.0)) <= 15.0 + 1e-3);
    assert!(query::geometry(&world).line_of_sight(snapshot.position, Vec3::new(0.0, 1.0, 0.0)));
}

#[test]
fn open_field_pursuit_never_escapes_at_240_hz() {
    let mut world = World::new(WorldConfig::default());
    let enemy = spawn(&mut world, Vec3::new(0.0, 1.0, -40.0));
    let mut steering = Steering::new(Config::new(31));
    let dt = Duration::from_secs(1) / 240;

    for _ in 0..(240 * 5) {
        let commands = step_by(&mut world, &mut steering, dt);
        assert!(
            !commands
                .iter()
                .any(|command| matches!(command, Command::TeleportEnemy { .. })),
            "free-running enemy escaped at {}",
            query::elapsed(&world).as_secs_f32()
        );
    }

    let view = query::enemy_view(&world);
    let position = view.get(enemy).expect("enemy alive").position;
    assert!(position.z > -30.0, "enemy fell behind at {position}");
}
