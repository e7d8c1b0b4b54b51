//! End-to-end negotiation scenarios through the public runtime API.

use skytwin_runtime::prelude::*;

fn drone(id: u32, from: (f64, f64, f64), to: (f64, f64, f64)) -> DroneAgent {
    DroneAgent::new(
        AgentId(id),
        Position::new(from.0, from.1, from.2),
        Position::new(to.0, to.1, to.2),
    )
}

fn crossing_pair(a: Priority, b: Priority) -> Vec<DroneAgent> {
    vec![
        drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0))
            .with_priority(a)
            .with_speed(1.0)
            .with_safety_radius(8.0),
        drone(2, (12.0, 10.0, 20.0), (88.0, 90.0, 20.0))
            .with_priority(b)
            .with_speed(1.0)
            .with_safety_radius(8.0),
    ]
}

fn config() -> AirspaceConfig {
    AirspaceConfig::default().with_seed(2024)
}

#[test]
fn high_priority_drone_keeps_its_path() {
    let mut airspace =
        Airspace::from_agents(config(), crossing_pair(Priority::High, Priority::Medium)).unwrap();

    let report = airspace.tick();

    let loser = airspace.agent(AgentId(2)).unwrap();
    assert_eq!(loser.status, AgentStatus::Rerouting);
    assert_eq!(loser.target.x, 88.0);
    assert_eq!(loser.target.y, 105.0);
    assert_eq!(loser.target.z, 30.0);

    let winner = airspace.agent(AgentId(1)).unwrap();
    assert_eq!(winner.target, Position::new(90.0, 90.0, 20.0));

    assert_eq!(report.conflicts(), 1);
    assert_eq!(report.events.len(), 2);

    let detected = &report.events[0];
    assert_eq!(detected.kind, EventKind::ConflictDetected);
    assert_eq!(detected.participants, vec![AgentId(1), AgentId(2)]);
    assert_eq!(detected.priority, Priority::High);

    let exchange = &report.events[1];
    assert_eq!(exchange.kind, EventKind::PriorityExchange);
    assert_eq!(exchange.participants, vec![AgentId(1), AgentId(2)]);
    assert!(exchange.description.contains("DRONE-001"));
    assert!(exchange.description.contains("DRONE-002"));
}

#[test]
fn both_drones_negotiate_on_detection() {
    let config = config();
    let mut store = AgentStore::from_agents(crossing_pair(Priority::High, Priority::Medium)).unwrap();

    let conflicts = ConflictDetector::from_config(&config).scan(&mut store);

    assert_eq!(conflicts.len(), 1);
    assert!(store.iter().all(|a| a.status == AgentStatus::Negotiating));
}

#[test]
fn high_priority_wins_from_either_side_of_the_pair() {
    let mut airspace =
        Airspace::from_agents(config(), crossing_pair(Priority::Low, Priority::High)).unwrap();

    let report = airspace.tick();

    assert_eq!(report.resolutions[0].winner, AgentId(2));
    assert_eq!(airspace.agent(AgentId(1)).unwrap().status, AgentStatus::Rerouting);
    assert_eq!(
        report.events[1].description,
        "DRONE-002 (HIGH priority) maintains path, DRONE-001 rerouting"
    );
}

#[test]
fn equal_priorities_negotiate_by_efficiency() {
    let mut airspace =
        Airspace::from_agents(config(), crossing_pair(Priority::High, Priority::High)).unwrap();

    let report = airspace.tick();

    assert_eq!(report.events[1].kind, EventKind::PathNegotiation);
    assert_eq!(report.events[1].priority, Priority::Medium);
    // DRONE-002 has less ground left to cover.
    assert_eq!(report.resolutions[0].loser, AgentId(1));
    let loser = airspace.agent(AgentId(1)).unwrap();
    assert_eq!(loser.target, Position::new(102.0, 90.0, 28.0));
}

#[test]
fn exact_tie_goes_to_lower_id() {
    // Mirror images: identical remaining distance.
    let agents = vec![
        drone(5, (40.0, 50.0, 30.0), (10.0, 50.0, 30.0)),
        drone(3, (42.0, 50.0, 30.0), (72.0, 50.0, 30.0)),
    ];
    let mut airspace = Airspace::from_agents(config(), agents).unwrap();

    let report = airspace.tick();

    assert_eq!(report.conflicts(), 1);
    assert_eq!(report.resolutions[0].winner, AgentId(3));
    assert_eq!(report.resolutions[0].loser, AgentId(5));
}

#[test]
fn arrival_picks_new_target_inside_operating_volume() {
    let config = config();
    let start = Position::new(50.0, 50.0, 30.0);
    let mut agent = DroneAgent::new(AgentId(1), start, start.offset(0.5, 0.5, 0.0));
    agent.status = AgentStatus::Rerouting;
    let mut airspace = Airspace::from_agents(config.clone(), vec![agent]).unwrap();

    let report = airspace.tick();

    let agent = airspace.agent(AgentId(1)).unwrap();
    assert_eq!(agent.status, AgentStatus::Active);
    assert!(config.operating_volume.contains(&agent.target));
    assert_eq!(report.motion.arrived, 1);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].kind, EventKind::ResolutionComplete);
    assert_eq!(
        report.events[0].description,
        "DRONE-001 reached destination, selecting new target"
    );
}

#[test]
fn well_separated_drones_produce_no_conflicts() {
    let agents = vec![
        drone(1, (20.0, 20.0, 20.0), (80.0, 20.0, 20.0)),
        drone(2, (20.0, 80.0, 50.0), (80.0, 80.0, 50.0)),
    ];
    let mut airspace = Airspace::from_agents(config(), agents).unwrap();

    for report in airspace.run(20) {
        assert_eq!(report.conflicts(), 0);
        assert!(report.events.is_empty());
    }
    assert!(airspace.agents().iter().all(|a| a.status == AgentStatus::Active));
}

#[test]
fn every_conflict_gets_exactly_one_resolution_event() {
    let mut airspace = Airspace::new(AirspaceConfig::default().with_seed(11)).unwrap();

    let mut total_conflicts = 0;
    for report in airspace.run(400) {
        let detected = report
            .events
            .iter()
            .filter(|e| e.kind == EventKind::ConflictDetected)
            .count();
        let resolved = report.events.iter().filter(|e| e.kind.is_resolution()).count();
        assert_eq!(detected, report.conflicts());
        assert_eq!(resolved, report.conflicts());
        assert!(report.events.iter().all(|e| e.tick == report.tick));
        total_conflicts += report.conflicts();
    }
    assert!(total_conflicts > 0, "a dense default fleet should meet at least once");
}

#[test]
fn same_seed_replays_identically() {
    let mut a = Airspace::new(AirspaceConfig::default().with_seed(77)).unwrap();
    let mut b = Airspace::new(AirspaceConfig::default().with_seed(77)).unwrap();

    a.run(150);
    b.run(150);

    assert_eq!(a.agents(), b.agents());
    let summarize = |airspace: &Airspace| {
        airspace
            .log()
            .iter()
            .map(|e| (e.id, e.tick, e.kind, e.description.clone(), e.participants.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summarize(&a), summarize(&b));
}

#[test]
fn log_stays_bounded_and_newest_first() {
    let mut airspace = Airspace::new(AirspaceConfig::default().with_seed(5)).unwrap();

    for _ in 0..600 {
        airspace.tick();
        assert!(airspace.log().len() <= 50);
    }

    let ids: Vec<EventId> = airspace.log().iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn depleted_drone_is_grounded_once() {
    let config = AirspaceConfig {
        ground_on_depletion: true,
        ..config()
    };
    let agents = vec![drone(1, (10.0, 50.0, 20.0), (90.0, 50.0, 20.0)).with_battery(0.25)];
    let mut airspace = Airspace::from_agents(config, agents).unwrap();

    airspace.run(3);
    let grounded = airspace.agent(AgentId(1)).unwrap().clone();
    assert_eq!(grounded.status, AgentStatus::Resolved);
    assert_eq!(grounded.battery_level, 0.0);

    airspace.run(10);
    let later = airspace.agent(AgentId(1)).unwrap();
    assert_eq!(later.position, grounded.position);
    assert_eq!(later.status, AgentStatus::Resolved);

    let groundings = airspace
        .log()
        .iter()
        .filter(|e| e.description.ends_with("battery depleted, grounded"))
        .count();
    assert_eq!(groundings, 1);
}

#[test]
fn grounded_drone_is_ignored_by_detection() {
    let config = AirspaceConfig {
        ground_on_depletion: true,
        ..config()
    };
    let mut parked = drone(1, (50.0, 50.0, 30.0), (90.0, 50.0, 30.0));
    parked.status = AgentStatus::Resolved;
    let agents = vec![parked, drone(2, (48.0, 50.0, 30.0), (90.0, 50.0, 30.0))];
    let mut airspace = Airspace::from_agents(config, agents).unwrap();

    let report = airspace.tick();

    assert_eq!(report.conflicts(), 0);
    assert_eq!(airspace.agent(AgentId(2)).unwrap().status, AgentStatus::Active);
}

#[test]
fn reset_with_invalid_config_keeps_current_run() {
    let mut clock = SimulationClock::new(AirspaceConfig::compact().with_seed(3)).unwrap();
    for _ in 0..25 {
        clock.advance();
    }
    let before = clock.snapshot();

    let bad = AirspaceConfig {
        lookahead_ticks: 0,
        ..AirspaceConfig::default()
    };
    assert!(clock.reset(bad).unwrap_err().is_config());
    assert_eq!(clock.snapshot(), before);
}

#[test]
fn stats_reflect_snapshot() {
    let mut airspace = Airspace::new(AirspaceConfig::default().with_seed(8)).unwrap();
    airspace.run(120);
    let snapshot = airspace.snapshot();

    let stats = AirspaceStats::from_snapshot(&snapshot);

    assert_eq!(stats.tick, 120);
    assert_eq!(stats.agents, 12);
    assert_eq!(
        stats.active + stats.negotiating + stats.rerouting + stats.resolved,
        12
    );
    assert_eq!(stats.total_events, snapshot.events.len());
    assert_eq!(stats, airspace.stats());
}

#[test]
fn explicit_drones_with_impossible_kinematics_are_rejected() {
    let backwards = drone(1, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0))
        .with_speed(-1.0)
        .with_safety_radius(-5.0);
    let err = Airspace::from_agents(config(), vec![backwards]).unwrap_err();
    assert!(err.is_config());

    let frozen = drone(2, (10.0, 10.0, 20.0), (90.0, 90.0, 20.0)).with_speed(0.0);
    assert!(Airspace::from_agents(config(), vec![frozen]).is_err());
}
