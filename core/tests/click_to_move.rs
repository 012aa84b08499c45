use approx::assert_relative_eq;
use museum_core::{
    Agent, CameraProjection, ClickOutcome, FollowerState, NavMeshGeometry, NavigationController,
    Pathfinding, SceneObjectDef, SceneShapeDef, StaticScene, TickOutcome, Zone,
};
use nalgebra::{Vector3, point, vector};

/// An L-shaped floor: the walk from the +x arm to the +z arm turns at (10, 0, 10).
fn l_floor() -> NavMeshGeometry {
    NavMeshGeometry::new(
        vec![
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [30.0, 0.0, 0.0],
            [30.0, 0.0, 10.0],
            [10.0, 0.0, 10.0],
            [0.0, 0.0, 10.0],
            [0.0, 0.0, 30.0],
            [10.0, 0.0, 30.0],
        ],
        vec![0, 1, 4, 0, 4, 5, 1, 2, 3, 1, 3, 4, 5, 4, 7, 5, 7, 6],
    )
}

fn camera() -> CameraProjection {
    CameraProjection::new(
        &point![15.0, 60.0, 40.0],
        &point![15.0, 0.0, 15.0],
        &Vector3::y(),
        std::f32::consts::FRAC_PI_4,
        16.0 / 9.0,
        0.1,
        500.0,
    )
}

fn controller(start: nalgebra::Point3<f32>) -> NavigationController<Pathfinding> {
    let mut pathfinding = Pathfinding::new();
    pathfinding.set_zone_data("gallery", Zone::build(&l_floor()).unwrap());
    NavigationController::new(pathfinding, "gallery", Agent::new(start, 10.0))
}

#[test]
fn click_routes_agent_around_corner() {
    let mut scene = StaticScene::build(vec![SceneObjectDef::new(
        0,
        Vector3::zeros(),
        SceneShapeDef::TriMesh(l_floor()),
    )])
    .unwrap();
    let camera = camera();
    let goal = point![5.0, 0.0, 28.0];
    let ndc = camera.project(&goal).xy().coords;

    let mut nav = controller(point![28.0, 0.0, 5.0]);
    let ClickOutcome::Following { target, waypoints } = nav.handle_click(&mut scene, &camera, &ndc)
    else {
        panic!("click did not start a path");
    };
    assert_relative_eq!(target, goal, epsilon = 1.0e-2);
    assert_eq!(waypoints, 2);

    let mut corner_reached = false;
    for _ in 0..1_000 {
        if let TickOutcome::Reached { remaining: 1 } = nav.tick(0.1) {
            assert_relative_eq!(nav.agent().position, point![10.0, 0.0, 10.0], epsilon = 1.0e-3);
            corner_reached = true;
        }
        if nav.state() == FollowerState::Idle {
            break;
        }
    }

    assert!(corner_reached);
    assert_eq!(nav.state(), FollowerState::Idle);
    assert_relative_eq!(nav.agent().position, target, epsilon = 1.0e-3);
}

#[test]
fn click_off_the_floor_keeps_agent_idle() {
    let mut scene = StaticScene::build(vec![SceneObjectDef::new(
        0,
        Vector3::zeros(),
        SceneShapeDef::TriMesh(l_floor()),
    )])
    .unwrap();
    let camera = camera();
    let start = point![28.0, 0.0, 5.0];
    // Above the missing quadrant of the L: the ray falls through to nothing.
    let ndc = camera.project(&point![25.0, 0.0, 25.0]).xy().coords;

    let mut nav = controller(start);
    assert_eq!(
        nav.handle_click(&mut scene, &camera, &ndc),
        ClickOutcome::NoTarget
    );
    assert_eq!(nav.tick(0.1), TickOutcome::Idle);
    assert_eq!(nav.agent().position, start);
}

#[test]
fn click_outside_viewport_is_ignored() {
    let mut scene = StaticScene::build(vec![SceneObjectDef::new(
        0,
        Vector3::zeros(),
        SceneShapeDef::TriMesh(l_floor()),
    )])
    .unwrap();

    let mut nav = controller(point![28.0, 0.0, 5.0]);
    let outcome = nav.handle_click(&mut scene, &camera(), &vector![1.5, 0.0]);
    assert_eq!(outcome, ClickOutcome::NoTarget);
}

#[test]
fn target_on_another_island_stops_the_agent() {
    let islands = NavMeshGeometry::new(
        vec![
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 0.0, 10.0],
            [0.0, 0.0, 10.0],
            [100.0, 0.0, 0.0],
            [110.0, 0.0, 0.0],
            [110.0, 0.0, 10.0],
            [100.0, 0.0, 10.0],
        ],
        vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
    );
    let mut pathfinding = Pathfinding::new();
    pathfinding.set_zone_data("gallery", Zone::build(&islands).unwrap());
    let mut nav =
        NavigationController::new(pathfinding, "gallery", Agent::new(point![1.0, 0.0, 1.0], 10.0));

    assert!(matches!(
        nav.move_to(point![9.0, 0.0, 9.0]),
        ClickOutcome::Following { .. }
    ));
    nav.tick(0.1);
    let stopped_at = nav.agent().position;

    assert!(matches!(
        nav.move_to(point![105.0, 0.0, 5.0]),
        ClickOutcome::Unreachable { .. }
    ));
    assert_eq!(nav.state(), FollowerState::Idle);
    for _ in 0..100 {
        assert_eq!(nav.tick(0.1), TickOutcome::Idle);
    }
    assert_eq!(nav.agent().position, stopped_at);
}
