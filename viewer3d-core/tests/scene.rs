//! End-to-end scene scenarios against the headless backend.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use viewer3d_core::config::DEFAULT_MATERIAL;
use viewer3d_core::geometry::cube;
use viewer3d_core::scene::MESH_DRAW_ORDER_START;
use viewer3d_core::{
    ElementKind, HeadlessBackend, MeshId, RenderHandle, Scene, SceneElement, SceneError,
    SceneEvent, SplitOutcome, Triangle, ViewerSettings, VolumeSize,
};

fn scene() -> Scene<HeadlessBackend> {
    Scene::new(ViewerSettings::default(), HeadlessBackend::new()).unwrap()
}

fn strict_scene() -> Scene<HeadlessBackend> {
    let settings = ViewerSettings {
        strict: true,
        ..ViewerSettings::default()
    };
    Scene::new(settings, HeadlessBackend::new()).unwrap()
}

fn two_disjoint_triangles() -> Vec<Triangle> {
    vec![
        Triangle::new([0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        Triangle::new([0.0, 0.0, 1.0], [5.0, 5.0, 0.0], [6.0, 5.0, 0.0], [5.0, 6.0, 0.0]),
    ]
}

fn tetrahedron() -> Vec<Triangle> {
    let p = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    vec![
        Triangle::new([0.0, 0.0, -1.0], p[0], p[2], p[1]),
        Triangle::new([0.0, -1.0, 0.0], p[0], p[1], p[3]),
        Triangle::new([-1.0, 0.0, 0.0], p[0], p[3], p[2]),
        Triangle::new([0.577, 0.577, 0.577], p[1], p[2], p[3]),
    ]
}

fn shifted(triangles: Vec<Triangle>, [dx, dy, dz]: [f32; 3]) -> Vec<Triangle> {
    triangles
        .into_iter()
        .map(|triangle| {
            let [a, b, c] = triangle.vertices.map(|[x, y, z]| [x + dx, y + dy, z + dz]);
            Triangle::new(triangle.normals, a, b, c)
        })
        .collect()
}

#[test]
fn test_new_scene_installs_builtins_in_order() {
    let scene = scene();
    let names: Vec<_> = scene.registry().names().collect();
    assert_eq!(
        names,
        vec![
            "center",
            "ambientLight",
            "directionalLight1",
            "directionalLight2",
            "floor",
            "grid",
            "axes",
            "buildVolume",
        ]
    );
    assert_eq!(scene.next_draw_order(), MESH_DRAW_ORDER_START);
    assert_eq!(scene.backend().live_count(), 8);
}

#[test]
fn test_two_disjoint_triangles_split_in_two() {
    let mut scene = scene();
    let id = scene.add_mesh("pair", &two_disjoint_triangles(), None, true).unwrap();

    let SplitOutcome::Split(pieces) = scene.split_mesh(id).unwrap() else {
        panic!("expected a split");
    };

    assert_eq!(pieces.len(), 2);
    assert!(scene.mesh(id).is_none());
    for (index, piece) in pieces.iter().enumerate() {
        let mesh = scene.mesh(*piece).unwrap();
        assert_eq!(mesh.name(), format!("pair [{index}]"));
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.material().id(), DEFAULT_MATERIAL);
    }
}

#[test]
fn test_tetrahedron_is_left_untouched() {
    let mut scene = scene();
    let id = scene.add_mesh("tetra", &tetrahedron(), None, true).unwrap();
    scene.select(id, true).unwrap();
    let registry = scene.registry().clone();
    let selection = scene.selection().clone();

    assert_eq!(scene.split_mesh(id).unwrap(), SplitOutcome::NotSplittable);
    assert_eq!(scene.registry(), &registry);
    assert_eq!(scene.selection(), &selection);
}

#[test]
fn test_split_conserves_faces() {
    let mut scene = scene();
    let mut triangles = shifted(tetrahedron(), [0.0, 10.0, 0.0]);
    triangles.extend(two_disjoint_triangles());
    triangles.extend(shifted(cube(1.0), [20.0, 0.0, 0.0]));
    let id = scene.add_mesh("bundle", &triangles, None, false).unwrap();

    let outcome = scene.split_mesh(id).unwrap();
    let pieces = outcome.pieces();
    assert_eq!(pieces.len(), 4);
    let faces: usize = pieces
        .iter()
        .map(|piece| scene.mesh(*piece).unwrap().face_count())
        .sum();
    assert_eq!(faces, triangles.len());
}

#[test]
fn test_select_round_trip_restores_color() {
    let mut scene = scene();
    let id = scene.add_mesh("part", &cube(2.0), None, true).unwrap();
    let original = scene.mesh(id).unwrap().color();

    for _ in 0..3 {
        scene.select(id, true).unwrap();
        scene.select(id, true).unwrap();
        scene.select(id, false).unwrap();
    }

    let mesh = scene.mesh(id).unwrap();
    assert_eq!(mesh.color(), original);
    assert_eq!(mesh.material().original_color(), Some(original));
}

#[test]
fn test_draw_order_strictly_increases() {
    enum Step {
        Add(&'static str),
        Select(usize, bool),
    }

    let mut scene = scene();
    let mut ids = Vec::new();
    let mut last = 0;
    let steps = [
        Step::Add("a"),
        Step::Select(0, true),
        Step::Add("b"),
        Step::Select(1, true),
        Step::Select(0, false),
        Step::Add("c"),
        Step::Select(2, true),
        Step::Select(1, false),
        Step::Add("d"),
    ];
    for step in steps {
        let id = match step {
            Step::Add(name) => {
                let id = scene.add_mesh(name, &cube(1.0), None, true).unwrap();
                ids.push(id);
                id
            }
            Step::Select(index, selected) => {
                scene.select(ids[index], selected).unwrap();
                ids[index]
            }
        };
        let order = scene.element(&id.key()).unwrap().render_order;
        assert!(order > last, "{order} after {last}");
        last = order;
    }
    assert!(last >= MESH_DRAW_ORDER_START);
}

#[test]
fn test_duplicate_name_leaves_registry_alone() {
    let mut scene = scene();
    let before = scene.registry().clone();
    let rival = SceneElement::new(ElementKind::Center, RenderHandle(999));

    let result = scene.set_element("floor", rival, Default::default());
    assert_eq!(
        result,
        Err(SceneError::DuplicateName {
            name: "floor".into()
        })
    );
    assert_eq!(scene.registry(), &before);
}

#[test]
fn test_toggle_builds_missing_builtin_lazily() {
    let settings = ViewerSettings {
        grid: viewer3d_core::config::GridSettings {
            enabled: false,
            ..Default::default()
        },
        ..ViewerSettings::default()
    };
    let mut scene = Scene::new(settings, HeadlessBackend::new()).unwrap();
    assert!(scene.element("grid").is_none());

    scene.toggle_element("grid", Some(false)).unwrap();
    assert!(scene.element("grid").is_none());

    scene.toggle_element("grid", None).unwrap();
    assert!(scene.element("grid").unwrap().visible);

    scene.toggle_element("grid", None).unwrap();
    assert!(!scene.element("grid").unwrap().visible);
}

#[test]
fn test_missing_elements_follow_strict_flag() {
    let mut lenient = scene();
    assert_eq!(lenient.remove_mesh(MeshId(3)), Ok(()));
    assert_eq!(lenient.toggle_element("nothing", None), Ok(()));

    let mut strict = strict_scene();
    assert_eq!(
        strict.remove_mesh(MeshId(3)),
        Err(SceneError::MissingElement {
            name: "mesh-3".into()
        })
    );
    assert!(strict.select(MeshId(3), true).is_err());
}

#[test]
fn test_events_are_delivered_synchronously() {
    let mut scene = scene();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    scene.subscribe(move |event| {
        let line = match event {
            SceneEvent::MeshAdded(mesh) => format!("added {}", mesh.name()),
            SceneEvent::MeshRemoved(id) => format!("removed {id}"),
            SceneEvent::MeshSelected { mesh, selected } => {
                format!("selected {} {selected}", mesh.name())
            }
        };
        sink.borrow_mut().push(line);
    });

    let id = scene.add_mesh("pair", &two_disjoint_triangles(), None, true).unwrap();
    scene.select(id, true).unwrap();
    scene.split_mesh(id).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "added pair",
            "selected pair true",
            "added pair [0]",
            "added pair [1]",
            "removed mesh-0",
        ]
    );
}

#[test]
fn test_remove_mesh_releases_resources() {
    let mut scene = scene();
    let id = scene.add_mesh("part", &cube(1.0), None, true).unwrap();
    let handle = scene.element(&id.key()).unwrap().handle;
    scene.select(id, true).unwrap();

    scene.remove_mesh(id).unwrap();
    assert!(scene.selection().is_empty());
    assert!(!scene.backend().is_live(handle));
    assert!(!scene.backend().is_bound(handle));
}

#[test]
fn test_drop_mesh_rests_on_floor() {
    let mut scene = scene();
    let raised = shifted(cube(2.0), [3.0, 0.0, 10.0]);
    let id = scene.add_mesh("raised", &raised, None, false).unwrap();
    scene.select(id, true).unwrap();

    scene.drop_selected().unwrap();

    let element = scene.element(&id.key()).unwrap();
    assert_relative_eq!(element.transform.position.x, 103.0);
    assert_relative_eq!(element.transform.position.z, 0.0);
    let bounds = scene.mesh(id).unwrap().geometry().bounding_box().unwrap();
    assert_relative_eq!(bounds.min.z, 0.0);
    assert_relative_eq!(bounds.center().x, 0.0);
    assert_eq!(scene.backend().geometry_updates(), 1);
}

#[test]
fn test_resize_rebuilds_builtins_and_recentres() {
    let mut scene = scene();
    let old_floor = scene.element("floor").unwrap().handle;

    scene.resize_build_volume(VolumeSize::new(300.0, 100.0, 50.0)).unwrap();

    assert!(!scene.backend().is_live(old_floor));
    let center = scene.center_position();
    assert_relative_eq!(center.x, 150.0);
    assert_relative_eq!(center.y, 50.0);
    assert_relative_eq!(center.z, 25.0);
    assert_eq!(scene.registry().len(), 8);
}

fn light_target(scene: &Scene<HeadlessBackend>, name: &str) -> [f32; 3] {
    match &scene.element(name).unwrap().kind {
        ElementKind::DirectionalLight { target, .. } => [target.x, target.y, target.z],
        other => panic!("{name} is not a directional light: {other:?}"),
    }
}

#[test]
fn test_directional_lights_follow_center() {
    let mut scene = scene();
    scene.resize_build_volume(VolumeSize::new(300.0, 100.0, 50.0)).unwrap();
    assert_eq!(light_target(&scene, "directionalLight1"), [150.0, 50.0, 25.0]);
    assert_eq!(light_target(&scene, "directionalLight2"), [150.0, 50.0, 25.0]);

    scene.set_center(Some(1.0), Some(2.0), Some(3.0)).unwrap();
    assert_eq!(light_target(&scene, "directionalLight1"), [1.0, 2.0, 3.0]);
    assert_eq!(light_target(&scene, "directionalLight2"), [1.0, 2.0, 3.0]);
}
