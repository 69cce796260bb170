//! Scene editor picking demo
//!
//! Builds a small scene (a perspective camera over a table with a cup, and an
//! orthographic UI camera over a button), then replays a scripted sequence of
//! mouse input through the picking controller and logs what each entity
//! receives. Usage: `picking_demo [config.toml|config.ron]`.

use scene_engine::config::ConfigError;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

/// Errors that abort the demo
#[derive(thiserror::Error, Debug)]
enum EditorError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build scene: {0}")]
    Scene(#[from] SceneError),
}

/// Entities of the demo scene
struct DemoScene {
    table: EntityId,
    cup: EntityId,
    button: EntityId,
}

fn build_scene(scene: &mut EntityManager, viewport: ViewRect) -> Result<DemoScene, SceneError> {
    let main_camera = scene
        .spawn("main camera")
        .with(Transform::from_position(Vec3::new(0.0, 2.0, 8.0)))?
        .with(Camera::perspective(60.0, 0.1, 100.0, viewport).with_render_group("scene"))?
        .id();
    scene.look_at(main_camera, Vec3::new(0.0, -0.5, 0.0), Vec3::y())?;

    scene
        .spawn("ui camera")
        .with(Transform::from_position(Vec3::new(0.0, 0.0, 10.0)))?
        .with(Camera::orthographic(viewport.height * 0.5, 0.1, 20.0, viewport).with_render_group("ui"))?;

    let table = scene
        .spawn("table")
        .with(Transform::from_position(Vec3::new(0.0, -0.5, 0.0)))?
        .with(Dimensions::new(4.0, 1.0, 2.0))?
        .with(Bounds::new())?
        .with(ColliderBox::from_size(Vec3::new(4.0, 1.0, 2.0)))?
        .add_to_group("scene")
        .id();

    let cup = scene
        .spawn("cup")
        .with(Transform::from_position(Vec3::new(1.0, 0.5, 0.0)))?
        .with(Dimensions::new(0.4, 0.5, 0.4))?
        .with(Anchor::new(0.5, 0.0, 0.5))?
        .with(Bounds::new())?
        .with(ColliderBox::new(AABB::new(Vec3::new(-0.2, 0.0, -0.2), Vec3::new(0.2, 0.5, 0.2))))?
        .set_parent(table)?
        .id();

    let button = scene
        .spawn("button")
        .with(Transform::from_position(Vec3::new(-viewport.width * 0.5 + 80.0, viewport.height * 0.5 - 40.0, 0.0)))?
        .with(ColliderBox::from_size(Vec3::new(120.0, 40.0, 1.0)))?
        .add_to_group("ui")
        .id();

    Ok(DemoScene { table, cup, button })
}

fn log_events(scene: &mut EntityManager, id: EntityId) -> Result<(), SceneError> {
    let name = scene.entity(id).map(|e| e.name().to_string()).unwrap_or_default();
    for event_type in [
        PointerEventType::MouseEnter,
        PointerEventType::MouseLeave,
        PointerEventType::MouseDown,
        PointerEventType::MouseUp,
        PointerEventType::MouseScroll,
    ] {
        let name = name.clone();
        scene.on(id, event_type, move |event: &PointerEvent, _: &mut MouseDevice| match event.hit {
            Some(hit) => log::info!(
                "{:<12} {} at ({:.2}, {:.2}, {:.2}), depth {:.2}",
                event.event_type.name(),
                name,
                hit.point.x,
                hit.point.y,
                hit.point.z,
                hit.depth
            ),
            None => log::info!("{:<12} {}", event.event_type.name(), name),
        })?;
    }
    Ok(())
}

fn run(config: &EditorConfig) -> Result<(), EditorError> {
    let (width, height) = config.viewport;
    let viewport = ViewRect::new(0.0, 0.0, width, height);

    let mut scene = EntityManager::new();
    let demo = build_scene(&mut scene, viewport)?;
    for id in [demo.table, demo.cup, demo.button] {
        log_events(&mut scene, id)?;
    }

    // The button swallows clicks.
    scene.on(demo.button, PointerEventType::MouseDown, |_: &PointerEvent, device: &mut MouseDevice| {
        device.stop_event_propagation();
    })?;

    for id in [demo.table, demo.cup] {
        let bounds = scene.world_bounding_box(id)?;
        log::info!(
            "World bounds of {}: min {:?}, max {:?}",
            id,
            bounds.min.as_slice(),
            bounds.max.as_slice()
        );
    }

    let mut device = MouseDevice::new(height);
    let mut picking = PickingController::new(config.picking.clone());

    log::info!("Replaying scripted input");
    device.cursor_moved(width * 0.5, height * 0.5);
    device.button_pressed(MouseButton::Left);
    device.button_released(MouseButton::Left);
    device.scrolled(1.0);
    device.cursor_moved(80.0, 40.0);
    device.button_pressed(MouseButton::Left);
    device.button_released(MouseButton::Left);
    device.cursor_moved(width - 5.0, height - 5.0);
    picking.process_pending(&mut scene, &mut device);

    log::info!("Hovered after replay: {:?}", picking.hovered());
    Ok(())
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match EditorConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", EditorError::from(e));
                std::process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    if let Err(e) = logging::try_init_with_filter(&config.log_filter) {
        eprintln!("Logger already initialized: {e}");
    }

    if let Err(e) = run(&config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
