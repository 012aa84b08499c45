use bevy::{prelude::*, window::PrimaryWindow};
use leafwing_input_manager::prelude::ActionState;
use museum_core::{CameraPose, CameraProjection, OrbitRig, Tween};
use nalgebra::vector;

use crate::{config::Config, convert, exhibits::Gallery, input::InputAction};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<ResetCamera>();
    app.init_resource::<ResetAnimation>();

    app.add_systems(Startup, add_camera);
    app.add_systems(
        Update,
        (request_reset, start_reset, orbit_input, advance_rig).chain(),
    );
    app.add_systems(PostUpdate, apply_rig.before(TransformSystems::Propagate));
}

/// Ask the camera to glide back to its initial pose and hide every exhibit.
#[derive(Message, Clone, Copy, Debug)]
pub struct ResetCamera;

#[derive(Resource, Deref, DerefMut)]
pub struct Rig(pub OrbitRig);

#[derive(Resource, Default)]
struct ResetAnimation(Option<Tween<CameraPose>>);

#[derive(Component)]
pub struct MainCamera;

fn add_camera(mut commands: Commands, config: Res<Config>) {
    let camera = &config.camera;
    let rig = OrbitRig::new(camera.initial, camera.orbit);

    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        pose_transform(&rig.pose()),
    ));
    commands.insert_resource(Rig(rig));
}

fn request_reset(actions: Res<ActionState<InputAction>>, mut resets: MessageWriter<ResetCamera>) {
    if actions.just_pressed(&InputAction::ResetCamera) {
        resets.write(ResetCamera);
    }
}

fn start_reset(
    mut resets: MessageReader<ResetCamera>,
    mut animation: ResMut<ResetAnimation>,
    mut gallery: ResMut<Gallery>,
    rig: Res<Rig>,
    config: Res<Config>,
) {
    if resets.read().last().is_none() {
        return;
    }
    let camera = &config.camera;
    animation.0 = Some(rig.tween_to(camera.initial, camera.reset_duration, camera.reset_easing));
    gallery.hide_all();
    info!("Camera reset");
}

fn orbit_input(
    actions: Res<ActionState<InputAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    animation: Res<ResetAnimation>,
    mut rig: ResMut<Rig>,
    config: Res<Config>,
) {
    // The reset animation owns the camera until it finishes.
    if animation.0.is_some() {
        return;
    }

    let motion = actions.axis_pair(&InputAction::PointerMotion);
    // leafwing reports mouse motion y-up; the rig expects screen pixels (y-down).
    let delta = vector![motion.x, -motion.y];
    let height = window.height();

    if actions.pressed(&InputAction::Rotate) {
        rig.rotate_pixels(delta, height);
    }
    if actions.pressed(&InputAction::Pan) {
        rig.pan_pixels(delta, height, config.camera.fov_y_degrees.to_radians());
    }

    let zoom = actions.value(&InputAction::Zoom);
    if zoom != 0.0 {
        rig.zoom_steps(zoom);
    }
}

fn advance_rig(time: Res<Time>, mut animation: ResMut<ResetAnimation>, mut rig: ResMut<Rig>) {
    let Some(tween) = animation.0.as_mut() else {
        rig.update();
        return;
    };

    let pose = tween.advance(time.delta_secs());
    rig.set_pose(pose);
    if tween.is_finished() {
        animation.0 = None;
    }
}

fn apply_rig(rig: Res<Rig>, mut camera: Single<&mut Transform, With<MainCamera>>) {
    if rig.is_changed() {
        **camera = pose_transform(&rig.pose());
    }
}

fn pose_transform(pose: &CameraPose) -> Transform {
    Transform::from_translation(convert::from_point(&pose.eye))
        .looking_at(convert::from_point(&pose.target), Vec3::Y)
}

/// The resolver's view of the main camera for a viewport of `width` by `height`.
///
/// Built from the camera's propagated transform, i.e. the pose of the frame on screen, not the
/// rig, which may already have moved on this frame.
pub fn projection(
    transform: &GlobalTransform,
    config: &Config,
    width: f32,
    height: f32,
) -> CameraProjection {
    let eye = transform.translation();
    let camera = &config.camera;
    CameraProjection::new(
        &convert::to_point(eye),
        &convert::to_point(eye + *transform.forward()),
        &convert::to_point(*transform.up()).coords,
        camera.fov_y_degrees.to_radians(),
        width / height.max(1.0),
        camera.near,
        camera.far,
    )
}
