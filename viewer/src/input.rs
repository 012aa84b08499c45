use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Walk the agent to the clicked point.
    LeftClick,
    /// Held to orbit around the target.
    Rotate,
    /// Held to slide the target across the view plane.
    Pan,
    #[actionlike(DualAxis)]
    PointerMotion,
    #[actionlike(Axis)]
    Zoom,
    ResetCamera,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::LeftClick, MouseButton::Left);
    input_map.insert(InputAction::Rotate, MouseButton::Middle);
    input_map.insert(InputAction::Pan, MouseButton::Right);
    input_map.insert_dual_axis(InputAction::PointerMotion, MouseMove::default());
    input_map.insert_axis(InputAction::Zoom, MouseScrollAxis::Y);
    input_map.insert(InputAction::ResetCamera, KeyCode::KeyR);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}
