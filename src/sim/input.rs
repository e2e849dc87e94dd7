//! Input translation
//!
//! Adapters deliver either key edges (press/release events) or a polled
//! snapshot of held keys. `Controls` folds both models into one `TickInput`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::tick::TickInput;

/// The command vocabulary the core understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Shoot,
    Pause,
    Quit,
    Restart,
}

/// An edge-triggered key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Pressed(Command),
    Released(Command),
}

/// Level-triggered snapshot of held keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shoot: bool,
}

impl HeldKeys {
    /// Net direction, each component in [-1, 1]
    pub fn axis(&self) -> IVec2 {
        IVec2::new(
            self.right as i32 - self.left as i32,
            self.up as i32 - self.down as i32,
        )
    }

    fn set(&mut self, command: Command, held: bool) {
        match command {
            Command::MoveLeft => self.left = held,
            Command::MoveRight => self.right = held,
            Command::MoveUp => self.up = held,
            Command::MoveDown => self.down = held,
            Command::Shoot => self.shoot = held,
            Command::Pause | Command::Quit | Command::Restart => {}
        }
    }

    fn horizontal(&self) -> bool {
        self.left || self.right
    }

    fn vertical(&self) -> bool {
        self.up || self.down
    }
}

/// Everything an input adapter reports for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Edge events in arrival order
    pub events: Vec<InputEvent>,
    /// Polled held-state, if the adapter is level-triggered
    pub held: Option<HeldKeys>,
}

impl InputFrame {
    pub fn pressed(command: Command) -> Self {
        Self {
            events: vec![InputEvent::Pressed(command)],
            held: None,
        }
    }

    pub fn snapshot(held: HeldKeys) -> Self {
        Self {
            events: Vec::new(),
            held: Some(held),
        }
    }
}

/// Tracks held keys across frames
#[derive(Debug, Clone, Default)]
pub struct Controls {
    held: HeldKeys,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    /// Forget held keys (after restart or focus loss)
    pub fn reset(&mut self) {
        self.held = HeldKeys::default();
    }

    /// Fold one frame of adapter input into a tick input. Movement comes
    /// from the held state after this frame, so both input models steer alike.
    pub fn translate(&mut self, frame: &InputFrame) -> TickInput {
        let mut input = TickInput::default();

        for event in &frame.events {
            match *event {
                InputEvent::Pressed(command) => {
                    match command {
                        Command::Pause => input.pause = true,
                        Command::Quit => input.quit = true,
                        Command::Restart => input.restart = true,
                        Command::Shoot => input.shoot = true,
                        _ => {}
                    }
                    self.held.set(command, true);
                }
                InputEvent::Released(command) => {
                    self.held.set(command, false);
                    match command {
                        Command::MoveLeft | Command::MoveRight => input.release_x = true,
                        Command::MoveUp | Command::MoveDown => input.release_y = true,
                        _ => {}
                    }
                }
            }
        }

        if let Some(snapshot) = frame.held {
            let previous = self.held;
            if previous.horizontal() && !snapshot.horizontal() {
                input.release_x = true;
            }
            if previous.vertical() && !snapshot.vertical() {
                input.release_y = true;
            }
            if snapshot.shoot && !previous.shoot {
                input.shoot = true;
            }
            self.held = snapshot;
        }

        // Held keys accelerate every frame, like OS key repeat
        input.axis = self.held.axis();
        input.impulse = input.axis;
        input.shoot_held = self.held.shoot;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_press_and_release() {
        let mut controls = Controls::new();
        let input = controls.translate(&InputFrame {
            events: vec![
                InputEvent::Pressed(Command::MoveLeft),
                InputEvent::Pressed(Command::MoveUp),
            ],
            held: None,
        });
        assert_eq!(input.axis, IVec2::new(-1, 1));
        assert_eq!(input.impulse, IVec2::new(-1, 1));

        // Still held next frame without new edges: keeps accelerating
        let input = controls.translate(&InputFrame::default());
        assert_eq!(input.axis, IVec2::new(-1, 1));
        assert_eq!(input.impulse, IVec2::new(-1, 1));

        let input = controls.translate(&InputFrame {
            events: vec![InputEvent::Released(Command::MoveLeft)],
            held: None,
        });
        assert_eq!(input.axis, IVec2::new(0, 1));
        assert!(input.release_x);
        assert!(!input.release_y);
    }

    #[test]
    fn test_edge_shoot_then_hold() {
        let mut controls = Controls::new();
        let input = controls.translate(&InputFrame::pressed(Command::Shoot));
        assert!(input.shoot);
        assert!(input.shoot_held);

        let input = controls.translate(&InputFrame::default());
        assert!(!input.shoot);
        assert!(input.shoot_held);

        let input = controls.translate(&InputFrame {
            events: vec![InputEvent::Released(Command::Shoot)],
            held: None,
        });
        assert!(!input.shoot_held);
    }

    #[test]
    fn test_snapshot_model() {
        let mut controls = Controls::new();
        let held = HeldKeys {
            right: true,
            shoot: true,
            ..Default::default()
        };
        let input = controls.translate(&InputFrame::snapshot(held));
        assert_eq!(input.axis, IVec2::new(1, 0));
        assert_eq!(input.impulse, IVec2::new(1, 0));
        assert!(input.shoot);

        // Held across frames keeps accelerating, shoot edge fires only once
        let input = controls.translate(&InputFrame::snapshot(held));
        assert_eq!(input.impulse, IVec2::new(1, 0));
        assert!(!input.shoot);
        assert!(input.shoot_held);

        let input = controls.translate(&InputFrame::snapshot(HeldKeys::default()));
        assert!(input.release_x);
        assert_eq!(input.axis, IVec2::ZERO);
        assert!(!input.shoot_held);
    }

    #[test]
    fn test_edge_and_snapshot_hold_give_same_impulse() {
        let mut edge = Controls::new();
        let mut snap = Controls::new();
        let held = HeldKeys {
            right: true,
            ..Default::default()
        };
        for frame in 0..60 {
            let edge_frame = if frame == 0 {
                InputFrame::pressed(Command::MoveRight)
            } else {
                InputFrame::default()
            };
            let a = edge.translate(&edge_frame);
            let b = snap.translate(&InputFrame::snapshot(held));
            assert_eq!(a.impulse, IVec2::new(1, 0));
            assert_eq!(a.impulse, b.impulse);
            assert_eq!(a.axis, b.axis);
        }
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut controls = Controls::new();
        let held = HeldKeys {
            left: true,
            right: true,
            ..Default::default()
        };
        let input = controls.translate(&InputFrame::snapshot(held));
        assert_eq!(input.axis, IVec2::ZERO);
    }

    #[test]
    fn test_one_shot_commands() {
        let mut controls = Controls::new();
        let input = controls.translate(&InputFrame {
            events: vec![
                InputEvent::Pressed(Command::Pause),
                InputEvent::Pressed(Command::Restart),
                InputEvent::Pressed(Command::Quit),
            ],
            held: None,
        });
        assert!(input.pause && input.restart && input.quit);

        let input = controls.translate(&InputFrame::default());
        assert!(!input.pause && !input.restart && !input.quit);
    }
}
