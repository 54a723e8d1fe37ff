// smart_lamp.rs
use crate::{
    commands::{Command, CommandKind},
    events::LampEvent,
    models::DeviceState,
};

/// The one device this process simulates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SmartLamp {
    state: DeviceState,
}

impl SmartLamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DeviceState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Applies a validated command. Metadata is only read by `COLOR`.
    pub fn handle_command(&mut self, command: Command) -> LampEvent {
        match command.kind {
            CommandKind::On => {
                self.state.power = true;
                LampEvent::PowerChanged { power: true }
            }
            CommandKind::Off => {
                self.state.power = false;
                LampEvent::PowerChanged { power: false }
            }
            CommandKind::Color => match command.metadata {
                Some(color) if !color.is_empty() => {
                    self.state.color = color.clone();
                    LampEvent::ColorChanged { color }
                }
                _ => LampEvent::ColorMissing,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(power: bool, color: &str) -> SmartLamp {
        SmartLamp::with_state(DeviceState {
            power,
            color: color.to_string(),
        })
    }

    #[test]
    fn on_and_off_ignore_prior_state() {
        for prior in [false, true] {
            let mut on = lamp(prior, "white");
            on.handle_command(Command::new(CommandKind::On));
            assert!(on.state().power);

            let mut off = lamp(prior, "white");
            off.handle_command(Command::new(CommandKind::Off));
            assert!(!off.state().power);
        }
    }

    #[test]
    fn off_ignores_metadata() {
        let mut lamp = lamp(true, "blue");
        let event = lamp.handle_command(Command::new(CommandKind::Off).with_metadata("ignored"));
        assert_eq!(event, LampEvent::PowerChanged { power: false });
        assert_eq!(
            lamp.state(),
            &DeviceState {
                power: false,
                color: "blue".into()
            }
        );
    }

    #[test]
    fn color_sets_non_empty_metadata() {
        let mut lamp = SmartLamp::new();
        let event = lamp.handle_command(Command::new(CommandKind::Color).with_metadata("red"));
        assert_eq!(event, LampEvent::ColorChanged { color: "red".into() });
        assert_eq!(lamp.state().color, "red");
        assert!(!lamp.state().power);
    }

    #[test]
    fn color_without_value_is_a_no_op() {
        let mut lamp = lamp(true, "red");
        let before = lamp.clone();

        assert_eq!(
            lamp.handle_command(Command::new(CommandKind::Color)),
            LampEvent::ColorMissing
        );
        assert_eq!(
            lamp.handle_command(Command::new(CommandKind::Color).with_metadata("")),
            LampEvent::ColorMissing
        );
        assert_eq!(lamp, before);
    }

    #[test]
    fn any_string_is_an_acceptable_color() {
        let mut lamp = SmartLamp::new();
        lamp.handle_command(Command::new(CommandKind::Color).with_metadata("#ff00aa"));
        assert_eq!(lamp.state().color, "#ff00aa");
    }
}
