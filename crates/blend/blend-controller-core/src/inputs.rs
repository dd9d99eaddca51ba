//! Input contracts for the controller.
//!
//! A control panel (or any host) collects commands between frames and passes them
//! to [`BlendController::update`](crate::BlendController::update), which applies them
//! in order before stepping.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    /// Commands applied before stepping, in order.
    #[serde(default)]
    pub commands: Vec<BlendCommand>,
}

impl Inputs {
    pub fn push(&mut self, command: BlendCommand) {
        self.commands.push(command);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlendCommand {
    /// Crossfade to a base track, or fade out when `target` is `None`.
    /// A missing duration uses `Config::default_crossfade`.
    RequestTransition {
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        duration: Option<f32>,
    },
    SetAdditiveWeight {
        track: String,
        weight: f32,
    },
    SetGlobalTimeScale {
        scale: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_tagged_json() {
        let inputs: Inputs = serde_json::from_str(
            r#"{ "commands": [
                { "type": "request_transition", "target": "walk" },
                { "type": "request_transition", "duration": 0.5 },
                { "type": "set_additive_weight", "track": "agree", "weight": 0.25 },
                { "type": "set_global_time_scale", "scale": 2.0 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(
            inputs.commands[0],
            BlendCommand::RequestTransition {
                target: Some("walk".into()),
                duration: None,
            }
        );
        assert_eq!(
            inputs.commands[1],
            BlendCommand::RequestTransition {
                target: None,
                duration: Some(0.5),
            }
        );
        assert_eq!(inputs.commands.len(), 4);
    }
}
