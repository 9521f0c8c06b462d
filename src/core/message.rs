use serde::{Deserialize, Serialize};

/// Primitive kinds a wire field can carry.
///
/// Every field occupies one 4-byte window on the serial wire,
/// whatever its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Bool,
    Int,
}

/// A single decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f32),
    Bool(bool),
    Int(u32),
}

/// Messages exchanged between the supervisor and the motor controller.
///
/// Each variant corresponds to one wire discriminant; its fields are
/// encoded in declaration order. The JSON representation (internally
/// tagged) is what the GUI receives over TCP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Pendulum angle reported by the controller, in degrees.
    AngularPosition { degrees: f32 },
    /// Angular speed, in degrees per second.
    AngularSpeed { dps: f32 },
    /// Battery voltage, in millivolts.
    BatteryVoltage { millivolts: u32 },
    /// Whether a user is currently detected on the robot.
    UserPresence { present: bool },
    /// Emergency stop line state.
    EmergencyStop { active: bool },
    /// Torque setpoint for the motor.
    Torque { value: f32 },
    /// Platform attitude, in degrees.
    Attitude { pitch: f32, roll: f32 },
}

impl Message {
    /// Wire discriminant identifying this message type.
    pub const fn discriminant(&self) -> u8 {
        match self {
            Message::AngularPosition { .. } => 0x01,
            Message::AngularSpeed { .. } => 0x02,
            Message::BatteryVoltage { .. } => 0x03,
            Message::UserPresence { .. } => 0x04,
            Message::EmergencyStop { .. } => 0x05,
            Message::Torque { .. } => 0x06,
            Message::Attitude { .. } => 0x07,
        }
    }

    /// Ordered field layout for a discriminant, or `None` if the
    /// discriminant is unknown.
    pub fn schema(discriminant: u8) -> Option<&'static [FieldKind]> {
        match discriminant {
            0x01 | 0x02 | 0x06 => Some(&[FieldKind::Float]),
            0x03 => Some(&[FieldKind::Int]),
            0x04 | 0x05 => Some(&[FieldKind::Bool]),
            0x07 => Some(&[FieldKind::Float, FieldKind::Float]),
            _ => None,
        }
    }

    /// Field values in wire order.
    pub fn fields(&self) -> Vec<FieldValue> {
        match *self {
            Message::AngularPosition { degrees } => vec![FieldValue::Float(degrees)],
            Message::AngularSpeed { dps } => vec![FieldValue::Float(dps)],
            Message::BatteryVoltage { millivolts } => vec![FieldValue::Int(millivolts)],
            Message::UserPresence { present } => vec![FieldValue::Bool(present)],
            Message::EmergencyStop { active } => vec![FieldValue::Bool(active)],
            Message::Torque { value } => vec![FieldValue::Float(value)],
            Message::Attitude { pitch, roll } => {
                vec![FieldValue::Float(pitch), FieldValue::Float(roll)]
            }
        }
    }

    /// Rebuild a message from a discriminant and decoded field values.
    ///
    /// Returns `None` when the discriminant is unknown or the values
    /// do not match its schema; the codec treats both as protocol
    /// faults.
    pub fn from_fields(discriminant: u8, fields: &[FieldValue]) -> Option<Message> {
        match (discriminant, fields) {
            (0x01, &[FieldValue::Float(degrees)]) => Some(Message::AngularPosition { degrees }),
            (0x02, &[FieldValue::Float(dps)]) => Some(Message::AngularSpeed { dps }),
            (0x03, &[FieldValue::Int(millivolts)]) => Some(Message::BatteryVoltage { millivolts }),
            (0x04, &[FieldValue::Bool(present)]) => Some(Message::UserPresence { present }),
            (0x05, &[FieldValue::Bool(active)]) => Some(Message::EmergencyStop { active }),
            (0x06, &[FieldValue::Float(value)]) => Some(Message::Torque { value }),
            (0x07, &[FieldValue::Float(pitch), FieldValue::Float(roll)]) => {
                Some(Message::Attitude { pitch, roll })
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::AngularPosition { degrees } => write!(f, "angular_position {degrees}"),
            Message::AngularSpeed { dps } => write!(f, "angular_speed {dps}"),
            Message::BatteryVoltage { millivolts } => write!(f, "battery_voltage {millivolts}"),
            Message::UserPresence { present } => write!(f, "user_presence {present}"),
            Message::EmergencyStop { active } => write!(f, "emergency_stop {active}"),
            Message::Torque { value } => write!(f, "torque {value}"),
            Message::Attitude { pitch, roll } => write!(f, "attitude {pitch} {roll}"),
        }
    }
}
