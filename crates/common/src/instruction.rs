//! Navigation instructions
//!
//! An [`Instruction`] is one replayable action ("press right", "touch at
//! x/y") identified by an [`InstructionId`] and carrying opaque arguments
//! that the handler registered for that id interprets.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a navigation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionId {
    /// Sleep for a fixed number of seconds
    Wait,
    /// Block until the screen changes (or a timeout elapses)
    WaitForScreenChange,
    RightClick,
    LeftClick,
    BothClick,
    /// Touch the screen at `(x, y)`
    Touch,
    /// Test-specific action, bound by the caller
    Custom(u32),
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionId::Wait => write!(f, "wait"),
            InstructionId::WaitForScreenChange => write!(f, "wait_for_screen_change"),
            InstructionId::RightClick => write!(f, "right_click"),
            InstructionId::LeftClick => write!(f, "left_click"),
            InstructionId::BothClick => write!(f, "both_click"),
            InstructionId::Touch => write!(f, "touch"),
            InstructionId::Custom(id) => write!(f, "custom({})", id),
        }
    }
}

impl From<u32> for InstructionId {
    fn from(id: u32) -> Self {
        InstructionId::Custom(id)
    }
}

/// A single navigation action with its arguments.
///
/// Instructions are immutable once built and compare by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    id: InstructionId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    kwargs: BTreeMap<String, Value>,
}

impl Instruction {
    /// Instruction without arguments
    pub fn new(id: impl Into<InstructionId>) -> Self {
        Self {
            id: id.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Instruction with positional and keyword arguments
    pub fn with_args<I, K>(id: impl Into<InstructionId>, args: I, kwargs: K) -> Self
    where
        I: IntoIterator<Item = Value>,
        K: IntoIterator<Item = (String, Value)>,
    {
        Self {
            id: id.into(),
            args: args.into_iter().collect(),
            kwargs: kwargs.into_iter().collect(),
        }
    }

    /// Touch instruction at screen coordinates
    pub fn touch(x: u32, y: u32) -> Self {
        Self {
            id: InstructionId::Touch,
            args: vec![Value::from(x), Value::from(y)],
            kwargs: BTreeMap::new(),
        }
    }

    /// Fixed sleep, in seconds
    pub fn wait(seconds: f64) -> Self {
        Self {
            id: InstructionId::Wait,
            args: vec![Value::from(seconds)],
            kwargs: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> InstructionId {
        self.id
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    /// Positional argument `index` as a float, if present and numeric
    pub fn arg_f64(&self, index: usize) -> Option<f64> {
        self.args.get(index).and_then(Value::as_f64)
    }

    /// Positional argument `index` as an unsigned coordinate
    pub fn arg_u32(&self, index: usize) -> Option<u32> {
        self.args
            .get(index)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn kwarg_f64(&self, name: &str) -> Option<f64> {
        self.kwargs.get(name).and_then(Value::as_f64)
    }
}

impl From<InstructionId> for Instruction {
    fn from(id: InstructionId) -> Self {
        Instruction::new(id)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if !self.args.is_empty() || !self.kwargs.is_empty() {
            let mut parts: Vec<String> = self.args.iter().map(Value::to_string).collect();
            parts.extend(self.kwargs.iter().map(|(k, v)| format!("{}={}", k, v)));
            write!(f, "({})", parts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equality_is_by_value() {
        let a = Instruction::with_args(1u32, vec![json!(1)], vec![("1".to_string(), json!(1))]);
        let b = Instruction::with_args(1u32, vec![json!(1)], vec![("1".to_string(), json!(1))]);
        let c = Instruction::with_args(1u32, vec![json!(2)], Vec::new());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.id(), InstructionId::Custom(1));
    }

    #[test]
    fn test_typed_argument_accessors() {
        let touch = Instruction::touch(200, 560);
        assert_eq!(touch.arg_u32(0), Some(200));
        assert_eq!(touch.arg_u32(1), Some(560));
        assert_eq!(touch.arg_u32(2), None);

        let wait = Instruction::wait(0.5);
        assert_eq!(wait.arg_f64(0), Some(0.5));
        assert_eq!(wait.arg_u32(0), None);

        let kw = Instruction::with_args(
            InstructionId::WaitForScreenChange,
            Vec::new(),
            vec![("timeout".to_string(), json!(3))],
        );
        assert_eq!(kw.kwarg_f64("timeout"), Some(3.0));
    }

    #[test]
    fn test_parse_from_yaml_shape() {
        let parsed: Instruction = serde_json::from_value(json!({
            "id": "touch",
            "args": [10, 20]
        }))
        .unwrap();
        assert_eq!(parsed, Instruction::touch(10, 20));

        let custom: Instruction = serde_json::from_value(json!({ "id": { "custom": 7 } })).unwrap();
        assert_eq!(custom.id(), InstructionId::Custom(7));
        assert!(custom.args().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::new(InstructionId::RightClick).to_string(), "right_click");
        assert_eq!(Instruction::touch(1, 2).to_string(), "touch(1, 2)");
    }
}
