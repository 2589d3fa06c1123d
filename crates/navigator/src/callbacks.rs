//! Instruction handlers
//!
//! Every [`InstructionId`] a navigation uses must have a handler registered
//! before the navigation starts. Handlers receive the backend, the
//! navigator's sleeper, and the instruction, and read their arguments from
//! the instruction.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use snapnav_common::{Firmware, Instruction, InstructionId};
use tracing::debug;

use crate::backend::Backend;
use crate::error::{NavError, NavResult};
use crate::pacing::{seconds, Sleeper};

/// Handler bound to one instruction identifier
pub type Callback = Box<dyn Fn(&mut dyn Backend, &mut dyn Sleeper, &Instruction) -> NavResult<()>>;

/// Default timeout of `WaitForScreenChange` when none is given
pub const DEFAULT_SCREEN_CHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Mapping from instruction identifier to handler
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<InstructionId, Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for the standard instructions of `firmware`'s device:
    /// waits on every device, clicks on button devices, touches on
    /// touchscreen devices.
    pub fn for_firmware(firmware: &Firmware) -> Self {
        let mut registry = Self::new();

        registry.register(InstructionId::Wait, |_, sleeper, ins| {
            let secs = ins.arg_f64(0).ok_or_else(|| NavError::InvalidArguments {
                id: ins.id(),
                reason: "expected a duration in seconds".to_string(),
            })?;
            sleeper.sleep(seconds(secs));
            Ok(())
        });
        registry.register(InstructionId::WaitForScreenChange, |backend, _, ins| {
            let timeout = ins
                .arg_f64(0)
                .or_else(|| ins.kwarg_f64("timeout"))
                .map(seconds)
                .unwrap_or(DEFAULT_SCREEN_CHANGE_TIMEOUT);
            backend.wait_for_screen_change(timeout)
        });

        if firmware.device.has_touchscreen() {
            registry.register(InstructionId::Touch, |backend, _, ins| {
                match (ins.arg_u32(0), ins.arg_u32(1)) {
                    (Some(x), Some(y)) => backend.finger_touch(x, y),
                    _ => Err(NavError::InvalidArguments {
                        id: ins.id(),
                        reason: "expected x and y screen coordinates".to_string(),
                    }),
                }
            });
        } else {
            registry.register(InstructionId::RightClick, |backend, _, _| backend.right_click());
            registry.register(InstructionId::LeftClick, |backend, _, _| backend.left_click());
            registry.register(InstructionId::BothClick, |backend, _, _| backend.both_click());
        }

        registry
    }

    /// Bind `callback` to `id`, replacing any previous handler
    pub fn register<F>(&mut self, id: InstructionId, callback: F) -> &mut Self
    where
        F: Fn(&mut dyn Backend, &mut dyn Sleeper, &Instruction) -> NavResult<()> + 'static,
    {
        if self.callbacks.insert(id, Box::new(callback)).is_some() {
            debug!("Replaced callback for {}", id);
        }
        self
    }

    pub fn contains(&self, id: InstructionId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Run the handler registered for `instruction`
    pub fn dispatch(
        &self,
        backend: &mut dyn Backend,
        sleeper: &mut dyn Sleeper,
        instruction: &Instruction,
    ) -> NavResult<()> {
        let callback = self
            .callbacks
            .get(&instruction.id())
            .ok_or(NavError::UnregisteredInstruction(instruction.id()))?;
        debug!("Dispatching {}", instruction);
        callback(backend, sleeper, instruction)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.callbacks.keys().collect();
        ids.sort();
        f.debug_struct("CallbackRegistry").field("ids", &ids).finish()
    }
}
