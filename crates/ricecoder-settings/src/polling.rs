//! Per-frame binding state machine
//!
//! Each key-binding setting with a bound current value moves through
//! Idle → Down → Held (every frame) → Up → Idle. Draggable bindings also
//! measure pointer travel while held and switch to an active drag once it
//! exceeds the configured threshold.

use std::collections::HashSet;
use tracing::trace;

use crate::events::{BindingEvent, FiredEvent};
use crate::input::InputSource;
use crate::registry::{ActiveBinding, DragPhase, DragState, SettingsRegistry};

impl SettingsRegistry {
    /// Advance every binding by one frame of `dt` seconds
    ///
    /// Drag promotion runs before the binding scan, so a drag that starts and
    /// a release that ends it can both land in one poll. Events are dispatched
    /// to binding listeners, then returned in firing order.
    pub fn poll(&mut self, dt: f32, input: &impl InputSource) -> Vec<FiredEvent> {
        let pointer = input.pointer_position();
        let threshold_sq = self.config.drag_threshold * self.config.drag_threshold;
        let mut fired = Vec::new();
        let mut promoted = HashSet::new();

        for key in &self.order {
            let Some(identity) = self.settings.get(key).and_then(|s| s.default_binding()) else {
                continue;
            };
            let Some(drag) = self.drag_states.get_mut(&identity) else {
                continue;
            };
            drag.current = pointer;
            if drag.phase == DragPhase::Measuring
                && drag.start.distance_squared(pointer) > threshold_sq
            {
                drag.phase = DragPhase::Active;
                promoted.insert(identity);
                fired.push(FiredEvent {
                    binding: identity,
                    event: BindingEvent::DragBegin {
                        start: drag.start,
                        current: pointer,
                    },
                });
            }
        }

        for key in &self.order {
            let Some(setting) = self.settings.get(key) else {
                continue;
            };
            let (Some(identity), Some(current)) = (setting.default_binding(), setting.current_binding())
            else {
                continue;
            };
            if current.is_none() {
                continue;
            }
            let keycode = current.keycode();

            if self.active_bindings.contains_key(&identity) {
                let released = input.went_up(keycode)
                    || !input.is_key_held(keycode)
                    || !input.modifiers_held(current);

                if released {
                    self.active_bindings.remove(&identity);
                    fired.push(FiredEvent {
                        binding: identity,
                        event: BindingEvent::Up,
                    });
                    let event = match self.drag_states.remove(&identity) {
                        Some(drag) if drag.phase == DragPhase::Active => BindingEvent::DragEnd {
                            start: drag.start,
                            current: pointer,
                        },
                        _ => BindingEvent::Click,
                    };
                    fired.push(FiredEvent {
                        binding: identity,
                        event,
                    });
                    continue;
                }

                if let Some(active) = self.active_bindings.get_mut(&identity) {
                    active.held_for += dt;
                    fired.push(FiredEvent {
                        binding: identity,
                        event: BindingEvent::Held {
                            held_for: active.held_for,
                        },
                    });
                }
                // DragBegin already reported this frame's position
                if let Some(drag) = self.drag_states.get(&identity) {
                    if drag.phase == DragPhase::Active && !promoted.contains(&identity) {
                        fired.push(FiredEvent {
                            binding: identity,
                            event: BindingEvent::Drag {
                                start: drag.start,
                                current: pointer,
                            },
                        });
                    }
                }
            } else if input.went_down(keycode) && input.modifiers_held(current) {
                self.active_bindings.insert(
                    identity,
                    ActiveBinding {
                        current,
                        held_for: 0.0,
                    },
                );
                fired.push(FiredEvent {
                    binding: identity,
                    event: BindingEvent::Down,
                });
                if setting.options().drag_enabled() {
                    self.drag_states.insert(
                        identity,
                        DragState {
                            phase: DragPhase::Measuring,
                            start: pointer,
                            current: pointer,
                            owner: key.clone(),
                        },
                    );
                }
            }
        }

        for event in &fired {
            trace!("{} {:?}", event.binding, event.event);
        }
        self.dispatch(&fired);
        fired
    }
}
