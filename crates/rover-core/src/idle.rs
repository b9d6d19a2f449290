//! Idle auto-rotation of the globe camera.
//!
//! Transition table:
//!
//! | state      | event                      | next                       | output            |
//! |------------|----------------------------|----------------------------|-------------------|
//! | `Idle`     | tick, deadline not reached | `Idle`                     | none              |
//! | `Idle`     | tick, deadline reached     | `Rotating`                 | fly out (once)    |
//! | `Rotating` | tick                       | `Rotating`                 | rotate one step   |
//! | any        | interaction                | `Idle`, deadline re-armed  | none              |
//! | any        | home view                  | `Idle`, re-armed late      | none, flag reset  |

/// Inactivity before rotation starts.
pub const IDLE_TIMEOUT_MS: u64 = 10_000;

/// Extra delay before re-arming after the home view, so rotation does not
/// fight the home flight.
pub const HOME_REARM_DELAY_MS: u64 = 500;

/// Altitude the camera flies out to when rotation starts.
pub const FLY_OUT_ALTITUDE_M: f64 = 12_000_000.0;

/// Rotation about the polar axis per tick.
pub const ROTATION_STEP_RAD: f64 = 0.0005;

/// Camera moves requested by the controller or the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    FlyToAltitude { altitude_m: f64 },
    RotateAboutPole { radians: f64 },
    FlyHome,
}

/// User-intent actions that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerDown,
    Wheel,
    TouchStart,
    PlaceWaypoint,
    Undo,
    Clear,
    Solve,
    Import,
    HomeView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    Tick { now_ms: u64 },
    Interaction { kind: Interaction, now_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Idle { deadline_ms: u64 },
    Rotating,
}

#[derive(Debug, Clone)]
pub struct IdleRotationController {
    state: IdleState,
    zoomed_out: bool,
    episodes: u64,
}

impl IdleRotationController {
    /// Start idle with the timer armed at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: IdleState::Idle {
                deadline_ms: now_ms.saturating_add(IDLE_TIMEOUT_MS),
            },
            zoomed_out: false,
            episodes: 0,
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn is_rotating(&self) -> bool {
        self.state == IdleState::Rotating
    }

    /// Number of times rotation has started.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    pub fn handle(&mut self, event: IdleEvent) -> Option<CameraCommand> {
        match (self.state, event) {
            (IdleState::Idle { deadline_ms }, IdleEvent::Tick { now_ms }) => {
                if now_ms < deadline_ms {
                    return None;
                }
                self.state = IdleState::Rotating;
                self.episodes += 1;
                tracing::debug!("Idle timeout elapsed, starting globe rotation");
                if self.zoomed_out {
                    Some(rotate_step())
                } else {
                    self.zoomed_out = true;
                    Some(CameraCommand::FlyToAltitude {
                        altitude_m: FLY_OUT_ALTITUDE_M,
                    })
                }
            }
            (IdleState::Rotating, IdleEvent::Tick { .. }) => Some(rotate_step()),
            (
                _,
                IdleEvent::Interaction {
                    kind: Interaction::HomeView,
                    now_ms,
                },
            ) => {
                self.zoomed_out = false;
                self.state = IdleState::Idle {
                    deadline_ms: now_ms
                        .saturating_add(HOME_REARM_DELAY_MS)
                        .saturating_add(IDLE_TIMEOUT_MS),
                };
                None
            }
            (_, IdleEvent::Interaction { now_ms, .. }) => {
                self.state = IdleState::Idle {
                    deadline_ms: now_ms.saturating_add(IDLE_TIMEOUT_MS),
                };
                None
            }
        }
    }
}

fn rotate_step() -> CameraCommand {
    CameraCommand::RotateAboutPole {
        radians: ROTATION_STEP_RAD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(c: &mut IdleRotationController, now_ms: u64) -> Option<CameraCommand> {
        c.handle(IdleEvent::Tick { now_ms })
    }

    fn interact(c: &mut IdleRotationController, kind: Interaction, now_ms: u64) {
        assert_eq!(c.handle(IdleEvent::Interaction { kind, now_ms }), None);
    }

    #[test]
    fn starts_rotating_once_after_timeout() {
        let mut c = IdleRotationController::new(0);
        assert_eq!(tick(&mut c, 9_999), None);
        assert!(!c.is_rotating());

        let entry = tick(&mut c, 10_000);
        assert_eq!(
            entry,
            Some(CameraCommand::FlyToAltitude {
                altitude_m: FLY_OUT_ALTITUDE_M
            })
        );
        for now in (10_016..20_000).step_by(16) {
            assert_eq!(tick(&mut c, now), Some(rotate_step()));
        }
        assert_eq!(c.episodes(), 1);
    }

    #[test]
    fn interaction_stops_rotation_and_rearms() {
        let mut c = IdleRotationController::new(0);
        tick(&mut c, 10_000);
        assert!(c.is_rotating());

        interact(&mut c, Interaction::PointerDown, 12_000);
        assert_eq!(c.state(), IdleState::Idle { deadline_ms: 22_000 });
        assert_eq!(tick(&mut c, 21_999), None);
        assert!(!c.is_rotating());

        // Fly-out happened already, so the second episode rotates straight away.
        assert_eq!(tick(&mut c, 22_000), Some(rotate_step()));
        assert_eq!(c.episodes(), 2);
    }

    #[test]
    fn every_named_interaction_resets_the_timer() {
        let kinds = [
            Interaction::PointerDown,
            Interaction::Wheel,
            Interaction::TouchStart,
            Interaction::PlaceWaypoint,
            Interaction::Undo,
            Interaction::Clear,
            Interaction::Solve,
            Interaction::Import,
        ];
        for kind in kinds {
            let mut c = IdleRotationController::new(0);
            interact(&mut c, kind, 9_000);
            assert_eq!(tick(&mut c, 10_000), None, "{kind:?} did not reset");
            assert!(tick(&mut c, 19_000).is_some());
        }
    }

    #[test]
    fn home_view_rearms_late_and_resets_fly_out() {
        let mut c = IdleRotationController::new(0);
        tick(&mut c, 10_000);
        interact(&mut c, Interaction::HomeView, 11_000);
        assert_eq!(
            c.state(),
            IdleState::Idle {
                deadline_ms: 11_000 + HOME_REARM_DELAY_MS + IDLE_TIMEOUT_MS
            }
        );
        assert_eq!(tick(&mut c, 21_000), None);
        assert_eq!(
            tick(&mut c, 21_500),
            Some(CameraCommand::FlyToAltitude {
                altitude_m: FLY_OUT_ALTITUDE_M
            })
        );
    }
}
