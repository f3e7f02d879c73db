//! Terminal-state policy for task instances.

use crate::task::LifecycleState;

/// True once the instance can no longer run.
pub fn is_terminal(state: &LifecycleState) -> bool {
    matches!(
        state,
        LifecycleState::Terminated | LifecycleState::Failed | LifecycleState::Successful
    )
}

/// Unknown states are terminable so a stuck instance can always be stopped.
pub fn can_terminate(state: &LifecycleState) -> bool {
    !is_terminal(state)
}

pub fn is_known(state: &LifecycleState) -> bool {
    !matches!(state, LifecycleState::Unknown(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_states_are_not_terminable() {
        for state in [
            LifecycleState::Terminated,
            LifecycleState::Failed,
            LifecycleState::Successful,
        ] {
            assert!(is_terminal(&state), "{state}");
            assert!(!can_terminate(&state), "{state}");
        }
    }

    #[test]
    fn every_other_known_state_is_terminable() {
        let known = LifecycleState::KNOWN;
        let open: Vec<_> = known
            .iter()
            .filter(|state| !is_terminal(state))
            .collect();
        assert_eq!(open.len(), 3);
        for state in open {
            assert!(can_terminate(state), "{state}");
        }
    }

    #[test]
    fn unrecognized_state_fails_open() {
        let state = LifecycleState::parse("archived");
        assert!(!is_known(&state));
        assert!(!is_terminal(&state));
        assert!(can_terminate(&state));
    }
}
