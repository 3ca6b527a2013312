use crate::ports::BridgeError;

/// Per-request lifecycle. No state survives a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Validated,
    AwaitingNetworkFix,
    Executing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Validate,
    BeginNetworkFix,
    NetworkFixed,
    Execute,
    Succeed,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: RequestPhase,
    pub to: RequestPhase,
    pub reason: &'static str,
}

pub fn phase_transition(
    phase: RequestPhase,
    action: RequestAction,
) -> Result<(RequestPhase, PhaseTransition), BridgeError> {
    use RequestAction::*;
    use RequestPhase::*;

    let (to, reason) = match (phase, action) {
        (Received, Validate) => (Validated, "request recognized"),
        (Validated, BeginNetworkFix) => (AwaitingNetworkFix, "chain mismatch, switch requested"),
        (AwaitingNetworkFix, NetworkFixed) => (Validated, "wallet switched to required chain"),
        (Validated, Execute) => (Executing, "preconditions met"),
        (Executing, Succeed) => (Succeeded, "flow completed"),
        (Validated, Fail) | (AwaitingNetworkFix, Fail) | (Executing, Fail) => {
            (Failed, "flow aborted")
        }
        (from, action) => {
            return Err(BridgeError::Validation(format!(
                "illegal request transition: {from:?} on {action:?}"
            )))
        }
    };
    Ok((
        to,
        PhaseTransition {
            from: phase,
            to,
            reason,
        },
    ))
}

/// Records one request's phases as the orchestrator drives it, so callers
/// can observe what happened without the orchestrator keeping any state.
#[derive(Debug)]
pub struct PhaseTracker {
    phase: RequestPhase,
    transitions: Vec<PhaseTransition>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: RequestPhase::Received,
            transitions: Vec::new(),
        }
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn apply(&mut self, action: RequestAction) -> Result<(), BridgeError> {
        let (next, transition) = phase_transition(self.phase, action)?;
        self.phase = next;
        self.transitions.push(transition);
        Ok(())
    }

    pub fn into_transitions(self) -> Vec<PhaseTransition> {
        self.transitions
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
