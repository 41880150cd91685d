//! Events flowing from the backend runtime to the UI thread.

use shared::{domain::DispatchPhase, status::StatusUpdate};

pub enum UiEvent {
    Status(StatusUpdate),
    BackendUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Busy,
    Success,
    Failure,
}

pub fn status_tone(phase: DispatchPhase) -> StatusTone {
    match phase {
        DispatchPhase::Idle => StatusTone::Neutral,
        DispatchPhase::Selected | DispatchPhase::Pending => StatusTone::Busy,
        DispatchPhase::Succeeded => StatusTone::Success,
        DispatchPhase::HttpError | DispatchPhase::NetworkError => StatusTone::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_error_kinds_read_as_failures() {
        assert_eq!(status_tone(DispatchPhase::HttpError), StatusTone::Failure);
        assert_eq!(status_tone(DispatchPhase::NetworkError), StatusTone::Failure);
    }

    #[test]
    fn in_flight_phases_read_as_busy() {
        assert_eq!(status_tone(DispatchPhase::Selected), StatusTone::Busy);
        assert_eq!(status_tone(DispatchPhase::Pending), StatusTone::Busy);
        assert_eq!(status_tone(DispatchPhase::Idle), StatusTone::Neutral);
    }
}
