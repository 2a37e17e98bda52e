use std::fmt;

/// Non-fatal conditions met during a release run.
/// These are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Latest tag exists but is not `vMAJOR.MINOR.PATCH`; numbering restarts from v0.0.0
    UnparsableTag { tag: String },
    /// Text generation failed; the fallback message is kept
    GenerationFailed { model: String, reason: String },
    /// `gup.timeout` is not an integer
    InvalidTimeout { value: String, fallback: u64 },
    /// Saved model is no longer listed by the generator
    SavedModelMissing { model: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnparsableTag { tag } => {
                write!(f, "Cannot parse tag '{}', numbering from v0.0.0", tag)
            }
            Warning::GenerationFailed { model, reason } => {
                write!(f, "AI message from '{}' unavailable: {}", model, reason)
            }
            Warning::InvalidTimeout { value, fallback } => {
                write!(
                    f,
                    "Ignoring gup.timeout '{}', using {} seconds",
                    value, fallback
                )
            }
            Warning::SavedModelMissing { model } => {
                write!(f, "Saved model '{}' is not available any more", model)
            }
        }
    }
}
