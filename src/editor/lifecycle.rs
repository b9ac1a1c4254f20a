use serde::Serialize;

/// Callbacks raised by the embedded editor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    AppReady,
    Error,
    Warning,
    RequestClose,
}

/// Loading state of an editor window.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EditorPhase {
    /// Spinner shown while the config is fetched and the editor boots.
    Loading,
    /// Editor visible. Errors and warnings also reveal it so the editor can render them.
    Ready,
    /// The configuration could not be built.
    Failed,
    Closed,
}

impl EditorPhase {
    pub fn apply(self, event: EditorEvent) -> EditorPhase {
        match (self, event) {
            (EditorPhase::Closed, _) => EditorPhase::Closed,
            (_, EditorEvent::RequestClose) => EditorPhase::Closed,
            (EditorPhase::Failed, _) => EditorPhase::Failed,
            (_, EditorEvent::AppReady | EditorEvent::Error | EditorEvent::Warning) => {
                EditorPhase::Ready
            }
        }
    }

    /// Outcome of fetching the editor configuration.
    pub fn on_config<T, E>(self, result: &Result<T, E>) -> EditorPhase {
        match (self, result) {
            (EditorPhase::Loading, Err(_)) => EditorPhase::Failed,
            (phase, _) => phase,
        }
    }
}
