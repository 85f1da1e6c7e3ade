use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("missing trigger line")]
    MissingTrigger,
    #[error("missing echo line")]
    MissingEcho,
    #[error("missing alert output")]
    MissingAlert,
    #[error("missing clock")]
    MissingClock,
    #[error("thresholds must satisfy 0 <= near < far (near={near}, far={far})")]
    InvalidThresholds { near: f32, far: f32 },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
