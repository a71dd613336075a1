use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectorError {
    #[error(
        "Not enough history to project: {points} equity point(s), at least 2 are required \
         to derive a return distribution"
    )]
    InsufficientHistory { points: usize },
}
