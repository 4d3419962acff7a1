use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    #[error("could not open log file: {0}")]
    Logging(String),
    #[error("could not access high score file {}: {source}", path.display())]
    HiscoreIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed high score file {}: {source}", path.display())]
    HiscoreParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not serialize high scores: {0}")]
    HiscoreWrite(#[from] toml::ser::Error),
}
