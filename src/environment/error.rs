/// Errors that may occur while resolving host constants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sysconf({name}) failed: {source}")]
    Sysconf {
        name: &'static str,
        #[source]
        source: nix::errno::Errno,
    },
    #[error("sysconf({name}) returned an unusable value: {value:?}")]
    InvalidValue {
        name: &'static str,
        value: Option<i64>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
