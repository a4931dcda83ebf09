/// Converts a `Result` into an `Option`, logging the error instead of propagating it.
///
/// Used at the boundaries where a failure only degrades the result: an
/// optional counter source, a process vanishing during a table scan.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error at `error` level.
    fn ok_log(self) -> Option<T>;

    /// Logs the error at the given level.
    fn ok_log_at(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        self.ok_log_at(log::Level::Error)
    }

    fn ok_log_at(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}
