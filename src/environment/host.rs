use nix::unistd::{SysconfVar, geteuid, sysconf};

use super::{Error, Result};

/// Clock tick rate assumed when `sysconf(_SC_CLK_TCK)` cannot be queried.
pub const FALLBACK_CLOCK_TICKS: u64 = 100;
/// Page size assumed when `sysconf(_SC_PAGESIZE)` cannot be queried.
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

/// Read-only host constants, resolved once at startup and passed explicitly
/// to the components that convert kernel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEnvironment {
    clock_ticks: u64,
    page_size: u64,
    privileged: bool,
}

impl HostEnvironment {
    /// Builds an environment from known values.
    ///
    /// Zero values are replaced by the fallbacks, since both constants are divisors
    /// or multipliers of kernel counters.
    pub fn new(clock_ticks: u64, page_size: u64, privileged: bool) -> Self {
        Self {
            clock_ticks: if clock_ticks == 0 {
                FALLBACK_CLOCK_TICKS
            } else {
                clock_ticks
            },
            page_size: if page_size == 0 {
                FALLBACK_PAGE_SIZE
            } else {
                page_size
            },
            privileged,
        }
    }

    /// Queries the running kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if either `sysconf` call fails or yields a non-positive value.
    pub fn detect() -> Result<Self> {
        let clock_ticks = query(SysconfVar::CLK_TCK, "_SC_CLK_TCK")?;
        let page_size = query(SysconfVar::PAGE_SIZE, "_SC_PAGESIZE")?;
        let privileged = geteuid().is_root();

        log::debug!(
            "Host environment: clock_ticks={clock_ticks}, page_size={page_size}, privileged={privileged}"
        );

        Ok(Self {
            clock_ticks,
            page_size,
            privileged,
        })
    }

    /// Like [`HostEnvironment::detect`], but falls back to common Linux defaults
    /// (100 Hz, 4 KiB pages) after logging a warning.
    pub fn detect_or_fallback() -> Self {
        Self::detect().unwrap_or_else(|err| {
            log::warn!("Using fallback host constants: {err}");
            Self::new(
                FALLBACK_CLOCK_TICKS,
                FALLBACK_PAGE_SIZE,
                geteuid().is_root(),
            )
        })
    }

    /// Clock ticks per second (`USER_HZ`).
    pub fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    /// Size of a memory page in bytes.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Whether the process runs with effective uid 0.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}

fn query(var: SysconfVar, name: &'static str) -> Result<u64> {
    let value = sysconf(var).map_err(|source| Error::Sysconf { name, source })?;
    match value {
        Some(v) if v > 0 => Ok(v as u64),
        other => Err(Error::InvalidValue {
            name,
            value: other.map(i64::from),
        }),
    }
}
