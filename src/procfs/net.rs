//! Network counters from `/proc/net/dev` and socket tables from `/proc/<pid>/net/tcp{,6}`.
//!
//! `/proc/net/dev` describes the network namespace of the reader, not a single
//! process, so the totals here are host-wide (for the host namespace) rather
//! than per-process.

use std::io::BufRead;

use crate::statfile::StatParseError;

/// Interfaces excluded from the totals.
const IGNORED_INTERFACES: [&str; 1] = ["lo"];

/// Receive/transmit totals summed across all non-loopback interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetDevStat {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errs: u64,
    pub rx_drop: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errs: u64,
    pub tx_drop: u64,
}

impl std::ops::AddAssign for NetDevStat {
    fn add_assign(&mut self, rhs: Self) {
        self.rx_bytes = self.rx_bytes.saturating_add(rhs.rx_bytes);
        self.rx_packets = self.rx_packets.saturating_add(rhs.rx_packets);
        self.rx_errs = self.rx_errs.saturating_add(rhs.rx_errs);
        self.rx_drop = self.rx_drop.saturating_add(rhs.rx_drop);
        self.tx_bytes = self.tx_bytes.saturating_add(rhs.tx_bytes);
        self.tx_packets = self.tx_packets.saturating_add(rhs.tx_packets);
        self.tx_errs = self.tx_errs.saturating_add(rhs.tx_errs);
        self.tx_drop = self.tx_drop.saturating_add(rhs.tx_drop);
    }
}

/// Column positions after the `iface:` prefix.
const COLUMNS: [(usize, &str); 8] = [
    (0, "rx_bytes"),
    (1, "rx_packets"),
    (2, "rx_errs"),
    (3, "rx_drop"),
    (8, "tx_bytes"),
    (9, "tx_packets"),
    (10, "tx_errs"),
    (11, "tx_drop"),
];

fn parse_interface(data: &str, lineno: usize) -> std::io::Result<NetDevStat> {
    let fields: Vec<&str> = data.split_whitespace().collect();
    let mut values = [0u64; COLUMNS.len()];

    for (slot, (index, key)) in values.iter_mut().zip(COLUMNS) {
        let raw = fields.get(index).ok_or_else(|| {
            std::io::Error::from(StatParseError::MalformedLine {
                line: lineno,
                reason: format!("missing column `{key}`"),
            })
        })?;
        *slot = raw
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_owned(),
                value: (*raw).to_owned(),
                line: lineno,
                source,
            })?;
    }

    let [rx_bytes, rx_packets, rx_errs, rx_drop, tx_bytes, tx_packets, tx_errs, tx_drop] = values;
    Ok(NetDevStat {
        rx_bytes,
        rx_packets,
        rx_errs,
        rx_drop,
        tx_bytes,
        tx_packets,
        tx_errs,
        tx_drop,
    })
}

impl NetDevStat {
    /// Sums the counters of every interface listed in a `/proc/net/dev` style buffer.
    ///
    /// The two header lines are skipped. Interface names are matched exactly, so
    /// `lo` is ignored while `lo1` or `loop0` are counted.
    pub fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = NetDevStat::default();
        let mut line = String::new();
        let mut lineno = 0;

        for _ in 0..2 {
            buf.read_line(&mut line)?;
            lineno += 1;
            line.clear();
        }

        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            if let Some((iface, data)) = line.trim().split_once(':') {
                if !IGNORED_INTERFACES.contains(&iface.trim()) {
                    stat += parse_interface(data, lineno)?;
                }
            }
            line.clear();
        }

        Ok(stat)
    }
}

/// Counts socket entries in a `/proc/<pid>/net/tcp` style table (one header line).
pub fn count_socket_entries<R: BufRead>(buf: &mut R) -> std::io::Result<u64> {
    let mut count = 0;
    let mut line = String::new();

    buf.read_line(&mut line)?;
    line.clear();
    while buf.read_line(&mut line)? != 0 {
        if !line.trim().is_empty() {
            count += 1;
        }
        line.clear();
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statfile::extract_stat_parse_error;

    const HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

    #[test]
    fn test_only_headers() {
        let stat = NetDevStat::from_reader(&mut HEADER.as_bytes()).unwrap();
        assert_eq!(stat, NetDevStat::default());
    }

    #[test]
    fn test_sums_interfaces_except_loopback() {
        let data = format!(
            "{HEADER}\
    lo: 422198341   75815    0    0    0     0          0         0 422198341   75815    0    0    0     0       0          0
  eth0: 10240    100     1    2    0     0          0         0  20480   200     3    4    0     0       0          0
docker0: 5000     50     0    0    0     0          0         0   6000    60     0    0    0     0       0          0
"
        );
        let stat = NetDevStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat,
            NetDevStat {
                rx_bytes: 15240,
                rx_packets: 150,
                rx_errs: 1,
                rx_drop: 2,
                tx_bytes: 26480,
                tx_packets: 260,
                tx_errs: 3,
                tx_drop: 4,
            }
        );
    }

    #[test]
    fn test_totals_saturate() {
        let data = format!(
            "{HEADER}\
  eth0: {max} 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0
  eth1: 10 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0
",
            max = u64::MAX
        );
        let stat = NetDevStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.rx_bytes, u64::MAX);
        assert_eq!(stat.rx_packets, 2);
    }

    #[test]
    fn test_truncated_interface_line() {
        let data = format!("{HEADER}  eth0: 10240 100 0 0\n");
        let err = NetDevStat::from_reader(&mut data.as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::MalformedLine { line, reason } => {
                assert_eq!(*line, 3);
                assert_eq!(reason, "missing column `tx_bytes`");
            }
            other => panic!("Expected MalformedLine error, got {other:?}"),
        }
    }

    #[test]
    fn test_count_socket_entries() {
        let data = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 23087 1
   1: 0100007F:1F90 0100007F:D2A4 01 00000000:00000000 00:00000000 00000000  1000        0 51213 1
";
        assert_eq!(count_socket_entries(&mut data.as_bytes()).unwrap(), 2);
        assert_eq!(count_socket_entries(&mut "".as_bytes()).unwrap(), 0);
    }
}
