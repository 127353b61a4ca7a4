//! Timestamp delta encoding.
//!
//! The first record of a stream keeps its absolute timestamps. Every later record replaces
//! recvTime with the distance from the previous record's recvTime, and sendTime with how
//! far in the past (relative to its own recvTime) the tick was sent.

use std::io;

use super::record::{malformed, Tick, FIELD_COUNT, FIELD_SEPARATOR, RECV_TIME_FIELD, SEND_TIME_FIELD};

/// The timestamp text that goes on the wire for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFields {
    pub send: String,
    pub recv: String,
}

/// Encoder side state: remembers the previous recvTime.
#[derive(Debug, Default)]
pub struct TimeDeltas {
    previous_recv: Option<i64>,
}

impl TimeDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the wire form of this tick's timestamps and remember its recvTime.
    pub fn next(&mut self, tick: &Tick<'_>, line_no: u64) -> io::Result<TimeFields> {
        let fields = match self.previous_recv {
            None => TimeFields {
                send: tick.send_raw.to_string(),
                recv: tick.recv_raw.to_string(),
            },
            Some(previous) => {
                let recv_delta = tick
                    .recv_time
                    .checked_sub(previous)
                    .ok_or_else(|| malformed(line_no, "recvTime delta overflows"))?;
                let send_delta = tick
                    .recv_time
                    .checked_sub(tick.send_time)
                    .ok_or_else(|| malformed(line_no, "sendTime delta overflows"))?;
                TimeFields {
                    send: send_delta.to_string(),
                    recv: recv_delta.to_string(),
                }
            }
        };
        self.previous_recv = Some(tick.recv_time);
        Ok(fields)
    }
}

/// Restore absolute timestamps in a decoded line.
///
/// `previous` is the last fully reconstructed line, or None for the first record of the
/// stream, whose timestamps are already absolute and pass through untouched. Otherwise
/// recvTime = previous recvTime + recvTime delta, and sendTime = recvTime - sendTime delta.
pub fn reverse_deltas(previous: Option<&str>, current: &str) -> io::Result<String> {
    let previous = match previous {
        Some(line) => line,
        None => return Ok(current.to_string()),
    };

    let previous_recv = parse_field(previous, RECV_TIME_FIELD)?;
    let mut fields: Vec<&str> = current.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(corrupt(&format!(
            "decoded record has {} fields instead of {}",
            fields.len(),
            FIELD_COUNT
        )));
    }
    let recv_delta = parse_int(fields[RECV_TIME_FIELD])?;
    let send_delta = parse_int(fields[SEND_TIME_FIELD])?;

    let recv_time = previous_recv
        .checked_add(recv_delta)
        .ok_or_else(|| corrupt("recvTime overflows"))?;
    let send_time = recv_time
        .checked_sub(send_delta)
        .ok_or_else(|| corrupt("sendTime overflows"))?;

    // Swap in the absolute values, everything else passes through
    let recv_text = recv_time.to_string();
    let send_text = send_time.to_string();
    fields[RECV_TIME_FIELD] = &recv_text;
    fields[SEND_TIME_FIELD] = &send_text;
    Ok(fields.join(FIELD_SEPARATOR))
}

fn parse_field(line: &str, index: usize) -> io::Result<i64> {
    let field = line
        .split(FIELD_SEPARATOR)
        .nth(index)
        .ok_or_else(|| corrupt("previous record is missing its timestamps"))?;
    parse_int(field)
}

fn parse_int(field: &str) -> io::Result<i64> {
    field
        .parse::<i64>()
        .map_err(|_| corrupt(&format!("'{}' is not a timestamp", field)))
}

fn corrupt(reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Corrupt compressed data: {}", reason),
    )
}
