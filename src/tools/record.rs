//! The record model: one tick per input line, eight comma separated fields.
//!
//! Fields are borrowed from the line they were parsed from. Nothing here owns data beyond
//! the two parsed timestamps.

use std::io;

/// Number of fields in every tick record.
pub const FIELD_COUNT: usize = 8;
/// Separator between fields, also a pattern in the dictionary.
pub const FIELD_SEPARATOR: &str = ",";
/// Separator between the whole and fractional part of a price.
pub const DECIMAL_POINT: &str = ".";
/// First half of the record terminator.
pub const CR: &str = "\r";
/// Second half of the record terminator. Decoding this pattern completes a record.
pub const LF: &str = "\n";

/// Field positions of the two timestamps within a record.
pub const SEND_TIME_FIELD: usize = 4;
pub const RECV_TIME_FIELD: usize = 5;

/// A price split at its decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price<'a> {
    pub whole: &'a str,
    pub fraction: Option<&'a str>,
}

impl<'a> Price<'a> {
    /// Split a price into whole and (optional) fractional part. More than one '.' is rejected.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut parts = raw.splitn(2, '.');
        let whole = parts.next()?;
        let fraction = parts.next();
        if fraction.map_or(false, |f| f.contains('.')) {
            return None;
        }
        Some(Self { whole, fraction })
    }
}

/// One market data tick: ticker,exchange,side,condition,sendTime,recvTime,price,size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick<'a> {
    pub ticker: &'a str,
    pub exchange: &'a str,
    pub side: &'a str,
    pub condition: &'a str,
    /// Epoch milliseconds the tick was sent.
    pub send_time: i64,
    /// Epoch milliseconds the tick was received. Non-decreasing across a stream.
    pub recv_time: i64,
    pub price: Price<'a>,
    pub size: &'a str,
    /// The timestamps as written in the input, used verbatim for the first record.
    pub send_raw: &'a str,
    pub recv_raw: &'a str,
}

impl<'a> Tick<'a> {
    /// Parse one input line (without its line terminator). `line_no` is 1-based and only
    /// used to report errors.
    pub fn parse(line: &'a str, line_no: u64) -> io::Result<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(
                line_no,
                &format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
            ));
        }

        let send_time = parse_timestamp(fields[SEND_TIME_FIELD], line_no, "sendTime")?;
        let recv_time = parse_timestamp(fields[RECV_TIME_FIELD], line_no, "recvTime")?;
        let price = Price::parse(fields[6])
            .ok_or_else(|| malformed(line_no, "price has more than one decimal point"))?;

        Ok(Self {
            ticker: fields[0],
            exchange: fields[1],
            side: fields[2],
            condition: fields[3],
            send_time,
            recv_time,
            price,
            size: fields[7],
            send_raw: fields[SEND_TIME_FIELD],
            recv_raw: fields[RECV_TIME_FIELD],
        })
    }
}

/// Timestamps must be spelled the way they will be printed again after delta reversal.
fn parse_timestamp(raw: &str, line_no: u64, name: &str) -> io::Result<i64> {
    match raw.parse::<i64>() {
        Ok(value) if value.to_string() == raw => Ok(value),
        Ok(_) => Err(malformed(
            line_no,
            &format!("{} '{}' is not a canonical integer", name, raw),
        )),
        Err(_) => Err(malformed(
            line_no,
            &format!("{} '{}' is not an integer", name, raw),
        )),
    }
}

/// Build the error returned for a line that does not fit the tick schema.
pub fn malformed(line_no: u64, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Malformed record on line {}: {}", line_no, reason),
    )
}

#[cfg(test)]
mod test {
    use super::{Price, Tick};

    #[test]
    fn parse_tick_test() {
        let tick = Tick::parse("AAPL,Q,B,,1000,1050,123.45,100", 1).unwrap();
        assert_eq!(tick.ticker, "AAPL");
        assert_eq!(tick.exchange, "Q");
        assert_eq!(tick.side, "B");
        assert_eq!(tick.condition, "");
        assert_eq!(tick.send_time, 1000);
        assert_eq!(tick.recv_time, 1050);
        assert_eq!(
            tick.price,
            Price {
                whole: "123",
                fraction: Some("45")
            }
        );
        assert_eq!(tick.size, "100");
    }

    #[test]
    fn price_without_fraction_test() {
        assert_eq!(
            Price::parse("123"),
            Some(Price {
                whole: "123",
                fraction: None
            })
        );
        assert_eq!(
            Price::parse("123."),
            Some(Price {
                whole: "123",
                fraction: Some("")
            })
        );
        assert_eq!(Price::parse("1.2.3"), None);
    }

    #[test]
    fn wrong_field_count_test() {
        let err = Tick::parse("AAPL,Q,B,1000,1050,123.45,100", 7).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn bad_timestamp_test() {
        assert!(Tick::parse("AAPL,Q,B,,10x0,1050,123.45,100", 1).is_err());
        assert!(Tick::parse("AAPL,Q,B,,1000,01050,123.45,100", 1).is_err());
        assert!(Tick::parse("AAPL,Q,B,,-5,1050,123.45,100", 1).is_ok());
    }
}
