//! Just enough NMEA 0183 to recover position and speed from a dashcam GPS log. Sentences are
//! framed by `nmea0183_parser` and their fields decoded with `nom`. Checksums are stripped but
//! never validated; dashcams routinely write sentences with bad ones.

use nmea0183_parser::{ChecksumMode, LineEndingMode, Nmea0183ParserBuilder};
use nom::bytes::complete::{take_while, take_while_m_n};
use nom::character::complete::{alphanumeric1, char, digit1};
use nom::combinator::{all_consuming, map_res, opt, recognize, verify};
use nom::multi::many0;
use nom::number::complete::recognize_float;
use nom::sequence::preceded;
use nom::{IResult, Parser};

#[derive(Fail, Debug, PartialEq)]
pub enum NmeaError {
    #[fail(display = "not an#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    /// Position fix. Degrees are decimal and signed, altitude is metres above mean sea level.
    Gga {
        latitude: f64,
        longitude: f64,
        altitude: Option<f64>,
    },
    /// Track made good and ground speed.
    Vtg { speed_kmh: f64 },
    /// Anything else, by its three letter type.
    Other(String),
}

/// The address of a sentence and its comma separated fields, address excluded.
type Fields<'a> = (&'a str, Vec<&'a str>);

impl Sentence {
    pub fn parse(line: &str) -> Result<Sentence, NmeaError> {
        let line = line.trim();
        let start = line
            .find('$')
            .ok_or_else(|| NmeaError::Malformed(line.to_string()))?;
        let sentence = match line.rfind('*') {
            Some(idx) if idx > start => &line[start..idx],
            _ => &line[start..],
        };

        let mut framed = Nmea0183ParserBuilder::new()
            .checksum_mode(ChecksumMode::Optional)
            .line_ending_mode(LineEndingMode::Forbidden)
            .build(content);
        let (address, fields) = match framed.parse(sentence) {
            Ok((_, Some(parsed))) => parsed,
            Ok((_, None)) => return Err(NmeaError::Malformed(line.to_string())),
            Err(e) => {
                trace!("Framing failed for {:?}: {:?}", line, e);
                return Err(NmeaError::Malformed(line.to_string()));
            }
        };
        if address.len() < 5 {
            return Err(NmeaError::Malformed(line.to_string()));
        }

        // Talker ($GP, $GN, $GL, ...) doesn't matter to us
        match &address[address.len() - 3..] {
            "GGA" => parse_gga(&fields),
            "VTG" => parse_vtg(&fields),
            other => Ok(Sentence::Other(other.to_string())),
        }
    }
}

/// Content parser handed to the framing layer. Never fails itself, a sentence whose body doesn't
/// split into an address and fields comes back as `None`.
fn content(input: &str) -> nmea0183_parser::IResult<&str, Option<Fields<'_>>> {
    Ok(("", split_fields(input).ok().map(|(_, fields)| fields)))
}

fn split_fields(input: &str) -> IResult<&str, Fields<'_>> {
    all_consuming(preceded(
        opt(char('$')),
        (
            alphanumeric1,
            many0(preceded(char(','), take_while(|c: char| c != ','))),
        ),
    ))
    .parse(input)
}

fn field<'a>(fields: &[&'a str], idx: usize) -> &'a str {
    fields.get(idx).map_or("", |f| f.trim())
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, str::parse::<f64>).parse(input)
}

/// `4807.038` (ddmm.mmmm, `degree_digits` 2) or `01131.000` (dddmm.mmmm, 3) to decimal degrees.
fn coordinate(input: &str, degree_digits: usize) -> IResult<&str, f64> {
    map_res(
        (
            take_while_m_n(degree_digits, degree_digits, |c: char| c.is_ascii_digit()),
            verify(recognize((digit1, opt((char('.'), digit1)))), |minutes: &str| {
                minutes.parse::<f64>().map_or(false, |m| m < 60.0)
            }),
        ),
        |(degrees, minutes): (&str, &str)| -> Result<f64, std::num::ParseFloatError> {
            Ok(degrees.parse::<f64>()? + minutes.parse::<f64>()? / 60.0)
        },
    )
    .parse(input)
}

fn parse_coordinate(
    text: &str,
    degree_digits: usize,
    hemisphere: &str,
    negative: &str,
    field: &'static str,
) -> Result<f64, NmeaError> {
    let value = match coordinate(text, degree_digits) {
        Ok(("", value)) => value,
        _ => {
            return Err(NmeaError::InvalidField {
                sentence: "GGA",
                field,
                text: text.to_string(),
            })
        }
    };
    if hemisphere.eq_ignore_ascii_case(negative) {
        Ok(-value)
    } else {
        Ok(value)
    }
}

fn parse_number(
    text: &str,
    sentence: &'static str,
    field: &'static str,
) -> Result<f64, NmeaError> {
    match number(text) {
        Ok(("", value)) => Ok(value),
        _ => Err(NmeaError::InvalidField {
            sentence,
            field,
            text: text.to_string(),
        }),
    }
}

// GGA fields: hhmmss.ss,llll.ll,a,yyyyy.yy,a,q,nn,h.h,a.a,M,g.g,M,t.t,iiii
fn parse_gga(fields: &[&str]) -> Result<Sentence, NmeaError> {
    let quality = field(fields, 5);
    let (lat, lon) = (field(fields, 1), field(fields, 3));
    if quality == "0" || lat.is_empty() || lon.is_empty() {
        return Err(NmeaError::NoFix);
    }

    let latitude = parse_coordinate(lat, 2, field(fields, 2), "S", "latitude")?;
    let longitude = parse_coordinate(lon, 3, field(fields, 4), "W", "longitude")?;
    let altitude = match field(fields, 8) {
        "" => None,
        text => Some(parse_number(text, "GGA", "altitude")?),
    };

    Ok(Sentence::Gga {
        latitude,
        longitude,
        altitude,
    })
}

// VTG fields: ttt.t,T,mmm.m,M,nnn.n,N,kkk.k,K,m
fn parse_vtg(fields: &[&str]) -> Result<Sentence, NmeaError> {
    match (field(fields, 6), field(fields, 4)) {
        ("", "") => Err(NmeaError::MissingField {
            sentence: "VTG",
            field: "ground speed",
        }),
        ("", knots) => Ok(Sentence::Vtg {
            speed_kmh: parse_number(knots, "VTG", "speed (knots)")? * 1.852,
        }),
        (kmh, _) => Ok(Sentence::Vtg {
            speed_kmh: parse_number(kmh, "VTG", "speed (km/h)")?,
        }),
    }
}

    sentence: "VTG",
            field: "ground speed",
        }),
        ("", knots) => {
            let knots = knots.parse::<f64>().map_err(|_| invalid("speed (knots)", knots))?;
            Ok(Sentence::Vtg {
                speed_kmh: knots * 1.852,
            })
        }
        (kmh, _) => {
            let speed_kmh = kmh.parse::<f64>().map_err(|_| invalid("speed (km/h)", kmh))?;
            Ok(Sentence::Vtg { speed_kmh })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
    }

    #[test]
    fn test_gga() {
        let sentence =
            Sentence::parse("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47")
                .unwrap();
        match sentence {
            Sentence::Gga {
                latitude,
                longitude,
                altitude,
            } => {
                assert_close(latitude, 48.1173);
                assert_close(longitude, 11.516666666);
                assert_eq!(altitude, Some(545.4));
            }
            other => panic!("Expected a GGA sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_gga_southern_western_hemispheres() {
        match Sentence::parse("$GNGGA,000000.00,3351.0000,S,15112.0000,W,1,08,0.9,,M,,M,,") {
            Ok(Sentence::Gga {
                latitude,
                longitude,
                altitude,
            }) => {
                assert_close(latitude, -33.85);
                assert_close(longitude, -151.2);
                assert_eq!(altitude, None);
            }
            other => panic!("Expected a GGA sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_gga_without_fix() {
        assert_eq!(
            Sentence::parse("$GPGGA,123519,,,,,0,00,,,M,,M,,*66"),
            Err(NmeaError::NoFix)
        );
        assert_eq!(
            Sentence::parse("$GPGGA,123519,4807.038,N,01131.000,E,0,08,0.9,545.4,M,46.9,M,,*47"),
            Err(NmeaError::NoFix)
        );
    }

    #[test]
    fn test_vtg() {
        assert_eq!(
            Sentence::parse("$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48"),
            Ok(Sentence::Vtg { speed_kmh: 10.2 })
        );
        match Sentence::parse("$GPVTG,054.7,T,034.4,M,005.5,N,,K").unwrap() {
            Sentence::Vtg { speed_kmh } => assert_close(speed_kmh, 10.186),
            other => panic!("Expected a VTG sentence, got {:?}", other),
        }
        assert!(Sentence::parse("$GPVTG,054.7,T,034.4,M,,N,,K").is_err());
    }

    #[test]
    fn test_other_and_garbage() {
        assert_eq!(
            Sentence::parse("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A"),
            Ok(Sentence::Other("RMC".into()))
        );
        assert!(Sentence::parse("GPGGA,123519").is_err());
        assert!(Sentence::parse("$G*").is_err());
        assert!(Sentence::parse("$GPGGA,123519,48x7.038,N,01131.000,E,1,08,0.9,545.4,M").is_err());
    }

    #[test]
    fn test_non_ascii_coordinates_are_invalid() {
        for text in &["\u{b0}1.5", "\u{fffd}1.5", "48\u{b0}07.038"] {
            let line = format!("$GPGGA,123519,{},N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47", text);
            assert!(Sentence::parse(&line).is_err(), "{:?} parsed", line);
            assert!(
                parse_coordinate(text, 2, "N", "S", "latitude").is_err(),
                "{:?} parsed",
                text
            );
        }
    }

    #[test]
    fn test_minutes_out_of_range() {
        assert_eq!(
            parse_coordinate("4867.038", 2, "N", "S", "latitude"),
            Err(NmeaError::InvalidField {
                sentence: "GGA",
                field: "latitude",
                text: "4867.038".into(),
            })
        );
        assert!(parse_coordinate("48", 2, "N", "S", "latitude").is_err());
        assert!(parse_coordinate("4807.038x", 2, "N", "S", "latitude").is_err());
    }
}
