//! Decoding of parsed lines into typed commands.

use std::str::FromStr;

use crate::device::{TriggerMode, TriggerSlope};
use crate::scpi::ScpiLine;

use super::DispatchError;

const TRIGGER_SUBJECT: &str = "TRIG";

/// Queries answered with one reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// `*IDN?`
    Identify,
    /// `CHANS?`
    Channels,
    /// `RATES?`
    Rates,
    /// `DEPTHS?`
    Depths,
}

/// A decoded command line. Channel indices are zero-based and clamped.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A recognised query; the only commands that produce a reply.
    Query(Query),
    /// `EXIT`: ends the command loop.
    Exit,
    /// `C<n>:ON` or `C<n>:OFF`.
    ChannelEnable {
        /// Target channel.
        channel: usize,
        /// New enable flag.
        enabled: bool,
    },
    /// `C<n>:OFFS <volts>`.
    Offset {
        /// Target channel.
        channel: usize,
        /// Vertical offset.
        volts: f64,
    },
    /// `C<n>:ATTEN <factor>`.
    Attenuation {
        /// Target channel.
        channel: usize,
        /// Probe attenuation factor.
        factor: f64,
    },
    /// `C<n>:RANGE <volts>`.
    Range {
        /// Target channel.
        channel: usize,
        /// Full-scale range.
        volts: f64,
    },
    /// `RATE <hz>`; always non-zero.
    Rate {
        /// Sample rate in hertz.
        hz: u64,
    },
    /// `DEPTH <samples>`; always non-zero.
    Depth {
        /// Memory depth in samples.
        samples: u64,
    },
    /// `TRIG:MODE`.
    TriggerMode(TriggerMode),
    /// `TRIG:EDGE:DIR`.
    TriggerSlope(TriggerSlope),
    /// `TRIG:LEV <volts>`.
    TriggerLevel {
        /// Trigger threshold.
        volts: f64,
    },
    /// `TRIG:SOU C<n>`.
    TriggerSource {
        /// Zero-based source channel.
        channel: usize,
    },
    /// `TRIG:DELAY <fs>`.
    TriggerDelay {
        /// Delay from the buffer midpoint in femtoseconds.
        delay_fs: i64,
    },
    /// `START` or `SINGLE`.
    Start {
        /// Set by `SINGLE`.
        one_shot: bool,
    },
    /// `FORCE`: arms without admission checks.
    Force,
    /// `STOP`.
    Stop,
}

impl Command {
    /// Decodes a parsed line for a device with `channel_count` channels.
    ///
    /// Keywords match case-insensitively. Queries ignore the subject.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for unknown keywords, a wrong argument
    /// count, unparseable numbers or an unsupported trigger mode.
    pub fn decode(line: &ScpiLine, channel_count: usize) -> Result<Self, DispatchError> {
        if line.query {
            return decode_query(line).map(Self::Query);
        }

        let keyword = line.command.to_ascii_uppercase();
        let channel = resolve_channel(&line.subject, channel_count);
        let command = match keyword.as_str() {
            "EXIT" => Self::Exit,
            "ON" | "OFF" => Self::ChannelEnable {
                channel,
                enabled: keyword == "ON",
            },
            "OFFS" => Self::Offset {
                channel,
                volts: number(line)?,
            },
            "ATTEN" => Self::Attenuation {
                channel,
                factor: number(line)?,
            },
            "RANGE" => Self::Range {
                channel,
                volts: number(line)?,
            },
            "RATE" => Self::Rate {
                hz: positive(line)?,
            },
            "DEPTH" => Self::Depth {
                samples: positive(line)?,
            },
            "START" => Self::Start { one_shot: false },
            "SINGLE" => Self::Start { one_shot: true },
            "FORCE" => Self::Force,
            "STOP" => Self::Stop,
            _ if line.subject.eq_ignore_ascii_case(TRIGGER_SUBJECT) => {
                decode_trigger(line, &keyword, channel_count)?
            }
            _ => {
                return Err(DispatchError::UnknownCommand {
                    subject: line.subject.clone(),
                    command: line.command.clone(),
                });
            }
        };
        Ok(command)
    }

    /// Returns `true` for commands that change a parameter of a running
    /// capture, so an armed trigger must be re-armed after applying them.
    #[must_use]
    pub const fn requires_rearm(&self) -> bool {
        matches!(
            self,
            Self::ChannelEnable { .. }
                | Self::Offset { .. }
                | Self::Attenuation { .. }
                | Self::Range { .. }
                | Self::Rate { .. }
                | Self::Depth { .. }
                | Self::TriggerMode(_)
                | Self::TriggerSlope(_)
                | Self::TriggerLevel { .. }
                | Self::TriggerSource { .. }
                | Self::TriggerDelay { .. }
        )
    }
}

/// Resolves a `C<n>` subject to a zero-based channel index.
///
/// `n` is 1-based on the wire. Missing, zero or non-numeric indices and
/// subjects not starting with `C` select channel 0; indices past the last
/// channel clamp to it.
#[must_use]
pub fn resolve_channel(subject: &str, channel_count: usize) -> usize {
    let mut chars = subject.chars();
    match chars.next() {
        Some('C' | 'c') => channel_number(chars.as_str(), channel_count),
        _ => 0,
    }
}

fn channel_number(digits: &str, channel_count: usize) -> usize {
    digits
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .unwrap_or(0)
        .min(channel_count.saturating_sub(1))
}

fn decode_query(line: &ScpiLine) -> Result<Query, DispatchError> {
    let keyword = line.command.to_ascii_uppercase();
    match keyword.as_str() {
        "IDN" => Ok(Query::Identify),
        "CHANS" => Ok(Query::Channels),
        "RATES" => Ok(Query::Rates),
        "DEPTHS" => Ok(Query::Depths),
        _ => Err(DispatchError::UnknownQuery {
            command: line.command.clone(),
        }),
    }
}

fn decode_trigger(
    line: &ScpiLine,
    keyword: &str,
    channel_count: usize,
) -> Result<Command, DispatchError> {
    let command = match keyword {
        "MODE" => {
            let mode = single(line)?;
            Command::TriggerMode(TriggerMode::parse(mode).ok_or_else(|| {
                DispatchError::UnsupportedTriggerMode {
                    mode: mode.to_owned(),
                }
            })?)
        }
        "EDGE:DIR" => Command::TriggerSlope(TriggerSlope::parse(single(line)?)),
        "LEV" => Command::TriggerLevel {
            volts: number(line)?,
        },
        "SOU" => {
            // Same form as a channel subject, e.g. `C2`.
            let mut chars = single(line)?.chars();
            chars.next();
            Command::TriggerSource {
                channel: channel_number(chars.as_str(), channel_count),
            }
        }
        "DELAY" => Command::TriggerDelay {
            delay_fs: number(line)?,
        },
        _ => {
            return Err(DispatchError::UnknownCommand {
                subject: line.subject.clone(),
                command: line.command.clone(),
            });
        }
    };
    Ok(command)
}

fn single(line: &ScpiLine) -> Result<&str, DispatchError> {
    line.single_arg().ok_or_else(|| DispatchError::InvalidArguments {
        command: line.command.clone(),
        expected: 1,
        actual: line.args.len(),
    })
}

fn number<T>(line: &ScpiLine) -> Result<T, DispatchError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = single(line)?;
    value
        .parse()
        .map_err(|error: T::Err| DispatchError::invalid_argument(value, error.to_string()))
}

fn positive(line: &ScpiLine) -> Result<u64, DispatchError> {
    let parsed: u64 = number(line)?;
    if parsed == 0 {
        return Err(DispatchError::invalid_argument("0", "must be greater than zero"));
    }
    Ok(parsed)
}
