use crate::cue::Cue;
use crate::error::SneakpeekError;

use std::time::Duration;

use anyhow::Context;
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{
    digit1, line_ending, multispace0, not_line_ending, one_of, space1,
};
use nom::combinator::{eof, map_res, opt, verify};
use nom::error::{convert_error, ErrorKind, ParseError, VerboseError};
use nom::multi::many0;
use nom::sequence::{preceded, terminated};
use nom::{branch::alt, Err, IResult};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    pub fn parse(&mut self, input: &str) -> Result<Vec<Cue>, anyhow::Error> {
        match vtt_file(input) {
            Ok((_, cues)) => Ok(cues),
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                let conv = convert_error(input, err);
                Err(SneakpeekError::ParseError(conv)).context("Failed to parse WebVTT track")
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        }
    }
}

fn optional_bom(input: &str) -> ParseResult<'_, Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn vtt_file(input: &str) -> ParseResult<'_, Vec<Cue>> {
    let (input, _) = optional_bom(input)?;
    let (input, _) = keyword_line("WEBVTT")(input)?;
    let (input, _) = many0(non_blank_line)(input)?;
    let (input, mut cues) = all_blocks(input)?;
    cues.sort_by_key(|c| c.start_time);
    Ok((input, cues))
}

fn all_blocks(input: &str) -> ParseResult<'_, Vec<Cue>> {
    let mut cues = Vec::new();
    let mut input = input;
    loop {
        let (rem_input, _) = multispace0(input)?;
        input = rem_input;
        if input.is_empty() {
            return Ok((input, cues));
        }
        if let Ok((rem_input, _)) = skipped_block(input) {
            input = rem_input;
            continue;
        }
        let (rem_input, parsed) = cue(input)?;
        cues.push(parsed);
        input = rem_input;
    }
}

/// Comment, stylesheet and region definition blocks carry nothing we use.
fn skipped_block(input: &str) -> ParseResult<'_, ()> {
    let (input, _) = alt((
        keyword_line("NOTE"),
        keyword_line("STYLE"),
        keyword_line("REGION"),
    ))(input)?;
    let (input, _) = many0(non_blank_line)(input)?;
    Ok((input, ()))
}

fn cue(input: &str) -> ParseResult<'_, Cue> {
    let (input, _) = opt(cue_identifier)(input)?;
    let (input, (start_time, end_time)) = cue_timings(input)?;
    // Cue settings (position, align, ...) don't apply to metadata.
    let (input, _) = rest_of_line(input)?;
    let (input, lines) = many0(payload_line)(input)?;

    Ok((
        input,
        Cue {
            start_time,
            end_time,
            text: lines.join("\n"),
        },
    ))
}

/// Payload ends at a blank line or at the next timing line.
fn payload_line(input: &str) -> ParseResult<'_, &str> {
    verify(non_blank_line, |line: &str| !line.contains("-->"))(input)
}

fn cue_identifier(input: &str) -> ParseResult<'_, &str> {
    verify(non_blank_line, |line: &str| !line.contains("-->"))(input)
}

fn cue_timings(input: &str) -> ParseResult<'_, (Duration, Duration)> {
    let (input, start_time) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, end_time) = timestamp(input)?;

    Ok((input, (start_time, end_time)))
}

/// Matches `keyword` when it's alone on its line or followed by a space or tab.
fn keyword_line<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    preceded(
        tag(keyword),
        alt((preceded(one_of(" \t"), rest_of_line), line_end)),
    )
}

fn non_blank_line(input: &str) -> ParseResult<'_, &str> {
    terminated(take_while1(|c: char| c != '\n' && c != '\r'), line_end)(input)
}

fn rest_of_line(input: &str) -> ParseResult<'_, &str> {
    terminated(not_line_ending, line_end)(input)
}

fn line_end(input: &str) -> ParseResult<'_, &str> {
    alt((line_ending, eof))(input)
}

fn timestamp(input: &str) -> ParseResult<'_, Duration> {
    const MILLIS_MIN: usize = 1;
    const MILLIS_MAX: usize = 3;
    let mut take_millis = map_res(
        take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
        |s: &str| {
            // `.2` is read as 200ms, not 2ms.
            format!("{:0<3}", s).parse::<u64>()
        },
    );

    let start = input;
    let (input, first) = number(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, second) = number(input)?;
    let (input, third) = opt(preceded(tag(":"), number))(input)?;
    // Some encoders emit SRT-style commas.
    let (input, _) = alt((tag("."), tag(",")))(input)?;
    let (input, millis) = take_millis(input)?;

    let (hours, minutes, seconds) = match third {
        Some(seconds) => (first, second, seconds),
        None => (0, first, second),
    };

    let total = hours
        .checked_mul(60 * 60 * 1000)
        .and_then(|t| minutes.checked_mul(60 * 1000).and_then(|m| t.checked_add(m)))
        .and_then(|t| seconds.checked_mul(1000).and_then(|s| t.checked_add(s)))
        .and_then(|t| t.checked_add(millis));

    match total {
        Some(total) => Ok((input, Duration::from_millis(total))),
        None => std::result::Result::Err(Err::Error(VerboseError::from_error_kind(
            start,
            ErrorKind::TooLarge,
        ))),
    }
}

fn number(input: &str) -> ParseResult<'_, u64> {
    map_res(digit1, |s: &str| s.parse())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_read_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let (_, duration) = timestamp(input).unwrap();

                assert_eq!(duration.as_millis(), expected);
            }
        )*
        }
    }

    test_read_ts! {
        test_read_ts_0: ("00:00:01.200", 1200),
        test_read_ts_1: ("00:00:01.2", 1200),
        test_read_ts_2: ("00:00:01.002", 1002),
        test_read_ts_3: ("00:00:01.02", 1020),
        test_read_ts_4: ("00:01.500", 1500),
        test_read_ts_5: ("1:1:1.200", 3661200),
        test_read_ts_6: ("01:01:01,200", 3661200),
        test_read_ts_7: ("100:00:00.001", 360_000_001),
    }

    #[test]
    fn rejects_timestamp_overflow() {
        assert!(timestamp("18446744073709:00:00.000").is_err());
        assert!(timestamp("00:307445734561825860:00.000").is_err());
    }

    #[test]
    fn overflowing_track_is_a_parse_error() {
        let err = Parser::new()
            .parse("WEBVTT\n\n18446744073709:00:00.000 --> 18446744073709:00:01.000\na.jpg\n")
            .unwrap_err();
        assert!(err.downcast_ref::<SneakpeekError>().is_some());
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn parses_thumbnail_track() {
        let input = "WEBVTT\n\
                     \n\
                     00:00.000 --> 00:05.000\n\
                     sprite.jpg#xywh=0,0,120,68\n\
                     \n\
                     00:05.000 --> 00:10.000\n\
                     sprite.jpg#xywh=120,0,120,68\n";

        let cues = Parser::new().parse(input).unwrap();

        assert_eq!(
            cues,
            vec![
                Cue::new(secs(0), secs(5), "sprite.jpg#xywh=0,0,120,68"),
                Cue::new(secs(5), secs(10), "sprite.jpg#xywh=120,0,120,68"),
            ]
        );
    }

    #[test]
    fn skips_header_notes_and_identifiers() {
        let input = "\u{FEFF}WEBVTT - thumbnails\r\n\
                     Kind: metadata\r\n\
                     \r\n\
                     NOTE generated by the sprite tool\r\n\
                     spans two lines\r\n\
                     \r\n\
                     thumb-1\r\n\
                     00:00:00.000 --> 00:00:04.000 align:start\r\n\
                     a.jpg\r\n\
                     \r\n\
                     STYLE\r\n\
                     ::cue { color: red }\r\n";

        let cues = Parser::new().parse(input).unwrap();

        assert_eq!(cues, vec![Cue::new(secs(0), secs(4), "a.jpg")]);
    }

    #[test]
    fn joins_multiline_payloads_and_tolerates_missing_final_newline() {
        let input = "WEBVTT\n\n00:01.000 --> 00:02.000\nfirst\nsecond";

        let cues = Parser::new().parse(input).unwrap();

        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "first\nsecond");
    }

    #[test]
    fn timing_line_ends_payload_without_blank_separator() {
        let input = "WEBVTT\n\n\
                     00:00.000 --> 00:05.000\n\
                     a.jpg#xywh=0,0,10,10\n\
                     00:05.000 --> 00:10.000\n\
                     b.jpg#xywh=10,0,10,10\n";

        let cues = Parser::new().parse(input).unwrap();

        assert_eq!(
            cues,
            vec![
                Cue::new(secs(0), secs(5), "a.jpg#xywh=0,0,10,10"),
                Cue::new(secs(5), secs(10), "b.jpg#xywh=10,0,10,10"),
            ]
        );
    }

    #[test]
    fn sorts_cues_by_start_time() {
        let input = "WEBVTT\n\n\
                     00:10.000 --> 00:20.000\nlate.jpg\n\n\
                     00:00.000 --> 00:10.000\nearly.jpg\n";

        let cues = Parser::new().parse(input).unwrap();

        assert_eq!(cues[0].text, "early.jpg");
        assert_eq!(cues[1].text, "late.jpg");
    }

    #[test]
    fn accepts_track_without_cues() {
        let cues = Parser::new().parse("WEBVTT\n").unwrap();
        assert!(cues.is_empty());
    }

    #[test]
    fn rejects_missing_signature() {
        let err = Parser::new()
            .parse("00:00.000 --> 00:05.000\na.jpg\n")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse WebVTT track"));
    }

    #[test]
    fn rejects_block_without_timings() {
        assert!(Parser::new()
            .parse("WEBVTT\n\nthumb-1\nnot a timing line\n")
            .is_err());
    }
}
