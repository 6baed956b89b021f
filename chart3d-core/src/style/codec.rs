/// Text encoding for colours, strokes and fonts
///
/// Formats:
/// - colour: `#rrggbbaa` (`#rrggbb` is accepted on input)
/// - stroke: `stroke width=0.5 cap=round join=round dash=3,3 phase=0`
///   (`dash=none` for solid lines)
/// - font: `font "Dialog" 12 bold` (or `plain`); `"` and `\` in the family
///   are backslash-escaped
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while_m_n},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::{Color, Font, LineCap, LineJoin, Stroke};
use crate::error::{ChartError, Result};

pub fn encode_color(color: &Color) -> String {
    format!(
        "#{:02x}{:02x}{:02x}{:02x}",
        color.r, color.g, color.b, color.a
    )
}

pub fn decode_color(input: &str) -> Result<Color> {
    finish(input, parse_color)
}

pub fn encode_stroke(stroke: &Stroke) -> String {
    let dash = if stroke.dash.is_empty() {
        "none".to_string()
    } else {
        stroke
            .dash
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "stroke width={} cap={} join={} dash={} phase={}",
        stroke.width,
        cap_name(stroke.cap),
        join_name(stroke.join),
        dash,
        stroke.dash_phase
    )
}

pub fn decode_stroke(input: &str) -> Result<Stroke> {
    let stroke = finish(input, parse_stroke)?;
    if !(stroke.width >= 0.0) || stroke.dash.iter().any(|d| !(*d >= 0.0)) {
        return Err(ChartError::StyleParse(format!(
            "negative stroke measure in {:?}",
            input
        )));
    }
    Ok(stroke)
}

pub fn encode_font(font: &Font) -> String {
    format!(
        "font \"{}\" {} {}",
        font.family.replace('\\', "\\\\").replace('"', "\\\""),
        font.size,
        if font.bold { "bold" } else { "plain" }
    )
}

pub fn decode_font(input: &str) -> Result<Font> {
    finish(input, parse_font)
}

fn finish<T>(input: &str, parser: fn(&str) -> IResult<&str, T>) -> Result<T> {
    match all_consuming(terminated(parser, multispace0))(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(e) => Err(ChartError::StyleParse(format!("{:?}", e))),
    }
}

fn cap_name(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
        LineCap::Square => "square",
    }
}

fn join_name(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
    }
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |s: &str| u8::from_str_radix(s, 16),
    )(input)
}

fn parse_color(input: &str) -> IResult<&str, Color> {
    let (input, _) = preceded(multispace0, tag("#"))(input)?;
    let (input, (r, g, b)) = tuple((hex_byte, hex_byte, hex_byte))(input)?;
    let (input, a) = opt(hex_byte)(input)?;
    Ok((input, Color::rgba(r, g, b, a.unwrap_or(255))))
}

fn parse_cap(input: &str) -> IResult<&str, LineCap> {
    alt((
        value(LineCap::Butt, tag("butt")),
        value(LineCap::Round, tag("round")),
        value(LineCap::Square, tag("square")),
    ))(input)
}

fn parse_join(input: &str) -> IResult<&str, LineJoin> {
    alt((
        value(LineJoin::Miter, tag("miter")),
        value(LineJoin::Round, tag("round")),
        value(LineJoin::Bevel, tag("bevel")),
    ))(input)
}

fn parse_dash(input: &str) -> IResult<&str, Vec<f32>> {
    alt((
        value(Vec::new(), tag("none")),
        separated_list1(char(','), float),
    ))(input)
}

fn parse_stroke(input: &str) -> IResult<&str, Stroke> {
    let (input, _) = preceded(multispace0, tag("stroke"))(input)?;
    let (input, width) = preceded(pair(multispace1, tag("width=")), float)(input)?;
    let (input, cap) = preceded(pair(multispace1, tag("cap=")), parse_cap)(input)?;
    let (input, join) = preceded(pair(multispace1, tag("join=")), parse_join)(input)?;
    let (input, dash) = preceded(pair(multispace1, tag("dash=")), parse_dash)(input)?;
    let (input, dash_phase) = preceded(pair(multispace1, tag("phase=")), float)(input)?;
    Ok((
        input,
        Stroke {
            width,
            cap,
            join,
            dash,
            dash_phase,
        },
    ))
}

fn family_name(input: &str) -> IResult<&str, String> {
    map(
        opt(escaped_transform(
            is_not("\\\""),
            '\\',
            alt((value("\\", tag("\\")), value("\"", tag("\"")))),
        )),
        Option::unwrap_or_default,
    )(input)
}

fn parse_font(input: &str) -> IResult<&str, Font> {
    let (input, _) = preceded(multispace0, tag("font"))(input)?;
    let (input, family) = preceded(
        multispace1,
        delimited(char('"'), family_name, char('"')),
    )(input)?;
    let (input, size) = preceded(multispace1, float)(input)?;
    let (input, bold) = preceded(
        multispace1,
        alt((value(true, tag("bold")), value(false, tag("plain")))),
    )(input)?;
    Ok((input, Font::new(family, size, bold)))
}
