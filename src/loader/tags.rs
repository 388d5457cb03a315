//! Legacy tag notation for guard definitions
//!
//! ```text
//! <guard: TownGuards scope:faction range:6 warn:25 detain:75 fov:80 soft:120
//!         speed:2 chasespeed:4 freq:3 chasefreq:5 open:on>
//! <patrol: 10,12 | 18,12 | 18,18 | 10,18 loop wait:1.5>
//! <patrol: random radius:6 wait:1-3>
//! <patrol: random rect:5,6,20,14 wait:0.5-2>
//! <idle: scan cross period:1.2>
//! ```
//!
//! Blocks may span lines and appear in any order. Durations are seconds and
//! are converted to ticks here; nothing downstream ever sees text.

use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_till1, take_until};
use nom::character::complete::{char, digit1, i32 as int32, multispace0, u32 as uint32};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair, terminated};
use nom::{IResult, Parser};

use crate::core::config::secs_to_ticks;
use crate::core::error::{GuardError, Result};
use crate::core::types::{Scope, TilePos};
use crate::guard::config::{
    GuardConfig, IdleScanSpec, PatrolSpec, ScanPattern, TileRect, TriggerMode, WaitRange,
};

type Res<'a, T> = IResult<&'a str, T>;

/// One whitespace-separated item inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Pair(&'a str, &'a str),
    Bar,
}

fn is_word_end(c: char) -> bool {
    c.is_whitespace() || c == '|'
}

fn pair(input: &str) -> Res<Token<'_>> {
    map(
        separated_pair(
            take_till1(|c: char| c == ':' || is_word_end(c)),
            (multispace0, char(':'), multispace0),
            take_till1(is_word_end),
        ),
        |(k, v)| Token::Pair(k, v),
    )
    .parse(input)
}

fn token(input: &str) -> Res<Token<'_>> {
    alt((
        map(char('|'), |_| Token::Bar),
        pair,
        map(take_till1(is_word_end), Token::Word),
    ))
    .parse(input)
}

fn tokens(body: &str) -> Result<Vec<Token<'_>>> {
    all_consuming(terminated(many0(preceded(multispace0, token)), multispace0))
        .parse(body)
        .map(|(_, toks)| toks)
        .map_err(|e| GuardError::TagParse(format!("cannot tokenize '{}': {}", body.trim(), e)))
}

/// Body of the first `<name: ...>` block, case-insensitive
fn find_block<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        rest = &rest[start..];
        let parsed: Res<&str> = delimited(
            (char('<'), multispace0, tag_no_case(name), multispace0, char(':')),
            take_until(">"),
            char('>'),
        )
        .parse(rest);
        if let Ok((_, body)) = parsed {
            return Some(body);
        }
        rest = &rest[1..];
    }
    None
}

fn decimal(input: &str) -> Res<f32> {
    map_res(recognize((digit1, opt((char('.'), digit1)))), |s: &str| {
        s.parse::<f32>()
    })
    .parse(input)
}

fn point(input: &str) -> Res<TilePos> {
    map(
        separated_pair(int32, (multispace0, char(','), multispace0), int32),
        |(x, y)| TilePos::new(x, y),
    )
    .parse(input)
}

fn rect(input: &str) -> Res<TileRect> {
    map(
        (int32, char(','), int32, char(','), int32, char(','), int32),
        |(x1, _, y1, _, x2, _, y2)| TileRect::new(x1, y1, x2, y2),
    )
    .parse(input)
}

/// `a-b` or a single `a`, in seconds
fn seconds_range(input: &str) -> Res<(f32, f32)> {
    map((decimal, opt(preceded(char('-'), decimal))), |(lo, hi)| {
        (lo, hi.unwrap_or(lo))
    })
    .parse(input)
}

/// Run a value parser over the whole value
fn value<'a, T>(
    key: &str,
    raw: &'a str,
    parser: impl Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
) -> Result<T> {
    all_consuming(parser)
        .parse(raw)
        .map(|(_, v)| v)
        .map_err(|_| GuardError::TagParse(format!("bad value '{}' for '{}'", raw, key)))
}

fn number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| GuardError::TagParse(format!("bad number '{}' for '{}'", raw, key)))
}

fn switch(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(GuardError::TagParse(format!("bad switch '{}' for '{}'", raw, key))),
    }
}

fn parse_guard_block(body: &str) -> Result<GuardConfig> {
    let toks = tokens(body)?;
    let authority = match toks.first() {
        Some(Token::Word(name)) => *name,
        _ => return Err(GuardError::MissingField("authority")),
    };

    let mut config = GuardConfig::new(authority);
    // Tag-defined guards stay off unless explicitly opened
    config.active = false;

    for tok in &toks[1..] {
        let (key, raw) = match tok {
            Token::Pair(k, v) => (k.to_ascii_lowercase(), *v),
            other => {
                tracing::warn!("ignoring stray '{:?}' in guard tag for {}", other, authority);
                continue;
            }
        };
        match key.as_str() {
            "scope" => config.scope = raw.parse::<Scope>().map_err(GuardError::TagParse)?,
            "rep" => config.rep_type = raw.to_string(),
            "range" => config.vision.range = number(&key, raw)?,
            "fov" => config.vision.hard_fov = number(&key, raw)?,
            "soft" => config.vision.soft_fov = number(&key, raw)?,
            "walls" => config.vision.occlusion = switch(&key, raw)?,
            "hear" => config.vision.hearing = switch(&key, raw)?,
            "hearrange" => config.vision.hear_range = number(&key, raw)?,
            "warn" => config.alert.warn_threshold = number(&key, raw)?,
            "detain" => config.alert.detain_threshold = number(&key, raw)?,
            "trigger" => {
                config.alert.trigger_mode =
                    raw.parse::<TriggerMode>().map_err(GuardError::TagParse)?
            }
            "speed" => config.movement.patrol_speed = number(&key, raw)?,
            "chasespeed" => config.movement.chase_speed = number(&key, raw)?,
            "freq" => config.movement.patrol_frequency = number(&key, raw)?,
            "chasefreq" => {
                config.movement.chase_frequency = number(&key, raw)?;
                config.movement.use_chase_frequency = true;
            }
            "onwarn" => config.escalation.on_warn = Some(number(&key, raw)?),
            "ondetain" => config.escalation.on_detain = Some(number(&key, raw)?),
            "reportce" => config.escalation.report = Some(number(&key, raw)?),
            "hunt" => {
                config.escalation.hunt_threshold = number(&key, raw)?;
                config.escalation.allow_encounter = true;
            }
            "troop" => config.escalation.encounter_troop = number(&key, raw)?,
            "autodetain" => config.auto_detain.wanted_threshold = number(&key, raw)?,
            "adtrigger" => {
                config.auto_detain.trigger_mode =
                    raw.parse::<TriggerMode>().map_err(GuardError::TagParse)?
            }
            "adfriendly" => config.auto_detain.respects_friendly = switch(&key, raw)?,
            "safe" => {
                config.safe_regions = raw
                    .split(',')
                    .map(|r| number(&key, r.trim()))
                    .collect::<Result<Vec<_>>>()?
            }
            "open" => config.active = switch(&key, raw)?,
            _ => tracing::warn!("unknown guard tag key '{}' for {}", key, authority),
        }
    }

    Ok(config)
}

fn parse_patrol_block(body: &str, ticks_per_second: u32) -> Result<PatrolSpec> {
    let toks = tokens(body)?;
    let to_ticks = |secs: f32| secs_to_ticks(secs, ticks_per_second);

    let mut random = false;
    let mut looping = false;
    let mut radius = None;
    let mut area = None;
    let mut wait = (0.0, 0.0);
    let mut points = Vec::new();

    for tok in &toks {
        match tok {
            Token::Bar => {}
            Token::Word(w) if w.eq_ignore_ascii_case("random") => random = true,
            Token::Word(w) if w.eq_ignore_ascii_case("loop") => looping = true,
            Token::Word(w) => points.push(value("waypoint", w, point)?),
            Token::Pair(k, v) => match k.to_ascii_lowercase().as_str() {
                "radius" => radius = Some(value("radius", v, uint32)?),
                "rect" => area = Some(value("rect", v, rect)?),
                "wait" => wait = value("wait", v, seconds_range)?,
                other => tracing::warn!("unknown patrol tag key '{}'", other),
            },
        }
    }

    let wait_range = WaitRange::new(to_ticks(wait.0.min(wait.1)), to_ticks(wait.0.max(wait.1)));

    if random {
        if let Some(radius) = radius {
            return Ok(PatrolSpec::RandomRadius {
                radius,
                wait: wait_range,
            });
        }
        if let Some(rect) = area {
            return Ok(PatrolSpec::RandomRect {
                rect,
                wait: wait_range,
            });
        }
        return Err(GuardError::TagParse(
            "random patrol needs radius or rect".into(),
        ));
    }

    Ok(PatrolSpec::Fixed {
        points,
        looping,
        wait: to_ticks(wait.0),
    })
}

fn parse_idle_block(body: &str, ticks_per_second: u32) -> Result<IdleScanSpec> {
    let toks = tokens(body)?;
    let mut spec = IdleScanSpec::default();

    match toks.first() {
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("scan") => {}
        _ => return Err(GuardError::TagParse("idle tag must start with 'scan'".into())),
    }

    for tok in &toks[1..] {
        match tok {
            Token::Word(w) if w.eq_ignore_ascii_case("lr") => spec.pattern = ScanPattern::Lr,
            Token::Word(w) if w.eq_ignore_ascii_case("cross") => spec.pattern = ScanPattern::Cross,
            Token::Pair(k, v) if k.eq_ignore_ascii_case("period") => {
                spec.period = secs_to_ticks(value("period", v, decimal)?, ticks_per_second);
            }
            other => tracing::warn!("ignoring '{:?}' in idle tag", other),
        }
    }

    Ok(spec)
}

/// Parse a guard definition from note/comment text
///
/// Returns `Ok(None)` when the text carries no `<guard:>` block.
pub fn parse_guard_tags(text: &str, ticks_per_second: u32) -> Result<Option<GuardConfig>> {
    let Some(body) = find_block(text, "guard") else {
        return Ok(None);
    };

    let mut config = parse_guard_block(body)?;

    if let Some(body) = find_block(text, "patrol") {
        config.patrol = parse_patrol_block(body, ticks_per_second)?;
    }
    if let Some(body) = find_block(text, "idle") {
        config.idle = Some(parse_idle_block(body, ticks_per_second)?);
    }

    Ok(Some(config))
}
