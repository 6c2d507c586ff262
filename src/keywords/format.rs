//! Validator for `format` keyword.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
    sync::Arc,
};

use email_address::EmailAddress;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;
use uuid_simd::{parse_hyphenated, Out};

use crate::{
    compiler,
    context::ValidationContext,
    error::{SchemaError, ValidationErrorKind},
    keywords::CompilationResult,
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    pattern_cache::{Matcher, DEFAULT_MATCH_TIMEOUT},
    validator::Validate,
};

static TIME_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(\.\d+)?([Zz]|[+-](\d{2}):(\d{2}))$").ok()
});
static RELATIVE_JSON_POINTER_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)$").ok());
// Reused as a base to accept relative references
static DUMMY_BASE: Lazy<Option<Url>> = Lazy::new(|| Url::parse("http://example.invalid/").ok());

/// A user-supplied string check registered under a format name.
pub trait Format: Send + Sync + 'static {
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    #[inline]
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

fn is_match(regex: &Lazy<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|regex| regex.is_match(text))
}

fn parse_digits(digits: &str) -> Option<u32> {
    if digits.bytes().all(|byte| byte.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let (Some(year), Some(month), Some(day)) = (
        parse_digits(&date[..4]),
        parse_digits(&date[5..7]),
        parse_digits(&date[8..]),
    ) else {
        return false;
    };
    #[allow(clippy::cast_possible_wrap)]
    chrono::NaiveDate::from_ymd_opt(year as i32, month, day).is_some()
}

fn is_valid_time(time: &str) -> bool {
    let Some(captures) = TIME_RE.as_ref().and_then(|regex| regex.captures(time)) else {
        return false;
    };
    let number = |idx: usize| {
        captures
            .get(idx)
            .and_then(|group| group.as_str().parse::<i64>().ok())
    };
    let (Some(hour), Some(minute), Some(second)) = (number(1), number(2), number(3)) else {
        return false;
    };
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let offset = match (captures.get(5).map(|group| group.as_str()), number(6), number(7)) {
        (Some("Z" | "z"), _, _) => 0,
        (Some(sign), Some(offset_hour), Some(offset_minute)) => {
            if offset_hour > 23 || offset_minute > 59 {
                return false;
            }
            let offset = offset_hour * 60 + offset_minute;
            if sign.starts_with('-') {
                -offset
            } else {
                offset
            }
        }
        _ => return false,
    };
    if second == 60 {
        // Leap seconds only exist at 23:59:60 UTC
        let utc = (hour * 60 + minute - offset).rem_euclid(24 * 60);
        return utc == 23 * 60 + 59;
    }
    true
}

fn is_valid_datetime(datetime: &str) -> bool {
    match datetime.find(['T', 't']) {
        Some(separator) => {
            is_valid_date(&datetime[..separator]) && is_valid_time(&datetime[separator + 1..])
        }
        None => false,
    }
}

fn is_valid_duration(duration: &str) -> bool {
    let Some(rest) = duration.strip_prefix('P') else {
        return false;
    };
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    if date.is_empty() && time.is_none() {
        return false;
    }
    let Some(date_units) = duration_units(date, b"YMWD") else {
        return false;
    };
    // Weeks never combine with other units
    if date_units.contains(&b'W') && (date_units.len() > 1 || time.is_some()) {
        return false;
    }
    match time {
        Some(time) => duration_units(time, b"HMS").is_some_and(|units| !units.is_empty()),
        None => true,
    }
}

/// Units of `part` in order, if they all appear in `allowed` in ascending order.
fn duration_units(part: &str, allowed: &[u8]) -> Option<Vec<u8>> {
    let bytes = part.as_bytes();
    let mut units = Vec::new();
    let mut last = None;
    let mut idx = 0;
    while idx < bytes.len() {
        let start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == start || idx == bytes.len() {
            return None;
        }
        let position = allowed.iter().position(|unit| *unit == bytes[idx])?;
        if last.is_some_and(|last| position <= last) {
            return None;
        }
        last = Some(position);
        units.push(bytes[idx]);
        idx += 1;
    }
    Some(units)
}

fn is_valid_hostname(hostname: &str) -> bool {
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    !(hostname.is_empty()
        || hostname.chars().count() > 253
        || hostname.split('.').any(|label| {
            label.is_empty()
                || label.chars().count() > 63
                || label.starts_with('-')
                || label.ends_with('-')
                || !label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        }))
}

fn is_valid_idn_hostname(hostname: &str) -> bool {
    idna::domain_to_ascii_strict(hostname).is_ok_and(|ascii| is_valid_hostname(&ascii))
}

fn is_valid_email_with(email: &str, hostname: fn(&str) -> bool) -> bool {
    let Ok(parsed) = EmailAddress::from_str(email) else {
        return false;
    };
    let domain = parsed.domain();
    if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        match literal.strip_prefix("IPv6:") {
            Some(address) => address.parse::<Ipv6Addr>().is_ok(),
            None => literal.parse::<Ipv4Addr>().is_ok(),
        }
    } else {
        hostname(domain)
    }
}

fn is_valid_email(email: &str) -> bool {
    email.is_ascii() && is_valid_email_with(email, is_valid_hostname)
}

fn is_valid_idn_email(email: &str) -> bool {
    is_valid_email_with(email, is_valid_idn_hostname)
}

fn has_illegal_reference_chars(reference: &str) -> bool {
    reference
        .chars()
        .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
}

fn is_valid_iri(iri: &str) -> bool {
    !has_illegal_reference_chars(iri) && Url::parse(iri).is_ok()
}

fn is_valid_iri_reference(reference: &str) -> bool {
    if has_illegal_reference_chars(reference) {
        return false;
    }
    match Url::parse(reference) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => DUMMY_BASE
            .as_ref()
            .is_some_and(|base| base.join(reference).is_ok()),
        Err(_) => false,
    }
}

fn is_valid_uri(uri: &str) -> bool {
    uri.is_ascii() && is_valid_iri(uri)
}

fn is_valid_uri_reference(reference: &str) -> bool {
    reference.is_ascii() && is_valid_iri_reference(reference)
}

fn is_valid_uuid(uuid: &str) -> bool {
    let mut out = [0; 16];
    uuid.len() == 36 && parse_hyphenated(uuid.as_bytes(), Out::from_mut(&mut out)).is_ok()
}

fn is_valid_regex(pattern: &str) -> bool {
    Matcher::new(pattern, DEFAULT_MATCH_TIMEOUT).is_ok()
}

fn is_valid_json_pointer(pointer: &str) -> bool {
    if pointer.is_empty() {
        return true;
    }
    if !pointer.starts_with('/') {
        return false;
    }
    let mut chars = pointer.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

fn is_valid_relative_json_pointer(pointer: &str) -> bool {
    is_match(&RELATIVE_JSON_POINTER_RE, pointer)
}

fn builtin(name: &str) -> Option<fn(&str) -> bool> {
    let check: fn(&str) -> bool = match name {
        "date" => is_valid_date,
        "date-time" => is_valid_datetime,
        "duration" => is_valid_duration,
        "email" => is_valid_email,
        "hostname" => is_valid_hostname,
        "idn-email" => is_valid_idn_email,
        "idn-hostname" => is_valid_idn_hostname,
        "ipv4" => |item| Ipv4Addr::from_str(item).is_ok(),
        "ipv6" => |item| Ipv6Addr::from_str(item).is_ok(),
        "iri" => is_valid_iri,
        "iri-reference" => is_valid_iri_reference,
        "json-pointer" => is_valid_json_pointer,
        "regex" => is_valid_regex,
        "relative-json-pointer" => is_valid_relative_json_pointer,
        "time" => is_valid_time,
        "uri" => is_valid_uri,
        "uri-reference" => is_valid_uri_reference,
        "uuid" => is_valid_uuid,
        _ => return None,
    };
    Some(check)
}

enum Check {
    Builtin(fn(&str) -> bool),
    Custom(Arc<dyn Format>),
}

pub(crate) struct FormatValidator {
    format: String,
    check: Check,
}

impl FormatValidator {
    fn is_valid(&self, item: &str) -> bool {
        match &self.check {
            Check::Builtin(check) => check(item),
            Check::Custom(format) => format.is_valid(item),
        }
    }
}

impl Validate for FormatValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        match instance {
            Value::String(item) if !self.is_valid(item) => Ok(ctx
                .error(
                    instance,
                    location,
                    ValidationErrorKind::Format {
                        format: self.format.clone(),
                    },
                )
                .into()),
            _ => Ok(Evaluation::Valid),
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Some(format) = schema.as_str() else {
        return Some(Err(ctx.invalid("format", "expected a string")));
    };
    if !ctx.config().validate_formats() {
        return None;
    }
    // Custom formats shadow built-in ones
    let check = if let Some(custom) = ctx.config().get_format(format) {
        Check::Custom(Arc::clone(custom))
    } else if let Some(check) = builtin(format) {
        Check::Builtin(check)
    } else if ctx.config().are_unknown_formats_ignored() {
        tracing::trace!(format, "Ignoring unknown format");
        return None;
    } else {
        return Some(Err(SchemaError::UnknownFormat {
            format: format.to_string(),
        }));
    };
    Some(Ok(Box::new(FormatValidator {
        format: format.to_string(),
        check,
    })))
}
