//! YAML 1.1 compatible serialization.
//!
//! `serde_yaml` resolves plain scalars with YAML 1.2 rules, so it leaves
//! strings such as `on`, `yes` or `2024-01-01` unquoted. Kubernetes tooling
//! reads YAML 1.1 and would turn those into booleans and timestamps. Strings a
//! YAML 1.1 reader would misresolve are single-quoted in the output.

use serde_yaml::Value;

const MARKER_PREFIX: &str = "__yaml11_quoted_";

const YAML11_BOOLS_AND_NULLS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "true", "True", "TRUE", "false",
    "False", "FALSE", "on", "On", "ON", "off", "Off", "OFF", "~", "null", "Null", "NULL", "",
];

/// Serialize `document`, quoting every string a YAML 1.1 reader would
/// resolve to something other than a string.
pub fn to_string(document: &Value) -> Result<String, serde_yaml::Error> {
    if !any_string(document, &is_ambiguous) {
        return serde_yaml::to_string(document);
    }

    // Ambiguous strings are swapped for plain markers that serde_yaml emits
    // verbatim, then the markers are replaced with quoted scalars.
    let mut prefix = MARKER_PREFIX.to_string();
    while any_string(document, &|s: &str| s.contains(prefix.as_str())) {
        prefix.push('x');
    }

    let mut marked = document.clone();
    let mut originals = Vec::new();
    mark(&mut marked, &prefix, &mut originals);

    let mut text = serde_yaml::to_string(&marked)?;
    for (index, original) in originals.iter().enumerate() {
        text = text.replace(&marker(&prefix, index), &single_quoted(original));
    }
    Ok(text)
}

fn marker(prefix: &str, index: usize) -> String {
    format!("{prefix}{index}_")
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn any_string(value: &Value, pred: &dyn Fn(&str) -> bool) -> bool {
    match value {
        Value::String(s) => pred(s),
        Value::Sequence(items) => items.iter().any(|item| any_string(item, pred)),
        Value::Mapping(map) => map.iter().any(|(k, v)| any_string(k, pred) || any_string(v, pred)),
        Value::Tagged(tagged) => any_string(&tagged.value, pred),
        _ => false,
    }
}

fn mark(value: &mut Value, prefix: &str, originals: &mut Vec<String>) {
    match value {
        Value::String(s) if is_ambiguous(s) => {
            let replacement = marker(prefix, originals.len());
            originals.push(std::mem::replace(s, replacement));
        }
        Value::Sequence(items) => items.iter_mut().for_each(|item| mark(item, prefix, originals)),
        Value::Mapping(map) => {
            // Keys cannot be edited in place; rebuild in the same order.
            for (mut key, mut entry) in std::mem::take(map) {
                mark(&mut key, prefix, originals);
                mark(&mut entry, prefix, originals);
                map.insert(key, entry);
            }
        }
        Value::Tagged(tagged) => mark(&mut tagged.value, prefix, originals),
        _ => {}
    }
}

/// Whether a YAML 1.1 reader would resolve `s` as a plain scalar to a
/// non-string. Errs towards quoting: an extra quote never changes meaning.
fn is_ambiguous(s: &str) -> bool {
    // Multi-line and control-character strings keep serde_yaml's own styles.
    if s.chars().any(char::is_control) {
        return false;
    }
    YAML11_BOOLS_AND_NULLS.contains(&s)
        || looks_like_date(s)
        || is_sexagesimal(s)
        || is_underscored_number(s)
}

fn is_short_digits(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYY-M-D`, optionally followed by a time part.
fn looks_like_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 8 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return false;
    }
    let Some((month, tail)) = s[5..].split_once('-') else {
        return false;
    };
    let day_len = tail.bytes().take_while(u8::is_ascii_digit).count();
    is_short_digits(month)
        && (1..=2).contains(&day_len)
        && matches!(tail.as_bytes().get(day_len), None | Some(b'T' | b't' | b' ' | b'\t'))
}

/// Base 60 numbers such as `10:30` or `-1:20:30.5`.
fn is_sexagesimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
    let segments: Vec<&str> = unsigned.split(':').collect();
    let Some((head, tail)) = segments.split_first() else {
        return false;
    };
    let Some((last, middle)) = tail.split_last() else {
        return false;
    };

    let head_ok = head.starts_with(|c: char| c.is_ascii_digit())
        && head.chars().all(|c| c.is_ascii_digit() || c == '_');
    let (last_int, fraction) = last.split_once('.').unwrap_or((*last, ""));

    head_ok
        && middle.iter().all(|segment| is_short_digits(segment))
        && is_short_digits(last_int)
        && fraction.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Numbers with `_` digit separators, e.g. `1_000` or `0x_ff`.
fn is_underscored_number(s: &str) -> bool {
    if !s.contains('_') {
        return false;
    }
    let digits: String = s.chars().filter(|c| *c != '_').collect();
    let unsigned = digits.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(&digits);
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(binary) = unsigned.strip_prefix("0b") {
        return !binary.is_empty() && binary.chars().all(|c| c == '0' || c == '1');
    }
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') && unsigned.parse::<f64>().is_ok()
}
