//! Length values with unit suffixes.

/// Millimetres per unit, for every accepted suffix.
const UNITS: &[(&str, f64)] = &[
    ("mm", 1.0),
    ("cm", 10.0),
    ("m", 1000.0),
    ("in", 25.4),
    ("um", 0.001),
];

/// Parse a length such as `0.2`, `0.2mm`, `1.5 cm` or `0.01in` into millimetres.
///
/// A bare number is taken as millimetres.
pub fn parse_length(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !value.is_finite() {
        return Err(format!("`{s}` is not finite"));
    }

    let unit = unit.trim();
    if unit.is_empty() {
        return Ok(value);
    }
    UNITS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(unit))
        .map(|(_, scale)| value * scale)
        .ok_or_else(|| {
            let known: Vec<&str> = UNITS.iter().map(|(name, _)| *name).collect();
            format!("unknown unit `{unit}` (expected one of {})", known.join(", "))
        })
}

/// Parse `x0,y0,z0,x1,y1,z1` (each a length) into box corners.
pub fn parse_cuboid(s: &str) -> Result<[f64; 6], String> {
    let values = s
        .split(',')
        .map(parse_length)
        .collect::<Result<Vec<_>, _>>()?;
    let corners: [f64; 6] = values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 6 comma-separated values, got {}", v.len()))?;
    if (0..3).any(|i| corners[i] >= corners[i + 3]) {
        return Err(format!("`{s}` has no volume: each max must exceed its min"));
    }
    Ok(corners)
}
