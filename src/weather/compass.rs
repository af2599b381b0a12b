/// Compass points clockwise from north, 22.5° apart.
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 22.5;

/// Map a bearing in degrees to its nearest 16-point compass label.
///
/// Sector boundaries snap upwards: 11.25° is NNE and 348.75° wraps to N.
pub fn compass_label(degrees: f64) -> &'static str {
    let sector = (degrees / SECTOR_DEGREES).round() as i64;
    COMPASS_POINTS[sector.rem_euclid(16) as usize]
}

/// Round to one decimal place, halves away from zero on the binary value.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
