//! Minimal TOML reader for machine configuration
//!
//! This handles only the subset needed for `machine.toml` and works
//! without an allocator. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, decimal, boolean)
//! - [section] and [section.name] headers
//! - Comments (# ...), including trailing comments
//!
//! Keys missing from the file keep their reference defaults.

use super::hardware::{parse_pin_string, AxisHwConfig, PinConfig};
use super::types::{AxisMotionConfig, CycleConfig, MachineConfig};
use crate::motion::AxisRole;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key not valid in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line number (1-based)
    pub line: usize,
    /// Error kind
    pub kind: ParseErrorKind,
}

/// Which clamp a `[clamp.*]` section configures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClampSection {
    Position,
    SecureWood,
}

/// Which switch a `[switch.*]` section configures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitchSection {
    Run,
    Reload,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Cycle,
    Axis(AxisRole),
    Switch(SwitchSection),
    Clamp(ClampSection),
}

/// Parse TOML configuration into MachineConfig
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        let at = |kind| ParseError {
            line: line_no,
            kind,
        };

        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or(at(ParseErrorKind::InvalidSection))?;
            section = parse_section_header(header).ok_or(at(ParseErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ParseErrorKind::InvalidLine))?;
        apply_value(&mut config, section, key, value).map_err(at)?;
    }

    Ok(config)
}

/// Remove a trailing comment unless the `#` sits inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse section header like "cycle", "axis.cut" or "clamp.secure_wood"
fn parse_section_header(header: &str) -> Option<Section> {
    let header = header.trim();
    let (kind, name) = match header.split_once('.') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (header, None),
    };

    match (kind, name) {
        ("cycle", None) => Some(Section::Cycle),
        ("axis", Some("cut")) => Some(Section::Axis(AxisRole::Cut)),
        ("axis", Some("position")) => Some(Section::Axis(AxisRole::Position)),
        ("switch", Some("run")) => Some(Section::Switch(SwitchSection::Run)),
        ("switch", Some("reload")) => Some(Section::Switch(SwitchSection::Reload)),
        ("clamp", Some("position")) => Some(Section::Clamp(ClampSection::Position)),
        ("clamp", Some("secure_wood")) => Some(Section::Clamp(ClampSection::SecureWood)),
        _ => None,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_value(
    config: &mut MachineConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => match key {
            "version" => config.version = parse_int(value)?,
            _ => return Err(ParseErrorKind::UnknownKey),
        },
        Section::Cycle => apply_cycle(&mut config.cycle, key, value)?,
        Section::Axis(role) => {
            let (motion, hw) = match role {
                AxisRole::Cut => (&mut config.cut, &mut config.hardware.cut_axis),
                AxisRole::Position => (&mut config.position, &mut config.hardware.position_axis),
            };
            apply_axis(motion, hw, key, value)?;
        }
        Section::Switch(which) => {
            let pin = match which {
                SwitchSection::Run => &mut config.hardware.run_switch,
                SwitchSection::Reload => &mut config.hardware.reload_switch,
            };
            apply_pin_only(pin, key, value)?;
        }
        Section::Clamp(which) => {
            let pin = match which {
                ClampSection::Position => &mut config.hardware.position_clamp,
                ClampSection::SecureWood => &mut config.hardware.secure_clamp,
            };
            apply_pin_only(pin, key, value)?;
        }
    }
    Ok(())
}

fn apply_cycle(cycle: &mut CycleConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "steps_per_unit" => cycle.steps_per_unit = parse_int(value)?,
        "clamp_settle_ms" => cycle.clamp_settle_ms = parse_int(value)?,
        "home_debounce_ms" => cycle.home_debounce_ms = parse_int(value)?,
        "switch_debounce_ms" => cycle.switch_debounce_ms = parse_int(value)?,
        "homing_seek_steps" => cycle.homing_seek_steps = parse_int(value)?,
        "homing_timeout_ms" => cycle.homing_timeout_ms = parse_int(value)?,
        "motion_timeout_ms" => cycle.motion_timeout_ms = parse_int(value)?,
        "repeat_while_held" => cycle.repeat_while_held = parse_bool(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_axis(
    motion: &mut AxisMotionConfig,
    hw: &mut AxisHwConfig,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match key {
        "travel" => motion.travel_x100 = parse_fixed_x100(value)?,
        "normal_speed" => motion.normal_speed = parse_int(value)?,
        "return_speed" => motion.return_speed = parse_int(value)?,
        "acceleration" => motion.acceleration = parse_int(value)?,
        "step_pin" => hw.step_pin = parse_pin(value)?,
        "dir_pin" => hw.dir_pin = parse_pin(value)?,
        "home_pin" => hw.home_pin = parse_pin(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_pin_only(pin: &mut PinConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "pin" => *pin = parse_pin(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseErrorKind::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseErrorKind::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

/// Parse a non-negative decimal with up to two fraction digits into
/// hundredths ("9.5" -> 950)
fn parse_fixed_x100(value: &str) -> Result<u32, ParseErrorKind> {
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (value, ""),
    };

    if whole.is_empty() || frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidValue);
    }

    let whole: u32 = parse_int(whole)?;
    let mut hundredths = 0u32;
    for (i, c) in frac.chars().enumerate() {
        let digit = c.to_digit(10).ok_or(ParseErrorKind::InvalidValue)?;
        hundredths += digit * if i == 0 { 10 } else { 1 };
    }

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(hundredths))
        .ok_or(ParseErrorKind::InvalidValue)
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseErrorKind> {
    parse_pin_string(parse_string(value)).ok_or(ParseErrorKind::InvalidPin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_x100() {
        assert_eq!(parse_fixed_x100("9.5"), Ok(950));
        assert_eq!(parse_fixed_x100("3.3"), Ok(330));
        assert_eq!(parse_fixed_x100("10"), Ok(1000));
        assert_eq!(parse_fixed_x100("0.05"), Ok(5));
        assert_eq!(parse_fixed_x100("9.555"), Err(ParseErrorKind::InvalidValue));
        assert_eq!(parse_fixed_x100("-1.0"), Err(ParseErrorKind::InvalidValue));
        assert_eq!(parse_fixed_x100(".5"), Err(ParseErrorKind::InvalidValue));
    }

    #[test]
    fn test_parse_int_separators() {
        assert_eq!(parse_int::<u32>("50_000"), Ok(50000));
        assert_eq!(parse_int::<i32>("-10"), Ok(-10));
        assert_eq!(parse_int::<u32>("abc"), Err(ParseErrorKind::InvalidValue));
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("a = 1 # note"), "a = 1 ");
        assert_eq!(strip_comment("pin = \"#gpio\""), "pin = \"#gpio\"");
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("cycle"), Some(Section::Cycle));
        assert_eq!(
            parse_section_header("axis.cut"),
            Some(Section::Axis(AxisRole::Cut))
        );
        assert_eq!(
            parse_section_header("clamp.secure_wood"),
            Some(Section::Clamp(ClampSection::SecureWood))
        );
        assert_eq!(parse_section_header("axis.z"), None);
        assert_eq!(parse_section_header("heater"), None);
    }

    #[test]
    fn test_empty_input_is_reference_config() {
        assert_eq!(parse_config(""), Ok(MachineConfig::new()));
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Reference machine
version = 1

[cycle]
steps_per_unit = 1600
clamp_settle_ms = 150   # slower valves
repeat_while_held = false
homing_timeout_ms = 60_000

[axis.cut]
travel = 8.25
return_speed = 40000
step_pin = "gpio14"
home_pin = "!^gpio15"

[axis.position]
travel = 2

[switch.run]
pin = "^gpio20"

[clamp.secure_wood]
pin = "!gpio21"
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.cycle.steps_per_unit, 1600);
        assert_eq!(config.cycle.clamp_settle_ms, 150);
        assert!(!config.cycle.repeat_while_held);
        assert_eq!(config.cycle.homing_timeout_ms, 60000);

        assert_eq!(config.cut.travel_x100, 825);
        assert_eq!(config.cut.return_speed, 40000);
        // Untouched keys keep their defaults
        assert_eq!(config.cut.normal_speed, 2000);
        assert_eq!(config.hardware.cut_axis.step_pin.pin, 14);
        assert!(config.hardware.cut_axis.home_pin.inverted);
        assert!(config.hardware.cut_axis.home_pin.pull_up);

        assert_eq!(config.position.travel_x100, 200);
        assert_eq!(config.hardware.run_switch, PinConfig::with_pullup(20));
        assert_eq!(config.hardware.secure_clamp, PinConfig::inverted(21));
    }

    #[test]
    fn test_parse_inverted_stepper_pins() {
        let config =
            parse_config("[axis.position]\nstep_pin = \"!gpio5\"\ndir_pin = \"!gpio6\"\n").unwrap();
        let pins = config.hardware.position_axis;
        assert_eq!(pins.step_pin, PinConfig::inverted(5));
        assert_eq!(pins.dir_pin, PinConfig::inverted(6));
        // Step idles high when inverted
        assert!(pins.step_pin.level_for(false));
        assert!(!config.hardware.cut_axis.dir_pin.inverted);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_config("[cycle]\nsteps_per_unit = lots\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);

        let err = parse_config("\n\n[spindle]\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ParseErrorKind::InvalidSection);

        let err = parse_config("[axis.cut]\nspeed = 10\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);

        let err = parse_config("[clamp.position]\npin = \"gpio99\"\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPin);

        let err = parse_config("[cycle]\njust words\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidLine);
    }
}
