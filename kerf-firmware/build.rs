//! Build script for kerf-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    // Re-run if machine.toml changes
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        fail(
            "machine.toml not found",
            &["The firmware embeds machine.toml from the kerf-firmware directory.".to_string()],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read machine.toml", &[e.to_string()]),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in machine.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    validate_version(&config, &mut errors);
    validate_cycle(&config, &mut errors);
    let pins = validate_sections(&config, &mut errors);
    validate_pin_usage(&pins, &mut errors);

    if !errors.is_empty() {
        fail("Invalid machine configuration", &errors);
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Abort the build with a boxed error message
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(errors)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(errors: &[String]) -> String {
    errors
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_version(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("version") {
        None => {}
        Some(toml::Value::Integer(1)) => {}
        Some(_) => errors.push("version must be 1".to_string()),
    }
}

fn validate_cycle(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(cycle) = config.get("cycle") else {
        return;
    };
    let Some(cycle) = cycle.as_table() else {
        errors.push("[cycle] must be a table".to_string());
        return;
    };

    for (key, value) in cycle {
        match key.as_str() {
            "steps_per_unit" | "homing_seek_steps" => {
                if !matches!(value, toml::Value::Integer(v) if *v > 0) {
                    errors.push(format!("[cycle] {} must be a positive integer", key));
                }
            }
            "clamp_settle_ms" | "home_debounce_ms" | "switch_debounce_ms"
            | "homing_timeout_ms" | "motion_timeout_ms" => {
                if !matches!(value, toml::Value::Integer(v) if *v >= 0) {
                    errors.push(format!("[cycle] {} must be a non-negative integer", key));
                }
            }
            "repeat_while_held" => {
                if !value.is_bool() {
                    errors.push("[cycle] repeat_while_held must be true or false".to_string());
                }
            }
            _ => errors.push(format!("[cycle] unknown key '{}'", key)),
        }
    }
}

/// Validate axis, switch and clamp sections; returns every configured pin
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) -> Vec<(String, i64)> {
    let mut pins = Vec::new();

    for (group, names) in [
        ("axis", &["cut", "position"][..]),
        ("switch", &["run", "reload"][..]),
        ("clamp", &["position", "secure_wood"][..]),
    ] {
        let Some(table) = config.get(group).and_then(|g| g.as_table()) else {
            continue;
        };

        for (name, section) in table {
            let label = format!("[{}.{}]", group, name);
            if !names.contains(&name.as_str()) {
                errors.push(format!("{} is not a known section", label));
                continue;
            }
            let Some(section) = section.as_table() else {
                errors.push(format!("{} must be a table", label));
                continue;
            };

            for (key, value) in section {
                match (group, key.as_str()) {
                    ("axis", "travel") => {
                        let travel = value
                            .as_float()
                            .or_else(|| value.as_integer().map(|v| v as f64));
                        if !matches!(travel, Some(t) if t > 0.0) {
                            errors.push(format!("{} travel must be a positive number", label));
                        }
                    }
                    ("axis", "normal_speed" | "return_speed" | "acceleration") => {
                        if !matches!(value, toml::Value::Integer(v) if *v > 0) {
                            errors.push(format!("{} {} must be a positive integer", label, key));
                        }
                    }
                    ("axis", "step_pin" | "dir_pin" | "home_pin") | (_, "pin") => {
                        match value.as_str().and_then(parse_pin) {
                            Some(pin) => pins.push((format!("{} {}", label, key), pin)),
                            None => errors.push(format!("{} {} is not a valid pin", label, key)),
                        }
                    }
                    _ => errors.push(format!("{} unknown key '{}'", label, key)),
                }
            }
        }
    }

    pins
}

/// Report pins assigned to more than one signal
fn validate_pin_usage(pins: &[(String, i64)], errors: &mut Vec<String>) {
    let mut users: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
    for (label, pin) in pins {
        users.entry(*pin).or_default().push(label);
    }
    for (pin, labels) in users {
        if labels.len() > 1 {
            errors.push(format!("gpio{} used by {}", pin, labels.join(", ")));
        }
    }
}

/// Parse "gpioN" with optional "!" and "^" prefixes
fn parse_pin(s: &str) -> Option<i64> {
    let number = s.trim().trim_start_matches(['!', '^']).strip_prefix("gpio")?;
    let pin: i64 = number.parse().ok()?;
    (0..GPIO_COUNT).contains(&pin).then_some(pin)
}
