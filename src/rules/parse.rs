//! The rules-file parser.
//!
//! The format is INI-like, line oriented, UTF-8: `[section]` opens a rule
//! named by the section, `key=value` lines populate it, `#` and `;` start
//! comments. Values may be double quoted to preserve interior whitespace.
//! There is no escaping; keys and values cannot contain newlines.

use std::path::PathBuf;

use scan_fmt::scan_fmt;
use tracing::warn;

use super::{RuleFloating, RuleOpacity, RulePosition, RuleSize, WindowRule};

/// A rejected rules file.
///
/// Parsing is all-or-nothing: the first malformed line fails the whole
/// file and the previously active rules stay in place.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rules file rejected at line {line}: {message}")]
pub struct RulesParseError {
    /// 1-based line the parser gave up on
    pub line: usize,
    /// What was wrong with it
    pub message: String,
    /// The file being parsed, when parsing from disk
    pub path: Option<PathBuf>,
}

impl RulesParseError {
    fn new(line: usize, message: impl Into<String>) -> RulesParseError {
        RulesParseError {
            line,
            message: message.into(),
            path: None,
        }
    }
}

/// Parse a complete rules file
pub fn parse_rules(source: &str) -> Result<Vec<WindowRule>, RulesParseError> {
    let mut rules = Vec::new();
    let mut current: Option<WindowRule> = None;

    for (idx, raw) in source.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[') {
            let Some(name) = name.strip_suffix(']') else {
                return Err(RulesParseError::new(lineno, "unterminated section header"));
            };
            if let Some(done) = current.take() {
                rules.push(done);
            }
            current = Some(WindowRule::new(name.trim()));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(RulesParseError::new(
                lineno,
                format!("expected key=value, got {line:?}"),
            ));
        };
        let Some(rule) = current.as_mut() else {
            return Err(RulesParseError::new(
                lineno,
                "key=value line before the first [section]",
            ));
        };
        parse_entry(rule, key.trim(), unquote(value.trim()), lineno)?;
    }

    if let Some(done) = current.take() {
        rules.push(done);
    }
    Ok(rules)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_entry(
    rule: &mut WindowRule,
    key: &str,
    value: &str,
    lineno: usize,
) -> Result<(), RulesParseError> {
    match key {
        "app_id" => rule.app_id = Some(value.to_owned()),
        "class" => rule.class = Some(value.to_owned()),
        "title" => rule.title = Some(value.to_owned()),
        "instance" => rule.instance = Some(value.to_owned()),
        "workspace" => {
            rule.workspace = Some(value.parse::<u32>().map_err(|_| {
                RulesParseError::new(lineno, format!("invalid workspace {value:?}"))
            })?);
        }
        "priority" => {
            rule.priority = value.parse::<i32>().map_err(|_| {
                RulesParseError::new(lineno, format!("invalid priority {value:?}"))
            })?;
        }
        "enabled" => {
            rule.enabled = parse_bool(value)
                .ok_or_else(|| RulesParseError::new(lineno, format!("invalid bool {value:?}")))?;
        }
        "floating" => {
            rule.floating = match value {
                "force_floating" => RuleFloating::ForceFloating,
                "force_tiled" => RuleFloating::ForceTiled,
                _ => {
                    return Err(RulesParseError::new(
                        lineno,
                        format!("invalid floating mode {value:?}"),
                    ))
                }
            };
        }
        "position" => {
            rule.position = match value {
                "center" => RulePosition::Center,
                "maximized" => RulePosition::Maximized,
                "fullscreen" => RulePosition::Fullscreen,
                "top-left" => RulePosition::TopLeft,
                "top-right" => RulePosition::TopRight,
                "bottom-left" => RulePosition::BottomLeft,
                "bottom-right" => RulePosition::BottomRight,
                custom => match scan_fmt!(custom, "{d},{d}", i32, i32) {
                    Ok((x, y)) => RulePosition::Custom { x, y },
                    Err(_) => {
                        return Err(RulesParseError::new(
                            lineno,
                            format!("invalid position {value:?}"),
                        ))
                    }
                },
            };
        }
        "size" => {
            rule.size = match value {
                "small" => RuleSize::Small,
                "medium" => RuleSize::Medium,
                "large" => RuleSize::Large,
                custom => match scan_fmt!(custom, "{d}x{d}", i32, i32) {
                    Ok((w, h)) if w > 0 && h > 0 => RuleSize::Custom { w, h },
                    _ => {
                        return Err(RulesParseError::new(
                            lineno,
                            format!("invalid size {value:?}"),
                        ))
                    }
                },
            };
        }
        "opacity" => {
            rule.opacity = match value {
                "opaque" => RuleOpacity::Opaque,
                "transparent" => RuleOpacity::Transparent,
                custom => match custom.parse::<f32>() {
                    Ok(v) if (0.0..=1.0).contains(&v) => RuleOpacity::Custom(v),
                    _ => {
                        return Err(RulesParseError::new(
                            lineno,
                            format!("invalid opacity {value:?}"),
                        ))
                    }
                },
            };
        }
        "disable_shadows" => {
            rule.disable_shadows = parse_bool(value)
                .ok_or_else(|| RulesParseError::new(lineno, format!("invalid bool {value:?}")))?;
        }
        "disable_blur" => {
            rule.disable_blur = parse_bool(value)
                .ok_or_else(|| RulesParseError::new(lineno, format!("invalid bool {value:?}")))?;
        }
        "disable_animations" => {
            rule.disable_animations = parse_bool(value)
                .ok_or_else(|| RulesParseError::new(lineno, format!("invalid bool {value:?}")))?;
        }
        "picture_in_picture" => {
            rule.enable_pip = parse_bool(value)
                .ok_or_else(|| RulesParseError::new(lineno, format!("invalid bool {value:?}")))?;
        }
        unknown => {
            warn!(key = unknown, rule = %rule.name, "ignoring unknown rule key");
        }
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_rule() {
        let rules = parse_rules(
            r#"
            # browser placement
            [fox]
            app_id = "firefox"
            workspace = 1
            position = maximized
            priority = 100
            "#,
        )
        .unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name, "fox");
        assert_eq!(rule.app_id.as_deref(), Some("firefox"));
        assert_eq!(rule.workspace, Some(1));
        assert_eq!(rule.position, RulePosition::Maximized);
        assert_eq!(rule.priority, 100);
        assert!(rule.enabled);
    }

    #[test]
    fn parses_custom_size_and_position() {
        let rules = parse_rules(
            "[popup]\ntitle=\"Quick *\"\nsize=640x480\nposition=120,80\nopacity=0.85\n",
        )
        .unwrap();
        let rule = &rules[0];
        assert_eq!(rule.size, RuleSize::Custom { w: 640, h: 480 });
        assert_eq!(rule.position, RulePosition::Custom { x: 120, y: 80 });
        assert_eq!(rule.opacity, RuleOpacity::Custom(0.85));
    }

    #[test]
    fn quoted_values_keep_interior_whitespace() {
        let rules = parse_rules("[r]\ntitle=\"  two  words  \"\n").unwrap();
        assert_eq!(rules[0].title.as_deref(), Some("  two  words  "));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let rules = parse_rules("[r]\napp_id=foo\nfrobnicate=yes\n").unwrap();
        assert_eq!(rules[0].app_id.as_deref(), Some("foo"));
    }

    #[test]
    fn multiple_sections_keep_file_order() {
        let rules = parse_rules("[a]\napp_id=x\n[b]\napp_id=y\n[c]\napp_id=z\n").unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn malformed_lines_reject_the_file() {
        let err = parse_rules("[a]\nthis is not a pair\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = parse_rules("app_id=early\n").unwrap_err();
        assert_eq!(err.line, 1);

        let err = parse_rules("[a]\nworkspace=minus-one\n").unwrap_err();
        assert!(err.message.contains("workspace"));

        let err = parse_rules("[broken\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
