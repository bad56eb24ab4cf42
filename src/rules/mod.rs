//! The window-rules engine.
//!
//! Rules classify new windows by their client identity and imprint initial
//! state: target workspace, floating mode, size, placement, opacity and
//! per-window effect toggles. Matching is declarative (case-insensitive
//! globs over app id, class, title and instance); the highest-priority
//! matching rule wins, ties breaking by file order.
//!
//! Rules run once, when a window is created, before it enters the layout.
//! Every action is best-effort: a failing action logs and the rest still
//! apply.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::adapter::SceneGraph;
use crate::utils::{Point, Rectangle, Size};
use crate::window::{Window, WindowIdentity};
use crate::workspace::WorkspaceId;
use crate::CoreError;

mod matcher;
mod parse;

use matcher::glob_match;
pub use parse::RulesParseError;

/// Margin kept between corner-placed windows and the workspace edge
const CORNER_MARGIN: i32 = 50;
/// Size a picture-in-picture window defaults to
const PIP_SIZE: Size = Size::new(320, 240);
/// Inset of a picture-in-picture window from the bottom-right corner
const PIP_MARGIN: i32 = 20;

/// Placement a rule imprints on its windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulePosition {
    /// Leave the window where it is
    #[default]
    None,
    /// Center in the workspace
    Center,
    /// Maximize onto the workspace rectangle
    Maximized,
    /// Fullscreen onto the output
    Fullscreen,
    /// Pin to the top-left corner
    TopLeft,
    /// Pin to the top-right corner
    TopRight,
    /// Pin to the bottom-left corner
    BottomLeft,
    /// Pin to the bottom-right corner
    BottomRight,
    /// Place at explicit coordinates
    Custom {
        /// Horizontal position
        x: i32,
        /// Vertical position
        y: i32,
    },
}

/// Size a rule imprints on its windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSize {
    /// Leave the size alone
    #[default]
    None,
    /// 400×300
    Small,
    /// 800×600
    Medium,
    /// 1200×800
    Large,
    /// An explicit size
    Custom {
        /// Width in pixels
        w: i32,
        /// Height in pixels
        h: i32,
    },
}

impl RuleSize {
    fn resolve(self) -> Option<Size> {
        match self {
            RuleSize::None => None,
            RuleSize::Small => Some(Size::new(400, 300)),
            RuleSize::Medium => Some(Size::new(800, 600)),
            RuleSize::Large => Some(Size::new(1200, 800)),
            RuleSize::Custom { w, h } => Some(Size::new(w, h)),
        }
    }
}

/// Tiling override a rule imprints on its windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleFloating {
    /// Keep the layout's decision
    #[default]
    Unset,
    /// Force the window into the tiled layer
    ForceTiled,
    /// Force the window into the floating layer
    ForceFloating,
}

/// Opacity a rule imprints on its windows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RuleOpacity {
    /// Keep the default opacity
    #[default]
    Unset,
    /// Fully opaque
    Opaque,
    /// The standard transparency (0.8)
    Transparent,
    /// An explicit value in `[0, 1]`
    Custom(f32),
}

impl RuleOpacity {
    fn resolve(self) -> Option<f32> {
        match self {
            RuleOpacity::Unset => None,
            RuleOpacity::Opaque => Some(1.0),
            RuleOpacity::Transparent => Some(0.8),
            RuleOpacity::Custom(v) => Some(v),
        }
    }
}

/// One declarative window rule
#[derive(Debug, Clone)]
pub struct WindowRule {
    /// Name of the rule (its section header)
    pub name: String,
    /// Glob the app id must match
    pub app_id: Option<String>,
    /// Glob the window class must match
    pub class: Option<String>,
    /// Glob the title must match
    pub title: Option<String>,
    /// Glob the instance name must match
    pub instance: Option<String>,
    /// Workspace the window is sent to
    pub workspace: Option<u32>,
    /// Placement action
    pub position: RulePosition,
    /// Size action
    pub size: RuleSize,
    /// Tiling override
    pub floating: RuleFloating,
    /// Opacity action
    pub opacity: RuleOpacity,
    /// Start the window without a shadow
    pub disable_shadows: bool,
    /// Start the window without blur
    pub disable_blur: bool,
    /// Start the window without animations
    pub disable_animations: bool,
    /// Put the window into picture-in-picture mode
    pub enable_pip: bool,
    /// Selection precedence among matching rules
    pub priority: i32,
    /// Disabled rules never match
    pub enabled: bool,
}

impl WindowRule {
    /// A rule with the given name and no matchers or actions
    pub fn new(name: impl Into<String>) -> WindowRule {
        WindowRule {
            name: name.into(),
            app_id: None,
            class: None,
            title: None,
            instance: None,
            workspace: None,
            position: RulePosition::None,
            size: RuleSize::None,
            floating: RuleFloating::Unset,
            opacity: RuleOpacity::Unset,
            disable_shadows: false,
            disable_blur: false,
            disable_animations: false,
            enable_pip: false,
            priority: 0,
            enabled: true,
        }
    }

    /// Whether this rule matches the given identity.
    ///
    /// Every present matcher field must glob-match the corresponding
    /// identity field; a rule without any matcher never matches.
    pub fn matches(&self, identity: &WindowIdentity) -> bool {
        if self.app_id.is_none()
            && self.class.is_none()
            && self.title.is_none()
            && self.instance.is_none()
        {
            return false;
        }
        let field = |pattern: &Option<String>, value: &Option<String>| match (pattern, value) {
            (None, _) => true,
            (Some(pattern), Some(value)) => glob_match(pattern, value),
            (Some(_), None) => false,
        };
        field(&self.app_id, &identity.app_id)
            && field(&self.class, &identity.class)
            && field(&self.title, &identity.title)
            && field(&self.instance, &identity.instance)
    }
}

/// Counters kept while rules are applied
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesStats {
    /// Windows a rule matched for
    pub matched: u32,
    /// Windows whose every action applied cleanly
    pub applied: u32,
    /// Windows where at least one action failed
    pub failed: u32,
}

/// What the shell needs to execute rule actions
pub struct RuleApplyEnv<'a> {
    /// The downstream scene graph, for repositioning
    pub scene: &'a mut dyn SceneGraph,
    /// Usable rectangle of the output the window appears on
    pub workspace_rect: Rectangle,
    /// Full rectangle of that output, for fullscreen placement
    pub output_rect: Rectangle,
    /// Workspaces that currently exist
    pub known_workspaces: &'a [WorkspaceId],
}

impl fmt::Debug for RuleApplyEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleApplyEnv")
            .field("workspace_rect", &self.workspace_rect)
            .field("output_rect", &self.output_rect)
            .field("known_workspaces", &self.known_workspaces)
            .finish_non_exhaustive()
    }
}

/// Effect toggles a rule left for the effects controller
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEffectOverrides {
    /// Shadow rendering is disabled for this window
    pub disable_shadows: bool,
    /// Blur rendering is disabled for this window
    pub disable_blur: bool,
    /// Animations are disabled for this window
    pub disable_animations: bool,
}

impl RuleEffectOverrides {
    /// Whether any override is set
    pub fn any(&self) -> bool {
        self.disable_shadows || self.disable_blur || self.disable_animations
    }
}

/// The result of applying a rule to a window
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    /// Name of the rule that matched
    pub rule_name: String,
    /// Workspace the window should be inserted into
    pub target_workspace: Option<WorkspaceId>,
    /// Effect toggles for the effects controller
    pub effects: RuleEffectOverrides,
}

/// Owns the rule list, matching and application
#[derive(Debug, Default)]
pub struct RulesManager {
    rules: Vec<WindowRule>,
    path: Option<PathBuf>,
    enabled: bool,
    stats: RulesStats,
}

impl RulesManager {
    /// An empty, enabled manager
    pub fn new() -> RulesManager {
        RulesManager {
            rules: Vec::new(),
            path: None,
            enabled: true,
            stats: RulesStats::default(),
        }
    }

    /// A manager preloaded with the built-in default rules
    pub fn with_defaults() -> RulesManager {
        let mut manager = RulesManager::new();
        manager.install_defaults();
        manager
    }

    /// Enable or disable rule application as a whole
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The active rules, in file order
    pub fn rules(&self) -> &[WindowRule] {
        &self.rules
    }

    /// Counters accumulated since creation
    pub fn stats(&self) -> RulesStats {
        self.stats
    }

    /// Append a rule behind the existing ones
    pub fn add_rule(&mut self, rule: WindowRule) {
        self.rules.push(rule);
    }

    /// Replace the rule list from a string.
    ///
    /// On a parse error the previous rules stay active.
    pub fn load_str(&mut self, source: &str) -> Result<(), CoreError> {
        let rules = parse::parse_rules(source)?;
        info!(rules = rules.len(), "loaded window rules");
        self.rules = rules;
        Ok(())
    }

    /// Load the rule list from a file, remembering the path for
    /// [`RulesManager::reload`].
    ///
    /// A missing or unreadable file installs the built-in defaults; a file
    /// that reads but does not parse is rejected and the previous rules
    /// stay active.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        self.path = Some(path.to_owned());
        match std::fs::read_to_string(path) {
            Ok(source) => self.load_str(&source).map_err(|err| {
                warn!(path = %path.display(), %err, "rules file rejected, keeping previous rules");
                match err {
                    CoreError::Parse(parse) => CoreError::Parse(RulesParseError {
                        path: Some(path.to_owned()),
                        ..parse
                    }),
                    other => other,
                }
            }),
            Err(err) => {
                info!(path = %path.display(), %err, "no rules file, installing defaults");
                if self.rules.is_empty() {
                    self.install_defaults();
                }
                Ok(())
            }
        }
    }

    /// Re-parse the remembered rules file.
    ///
    /// The swap is atomic: on any error the active list is untouched.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        let Some(path) = self.path.clone() else {
            return Err(CoreError::invalid("no rules file was ever loaded"));
        };
        let source = std::fs::read_to_string(&path).map_err(|err| {
            CoreError::invalid(format!("cannot read {}: {err}", path.display()))
        })?;
        self.load_str(&source).map_err(|err| match err {
            CoreError::Parse(parse) => CoreError::Parse(RulesParseError {
                path: Some(path.clone()),
                ..parse
            }),
            other => other,
        })
    }

    /// Install the built-in default rule set
    pub fn install_defaults(&mut self) {
        self.rules.clear();

        let mut firefox = WindowRule::new("firefox-rule");
        firefox.app_id = Some("firefox".into());
        firefox.workspace = Some(1);
        firefox.position = RulePosition::Maximized;
        firefox.priority = 100;
        self.rules.push(firefox);

        let mut vscode = WindowRule::new("vscode-rule");
        vscode.app_id = Some("code".into());
        vscode.class = Some("Code".into());
        vscode.workspace = Some(2);
        vscode.size = RuleSize::Large;
        vscode.position = RulePosition::Center;
        vscode.priority = 100;
        self.rules.push(vscode);

        let mut media = WindowRule::new("media-player-rule");
        media.app_id = Some("mpv".into());
        media.floating = RuleFloating::ForceFloating;
        media.size = RuleSize::Medium;
        media.position = RulePosition::BottomRight;
        media.enable_pip = true;
        media.priority = 90;
        self.rules.push(media);

        let mut calculator = WindowRule::new("calculator-rule");
        calculator.app_id = Some("org.gnome.Calculator".into());
        calculator.class = Some("*calculator*".into());
        calculator.floating = RuleFloating::ForceFloating;
        calculator.size = RuleSize::Small;
        calculator.position = RulePosition::TopRight;
        calculator.priority = 95;
        self.rules.push(calculator);

        info!(rules = self.rules.len(), "installed default window rules");
    }

    /// The best matching enabled rule for an identity, if any
    pub fn find_matching_rule(&self, identity: &WindowIdentity) -> Option<&WindowRule> {
        let mut best: Option<&WindowRule> = None;
        for rule in self.rules.iter().filter(|r| r.enabled) {
            if rule.matches(identity) && best.map(|b| rule.priority > b.priority).unwrap_or(true) {
                best = Some(rule);
            }
        }
        best
    }

    /// Match and apply the best rule for `window`.
    ///
    /// Actions run in a fixed order (workspace, floating, size, position,
    /// opacity, effects), each independent and best-effort. Returns `None`
    /// when no rule matched.
    pub fn apply_to_window(
        &mut self,
        window: &Window,
        env: &mut RuleApplyEnv<'_>,
    ) -> Option<RuleOutcome> {
        if !self.enabled {
            return None;
        }
        let identity = window.identity();
        let rule = self.find_matching_rule(&identity)?.clone();
        self.stats.matched += 1;
        info!(rule = %rule.name, window = window.id(), "applying window rule");

        let mut outcome = RuleOutcome {
            rule_name: rule.name.clone(),
            ..RuleOutcome::default()
        };
        let mut all_ok = true;

        // workspace
        if let Some(target) = rule.workspace {
            let target = WorkspaceId(target);
            if env.known_workspaces.contains(&target) {
                outcome.target_workspace = Some(target);
            } else {
                warn!(rule = %rule.name, workspace = target.0, "rule targets a workspace that does not exist");
                all_ok = false;
            }
        }

        // floating
        match rule.floating {
            RuleFloating::Unset => {}
            RuleFloating::ForceTiled => window.set_floating(false),
            RuleFloating::ForceFloating => window.set_floating(true),
        }

        // size
        if let Some(size) = rule.size.resolve() {
            let geometry = window.geometry();
            window.commit_geometry(Rectangle::from_loc_and_size(geometry.loc(), size));
        }

        // position
        apply_position(&rule, window, env);

        // opacity
        if let Some(opacity) = rule.opacity.resolve() {
            window.set_opacity(opacity);
        }

        // effects
        outcome.effects = RuleEffectOverrides {
            disable_shadows: rule.disable_shadows,
            disable_blur: rule.disable_blur,
            disable_animations: rule.disable_animations,
        };
        if rule.enable_pip {
            apply_pip(&rule, window, env);
        }

        if all_ok {
            self.stats.applied += 1;
        } else {
            self.stats.failed += 1;
        }
        Some(outcome)
    }

    /// Dump the active rules at debug level
    pub fn log_rules(&self) {
        debug!(rules = self.rules.len(), "active window rules");
        for rule in &self.rules {
            debug!(
                name = %rule.name,
                priority = rule.priority,
                enabled = rule.enabled,
                app_id = rule.app_id.as_deref().unwrap_or("*"),
                class = rule.class.as_deref().unwrap_or("*"),
                title = rule.title.as_deref().unwrap_or("*"),
                "window rule"
            );
        }
    }
}

fn apply_position(rule: &WindowRule, window: &Window, env: &mut RuleApplyEnv<'_>) {
    let area = env.workspace_rect;
    let geometry = window.geometry();
    let location = match rule.position {
        RulePosition::None => return,
        RulePosition::Center => Point::new(
            area.x + (area.width - geometry.width) / 2,
            area.y + (area.height - geometry.height) / 2,
        ),
        RulePosition::TopLeft => Point::new(area.x + CORNER_MARGIN, area.y + CORNER_MARGIN),
        RulePosition::TopRight => Point::new(
            area.right() - geometry.width - CORNER_MARGIN,
            area.y + CORNER_MARGIN,
        ),
        RulePosition::BottomLeft => Point::new(
            area.x + CORNER_MARGIN,
            area.bottom() - geometry.height - CORNER_MARGIN,
        ),
        RulePosition::BottomRight => Point::new(
            area.right() - geometry.width - CORNER_MARGIN,
            area.bottom() - geometry.height - CORNER_MARGIN,
        ),
        RulePosition::Custom { x, y } => Point::new(x, y),
        RulePosition::Maximized => {
            window.set_maximized(true, area);
            sync_scene_position(window, env);
            return;
        }
        RulePosition::Fullscreen => {
            window.set_fullscreen(true, env.output_rect);
            sync_scene_position(window, env);
            return;
        }
    };
    window.set_geometry(Rectangle::from_loc_and_size(location, geometry.size()));
    sync_scene_position(window, env);
}

fn apply_pip(rule: &WindowRule, window: &Window, env: &mut RuleApplyEnv<'_>) {
    window.set_pip(true);
    window.set_floating(true);

    let mut geometry = window.geometry();
    if rule.size == RuleSize::None {
        geometry = Rectangle::from_loc_and_size(geometry.loc(), PIP_SIZE);
    }
    if rule.position == RulePosition::None {
        let area = env.workspace_rect;
        geometry = Rectangle::from_loc_and_size(
            Point::new(
                area.right() - geometry.width - PIP_MARGIN,
                area.bottom() - geometry.height - PIP_MARGIN,
            ),
            geometry.size(),
        );
    }
    window.commit_geometry(geometry);
    sync_scene_position(window, env);
    debug!(window = window.id(), "picture-in-picture mode enabled");
}

fn sync_scene_position(window: &Window, env: &mut RuleApplyEnv<'_>) {
    if let Some(node) = window.scene_node() {
        env.scene.set_position(node, window.geometry().loc());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(app_id: &str, title: &str) -> WindowIdentity {
        WindowIdentity {
            app_id: Some(app_id.into()),
            class: Some(app_id.into()),
            title: Some(title.into()),
            instance: None,
        }
    }

    #[test]
    fn a_rule_without_matchers_never_matches() {
        let rule = WindowRule::new("empty");
        assert!(!rule.matches(&identity("firefox", "browser")));
    }

    #[test]
    fn all_present_fields_must_match() {
        let mut rule = WindowRule::new("r");
        rule.app_id = Some("firefox".into());
        rule.title = Some("*private*".into());

        assert!(rule.matches(&identity("Firefox", "a Private window")));
        assert!(!rule.matches(&identity("Firefox", "a regular window")));
        assert!(!rule.matches(&identity("chromium", "a Private window")));
    }

    #[test]
    fn a_pattern_against_an_absent_field_fails() {
        let mut rule = WindowRule::new("r");
        rule.instance = Some("*".into());
        assert!(!rule.matches(&identity("firefox", "t")));
    }

    #[test]
    fn highest_priority_wins_ties_by_order() {
        let mut manager = RulesManager::new();
        let mut low = WindowRule::new("low");
        low.app_id = Some("*".into());
        low.priority = 1;
        let mut first = WindowRule::new("first");
        first.app_id = Some("fire*".into());
        first.priority = 50;
        let mut second = WindowRule::new("second");
        second.app_id = Some("*fox".into());
        second.priority = 50;
        manager.add_rule(low);
        manager.add_rule(first);
        manager.add_rule(second);

        let best = manager.find_matching_rule(&identity("firefox", "t")).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut manager = RulesManager::new();
        let mut rule = WindowRule::new("off");
        rule.app_id = Some("*".into());
        rule.enabled = false;
        manager.add_rule(rule);
        assert!(manager.find_matching_rule(&identity("firefox", "t")).is_none());
    }

    #[test]
    fn defaults_cover_the_usual_suspects() {
        let manager = RulesManager::with_defaults();
        assert_eq!(
            manager.find_matching_rule(&identity("firefox", "t")).unwrap().name,
            "firefox-rule"
        );
        assert_eq!(
            manager
                .find_matching_rule(&identity("org.gnome.Calculator", "t"))
                .unwrap()
                .name,
            "calculator-rule"
        );
        assert_eq!(
            manager.find_matching_rule(&identity("mpv", "t")).unwrap().name,
            "media-player-rule"
        );
    }

    #[test]
    fn a_failed_parse_keeps_the_previous_rules() {
        let mut manager = RulesManager::new();
        manager.load_str("[good]\napp_id=foo\n").unwrap();
        assert!(manager.load_str("[bad]\nworkspace=NaN\n").is_err());
        assert_eq!(manager.rules().len(), 1);
        assert_eq!(manager.rules()[0].name, "good");
    }
}
