//! The smart-gaps engine.
//!
//! Gaps are driven by profiles: named bundles of base values, an adaptation
//! mode, activation conditions and animation settings. On every event that
//! can affect spacing the shell rebuilds a [`GapContext`] per output and
//! asks the engine to re-evaluate; the engine scores the enabled profiles,
//! adapts the winner's base values to the context and, when the result
//! differs from the current state, either applies it directly or starts an
//! interpolated transition.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::output::OutputId;
use crate::utils::Size;

mod animation;

use animation::GapAnimation;
pub use animation::GapEasing;

/// The six gap dimensions of one output, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapValues {
    /// Space between adjacent tiles
    pub inner: i32,
    /// Nominal space between tiles and the workspace edge
    pub outer: i32,
    /// Inset at the top edge
    pub top: i32,
    /// Inset at the bottom edge
    pub bottom: i32,
    /// Inset at the left edge
    pub left: i32,
    /// Inset at the right edge
    pub right: i32,
}

impl GapValues {
    /// All six dimensions zero
    pub const ZERO: GapValues = GapValues {
        inner: 0,
        outer: 0,
        top: 0,
        bottom: 0,
        left: 0,
        right: 0,
    };

    pub(crate) fn to_array(self) -> [i32; 6] {
        [
            self.inner,
            self.outer,
            self.top,
            self.bottom,
            self.left,
            self.right,
        ]
    }

    pub(crate) fn from_array(values: [i32; 6]) -> GapValues {
        GapValues {
            inner: values[0],
            outer: values[1],
            top: values[2],
            bottom: values[3],
            left: values[4],
            right: values[5],
        }
    }
}

/// How a profile adapts its inner gap to the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapAdaptation {
    /// Use the base values as they are
    #[default]
    Static,
    /// Shrink gaps as the window count grows
    ByCount,
    /// Scale gaps with the output's pixel density
    ByDensity,
    /// Widen gaps while a window holds focus
    ByFocus,
    /// Average of [`GapAdaptation::ByCount`] and [`GapAdaptation::ByDensity`]
    Mixed,
}

/// Bounds and knobs for the adaptive formulas
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveParams {
    /// Smallest gap adaptation may produce
    pub min_gap: i32,
    /// Largest gap adaptation may produce
    pub max_gap: i32,
    /// Strength of the adaptation
    pub scale_factor: f32,
    /// Window count below which counting adaptation stays idle
    pub threshold: i32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        AdaptiveParams {
            min_gap: 2,
            max_gap: 30,
            scale_factor: 1.0,
            threshold: 3,
        }
    }
}

/// When a profile is allowed to win the selection
#[derive(Debug, Clone, Default)]
pub struct ActivationConditions {
    /// Fewest windows the profile applies to
    pub min_windows: i32,
    /// Most windows the profile applies to
    pub max_windows: i32,
    /// Collapse all gaps while something is fullscreen
    pub fullscreen_disable: bool,
    /// Profile also applies its values to floating-dominated workspaces
    pub floating_override: bool,
    /// Substring the workspace name must contain
    pub workspace_pattern: Option<String>,
    /// Substring the output name must contain
    pub output_pattern: Option<String>,
}

/// Animation settings of one profile
#[derive(Debug, Clone, Copy)]
pub struct GapAnimationSettings {
    /// Animate towards new values instead of jumping
    pub enabled: bool,
    /// Transition length in milliseconds
    pub duration_ms: u32,
    /// Curve shaping the transition
    pub easing: GapEasing,
}

impl Default for GapAnimationSettings {
    fn default() -> Self {
        GapAnimationSettings {
            enabled: true,
            duration_ms: 250,
            easing: GapEasing::EaseOut,
        }
    }
}

/// A named gap configuration the engine can switch between
#[derive(Debug, Clone)]
pub struct GapProfile {
    /// Profile name, unique within the engine
    pub name: String,
    /// Disabled profiles never win the selection
    pub enabled: bool,
    /// Base values before adaptation
    pub gaps: GapValues,
    /// Adaptation mode for the inner gap
    pub adaptation: GapAdaptation,
    /// Bounds and knobs of the adaptive formulas
    pub adaptive: AdaptiveParams,
    /// Conditions gating the profile's selection
    pub conditions: ActivationConditions,
    /// How value changes are animated
    pub animation: GapAnimationSettings,
}

/// Everything profile selection and adaptation looks at.
///
/// Rebuilt by the shell for the output in question on every event that can
/// affect gaps.
#[derive(Debug, Clone, Default)]
pub struct GapContext {
    /// Windows on the output's visible workspace
    pub window_count: usize,
    /// Tiled, non-fullscreen windows among them
    pub tiled_count: usize,
    /// Floating windows among them
    pub floating_count: usize,
    /// Whether any of them is fullscreen
    pub has_fullscreen: bool,
    /// Whether a window holds keyboard focus on this output
    pub focused: bool,
    /// Size of the output
    pub screen_size: Size,
    /// Pixel density of the output
    pub density: f32,
    /// Name of the visible workspace
    pub workspace_name: String,
    /// Name of the output
    pub output_name: String,
}

/// Live gap values of one output
#[derive(Debug)]
pub struct GapState {
    active_profile: String,
    current: GapValues,
    animation: Option<GapAnimation>,
    adaptations: u32,
    last_adaptation_ms: u32,
}

impl GapState {
    /// Name of the profile currently driving this output
    pub fn active_profile(&self) -> &str {
        &self.active_profile
    }

    /// The effective values, mid-animation ones included
    pub fn current(&self) -> GapValues {
        self.current
    }

    /// Whether a transition is in flight
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// How often this output's gaps were re-adapted
    pub fn adaptations(&self) -> u32 {
        self.adaptations
    }

    /// When the last re-adaptation happened
    pub fn last_adaptation_ms(&self) -> u32 {
        self.last_adaptation_ms
    }
}

/// The profile store and per-output gap states
#[derive(Debug)]
pub struct SmartGaps {
    enabled: bool,
    smart_gaps: bool,
    outer_gaps_smart: bool,
    profiles: IndexMap<String, GapProfile>,
    default_profile: Option<String>,
    states: IndexMap<OutputId, GapState>,
}

impl Default for SmartGaps {
    fn default() -> Self {
        Self::new()
    }
}

impl SmartGaps {
    /// Create an engine preloaded with the built-in profiles
    /// (`default`, `adaptive`, `compact`, `spacious`)
    pub fn new() -> SmartGaps {
        let mut gaps = SmartGaps {
            enabled: true,
            smart_gaps: false,
            outer_gaps_smart: false,
            profiles: IndexMap::new(),
            default_profile: None,
            states: IndexMap::new(),
        };
        gaps.load_defaults();
        gaps
    }

    fn load_defaults(&mut self) {
        let defaults = [
            GapProfile {
                name: "default".into(),
                enabled: true,
                gaps: GapValues {
                    inner: 10,
                    outer: 5,
                    top: 5,
                    bottom: 5,
                    left: 5,
                    right: 5,
                },
                adaptation: GapAdaptation::Static,
                adaptive: AdaptiveParams {
                    min_gap: 2,
                    max_gap: 30,
                    scale_factor: 1.0,
                    threshold: 3,
                },
                conditions: ActivationConditions {
                    min_windows: 1,
                    max_windows: 99,
                    fullscreen_disable: true,
                    floating_override: false,
                    workspace_pattern: None,
                    output_pattern: None,
                },
                animation: GapAnimationSettings {
                    enabled: true,
                    duration_ms: 250,
                    easing: GapEasing::EaseOut,
                },
            },
            GapProfile {
                name: "adaptive".into(),
                enabled: true,
                gaps: GapValues {
                    inner: 15,
                    outer: 8,
                    top: 8,
                    bottom: 8,
                    left: 8,
                    right: 8,
                },
                adaptation: GapAdaptation::ByCount,
                adaptive: AdaptiveParams {
                    min_gap: 5,
                    max_gap: 25,
                    scale_factor: 0.8,
                    threshold: 4,
                },
                conditions: ActivationConditions {
                    min_windows: 2,
                    max_windows: 99,
                    fullscreen_disable: true,
                    floating_override: true,
                    workspace_pattern: None,
                    output_pattern: None,
                },
                animation: GapAnimationSettings {
                    enabled: true,
                    duration_ms: 500,
                    easing: GapEasing::EaseInOut,
                },
            },
            GapProfile {
                name: "compact".into(),
                enabled: true,
                gaps: GapValues {
                    inner: 5,
                    outer: 2,
                    top: 2,
                    bottom: 2,
                    left: 2,
                    right: 2,
                },
                adaptation: GapAdaptation::ByDensity,
                adaptive: AdaptiveParams {
                    min_gap: 1,
                    max_gap: 10,
                    scale_factor: 0.5,
                    threshold: 6,
                },
                conditions: ActivationConditions {
                    min_windows: 1,
                    max_windows: 99,
                    fullscreen_disable: true,
                    floating_override: false,
                    workspace_pattern: None,
                    output_pattern: None,
                },
                animation: GapAnimationSettings {
                    enabled: false,
                    duration_ms: 100,
                    easing: GapEasing::Linear,
                },
            },
            GapProfile {
                name: "spacious".into(),
                enabled: true,
                gaps: GapValues {
                    inner: 25,
                    outer: 15,
                    top: 15,
                    bottom: 15,
                    left: 15,
                    right: 15,
                },
                adaptation: GapAdaptation::ByFocus,
                adaptive: AdaptiveParams {
                    min_gap: 15,
                    max_gap: 40,
                    scale_factor: 1.2,
                    threshold: 2,
                },
                conditions: ActivationConditions {
                    min_windows: 1,
                    max_windows: 4,
                    fullscreen_disable: true,
                    floating_override: true,
                    workspace_pattern: None,
                    output_pattern: None,
                },
                animation: GapAnimationSettings {
                    enabled: true,
                    duration_ms: 1000,
                    easing: GapEasing::EaseInOut,
                },
            },
        ];
        for profile in defaults {
            let _ = self.add_profile(profile);
        }
        info!(profiles = self.profiles.len(), "loaded default gap profiles");
    }

    /// Whether the engine is running at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the whole engine.
    ///
    /// A disabled engine reports zero gaps everywhere.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the engine on or off, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Configure the single-window collapse.
    ///
    /// With `smart_gaps` set, a workspace holding at most one tiled window
    /// gets no inner gap; `outer_gaps_smart` collapses the outer gaps with
    /// it.
    pub fn set_smart_gaps(&mut self, smart_gaps: bool, outer_gaps_smart: bool) {
        self.smart_gaps = smart_gaps;
        self.outer_gaps_smart = outer_gaps_smart;
    }

    /// Register a profile. Duplicate names are rejected; the first profile
    /// registered becomes the default.
    pub fn add_profile(&mut self, profile: GapProfile) -> Result<(), crate::CoreError> {
        if self.profiles.contains_key(&profile.name) {
            return Err(crate::CoreError::invalid(format!(
                "gap profile {:?} already exists",
                profile.name
            )));
        }
        if self.default_profile.is_none() {
            self.default_profile = Some(profile.name.clone());
        }
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> bool {
        let removed = self.profiles.shift_remove(name).is_some();
        if removed && self.default_profile.as_deref() == Some(name) {
            self.default_profile = self.profiles.keys().next().cloned();
        }
        removed
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Option<&GapProfile> {
        self.profiles.get(name)
    }

    /// Mutable access to a profile by name
    pub fn profile_mut(&mut self, name: &str) -> Option<&mut GapProfile> {
        self.profiles.get_mut(name)
    }

    /// Make `name` the fallback profile used when no profile qualifies
    pub fn set_default_profile(&mut self, name: &str) {
        if self.profiles.contains_key(name) {
            self.default_profile = Some(name.to_owned());
        } else {
            warn!(profile = name, "unknown profile cannot become the default");
        }
    }

    /// The per-output state, if the output has been seen
    pub fn state(&self, output: OutputId) -> Option<&GapState> {
        self.states.get(&output)
    }

    /// The effective gap values of an output.
    ///
    /// Outputs the engine has not adapted yet report the default profile's
    /// base values.
    pub fn current_values(&self, output: OutputId) -> GapValues {
        if let Some(state) = self.states.get(&output) {
            return state.current;
        }
        self.default_profile
            .as_ref()
            .and_then(|name| self.profiles.get(name))
            .map(|profile| profile.gaps)
            .unwrap_or(GapValues::ZERO)
    }

    /// Score the enabled profiles against `context` and return the winner.
    ///
    /// Ties break by registration order; with no qualifying profile the
    /// default one is returned.
    pub fn select_profile(&self, context: &GapContext) -> Option<&GapProfile> {
        let mut best: Option<(&GapProfile, i32)> = None;
        for profile in self.profiles.values() {
            if !profile.enabled {
                continue;
            }
            let window_count = context.window_count as i32;
            if window_count < profile.conditions.min_windows
                || window_count > profile.conditions.max_windows
            {
                continue;
            }
            let mut score = 10;
            if profile.adaptation == GapAdaptation::ByCount && context.tiled_count >= 3 {
                score += 5;
            }
            if profile.adaptation == GapAdaptation::ByDensity && context.density != 96.0 {
                score += 5;
            }
            if profile.adaptation == GapAdaptation::ByFocus && context.focused {
                score += 5;
            }
            if let Some(pattern) = &profile.conditions.workspace_pattern {
                if context.workspace_name.contains(pattern.as_str()) {
                    score += 3;
                }
            }
            if let Some(pattern) = &profile.conditions.output_pattern {
                if context.output_name.contains(pattern.as_str()) {
                    score += 3;
                }
            }
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((profile, score));
            }
        }
        best.map(|(profile, _)| profile).or_else(|| {
            self.default_profile
                .as_ref()
                .and_then(|name| self.profiles.get(name))
        })
    }

    /// Compute the target gap values for `context`.
    ///
    /// Returns the values together with the name of the profile they came
    /// from.
    pub fn calculate(&self, context: &GapContext) -> (GapValues, Option<String>) {
        if !self.enabled {
            return (GapValues::ZERO, None);
        }
        let Some(profile) = self.select_profile(context) else {
            warn!("no gap profile available, falling back to bare defaults");
            return (
                GapValues {
                    inner: 10,
                    outer: 10,
                    top: 10,
                    bottom: 10,
                    left: 10,
                    right: 10,
                },
                None,
            );
        };

        if context.has_fullscreen && profile.conditions.fullscreen_disable {
            return (GapValues::ZERO, Some(profile.name.clone()));
        }

        if self.smart_gaps && context.tiled_count <= 1 {
            let outer = if self.outer_gaps_smart {
                0
            } else {
                profile.gaps.outer
            };
            return (
                GapValues {
                    inner: 0,
                    outer,
                    top: outer,
                    bottom: outer,
                    left: outer,
                    right: outer,
                },
                Some(profile.name.clone()),
            );
        }

        let inner = match profile.adaptation {
            GapAdaptation::Static => profile.gaps.inner,
            GapAdaptation::ByCount => adapt_by_count(profile, context.window_count as i32),
            GapAdaptation::ByDensity => adapt_by_density(profile, context.density),
            GapAdaptation::ByFocus => adapt_by_focus(profile, context.focused),
            GapAdaptation::Mixed => {
                (adapt_by_count(profile, context.window_count as i32)
                    + adapt_by_density(profile, context.density))
                    / 2
            }
        };

        (
            GapValues {
                inner,
                ..profile.gaps
            },
            Some(profile.name.clone()),
        )
    }

    /// Re-evaluate one output against a fresh context.
    ///
    /// Starts or replaces a transition when the selected profile animates,
    /// applies the values directly otherwise. Returns whether the output's
    /// target changed (the caller recalculates layouts in that case).
    pub fn update_output(&mut self, output: OutputId, context: &GapContext, now_ms: u32) -> bool {
        let (target, profile_name) = self.calculate(context);
        let animation = profile_name
            .as_ref()
            .and_then(|name| self.profiles.get(name))
            .map(|profile| profile.animation);

        let default_values = self.current_values(output);
        let state = self.states.entry(output).or_insert_with(|| GapState {
            active_profile: String::new(),
            current: default_values,
            animation: None,
            adaptations: 0,
            last_adaptation_ms: 0,
        });
        if let Some(name) = &profile_name {
            if state.active_profile != *name {
                debug!(output = ?output, profile = %name, "gap profile switched");
            }
            state.active_profile = name.clone();
        }

        let previous_target = state
            .animation
            .as_ref()
            .map(|anim| anim.target())
            .unwrap_or(state.current);
        if target == previous_target {
            return false;
        }

        match animation {
            Some(settings) if settings.enabled && settings.duration_ms > 0 => {
                state.animation = Some(GapAnimation::new(
                    state.current,
                    target,
                    now_ms,
                    settings.duration_ms,
                    settings.easing,
                ));
            }
            _ => {
                state.current = target;
                state.animation = None;
            }
        }
        state.adaptations += 1;
        state.last_adaptation_ms = now_ms;
        true
    }

    /// Advance all in-flight transitions.
    ///
    /// Returns the outputs whose effective values changed this tick.
    pub fn tick(&mut self, now_ms: u32) -> SmallVec<[OutputId; 2]> {
        let mut changed = SmallVec::new();
        for (output, state) in self.states.iter_mut() {
            let Some(animation) = &state.animation else {
                continue;
            };
            let (values, finished) = animation.sample(now_ms);
            if values != state.current {
                state.current = values;
                changed.push(*output);
            }
            if finished {
                state.animation = None;
            }
        }
        changed
    }

    /// Whether any output still animates its gaps
    pub fn is_animating(&self) -> bool {
        self.states.values().any(|state| state.animation.is_some())
    }

    /// Grow (or shrink, with a negative delta) the effective gaps of every
    /// output. In-flight transitions are cancelled.
    pub fn adjust_gaps(&mut self, delta: i32) {
        for state in self.states.values_mut() {
            let adjusted = state
                .current
                .to_array()
                .map(|value| (value + delta).max(0));
            state.current = GapValues::from_array(adjusted);
            state.animation = None;
        }
    }

    /// Snap every output back to its active profile's base values
    pub fn reset_gaps(&mut self) {
        for state in self.states.values_mut() {
            if let Some(profile) = self.profiles.get(&state.active_profile) {
                state.current = profile.gaps;
                state.animation = None;
            }
        }
    }
}

fn clamp_gap(profile: &GapProfile, value: f32) -> i32 {
    (value.round() as i32).clamp(profile.adaptive.min_gap, profile.adaptive.max_gap)
}

/// Shrink the inner gap as the window count passes the threshold
fn adapt_by_count(profile: &GapProfile, window_count: i32) -> i32 {
    if window_count <= profile.adaptive.threshold {
        return profile.gaps.inner;
    }
    let over = (window_count - profile.adaptive.threshold) as f32;
    let factor = (1.0 - 0.1 * profile.adaptive.scale_factor * over).max(0.2);
    clamp_gap(profile, profile.gaps.inner as f32 * factor)
}

/// Scale the inner gap with the output density relative to standard DPI
fn adapt_by_density(profile: &GapProfile, density: f32) -> i32 {
    if density <= 0.0 {
        return profile.gaps.inner;
    }
    let factor = profile.adaptive.scale_factor * 96.0 / density;
    clamp_gap(profile, profile.gaps.inner as f32 * factor)
}

/// Widen the inner gap around a focused window
fn adapt_by_focus(profile: &GapProfile, focused: bool) -> i32 {
    if !focused {
        return profile.gaps.inner;
    }
    let factor = 1.0 + 0.2 * profile.adaptive.scale_factor;
    clamp_gap(profile, profile.gaps.inner as f32 * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(adaptation: GapAdaptation) -> GapProfile {
        GapProfile {
            name: "test".into(),
            enabled: true,
            gaps: GapValues {
                inner: 10,
                outer: 5,
                top: 5,
                bottom: 5,
                left: 5,
                right: 5,
            },
            adaptation,
            adaptive: AdaptiveParams {
                min_gap: 2,
                max_gap: 30,
                scale_factor: 1.0,
                threshold: 3,
            },
            conditions: ActivationConditions {
                min_windows: 0,
                max_windows: 99,
                fullscreen_disable: true,
                floating_override: false,
                workspace_pattern: None,
                output_pattern: None,
            },
            animation: GapAnimationSettings {
                enabled: false,
                duration_ms: 0,
                easing: GapEasing::Linear,
            },
        }
    }

    fn context(windows: usize) -> GapContext {
        GapContext {
            window_count: windows,
            tiled_count: windows,
            floating_count: 0,
            has_fullscreen: false,
            focused: false,
            screen_size: Size::new(1920, 1080),
            density: 96.0,
            workspace_name: "workspace_0".into(),
            output_name: "DP-1".into(),
        }
    }

    #[test]
    fn count_adaptation_is_idle_below_the_threshold() {
        let p = profile(GapAdaptation::ByCount);
        assert_eq!(adapt_by_count(&p, 2), 10);
        assert_eq!(adapt_by_count(&p, 3), 10);
        // one over the threshold shaves 10 percent
        assert_eq!(adapt_by_count(&p, 4), 9);
        // far over the threshold bottoms out at the 0.2 factor
        assert_eq!(adapt_by_count(&p, 30), 2);
    }

    #[test]
    fn density_adaptation_shrinks_on_hidpi() {
        let p = profile(GapAdaptation::ByDensity);
        assert_eq!(adapt_by_density(&p, 96.0), 10);
        assert_eq!(adapt_by_density(&p, 192.0), 5);
        assert_eq!(adapt_by_density(&p, 48.0), 20);
    }

    #[test]
    fn focus_adaptation_widens_around_focus() {
        let p = profile(GapAdaptation::ByFocus);
        assert_eq!(adapt_by_focus(&p, false), 10);
        assert_eq!(adapt_by_focus(&p, true), 12);
    }

    #[test]
    fn selection_disqualifies_out_of_range_profiles() {
        let mut gaps = SmartGaps::new();
        // spacious only allows up to four windows
        let ctx = context(6);
        let selected = gaps.select_profile(&ctx).unwrap();
        assert_ne!(selected.name, "spacious");

        // with every profile disqualified the default is used
        for profile in gaps.profiles.values_mut() {
            profile.conditions.min_windows = 50;
        }
        let selected = gaps.select_profile(&ctx).unwrap();
        assert_eq!(selected.name, "default");
    }

    #[test]
    fn selection_prefers_matching_adaptation_mode() {
        let gaps = SmartGaps::new();
        let mut ctx = context(5);
        ctx.tiled_count = 5;
        // "adaptive" (ByCount) earns the +5 bonus over the static default
        let selected = gaps.select_profile(&ctx).unwrap();
        assert_eq!(selected.name, "adaptive");
    }

    #[test]
    fn fullscreen_collapses_everything() {
        let mut gaps = SmartGaps::new();
        gaps.set_smart_gaps(false, false);
        let mut ctx = context(3);
        ctx.has_fullscreen = true;
        let (values, _) = gaps.calculate(&ctx);
        assert_eq!(values, GapValues::ZERO);
    }

    #[test]
    fn smart_gaps_collapse_for_a_single_tile() {
        let mut gaps = SmartGaps::new();
        gaps.set_smart_gaps(true, true);
        let (values, _) = gaps.calculate(&context(1));
        assert_eq!(values, GapValues::ZERO);

        gaps.set_smart_gaps(true, false);
        let (values, _) = gaps.calculate(&context(1));
        assert_eq!(values.inner, 0);
        assert_eq!(values.outer, 5);
        assert_eq!(values.left, 5);
    }

    #[test]
    fn update_without_animation_applies_directly() {
        let mut gaps = SmartGaps::new();
        for name in ["default", "adaptive", "compact", "spacious"] {
            gaps.profile_mut(name).unwrap().animation.enabled = false;
        }
        let output = crate::output::Output::new("DP-1", crate::utils::Rectangle::new(0, 0, 1920, 1080));

        // a fresh state starts on the default profile's base values, so the
        // first evaluation of a matching context changes nothing
        assert!(!gaps.update_output(output.id(), &context(2), 0));
        let state = gaps.state(output.id()).unwrap();
        assert_eq!(state.active_profile(), "default");
        assert!(!state.is_animating());
        assert_eq!(state.current().inner, 10);

        // five tiled windows swing the selection to the count-adaptive
        // profile, which lands directly with animation off
        assert!(gaps.update_output(output.id(), &context(5), 16));
        let state = gaps.state(output.id()).unwrap();
        assert_eq!(state.active_profile(), "adaptive");
        assert!(!state.is_animating());
        assert_eq!(state.current().inner, 14);
        assert_eq!(state.current().outer, 8);
        assert_eq!(state.adaptations(), 1);
    }

    #[test]
    fn update_with_animation_interpolates_over_ticks() {
        let mut gaps = SmartGaps::new();
        let output = crate::output::Output::new("DP-1", crate::utils::Rectangle::new(0, 0, 1920, 1080));
        // land on "default" (animated, 250 ms) from a zero state
        gaps.states.insert(
            output.id(),
            GapState {
                active_profile: "default".into(),
                current: GapValues::ZERO,
                animation: None,
                adaptations: 0,
                last_adaptation_ms: 0,
            },
        );

        assert!(gaps.update_output(output.id(), &context(2), 1000));
        assert!(gaps.is_animating());
        let mid = gaps.tick(1125);
        assert_eq!(mid.as_slice(), &[output.id()]);
        let state = gaps.state(output.id()).unwrap();
        assert!(state.current().inner > 0 && state.current().inner < 10);

        gaps.tick(1250);
        let state = gaps.state(output.id()).unwrap();
        assert_eq!(state.current().inner, 10);
        assert!(!state.is_animating());
    }

    #[test]
    fn a_newer_target_replaces_the_running_animation() {
        let mut gaps = SmartGaps::new();
        let output = crate::output::Output::new("DP-1", crate::utils::Rectangle::new(0, 0, 1920, 1080));
        gaps.update_output(output.id(), &context(2), 0);
        gaps.states.get_mut(&output.id()).unwrap().current = GapValues::ZERO;
        gaps.update_output(output.id(), &context(2), 10);
        assert!(gaps.is_animating());

        // fullscreen appears mid-flight: the zero target replaces the old one
        let mut ctx = context(2);
        ctx.has_fullscreen = true;
        assert!(gaps.update_output(output.id(), &ctx, 50));
        gaps.tick(5000);
        assert_eq!(gaps.current_values(output.id()), GapValues::ZERO);
    }

    #[test]
    fn disabled_engine_reports_zero_gaps() {
        let mut gaps = SmartGaps::new();
        gaps.set_enabled(false);
        let (values, profile) = gaps.calculate(&context(3));
        assert_eq!(values, GapValues::ZERO);
        assert!(profile.is_none());
    }
}
