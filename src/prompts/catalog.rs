//! Prompt catalog - hand-authored prompts with filtered selection
//!
//! Every accessor narrows candidates through a fixed filter order, never
//! narrowing to an empty set, and always ends with a usable prompt: an
//! empty catalog yields the built-in default for the requested type.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::library;
use crate::progression::Stage;

/// Chance of offering a humorous prompt when one is available
pub const DEFAULT_HUMOR_PROBABILITY: f64 = 0.15;

/// Whether a prompt asks for observation, interpretation, or either
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    Capture,
    Synthesis,
    Either,
}

impl PromptMode {
    fn accepts(&self, requested: PromptMode) -> bool {
        *self == requested || *self == PromptMode::Either || requested == PromptMode::Either
    }
}

/// The job a prompt does in the reflection flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    Orientation,
    Primary,
    CaptureQuality,
    LensProgression,
    VoiceExpansion,
    Refinement,
    Aggregation,
}

/// How much effort a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Quick,
    Standard,
    Deep,
}

/// The aspect of an experience a prompt points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusType {
    Sensory,
    Dialogue,
    Behavior,
    Setting,
    Sequence,
    Emotion,
    Cause,
    Perspective,
    Pattern,
}

/// An immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub id: &'static str,
    pub mode: PromptMode,
    #[serde(rename = "type")]
    pub kind: PromptType,
    pub tier: Option<Tier>,
    pub focus: Option<FocusType>,
    /// Lowest stage the prompt is offered at
    pub stage: Option<u8>,
    pub text: &'static str,
    pub follow_up: Option<&'static str>,
    pub is_humor: bool,
}

impl Prompt {
    pub const fn new(id: &'static str, mode: PromptMode, kind: PromptType, text: &'static str) -> Self {
        Self {
            id,
            mode,
            kind,
            tier: None,
            focus: None,
            stage: None,
            text,
            follow_up: None,
            is_humor: false,
        }
    }

    pub const fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub const fn focus(mut self, focus: FocusType) -> Self {
        self.focus = Some(focus);
        self
    }

    pub const fn min_stage(mut self, stage: u8) -> Self {
        self.stage = Some(stage);
        self
    }

    pub const fn follow_up(mut self, follow_up: &'static str) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    pub const fn humor(mut self) -> Self {
        self.is_humor = true;
        self
    }
}

/// Selection criteria for one accessor call
#[derive(Debug, Clone, Copy)]
pub struct PromptQuery {
    pub kind: PromptType,
    pub mode: PromptMode,
    pub focus: Option<FocusType>,
    pub tier: Option<Tier>,
    pub stage: Stage,
}

impl PromptQuery {
    pub fn new(kind: PromptType, mode: PromptMode, stage: Stage) -> Self {
        Self { kind, mode, focus: None, tier: None, stage }
    }

    pub fn with_focus(mut self, focus: Option<FocusType>) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_tier(mut self, tier: Option<Tier>) -> Self {
        self.tier = tier;
        self
    }
}

/// Keep only the candidates matching `keep`, unless none would remain
fn narrow<'a>(candidates: Vec<&'a Prompt>, keep: impl Fn(&Prompt) -> bool) -> Vec<&'a Prompt> {
    let narrowed: Vec<&Prompt> = candidates.iter().copied().filter(|p| keep(*p)).collect();
    if narrowed.is_empty() {
        candidates
    } else {
        narrowed
    }
}

/// Fixed set of prompts, loaded once
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Vec<Prompt>,
    humor_probability: f64,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptCatalog {
    /// Catalog with the hand-authored prompt library
    pub fn builtin() -> Self {
        Self::new(library::PROMPTS.to_vec())
    }

    /// Catalog over an arbitrary prompt set
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts,
            humor_probability: DEFAULT_HUMOR_PROBABILITY,
        }
    }

    /// Catalog with no prompts; every accessor yields its default
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_humor_probability(mut self, probability: f64) -> Self {
        self.humor_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Candidates for `query` after all narrowing filters
    fn candidates(&self, query: &PromptQuery) -> Vec<&Prompt> {
        let mut candidates: Vec<&Prompt> = self
            .prompts
            .iter()
            .filter(|p| p.kind == query.kind && p.mode.accepts(query.mode))
            .collect();

        if let Some(focus) = query.focus {
            candidates = narrow(candidates, |p| p.focus == Some(focus));
        }
        if let Some(tier) = query.tier {
            candidates = narrow(candidates, |p| p.tier.is_none() || p.tier == Some(tier));
        }
        let stage = query.stage.number();
        narrow(candidates, |p| p.stage.map_or(true, |min| min <= stage))
    }

    /// Pick a prompt for `query`. Never fails.
    pub fn select<R: Rng + ?Sized>(&self, query: &PromptQuery, rng: &mut R) -> Prompt {
        let candidates = self.candidates(query);

        let (humorous, plain): (Vec<&Prompt>, Vec<&Prompt>) =
            candidates.iter().copied().partition(|p| p.is_humor);

        if rng.random::<f64>() < self.humor_probability {
            if let Some(prompt) = humorous.choose(rng) {
                debug!("Selected humor prompt {}", prompt.id);
                return (*prompt).clone();
            }
        }

        plain
            .choose(rng)
            .or_else(|| candidates.choose(rng))
            .map(|p| (*p).clone())
            .unwrap_or_else(|| {
                debug!("No catalog prompt for {:?}, using default", query.kind);
                library::default_prompt(query.kind)
            })
    }

    /// Observation prompt for the capture phase
    pub fn capture_prompt<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        tier: Option<Tier>,
        focus: Option<FocusType>,
        rng: &mut R,
    ) -> Prompt {
        let query = PromptQuery::new(PromptType::Primary, PromptMode::Capture, stage)
            .with_tier(tier)
            .with_focus(focus);
        self.select(&query, rng)
    }

    /// Interpretation prompt for the synthesis phase
    pub fn synthesis_prompt<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        tier: Option<Tier>,
        focus: Option<FocusType>,
        rng: &mut R,
    ) -> Prompt {
        let query = PromptQuery::new(PromptType::Primary, PromptMode::Synthesis, stage)
            .with_tier(tier)
            .with_focus(focus);
        self.select(&query, rng)
    }

    /// Short settling-in prompt shown before writing
    pub fn orientation_prompt<R: Rng + ?Sized>(&self, mode: PromptMode, stage: Stage, rng: &mut R) -> Prompt {
        self.select(&PromptQuery::new(PromptType::Orientation, mode, stage), rng)
    }

    /// Nudge toward a better capture, aimed at a weak aspect
    pub fn capture_quality_prompt<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        focus: Option<FocusType>,
        rng: &mut R,
    ) -> Prompt {
        let query = PromptQuery::new(PromptType::CaptureQuality, PromptMode::Capture, stage)
            .with_focus(focus);
        self.select(&query, rng)
    }

    /// Invitation to view an entry through a new lens
    pub fn lens_progression_prompt<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        focus: Option<FocusType>,
        rng: &mut R,
    ) -> Prompt {
        let query = PromptQuery::new(PromptType::LensProgression, PromptMode::Synthesis, stage)
            .with_focus(focus);
        self.select(&query, rng)
    }

    /// Prompt to bring other people's voices into an entry
    pub fn voice_expansion_prompt<R: Rng + ?Sized>(&self, stage: Stage, rng: &mut R) -> Prompt {
        self.select(
            &PromptQuery::new(PromptType::VoiceExpansion, PromptMode::Either, stage),
            rng,
        )
    }

    /// Prompt to revise or sharpen an existing entry
    pub fn refinement_prompt<R: Rng + ?Sized>(&self, mode: PromptMode, stage: Stage, rng: &mut R) -> Prompt {
        self.select(&PromptQuery::new(PromptType::Refinement, mode, stage), rng)
    }

    /// Prompt to look across several entries at once
    pub fn aggregation_prompt<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        tier: Option<Tier>,
        rng: &mut R,
    ) -> Prompt {
        let query = PromptQuery::new(PromptType::Aggregation, PromptMode::Synthesis, stage)
            .with_tier(tier);
        self.select(&query, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL_TYPES: [PromptType; 7] = [
        PromptType::Orientation,
        PromptType::Primary,
        PromptType::CaptureQuality,
        PromptType::LensProgression,
        PromptType::VoiceExpansion,
        PromptType::Refinement,
        PromptType::Aggregation,
    ];

    fn stage(n: u8) -> Stage {
        Stage::new(n).unwrap()
    }

    #[test]
    fn test_builtin_covers_every_type() {
        let catalog = PromptCatalog::builtin();
        for kind in ALL_TYPES {
            assert!(
                catalog.prompts.iter().any(|p| p.kind == kind),
                "no builtin prompt for {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_empty_catalog_yields_defaults() {
        let catalog = PromptCatalog::empty();
        let mut rng = StdRng::seed_from_u64(1);
        for kind in ALL_TYPES {
            for mode in [PromptMode::Capture, PromptMode::Synthesis, PromptMode::Either] {
                let prompt = catalog.select(&PromptQuery::new(kind, mode, Stage::FIRST), &mut rng);
                assert_eq!(prompt.kind, kind);
                assert!(!prompt.text.is_empty());
                assert!(prompt.id.starts_with("default-"));
            }
        }
    }

    /// Each named accessor paired with the kind and mode it asks for
    fn named_accessors(catalog: &PromptCatalog, n: u8, rng: &mut StdRng) -> Vec<(PromptType, PromptMode, Prompt)> {
        let stage = stage(n);
        vec![
            (PromptType::Orientation, PromptMode::Capture, catalog.orientation_prompt(PromptMode::Capture, stage, rng)),
            (PromptType::Primary, PromptMode::Capture, catalog.capture_prompt(stage, None, None, rng)),
            (PromptType::Primary, PromptMode::Synthesis, catalog.synthesis_prompt(stage, None, None, rng)),
            (
                PromptType::CaptureQuality,
                PromptMode::Capture,
                catalog.capture_quality_prompt(stage, Some(FocusType::Sensory), rng),
            ),
            (
                PromptType::LensProgression,
                PromptMode::Synthesis,
                catalog.lens_progression_prompt(stage, Some(FocusType::Perspective), rng),
            ),
            (PromptType::VoiceExpansion, PromptMode::Either, catalog.voice_expansion_prompt(stage, rng)),
            (PromptType::Refinement, PromptMode::Synthesis, catalog.refinement_prompt(PromptMode::Synthesis, stage, rng)),
            (PromptType::Aggregation, PromptMode::Synthesis, catalog.aggregation_prompt(stage, Some(Tier::Deep), rng)),
        ]
    }

    #[test]
    fn test_named_accessors_fall_back_to_defaults() {
        let catalog = PromptCatalog::empty();
        let mut rng = StdRng::seed_from_u64(11);
        for n in 1..=4 {
            for (kind, _, prompt) in named_accessors(&catalog, n, &mut rng) {
                assert_eq!(prompt, library::default_prompt(kind), "stage {} {:?}", n, kind);
            }
        }
    }

    #[test]
    fn test_named_accessors_respect_kind_and_mode() {
        let catalog = PromptCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(12);
        for n in 1..=4 {
            for (kind, mode, prompt) in named_accessors(&catalog, n, &mut rng) {
                assert_eq!(prompt.kind, kind);
                assert!(prompt.mode.accepts(mode), "{} does not fit {:?}", prompt.id, mode);
            }
        }
    }

    #[test]
    fn test_every_query_combination_returns_prompt() {
        let catalog = PromptCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let tiers = [None, Some(Tier::Quick), Some(Tier::Standard), Some(Tier::Deep)];
        let focuses = [None, Some(FocusType::Sensory), Some(FocusType::Perspective), Some(FocusType::Pattern)];
        for kind in ALL_TYPES {
            for mode in [PromptMode::Capture, PromptMode::Synthesis, PromptMode::Either] {
                for tier in tiers {
                    for focus in focuses {
                        for n in 1..=4 {
                            let query = PromptQuery::new(kind, mode, stage(n))
                                .with_tier(tier)
                                .with_focus(focus);
                            let prompt = catalog.select(&query, &mut rng);
                            assert!(!prompt.text.is_empty());
                            assert_eq!(prompt.kind, kind);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_stage_gate_excludes_advanced_prompts() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("basic", PromptMode::Capture, PromptType::Primary, "basic"),
            Prompt::new("adv", PromptMode::Capture, PromptType::Primary, "advanced").min_stage(3),
        ])
        .with_humor_probability(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(catalog.capture_prompt(stage(2), None, None, &mut rng).id, "basic");
        }
    }

    #[test]
    fn test_stage_gate_never_empties_candidates() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("adv", PromptMode::Capture, PromptType::Primary, "advanced").min_stage(4),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(catalog.capture_prompt(Stage::FIRST, None, None, &mut rng).id, "adv");
    }

    #[test]
    fn test_focus_and_tier_narrow() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("a", PromptMode::Capture, PromptType::Primary, "a").focus(FocusType::Dialogue),
            Prompt::new("b", PromptMode::Capture, PromptType::Primary, "b").focus(FocusType::Sensory).tier(Tier::Deep),
            Prompt::new("c", PromptMode::Capture, PromptType::Primary, "c").focus(FocusType::Sensory).tier(Tier::Quick),
        ])
        .with_humor_probability(0.0);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let prompt = catalog.capture_prompt(Stage::FIRST, Some(Tier::Quick), Some(FocusType::Sensory), &mut rng);
            assert_eq!(prompt.id, "c");
        }
    }

    #[test]
    fn test_untiered_prompts_pass_tier_filter() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("any", PromptMode::Capture, PromptType::Primary, "any"),
            Prompt::new("deep", PromptMode::Capture, PromptType::Primary, "deep").tier(Tier::Deep),
        ])
        .with_humor_probability(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(catalog.capture_prompt(Stage::FIRST, Some(Tier::Quick), None, &mut rng).id, "any");
        }
    }

    #[test]
    fn test_humor_rate() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("plain", PromptMode::Capture, PromptType::Primary, "plain"),
            Prompt::new("funny", PromptMode::Capture, PromptType::Primary, "funny").humor(),
        ]);
        let mut rng = StdRng::seed_from_u64(99);
        let trials = 10_000;
        let funny = (0..trials)
            .filter(|_| catalog.capture_prompt(Stage::FIRST, None, None, &mut rng).is_humor)
            .count();
        let rate = funny as f64 / trials as f64;
        assert!((rate - DEFAULT_HUMOR_PROBABILITY).abs() < 0.02, "humor rate {}", rate);
    }

    #[test]
    fn test_humor_only_catalog_still_returns() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("funny", PromptMode::Capture, PromptType::Primary, "funny").humor(),
        ])
        .with_humor_probability(0.0);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(catalog.capture_prompt(Stage::FIRST, None, None, &mut rng).id, "funny");
    }

    #[test]
    fn test_either_mode_serves_both() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("both", PromptMode::Either, PromptType::Refinement, "both"),
        ]);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(catalog.refinement_prompt(PromptMode::Capture, Stage::FIRST, &mut rng).id, "both");
        assert_eq!(catalog.refinement_prompt(PromptMode::Synthesis, Stage::FIRST, &mut rng).id, "both");
    }

    #[test]
    fn test_mode_filter_is_mandatory() {
        let catalog = PromptCatalog::new(vec![
            Prompt::new("cap", PromptMode::Capture, PromptType::Primary, "cap"),
        ]);
        let mut rng = StdRng::seed_from_u64(4);
        let prompt = catalog.synthesis_prompt(Stage::FIRST, None, None, &mut rng);
        assert_eq!(prompt.id, "default-primary");
    }
}
