//! Hand-authored prompt library
//!
//! Static data only: the catalog prompts, the per-category phase 1 and
//! phase 2 lists, stage 1 scaffolding examples, and the built-in defaults
//! used when nothing else matches.

use super::catalog::{FocusType, Prompt, PromptMode, PromptType, Tier};
use crate::types::Category;

use FocusType::*;
use PromptMode::{Capture, Either, Synthesis};
use PromptType::*;

pub static PROMPTS: &[Prompt] = &[
    // Orientation
    Prompt::new("orient-breath", Capture, Orientation,
        "Before you write, take one slow breath and picture where you were."),
    Prompt::new("orient-replay", Capture, Orientation,
        "Replay the moment once in your head, like rewinding a short clip."),
    Prompt::new("orient-zoom", Capture, Orientation,
        "Pick the single minute of today you remember most sharply.")
        .focus(Sequence),
    Prompt::new("orient-lookback", Synthesis, Orientation,
        "Read back over what you captured. Don't change anything yet."),
    Prompt::new("orient-distance", Synthesis, Orientation,
        "Imagine reading this entry a year from now. What stands out?")
        .min_stage(2),
    Prompt::new("orient-snack", Either, Orientation,
        "Grab a snack if you need one. Reflection runs on crackers too.")
        .humor(),

    // Primary capture
    Prompt::new("cap-sense", Capture, Primary,
        "What did you see, hear, or smell in that moment?")
        .focus(Sensory).tier(Tier::Quick),
    Prompt::new("cap-sense-deep", Capture, Primary,
        "Walk through the scene one sense at a time: sight, sound, smell, touch.")
        .focus(Sensory).tier(Tier::Deep)
        .follow_up("Which sense carried the most of the moment?"),
    Prompt::new("cap-words", Capture, Primary,
        "Write down one thing someone said, as close to word for word as you can.")
        .focus(Dialogue)
        .follow_up("How did they say it?"),
    Prompt::new("cap-words-exchange", Capture, Primary,
        "Reconstruct a short exchange: who spoke first, and what came back?")
        .focus(Dialogue).tier(Tier::Deep).min_stage(2),
    Prompt::new("cap-actions", Capture, Primary,
        "What did people do with their hands, faces, or bodies?")
        .focus(Behavior),
    Prompt::new("cap-setting", Capture, Primary,
        "Describe the place as if sketching it for someone who has never been there.")
        .focus(Setting).tier(Tier::Standard),
    Prompt::new("cap-sequence", Capture, Primary,
        "What happened first, next, and last?")
        .focus(Sequence).tier(Tier::Quick),
    Prompt::new("cap-general", Capture, Primary,
        "Describe what happened, sticking to what a camera would have recorded."),
    Prompt::new("cap-detail", Capture, Primary,
        "Name one small detail nobody else would have noticed.")
        .tier(Tier::Standard),
    Prompt::new("cap-pigeon", Capture, Primary,
        "Describe the scene as an extremely nosy pigeon would report it.")
        .humor(),

    // Primary synthesis
    Prompt::new("syn-meaning", Synthesis, Primary,
        "Looking at what you wrote, what does it tell you about what matters to you?"),
    Prompt::new("syn-cause", Synthesis, Primary,
        "What led to this moment? Trace one cause back a step or two.")
        .focus(Cause).min_stage(2),
    Prompt::new("syn-feeling", Synthesis, Primary,
        "What did you feel, and which observed detail set it off?")
        .focus(Emotion),
    Prompt::new("syn-perspective", Synthesis, Primary,
        "How might the other person describe the same moment?")
        .focus(Perspective).min_stage(3)
        .follow_up("What might they have noticed that you didn't?"),
    Prompt::new("syn-pattern", Synthesis, Primary,
        "Have you been here before? What repeats?")
        .focus(Pattern).tier(Tier::Deep).min_stage(3),
    Prompt::new("syn-quick", Synthesis, Primary,
        "In one sentence: why did this stick with you?")
        .tier(Tier::Quick),
    Prompt::new("syn-advice", Synthesis, Primary,
        "If a friend had lived this moment, what would you tell them?")
        .tier(Tier::Standard),

    // Capture quality nudges
    Prompt::new("cq-sensory", Capture, CaptureQuality,
        "Add one sensory detail: a sound, a texture, a smell.")
        .focus(Sensory),
    Prompt::new("cq-verbatim", Capture, CaptureQuality,
        "Try quoting someone directly instead of summarizing what they meant.")
        .focus(Dialogue),
    Prompt::new("cq-behavior", Capture, CaptureQuality,
        "Swap one feeling word for what you saw someone do.")
        .focus(Behavior),
    Prompt::new("cq-specific", Capture, CaptureQuality,
        "Replace one general word with a specific one. Not 'food' but 'cold lentil soup'."),

    // Lens progression
    Prompt::new("lens-cause", Synthesis, LensProgression,
        "Reread your entry and underline every 'because'. What's missing?")
        .focus(Cause).min_stage(2),
    Prompt::new("lens-other", Synthesis, LensProgression,
        "Rewrite one sentence from the other person's point of view.")
        .focus(Perspective).min_stage(3),
    Prompt::new("lens-time", Synthesis, LensProgression,
        "How would you have read this moment five years ago?")
        .focus(Pattern).min_stage(3),
    Prompt::new("lens-body", Synthesis, LensProgression,
        "Look at the entry only for what your body did. What does it say?")
        .focus(Behavior),

    // Voice expansion
    Prompt::new("voice-quote", Either, VoiceExpansion,
        "Whose voice is missing from this entry? Give them one line."),
    Prompt::new("voice-bystander", Either, VoiceExpansion,
        "Who else was nearby? What would they say happened?")
        .min_stage(2),
    Prompt::new("voice-self", Synthesis, VoiceExpansion,
        "Write one line in the voice of you from yesterday.")
        .min_stage(3),

    // Refinement
    Prompt::new("ref-trim", Either, Refinement,
        "Cut one sentence that explains instead of shows."),
    Prompt::new("ref-first-line", Capture, Refinement,
        "Rewrite your first sentence so it starts in the middle of the action."),
    Prompt::new("ref-claim", Synthesis, Refinement,
        "Find your biggest claim. Point to the detail that supports it.")
        .min_stage(2),
    Prompt::new("ref-title", Either, Refinement,
        "Give this entry a title a tabloid would be proud of.")
        .humor(),

    // Aggregation
    Prompt::new("agg-week", Synthesis, Aggregation,
        "Across this week's entries, which person shows up most?")
        .tier(Tier::Quick),
    Prompt::new("agg-thread", Synthesis, Aggregation,
        "Pick two entries that seem unrelated. What connects them?")
        .tier(Tier::Standard).min_stage(2),
    Prompt::new("agg-shift", Synthesis, Aggregation,
        "Compare your oldest and newest entries. What do you notice differently now?")
        .tier(Tier::Deep).min_stage(3),
];

static DEFAULT_ORIENTATION: Prompt = Prompt::new("default-orientation", Either, Orientation,
    "Take a moment to settle in before you begin.");
static DEFAULT_PRIMARY: Prompt = Prompt::new("default-primary", Either, Primary,
    "What happened today that you'd like to remember?");
static DEFAULT_CAPTURE_QUALITY: Prompt = Prompt::new("default-capture-quality", Either, CaptureQuality,
    "Add one more concrete detail to what you wrote.");
static DEFAULT_LENS: Prompt = Prompt::new("default-lens-progression", Either, LensProgression,
    "Read your entry again and look for something you missed.");
static DEFAULT_VOICE: Prompt = Prompt::new("default-voice-expansion", Either, VoiceExpansion,
    "Who else was part of this moment?");
static DEFAULT_REFINEMENT: Prompt = Prompt::new("default-refinement", Either, Refinement,
    "Is there one sentence you would write differently?");
static DEFAULT_AGGREGATION: Prompt = Prompt::new("default-aggregation", Either, Aggregation,
    "Look back across your recent entries. What stands out?");

/// Built-in prompt used when no catalog prompt of `kind` exists
pub fn default_prompt(kind: PromptType) -> Prompt {
    match kind {
        Orientation => DEFAULT_ORIENTATION.clone(),
        Primary => DEFAULT_PRIMARY.clone(),
        CaptureQuality => DEFAULT_CAPTURE_QUALITY.clone(),
        LensProgression => DEFAULT_LENS.clone(),
        VoiceExpansion => DEFAULT_VOICE.clone(),
        Refinement => DEFAULT_REFINEMENT.clone(),
        Aggregation => DEFAULT_AGGREGATION.clone(),
    }
}

/// Phase 1 "what happened" prompts for a category
pub fn phase1_prompts(category: Category) -> &'static [&'static str] {
    match category {
        Category::Person => &[
            "Think of someone you saw today. What were they doing when you noticed them?",
            "Describe someone you spent time with today, starting with how they looked.",
            "Who did you cross paths with today? Capture one thing they did.",
        ],
        Category::Place => &[
            "Where did you spend the most time today? Describe what surrounded you.",
            "Pick a place you passed through today. What did it sound like?",
            "Describe a spot you were in today as if you were standing there again.",
        ],
        Category::Conversation => &[
            "Recall a conversation from today. What exactly was said?",
            "Write down a short exchange you had today, line by line.",
            "What's one thing someone told you today? Use their words.",
        ],
        Category::Object => &[
            "Pick an object you handled today. Describe it closely.",
            "What's something you used today without thinking about it? Look at it now.",
            "Describe an object that caught your eye today.",
        ],
        Category::Moment => &[
            "Capture a single moment from today, a few seconds long.",
            "What's one moment from today you could replay in detail?",
            "Describe the moment today when something changed, even slightly.",
        ],
        Category::Routine => &[
            "Walk through something you do every day, step by step, as it went today.",
            "Describe part of your routine today. What was different this time?",
            "Pick a habit you repeated today. What did it actually look like?",
        ],
    }
}

/// Phase 2 "what does it mean" prompts for a category
pub fn phase2_prompts(category: Category) -> &'static [&'static str] {
    match category {
        Category::Person => &[
            "What does this tell you about your relationship with them?",
            "Why do you think this person stood out today?",
            "What might they have been thinking in that moment?",
        ],
        Category::Place => &[
            "How did this place affect your mood?",
            "Why does this place matter to you, or not?",
            "What would you change about being there?",
        ],
        Category::Conversation => &[
            "What was really being said underneath the words?",
            "Why do you think this conversation stayed with you?",
            "What would you say differently now?",
        ],
        Category::Object => &[
            "What role does this object play in your life?",
            "Why do you think you noticed it today?",
            "What would be different without it?",
        ],
        Category::Moment => &[
            "Why did this moment matter?",
            "What led up to this moment?",
            "What did this moment show you about yourself?",
        ],
        Category::Routine => &[
            "What does this routine give you?",
            "Why do you keep doing it this way?",
            "What would happen if you changed one step?",
        ],
    }
}

/// Worked example appended to phase 1 prompts at stage 1
pub fn scaffolding_example(category: Category) -> &'static str {
    match category {
        Category::Person => "For example: \"My neighbor was kneeling by her gate, pulling weeds with one glove on.\"",
        Category::Place => "For example: \"The café was loud, the espresso machine hissed every minute, and the window was fogged.\"",
        Category::Conversation => "For example: \"He said, 'I'll call you after six,' and tapped the table twice.\"",
        Category::Object => "For example: \"My mug has a chip on the handle and a faded blue stripe around the rim.\"",
        Category::Moment => "For example: \"The bus doors closed just as I reached them, and the driver shrugged.\"",
        Category::Routine => "For example: \"I filled the kettle, checked my phone, then forgot the kettle for ten minutes.\"",
    }
}

/// The single phase 2 question offered at stage 3
pub const STAGE_THREE_PHASE2: &str = "What does this mean to you?";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let mut seen = HashSet::new();
        for prompt in PROMPTS {
            assert!(seen.insert(prompt.id), "duplicate prompt id {}", prompt.id);
        }
    }

    #[test]
    fn test_every_category_has_phase_lists() {
        for category in Category::ALL {
            assert!(!phase1_prompts(category).is_empty());
            assert!(!phase2_prompts(category).is_empty());
            assert!(!scaffolding_example(category).is_empty());
        }
    }

    #[test]
    fn test_stage_gates_in_range() {
        for prompt in PROMPTS {
            if let Some(stage) = prompt.stage {
                assert!((1..=4).contains(&stage), "{} has stage {}", prompt.id, stage);
            }
        }
    }
}
