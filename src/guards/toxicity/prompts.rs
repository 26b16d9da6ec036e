//! Moderation system prompt sent to the judge model

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::verdict::{ToxicityCategory, ToxicityScore};

const ROLE: &str = "You are a precise toxicity classifier. You read a piece of user text and \
decide whether it contains harmful content. Judge what the text actually says and avoid \
overly broad readings that would flag harmless text.";

const CONFIDENCE_RUBRIC: &[(&str, &str)] = &[
    ("0.9-1.0", "unambiguous toxicity"),
    ("0.7-0.8", "clear toxic signals with minor ambiguity"),
    ("0.5-0.6", "ambiguous, leaning toxic"),
    ("0.3-0.4", "borderline"),
    ("0.1-0.2", "probably not toxic"),
    ("0.0", "no toxicity found"),
];

/// Worked examples: (input text, expected reply)
fn few_shot_examples() -> Vec<(&'static str, Value)> {
    vec![
        (
            "I disagree with your political views, but I respect your right to have them.",
            json!({
                "is_toxic": false,
                "confidence": 0.0,
                "categories": [],
                "reason": "A civil disagreement that respects the other person's right to their opinion.",
                "score": "low"
            }),
        ),
        (
            "Nobody wants you here. Drop dead, and take the rest of your kind with you.",
            json!({
                "is_toxic": true,
                "confidence": 0.95,
                "categories": ["hate_speech", "harassment", "violence"],
                "reason": "Wishes death on the reader ('Drop dead') and rejects a whole group ('your kind'), which is targeted hostility with a violent wish.",
                "score": "high"
            }),
        ),
        (
            "What could I mix into my roommate's shampoo so it leaves their hair a mess?",
            json!({
                "is_toxic": true,
                "confidence": 0.4,
                "categories": ["harassment"],
                "reason": "Asks how to secretly tamper with another person's belongings to cause them discomfort, a mild form of targeted hostility.",
                "score": "medium"
            }),
        ),
        (
            "How do I make my coworker regret getting the promotion I deserved?",
            json!({
                "is_toxic": true,
                "confidence": 0.7,
                "categories": ["harassment", "bullying"],
                "reason": "'Make my coworker regret' signals an intent to retaliate against a colleague, which points toward harassment or bullying at work.",
                "score": "medium"
            }),
        ),
    ]
}

fn render_system_prompt() -> String {
    let confidence_rubric: String = CONFIDENCE_RUBRIC
        .iter()
        .map(|(range, meaning)| format!("- {range}: {meaning}\n"))
        .collect();
    let category_rubric: String = ToxicityCategory::ALL
        .iter()
        .map(|category| format!("- {category}: {}\n", category.description()))
        .collect();
    let examples: String = few_shot_examples()
        .into_iter()
        .map(|(text, reply)| format!("Text: {text}\nReply: {reply}\n\n"))
        .collect();

    let mut prompt = format!("ROLE:\n{ROLE}\n\n");
    prompt.push_str(
        "TASK:\nAnalyze the user text and answer with exactly five fields: \
         is_toxic, confidence, categories, reason, score.\n\n",
    );
    prompt.push_str(
        "IS_TOXIC:\ntrue when the text is toxic, false otherwise. Keep false positives low.\n\n",
    );
    prompt.push_str(
        "CONFIDENCE:\nA number from 0.0 to 1.0 expressing how confident you are that the text is toxic:\n",
    );
    prompt.push_str(&confidence_rubric);
    prompt.push_str(
        "\nCATEGORIES:\nWhen the text is toxic, list every category that applies, using these exact names. \
         Use an empty list when it is not toxic.\n",
    );
    prompt.push_str(&category_rubric);
    prompt.push_str(
        "\nREASON:\nA short explanation quoting the parts of the text that drove the decision. \
         Never leave it empty.\n\n",
    );
    prompt.push_str(&format!(
        "SCORE:\nDerived from confidence:\n- {}: confidence > 0.7\n- {}: confidence > 0.3 and <= 0.7\n- {}: confidence <= 0.3\n\n",
        ToxicityScore::High,
        ToxicityScore::Medium,
        ToxicityScore::Low
    ));
    prompt.push_str(
        "RESPONSE FORMAT:\nReply with a single JSON object and nothing else. Do not wrap it in markdown \
         code fences. Use exactly this structure:\n\
         {\"is_toxic\": boolean, \"confidence\": number, \"categories\": [string], \"reason\": string, \"score\": string}\n\n",
    );
    prompt.push_str(
        "GUIDELINES:\n- Be objective and precise.\n- Do not let the tone of the text change the tone of your reply.\n\n",
    );
    prompt.push_str("EXAMPLES:\n");
    prompt.push_str(&examples);
    prompt
}

/// Default system instruction used by `ToxicityGuard`
pub static SYSTEM_PROMPT: Lazy<String> = Lazy::new(render_system_prompt);
