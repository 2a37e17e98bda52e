//! Parsing and ranking of the generator's model list

use std::sync::OnceLock;

use regex::Regex;

use super::ModelInfo;

const FAMILY: &str = "gemini";

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\.(\d+)").expect("valid regex"))
}

/// Models from `llm models` output
///
/// Each non-blank line that is not a `Provider:` heading is a model. The id is
/// the text before the first `(`, after its last `:`; lines whose id is empty
/// or contains whitespace or control characters are skipped.
pub fn parse_models(output: &str) -> Vec<ModelInfo> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .filter_map(|line| {
            let core = line.split('(').next().unwrap_or_default().trim();
            let id = core.rsplit(':').next().unwrap_or_default().trim();
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_graphic()) {
                return None;
            }
            Some(ModelInfo {
                id: id.to_string(),
                label: line.to_string(),
            })
        })
        .collect()
}

/// Preference score of a model id; higher is better
pub fn model_score(id: &str) -> u64 {
    let mut score = if id.contains(FAMILY) { 1000 } else { 500 };

    if let Some(caps) = version_pattern().captures(id) {
        let major: u64 = caps[1].parse().unwrap_or(0);
        let minor: u64 = caps[2].parse().unwrap_or(0);
        score += major.saturating_mul(100).saturating_add(minor.saturating_mul(10));
    }
    if id.contains("flash") {
        score += 50;
    }
    if id.contains("lite") || id.contains("mini") {
        score += 30;
    }
    score
}

/// Highest scoring model; the earliest one wins ties
pub fn best_of<'a, I>(models: I) -> Option<&'a ModelInfo>
where
    I: IntoIterator<Item = &'a ModelInfo>,
{
    models.into_iter().fold(None, |best, model| match best {
        Some(current) if model_score(&current.id) >= model_score(&model.id) => Some(current),
        _ => Some(model),
    })
}

/// Up to two models offered before the full list
///
/// The saved model comes first when it is still listed, followed by the best
/// gemini model and the best other model.
pub fn quick_choices(models: &[ModelInfo], saved: Option<&str>) -> Vec<ModelInfo> {
    let saved = saved.and_then(|id| models.iter().find(|m| m.id == id));
    let best_family = best_of(models.iter().filter(|m| m.id.contains(FAMILY)));
    let best_other = best_of(models.iter().filter(|m| !m.id.contains(FAMILY)));

    let mut choices: Vec<ModelInfo> = Vec::new();
    for model in [saved, best_family, best_other].into_iter().flatten() {
        if !choices.contains(model) {
            choices.push(model.clone());
        }
    }
    choices.truncate(2);
    choices
}
