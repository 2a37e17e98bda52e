//! Model selection and message generation for one release run

use std::time::Duration;

use tracing::debug;

use crate::domain::CommitDraft;
use crate::error::Result;
use crate::git::{ConfigScope, ConfigStore, MODEL_KEY};
use crate::llm::{compose_draft, quick_choices, ModelInfo, TextGenerator};
use crate::ui::{self, Prompter};
use crate::warning::Warning;

/// Generator together with everything a draft is built from
pub struct Composer<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    models: Vec<ModelInfo>,
    fallback: String,
    diff: String,
    timeout: Duration,
}

impl<'a, G: TextGenerator + ?Sized> Composer<'a, G> {
    /// Composer for `generator`, or `None` when it is missing or offers no models
    pub fn new(
        generator: &'a G,
        fallback: impl Into<String>,
        diff: impl Into<String>,
        timeout: Duration,
    ) -> Option<Self> {
        if !generator.is_available() {
            debug!("text generator not available");
            return None;
        }
        let models = match generator.list_models(timeout) {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                debug!("text generator lists no models");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "cannot list models");
                return None;
            }
        };

        Some(Composer {
            generator,
            models,
            fallback: fallback.into(),
            diff: diff.into(),
            timeout,
        })
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Deterministic message used when generation fails
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Ask for a model and remember the choice in repository config
    pub fn select_model<C, P>(&self, config: &mut C, prompter: &mut P) -> Result<ModelInfo>
    where
        C: ConfigStore + ?Sized,
        P: Prompter + ?Sized,
    {
        let saved = config.get_effective(MODEL_KEY)?;
        if let Some(id) = saved.as_deref() {
            if !self.models.iter().any(|m| m.id == id) {
                ui::display_warning(&Warning::SavedModelMissing {
                    model: id.to_string(),
                });
            }
        }

        let quick = quick_choices(&self.models, saved.as_deref());
        let model = match ui::select_model(prompter, &quick, &self.models)? {
            Some(model) => model,
            // quick choices are never empty while models are listed
            None => self.models[0].clone(),
        };

        config.set(ConfigScope::Local, MODEL_KEY, &model.id)?;
        debug!(model = %model.id, "selected model");
        Ok(model)
    }

    /// Draft from `model`, starting over from the fallback message
    pub fn compose(&self, model: &ModelInfo) -> CommitDraft {
        compose_draft(
            self.generator,
            &model.id,
            &self.fallback,
            &self.diff,
            self.timeout,
        )
    }
}
