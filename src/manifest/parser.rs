//! Manifest parsing, validation and merging: reserved-name enforcement and
//! merge semantics over a flat request vocabulary.

use super::model::{Manifest, RequestSpec};
use crate::error::{ErrorCode, JsonRpcError, Result};
use std::collections::HashMap;
use std::path::Path;

fn validation_failed(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError::new(ErrorCode::ValidationFailed, Some(message.into()))
}

/// Built-in request names every server answers itself; a Manifest that
/// declares one of these is rejected with `ValidationFailed` (-32013).
pub const RESERVED_REQUESTS: &[&str] = &["ping", "echo", "get_info", "validate", "slow_process", "manifest"];

pub struct ManifestParser;

impl ManifestParser {
    pub fn from_json(text: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_json::from_str(text)?;
        Self::validate(&manifest)?;
        Ok(manifest)
    }

    pub fn from_yaml(text: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_yaml::from_str(text)?;
        Self::validate(&manifest)?;
        Ok(manifest)
    }

    /// Dispatches on file extension (`.yaml`/`.yml` vs everything else, which
    /// is treated as JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Manifest> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    pub fn to_json(manifest: &Manifest) -> Result<String> {
        Ok(serde_json::to_string_pretty(manifest)?)
    }

    pub fn to_yaml(manifest: &Manifest) -> Result<String> {
        Ok(serde_yaml::to_string(manifest)?)
    }

    /// Reserved-name enforcement and model-reference resolution. Does not
    /// check response *values* against their schemas — that's
    /// [`super::ResponseValidator`]'s job.
    pub fn validate(manifest: &Manifest) -> Result<()> {
        log::debug!(
            "validating manifest '{}' ({} requests)",
            manifest.name.as_deref().unwrap_or(&manifest.version),
            manifest.requests.len()
        );

        if manifest.version.is_empty() {
            return Err(validation_failed("manifest version must not be empty"));
        }

        for name in manifest.requests.keys() {
            if RESERVED_REQUESTS.contains(&name.as_str()) {
                return Err(validation_failed(format!(
                    "request name '{name}' is reserved for a built-in request and cannot be declared in a Manifest"
                )));
            }
            crate::security::SecurityValidator::validate_name(
                name,
                crate::security::NameKind::Request,
                &crate::security::SecurityConfig::default(),
            )?;
        }

        for (name, request) in &manifest.requests {
            match &request.description {
                Some(d) if !d.is_empty() => {}
                _ => {
                    return Err(validation_failed(format!(
                        "request '{name}' must declare a non-empty description"
                    )));
                }
            }
            Self::check_model_refs(&request.response, manifest, name)?;
            Self::check_constraints(&request.response, name)?;
            for (arg_name, arg) in &request.args {
                let arg_path = format!("{name}.{arg_name}");
                Self::check_model_refs(arg, manifest, &arg_path)?;
                Self::check_constraints(arg, &arg_path)?;
            }
        }

        if let Some(models) = &manifest.models {
            for (model_name, model) in models {
                if let Some(parent) = &model.extends {
                    if !models.contains_key(parent) {
                        return Err(validation_failed(format!(
                            "model '{model_name}' extends unknown model '{parent}'"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn check_model_refs(
        arg: &crate::manifest::Argument,
        manifest: &Manifest,
        path: &str,
    ) -> Result<()> {
        if let Some(model_ref) = &arg.model_ref {
            if manifest.model(model_ref).is_none() {
                return Err(validation_failed(format!(
                    "{path} references unknown model '{model_ref}'"
                )));
            }
        }
        if let Some(items) = &arg.items {
            Self::check_model_refs(items, manifest, &format!("{path}[]"))?;
        }
        if let Some(properties) = &arg.properties {
            for (prop_name, prop) in properties {
                Self::check_model_refs(prop, manifest, &format!("{path}.{prop_name}"))?;
            }
        }
        Ok(())
    }

    /// Catches constraint mistakes that would otherwise only surface the
    /// first time a value is checked against this argument: an unparseable
    /// `pattern`, an inverted `minimum`/`maximum` pair, or an inverted
    /// `minLength`/`maxLength` pair. Recurses into `items`/`properties`
    /// the same way [`Self::check_model_refs`] does.
    fn check_constraints(arg: &crate::manifest::Argument, path: &str) -> Result<()> {
        if let Some(pattern) = &arg.pattern {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(validation_failed(format!("{path} has an invalid pattern '{pattern}': {e}")));
            }
        }
        if let (Some(min), Some(max)) = (arg.minimum, arg.maximum) {
            if min > max {
                return Err(validation_failed(format!(
                    "{path} has minimum {min} greater than maximum {max}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (arg.min_length, arg.max_length) {
            if min > max {
                return Err(validation_failed(format!(
                    "{path} has minLength {min} greater than maxLength {max}"
                )));
            }
        }
        if let Some(items) = &arg.items {
            Self::check_constraints(items, &format!("{path}[]"))?;
        }
        if let Some(properties) = &arg.properties {
            for (prop_name, prop) in properties {
                Self::check_constraints(prop, &format!("{path}.{prop_name}"))?;
            }
        }
        Ok(())
    }

    /// Merges `overlay` on top of `base`: overlay requests/models win on name
    /// collision, everything else is a union. Both inputs must already be
    /// individually valid; the merged result is re-validated before return.
    pub fn merge(base: &Manifest, overlay: &Manifest) -> Result<Manifest> {
        let mut requests = base.requests.clone();
        requests.extend(overlay.requests.clone());

        let models = match (&base.models, &overlay.models) {
            (None, None) => None,
            (Some(b), None) => Some(b.clone()),
            (None, Some(o)) => Some(o.clone()),
            (Some(b), Some(o)) => {
                let mut merged = b.clone();
                merged.extend(o.clone());
                Some(merged)
            }
        };

        let merged = Manifest {
            version: overlay.version.clone(),
            name: overlay.name.clone().or_else(|| base.name.clone()),
            description: overlay.description.clone().or_else(|| base.description.clone()),
            requests,
            models,
        };
        Self::validate(&merged)?;
        Ok(merged)
    }

    /// Converts a legacy `channels[*].commands[*]` document into the flat
    /// `requests` vocabulary, stamping each converted [`RequestSpec::channel`]
    /// with its originating channel id. Kept only as a migration path for
    /// documents written against the older shape.
    pub fn from_legacy_channels_json(text: &str) -> Result<Manifest> {
        #[derive(serde::Deserialize)]
        struct LegacyManifest {
            version: String,
            #[serde(default)]
            name: Option<String>,
            #[serde(default)]
            description: Option<String>,
            channels: HashMap<String, LegacyChannel>,
            #[serde(default)]
            models: Option<HashMap<String, super::model::Model>>,
        }

        #[derive(serde::Deserialize)]
        struct LegacyChannel {
            #[serde(default)]
            commands: HashMap<String, RequestSpec>,
        }

        let legacy: LegacyManifest = serde_json::from_str(text)?;
        let mut requests = HashMap::new();
        for (channel_id, channel) in legacy.channels {
            for (command_name, mut spec) in channel.commands {
                spec.channel = Some(channel_id.clone());
                if requests.insert(command_name.clone(), spec).is_some() {
                    return Err(validation_failed(format!(
                        "command '{command_name}' is declared in more than one legacy channel"
                    )));
                }
            }
        }

        let manifest = Manifest {
            version: legacy.version,
            name: legacy.name,
            description: legacy.description,
            requests,
            models: legacy.models,
        };
        Self::validate(&manifest)?;
        Ok(manifest)
    }
}
