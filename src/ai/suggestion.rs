use std::{collections::BTreeMap, time::Duration};

use tracing::debug;

use super::{
    client::{with_timeout, ChatClient, ClassifierReport, ProviderError},
    prompts::suggestion_messages,
};

/// Minimum probability for a finding to be reported.
pub const THRESHOLD: f64 = 0.6;

pub const CLINICALLY_RELEVANT: &[&str] = &[
    "Consolidation",
    "Atelectasis",
    "Infiltration",
    "Pneumonia",
    "Effusion",
    "Lung Opacity",
    "Fracture",
];

pub fn relevant_findings(report: &ClassifierReport) -> BTreeMap<String, f64> {
    report
        .probabilities
        .iter()
        .filter(|(label, p)| **p >= THRESHOLD && CLINICALLY_RELEVANT.contains(&label.as_str()))
        .map(|(label, p)| (label.clone(), *p))
        .collect()
}

/// Ask the chat model to explain the classifier's relevant findings.
pub async fn generate_suggestion(
    client: &dyn ChatClient,
    report: &ClassifierReport,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let findings = relevant_findings(report);
    debug!(findings = findings.len(), "generating suggestion");
    let messages = suggestion_messages(&findings).map_err(|e| ProviderError::Decode(e.to_string()))?;
    with_timeout(timeout, client.complete(&messages)).await
}
