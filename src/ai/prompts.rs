//! Prompt contracts for the vision, synthesis, translation and suggestion calls.
//!
//! The analysis and synthesis prompts share one output format: two labelled
//! sections followed by [`DISCLAIMER`]. [`validate_report`] checks that format
//! before a completion is accepted.

use std::collections::BTreeMap;

use super::client::ChatMessage;

/// Exact reply requested for images that are not medical.
pub const NOT_MEDICAL: &str = "not medical";
pub const DOCTOR_SECTION: &str = "Doctor-Level Explanation";
pub const LAYMAN_SECTION: &str = "Layman-Friendly Explanation";
pub const DISCLAIMER: &str = "This AI-generated analysis is for informational purposes only and must be reviewed by a qualified healthcare professional.";

/// Result of checking a completion against the report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// The model classified the input as non-medical. Final.
    NotMedical,
    /// Output does not follow the format. Worth another attempt.
    Malformed(&'static str),
}

/// System prompt, user instruction and validation rule for one per-image call.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
    pub validate: fn(&str) -> Verdict,
}

impl PromptTemplate {
    pub fn medical_analysis() -> Self {
        Self {
            system: format!(
                "You are an expert medical imaging assistant. You review X-rays, CT scans, MRI scans \
                 and medical reports.\n\
                 First decide whether the image is a recognizable medical image or medical document. \
                 If it is not, reply with exactly: {NOT_MEDICAL}\n\
                 Otherwise reply with exactly two sections:\n\
                 1. **{DOCTOR_SECTION}:** a professional, detailed description for clinicians. State the \
                 modality, body region, orientation and laterality, all findings and abnormalities, \
                 fractures, implants or devices, foreign bodies and technical observations, in formal \
                 medical language as a natural paragraph.\n\
                 2. **{LAYMAN_SECTION}:** the same findings explained simply for the patient, without \
                 medical jargon.\n\
                 Do not invent findings that are not visible. Do not ask questions.\n\
                 End the response with this sentence, verbatim: {DISCLAIMER}"
            ),
            user: "Please analyze this medical image.".to_string(),
            validate: validate_report,
        }
    }

    pub fn messages_for_image(&self, image_b64: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user_with_image(self.user.clone(), image_b64),
        ]
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Check a completion against the two-section report format.
pub fn validate_report(text: &str) -> Verdict {
    let norm = normalize(text);
    if norm.is_empty() {
        return Verdict::Malformed("empty response");
    }
    if norm.contains(NOT_MEDICAL) {
        return Verdict::NotMedical;
    }
    if !norm.contains(&DOCTOR_SECTION.to_lowercase()) {
        return Verdict::Malformed("missing doctor-level section");
    }
    if !norm.contains(&LAYMAN_SECTION.to_lowercase()) {
        return Verdict::Malformed("missing layman section");
    }
    if !norm.contains(&normalize(DISCLAIMER.trim_end_matches('.'))) {
        return Verdict::Malformed("missing disclaimer");
    }
    Verdict::Accept
}

/// Second-pass prompt merging per-image reports. `reports` carries the
/// 1-based input position of each image.
pub fn synthesis_messages(reports: &[(usize, String)]) -> Vec<ChatMessage> {
    let system = format!(
        "You are an expert radiologist combining several imaging reports from the same patient \
         into one consolidated report. Correlate findings across images. Explicitly state the \
         orientation and laterality of each image, incidental findings, the major abnormalities, \
         the presence of any devices or implants, and any inconsistencies between images, \
         referring to images by their labels.\n\
         Reply with exactly two sections:\n\
         1. **{DOCTOR_SECTION}:** the consolidated professional report.\n\
         2. **{LAYMAN_SECTION}:** the consolidated findings in plain language for the patient.\n\
         End the response with this sentence, verbatim: {DISCLAIMER}"
    );

    let mut user = String::from("Individual image reports:\n");
    for (position, report) in reports {
        user.push_str(&format!("\n--- Image {position} ---\n{}\n", report.trim()));
    }
    user.push_str("\nWrite the combined report now.");

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn translation_messages(text: &str, language: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a professional medical translator. Translate the user's text into {language}. \
             Preserve the tone, formatting, section headings and closing disclaimer; translate their \
             wording but keep the structure. Return only the translated text."
        )),
        ChatMessage::user(text),
    ]
}

pub fn suggestion_messages(findings: &BTreeMap<String, f64>) -> anyhow::Result<Vec<ChatMessage>> {
    let data = serde_json::to_string_pretty(findings)?;
    Ok(vec![
        ChatMessage::system(
            "You are an expert medical assistant. Provide accurate, detailed medical analysis.",
        ),
        ChatMessage::user(format!(
            "Given the following filtered X-ray analysis data, generate a structured response with two sections:\n\n\
             1. {DOCTOR_SECTION}: a professional, detailed medical description suitable for doctors, \
             written as a natural paragraph in formal medical language.\n\n\
             2. {LAYMAN_SECTION}: a simple explanation of the same findings for patients, without \
             medical jargon.\n\n\
             Only include findings present in the filtered data. Do not add unrelated abnormalities. \
             Filtered analysis data:\n{data}"
        )),
    ])
}
