//! What gets sent to the estimation service.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use super::error::EstimateError;

/// Largest image accepted for upload.
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// A photo of the meal, validated before any request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    mime: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Wraps raw image bytes. Fails on non-image MIME types and oversized
    /// payloads.
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Result<Self, EstimateError> {
        let mime = mime.into().trim().to_ascii_lowercase();
        check_mime(&mime)?;
        check_size(bytes.len() as u64)?;
        if bytes.is_empty() {
            return Err(EstimateError::InvalidAttachment("image is empty".into()));
        }
        Ok(Self { mime, bytes })
    }

    /// Reads an image from disk, inferring its MIME type from the extension.
    ///
    /// The size is checked from file metadata before the file is read.
    pub fn from_path(path: &Path) -> Result<Self, EstimateError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let mime = mime_from_ext(ext).ok_or_else(|| {
            EstimateError::InvalidAttachment(format!(
                "{} is not a supported image (jpg, png, webp, gif, heic)",
                path.display()
            ))
        })?;

        let unreadable =
            |e: std::io::Error| EstimateError::InvalidAttachment(format!("{}: {}", path.display(), e));
        let metadata = fs::metadata(path).map_err(unreadable)?;
        check_size(metadata.len())?;
        let bytes = fs::read(path).map_err(unreadable)?;

        Self::new(bytes, mime)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>` form used in vision requests.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn check_mime(mime: &str) -> Result<(), EstimateError> {
    match mime.strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() => Ok(()),
        _ => Err(EstimateError::InvalidAttachment(format!(
            "expected an image, got '{}'",
            mime
        ))),
    }
}

fn check_size(len: u64) -> Result<(), EstimateError> {
    if len > MAX_ATTACHMENT_BYTES {
        return Err(EstimateError::InvalidAttachment(format!(
            "image is {:.1} MB, the limit is 20 MB",
            len as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(())
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// A quick-tracked preset eaten earlier on the same day.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetUsage {
    pub name: String,
    pub quantity: u32,
    pub calories_per_unit: u32,
    pub unit: String,
}

/// An entry already logged on the same day.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorEntry {
    pub description: String,
    pub total_calories: u32,
}

/// A meal or activity to estimate, plus what has been logged so far today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateRequest {
    description: Option<String>,
    attachment: Option<Attachment>,
    presets: Vec<PresetUsage>,
    prior_entries: Vec<PriorEntry>,
}

impl EstimateRequest {
    pub fn new(description: Option<String>) -> Self {
        Self {
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_presets(mut self, presets: Vec<PresetUsage>) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_prior_entries(mut self, prior_entries: Vec<PriorEntry>) -> Self {
        self.prior_entries = prior_entries;
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn presets(&self) -> &[PresetUsage] {
        &self.presets
    }

    pub fn prior_entries(&self) -> &[PriorEntry] {
        &self.prior_entries
    }

    /// Text and image are both absent.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.attachment.is_none()
    }

    /// The user message: today's context, the thing to estimate, and the
    /// exact JSON shape expected back.
    pub fn user_prompt(&self) -> String {
        let mut prompt = String::from(
            "Estimate the calories and macronutrients for the following. \
             Be realistic and accurate. Use standard Indian/international portion sizes. \
             If it describes physical activity, set \"kind\" to \"exercise\" and estimate \
             the calories burned; otherwise set it to \"food\".\n\n",
        );

        prompt.push_str("PREVIOUSLY EATEN TODAY:\n");
        if self.prior_entries.is_empty() {
            prompt.push_str("None yet today.\n");
        } else {
            for (i, entry) in self.prior_entries.iter().enumerate() {
                let _ = writeln!(
                    prompt,
                    "{}. {} - {} kcal",
                    i + 1,
                    entry.description,
                    entry.total_calories
                );
            }
        }

        prompt.push_str("\nQUICK-TRACKED ITEMS TODAY:\n");
        let tracked: Vec<_> = self.presets.iter().filter(|p| p.quantity > 0).collect();
        if tracked.is_empty() {
            prompt.push_str("None.\n");
        } else {
            for p in tracked {
                let _ = writeln!(
                    prompt,
                    "{}: {} {}(s) x {} kcal each = {} kcal",
                    p.name,
                    p.quantity,
                    p.unit,
                    p.calories_per_unit,
                    u64::from(p.quantity) * u64::from(p.calories_per_unit)
                );
            }
        }

        match &self.description {
            Some(text) => {
                let _ = writeln!(prompt, "\nNEW ITEM TO ESTIMATE: \"{}\"", text);
                if self.attachment.is_some() {
                    prompt.push_str("A photo of it is attached.\n");
                }
            }
            None => prompt.push_str("\nNEW ITEM TO ESTIMATE: the meal in the attached photo.\n"),
        }

        prompt.push_str(RESPONSE_FORMAT);
        prompt
    }
}

pub(crate) const SYSTEM_PROMPT: &str = "You are a nutrition expert AI. You estimate calories \
     and macronutrients from food descriptions and photos, and calories burned from exercise \
     descriptions, accurately. Always respond with valid JSON only, no markdown formatting, \
     no code blocks.";

const RESPONSE_FORMAT: &str = r#"
You MUST respond ONLY with valid JSON, no extra text. Use this exact format:
{
  "kind": "food" | "exercise",
  "totalCalories": <number>,
  "totalProtein": <grams>,
  "totalCarbs": <grams>,
  "totalFats": <grams>,
  "totalFiber": <grams>,
  "items": [{"name": "<item name>", "calories": <number>, "protein": <grams>, "carbs": <grams>, "fats": <grams>, "fiber": <grams>}],
  "explanation": "<brief 1-2 sentence reasoning>"
}"#;

/// Prompt asking for the calories in one unit of a food.
pub(crate) fn preset_calorie_prompt(name: &str, unit: &str) -> String {
    format!(
        "How many calories are in 1 {} of {}? Use standard Indian/international portion \
         sizes. Respond ONLY with a JSON object: {{\"calories\": <number>, \"note\": \"<brief note>\"}}",
        unit, name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::Builder;

    #[test]
    fn test_attachment_rejects_non_image() {
        let err = Attachment::new(vec![1, 2, 3], "application/pdf").unwrap_err();
        assert!(matches!(err, EstimateError::InvalidAttachment(_)));
        assert!(Attachment::new(vec![1], "image/").is_err());
    }

    #[test]
    fn test_attachment_size_limit() {
        let at_limit = vec![0u8; MAX_ATTACHMENT_BYTES as usize];
        assert!(Attachment::new(at_limit, "image/png").is_ok());

        let over = vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1];
        let err = Attachment::new(over, "image/png").unwrap_err();
        assert!(matches!(err, EstimateError::InvalidAttachment(_)));
    }

    #[test]
    fn test_attachment_rejects_empty() {
        assert!(Attachment::new(Vec::new(), "image/jpeg").is_err());
    }

    #[test]
    fn test_data_url() {
        let attachment = Attachment::new(b"abc".to_vec(), "Image/PNG").unwrap();
        assert_eq!(attachment.mime(), "image/png");
        assert_eq!(attachment.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_mime_from_ext() {
        assert_eq!(mime_from_ext("JPG"), Some("image/jpeg"));
        assert_eq!(mime_from_ext("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_from_ext("png"), Some("image/png"));
        assert_eq!(mime_from_ext("webp"), Some("image/webp"));
        assert_eq!(mime_from_ext("heic"), Some("image/heic"));
        assert_eq!(mime_from_ext("txt"), None);
    }

    #[test]
    fn test_from_path() {
        let mut file = Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let attachment = Attachment::from_path(file.path()).unwrap();
        assert_eq!(attachment.mime(), "image/jpeg");
        assert_eq!(attachment.len(), 3);

        let text = Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(Attachment::from_path(text.path()).is_err());
    }

    #[test]
    fn test_blank_description_is_empty() {
        assert!(EstimateRequest::new(Some("   ".into())).is_empty());
        assert!(EstimateRequest::new(None).is_empty());
        assert!(!EstimateRequest::new(Some("2 idli".into())).is_empty());
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = EstimateRequest::new(Some("Masala dosa".into())).user_prompt();
        assert!(prompt.contains("None yet today."));
        assert!(prompt.contains("QUICK-TRACKED ITEMS TODAY:\nNone."));
        assert!(prompt.contains("\"Masala dosa\""));
        assert!(prompt.contains("\"totalFiber\""));
    }

    #[test]
    fn test_prompt_with_context() {
        let request = EstimateRequest::new(Some("Lassi".into()))
            .with_presets(vec![PresetUsage {
                name: "Roti".into(),
                quantity: 2,
                calories_per_unit: 120,
                unit: "piece".into(),
            }])
            .with_prior_entries(vec![PriorEntry {
                description: "Poha".into(),
                total_calories: 250,
            }]);

        let prompt = request.user_prompt();
        assert!(prompt.contains("1. Poha - 250 kcal"));
        assert!(prompt.contains("Roti: 2 piece(s) x 120 kcal each = 240 kcal"));
    }

    #[test]
    fn test_preset_calorie_prompt() {
        let prompt = preset_calorie_prompt("Upma", "bowl");
        assert!(prompt.starts_with("How many calories are in 1 bowl of Upma?"));
    }
}
