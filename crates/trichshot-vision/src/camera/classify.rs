//! Name/index heuristics for telling external webcams from built-in ones.

use trichshot_models::CameraClass;

/// Substrings that mark a device as an external webcam.
pub const EXTERNAL_KEYWORDS: &[&str] = &[
    "usb", "logitech", "microsoft", "creative", "webcam", "external", "hd pro", "c920", "c922",
    "c930", "c270",
];

/// Substrings that mark a device as a built-in laptop camera.
pub const INTEGRATED_KEYWORDS: &[&str] = &[
    "integrated",
    "built-in",
    "internal",
    "laptop",
    "chicony",
    "realtek",
    "asus",
    "hp truevision",
    "lenovo",
    "dell",
];

/// One keyword rule: any keyword matching assigns `class`.
#[derive(Debug, Clone, Copy)]
pub struct ClassRule {
    pub class: CameraClass,
    pub keywords: &'static [&'static str],
}

/// Rules in priority order; the first rule with a matching keyword wins.
pub const DEFAULT_RULES: &[ClassRule] = &[
    ClassRule {
        class: CameraClass::External,
        keywords: EXTERNAL_KEYWORDS,
    },
    ClassRule {
        class: CameraClass::Integrated,
        keywords: INTEGRATED_KEYWORDS,
    },
];

/// Classify a camera by name using [`DEFAULT_RULES`].
///
/// Unknown or missing names yield [`CameraClass::Unknown`]; the device index
/// then decides its rank (see `CameraCandidate::rank`).
pub fn classify(name: Option<&str>) -> CameraClass {
    classify_with(DEFAULT_RULES, name)
}

/// Classify a camera against an explicit rule list.
pub fn classify_with(rules: &[ClassRule], name: Option<&str>) -> CameraClass {
    let Some(name) = name else {
        return CameraClass::Unknown;
    };
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.class)
        .unwrap_or(CameraClass::Unknown)
}
