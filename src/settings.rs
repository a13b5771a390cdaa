use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scoring::Level;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub const DEFAULT_SETTINGS_PATH: &str = "settings.default.ron";
pub const OVERRIDE_SETTINGS_PATH: &str = "settings.ron";
pub const SETTINGS_PATH_ENV: &str = "RANKSENSE_SETTINGS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("no sections configured")]
    NoSections,
    #[error("duplicate section `{0}`")]
    DuplicateSection(String),
    #[error("section weights must sum to 100, got {0}")]
    WeightSum(f64),
    #[error("invalid signature for section `{section}`: {message}")]
    Signature { section: String, message: String },
    #[error("level bands are empty")]
    NoLevels,
    #[error("grade thresholds must be strictly descending")]
    GradeOrder,
    #[error("`{0}` is an empty range")]
    EmptyRange(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub scoring: Scoring,
    pub sections: Vec<SectionSpec>,
    pub levels: Vec<LevelBand>,
    pub grades: Vec<GradeBand>,
    pub feedback_fallback: String,
    pub profile: ProfileTables,
    pub batch: BatchLimits,
    pub display: Display,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoring {
    pub min_text_length: usize,
    pub placeholder: ScoreRange,
    pub signature: SignatureScoring,
    pub layout: LayoutScoring,
    pub default_weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

/// Constants of the keyword-density heuristic used by every section that
/// carries a signature pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureScoring {
    pub base: f64,
    pub words_per_density_unit: f64,
    pub density_scale: f64,
    pub density_cap: f64,
    pub words_per_richness_point: f64,
    pub richness_cap: f64,
    pub jitter: f64,
    pub clamp: ScoreRange,
}

/// Constants of the average-line-length heuristic. This is a weak layout
/// proxy and nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutScoring {
    pub base: f64,
    pub readable_bonus: f64,
    pub readable_min_line: f64,
    pub readable_max_line: f64,
    pub jitter: f64,
    pub clamp: ScoreRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub weight: f64,
    pub signature: Option<String>,
    pub feedback: LevelFeedback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFeedback {
    pub excellent: String,
    pub good: String,
    pub moderate: String,
    pub poor: String,
}

impl LevelFeedback {
    pub fn for_level(&self, level: Level) -> &str {
        match level {
            Level::Excellent => &self.excellent,
            Level::Good => &self.good,
            Level::Moderate => &self.moderate,
            Level::Poor => &self.poor,
        }
    }
}

/// Half-open score interval `[min, max)` mapped to a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelBand {
    pub min: f64,
    pub max: f64,
    pub level: Level,
}

/// Inclusive lower threshold for a letter grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBand {
    pub threshold: f64,
    pub grade: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTables {
    pub name_scan_lines: usize,
    pub cities: Vec<String>,
    pub institution_patterns: Vec<String>,
    pub tech_keywords: Vec<String>,
    pub max_keywords: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLimits {
    pub max_documents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Display {
    pub default_role: String,
    pub avatar_colors: Vec<String>,
}

fn section(
    name: &str,
    weight: f64,
    signature: Option<&str>,
    feedback: [&str; 4],
) -> SectionSpec {
    let [excellent, good, moderate, poor] = feedback;
    SectionSpec {
        name: name.to_string(),
        weight,
        signature: signature.map(str::to_string),
        feedback: LevelFeedback {
            excellent: excellent.to_string(),
            good: good.to_string(),
            moderate: moderate.to_string(),
            poor: poor.to_string(),
        },
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scoring: Scoring {
                min_text_length: 10,
                placeholder: ScoreRange {
                    min: 40.0,
                    max: 60.0,
                },
                signature: SignatureScoring {
                    base: 40.0,
                    words_per_density_unit: 100.0,
                    density_scale: 25.0,
                    density_cap: 40.0,
                    words_per_richness_point: 20.0,
                    richness_cap: 15.0,
                    jitter: 5.0,
                    clamp: ScoreRange {
                        min: 40.0,
                        max: 98.0,
                    },
                },
                layout: LayoutScoring {
                    base: 70.0,
                    readable_bonus: 10.0,
                    readable_min_line: 30.0,
                    readable_max_line: 80.0,
                    jitter: 8.0,
                    clamp: ScoreRange {
                        min: 45.0,
                        max: 98.0,
                    },
                },
                default_weight: 10.0,
            },
            sections: vec![
                section(
                    "Contact Info",
                    5.0,
                    Some(r"(email|phone|linkedin|github|portfolio|contact)"),
                    [
                        "All professional channels present: email, phone, LinkedIn, GitHub",
                        "Most contact details present, missing one channel",
                        "Basic contact info only, add LinkedIn/GitHub",
                        "Very minimal contact information provided",
                    ],
                ),
                section(
                    "Education",
                    20.0,
                    Some(r"(education|university|college|degree|gpa|cgpa|bachelor|master|phd|b\.?tech|m\.?tech)"),
                    [
                        "Strong academic background with prestigious institution",
                        "Solid educational foundation, GPA mentioned",
                        "Education listed but lacks GPA or institution prestige",
                        "Education section needs significant detail",
                    ],
                ),
                section(
                    "Work Experience",
                    30.0,
                    Some(r"(experience|work|internship|employment|job|company|engineer|analyst|developer|intern)"),
                    [
                        "Strong work history with quantified impact metrics",
                        "Good experience, some quantified results",
                        "Work experience listed but lacks quantified achievements",
                        "Limited or no work experience demonstrated",
                    ],
                ),
                section(
                    "Skills",
                    20.0,
                    Some(r"(skills|technologies|tools|frameworks|languages|proficiency|expertise)"),
                    [
                        "Comprehensive and role-relevant technical skill set",
                        "Good skill coverage, minor gaps in stack",
                        "Basic skills listed, needs deeper technical depth",
                        "Skills section is underdeveloped",
                    ],
                ),
                section(
                    "Projects",
                    15.0,
                    Some(r"(projects?|portfolio|built|developed|created|implemented)"),
                    [
                        "Strong portfolio of relevant projects with live demonstrations",
                        "Good projects, could add more metrics and GitHub links",
                        "Projects listed but lack depth or public links",
                        "Very few or irrelevant projects in portfolio",
                    ],
                ),
                section(
                    "Achievements",
                    5.0,
                    Some(r"(achievements?|awards?|honors?|publications?|certifications?|accomplishments?)"),
                    [
                        "Notable awards, publications, or certifications listed",
                        "Some recognitions and certifications present",
                        "Few achievements mentioned, needs more specificity",
                        "No achievements or certifications listed",
                    ],
                ),
                section(
                    "Summary",
                    3.0,
                    Some(r"(summary|objective|profile|about|overview)"),
                    [
                        "Clear, targeted, and role-specific professional summary",
                        "Good summary with clear career objective",
                        "Summary is generic, not tailored to role",
                        "Missing or very vague professional summary",
                    ],
                ),
                section(
                    "Formatting",
                    2.0,
                    None,
                    [
                        "ATS-optimized, consistent layout, professional design",
                        "Clean layout with minor formatting inconsistencies",
                        "Acceptable but has formatting issues that may affect ATS",
                        "Significant formatting issues detected",
                    ],
                ),
            ],
            levels: vec![
                LevelBand {
                    min: 85.0,
                    max: 101.0,
                    level: Level::Excellent,
                },
                LevelBand {
                    min: 70.0,
                    max: 85.0,
                    level: Level::Good,
                },
                LevelBand {
                    min: 50.0,
                    max: 70.0,
                    level: Level::Moderate,
                },
                LevelBand {
                    min: 0.0,
                    max: 50.0,
                    level: Level::Poor,
                },
            ],
            grades: [
                (90.0, "A+", "#3b82f6"),
                (80.0, "A", "#8b5cf6"),
                (70.0, "B+", "#06b6d4"),
                (60.0, "B", "#f59e0b"),
                (50.0, "C+", "#f97316"),
                (0.0, "C", "#f43f5e"),
            ]
            .into_iter()
            .map(|(threshold, grade, color)| GradeBand {
                threshold,
                grade: grade.to_string(),
                color: color.to_string(),
            })
            .collect(),
            feedback_fallback: "Score computed from resume content".to_string(),
            profile: ProfileTables {
                name_scan_lines: 5,
                cities: vec![
                    "Mumbai".into(),
                    "Delhi".into(),
                    "Bangalore".into(),
                    "Hyderabad".into(),
                    "Chennai".into(),
                    "Pune".into(),
                    "Kolkata".into(),
                    "Ahmedabad".into(),
                    "Jaipur".into(),
                    "New York".into(),
                    "San Francisco".into(),
                    "London".into(),
                    "Singapore".into(),
                    "Dubai".into(),
                    "Remote".into(),
                ],
                institution_patterns: vec![
                    r"IIT\s+\w+".into(),
                    r"IIM\s+\w+".into(),
                    r"BITS\s+\w+".into(),
                    r"NIT\s+\w+".into(),
                    r"VIT\s+\w+".into(),
                    "MIT".into(),
                    "Stanford".into(),
                    "Harvard".into(),
                    "[A-Z][a-z]+ University".into(),
                    "[A-Z][a-z]+ College".into(),
                ],
                tech_keywords: vec![
                    "Python".into(),
                    "Java".into(),
                    "JavaScript".into(),
                    "TypeScript".into(),
                    "C++".into(),
                    "C#".into(),
                    "Go".into(),
                    "Rust".into(),
                    "React".into(),
                    "Vue".into(),
                    "Angular".into(),
                    "Node.js".into(),
                    "FastAPI".into(),
                    "Django".into(),
                    "Flask".into(),
                    "TensorFlow".into(),
                    "PyTorch".into(),
                    "scikit-learn".into(),
                    "SBERT".into(),
                    "LayoutLMv3".into(),
                    "BERT".into(),
                    "Hugging Face".into(),
                    "spaCy".into(),
                    "NLTK".into(),
                    "OpenCV".into(),
                    "Pandas".into(),
                    "NumPy".into(),
                    "SQL".into(),
                    "PostgreSQL".into(),
                    "MongoDB".into(),
                    "Redis".into(),
                    "MySQL".into(),
                    "Docker".into(),
                    "Kubernetes".into(),
                    "AWS".into(),
                    "GCP".into(),
                    "Azure".into(),
                    "Machine Learning".into(),
                    "Deep Learning".into(),
                    "NLP".into(),
                    "Computer Vision".into(),
                    "REST APIs".into(),
                    "GraphQL".into(),
                    "Microservices".into(),
                    "MLOps".into(),
                    "Tableau".into(),
                    "Power BI".into(),
                ],
                max_keywords: 10,
            },
            batch: BatchLimits { max_documents: 25 },
            display: Display {
                default_role: "Candidate".to_string(),
                avatar_colors: vec![
                    "#3b82f6".into(),
                    "#8b5cf6".into(),
                    "#22d3ee".into(),
                    "#f59e0b".into(),
                    "#f43f5e".into(),
                    "#10b981".into(),
                    "#a78bfa".into(),
                ],
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let mut settings =
            read_layer(Path::new(DEFAULT_SETTINGS_PATH)).unwrap_or_default();

        let override_path = std::env::var(SETTINGS_PATH_ENV)
            .unwrap_or_else(|_| OVERRIDE_SETTINGS_PATH.to_string());
        if let Some(overrides) = read_layer(Path::new(&override_path)) {
            settings = overrides;
        }

        settings
    }

    pub fn from_ron_str(content: &str) -> Result<Settings, SettingsError> {
        let settings: Settings = ron::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sections.is_empty() {
            return Err(SettingsError::NoSections);
        }

        for (i, spec) in self.sections.iter().enumerate() {
            if self.sections[..i].iter().any(|s| s.name == spec.name) {
                return Err(SettingsError::DuplicateSection(spec.name.clone()));
            }
            if let Some(ref pattern) = spec.signature {
                if let Err(e) = regex::Regex::new(pattern) {
                    return Err(SettingsError::Signature {
                        section: spec.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let total: f64 = self.sections.iter().map(|s| s.weight).sum();
        if (total - 100.0).abs() > 1e-9 {
            return Err(SettingsError::WeightSum(total));
        }

        if self.levels.is_empty() {
            return Err(SettingsError::NoLevels);
        }

        let sc = &self.scoring;
        let ranges = [
            ("scoring.placeholder", sc.placeholder.min, sc.placeholder.max),
            ("scoring.signature.clamp", sc.signature.clamp.min, sc.signature.clamp.max),
            ("scoring.layout.clamp", sc.layout.clamp.min, sc.layout.clamp.max),
            ("scoring.signature.jitter", -sc.signature.jitter, sc.signature.jitter),
            ("scoring.layout.jitter", -sc.layout.jitter, sc.layout.jitter),
        ];
        if let Some((name, _, _)) = ranges.iter().find(|(_, min, max)| !(min <= max)) {
            return Err(SettingsError::EmptyRange(*name));
        }

        if self
            .grades
            .windows(2)
            .any(|pair| pair[0].threshold <= pair[1].threshold)
            || self.grades.is_empty()
        {
            return Err(SettingsError::GradeOrder);
        }

        Ok(())
    }

    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Weight of a criterion, falling back to `scoring.default_weight` for
    /// names outside the configured section set.
    pub fn section_weight(&self, name: &str) -> f64 {
        self.section(name)
            .map(|s| s.weight)
            .unwrap_or(self.scoring.default_weight)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }
}

fn read_layer(path: &Path) -> Option<Settings> {
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unable to read settings file");
            return None;
        }
    };

    match Settings::from_ron_str(&content) {
        Ok(settings) => {
            debug!(path = %path.display(), "loaded settings");
            Some(settings)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring settings file");
            None
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}
