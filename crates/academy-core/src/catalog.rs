//! # Course Catalog
//!
//! Static course table. Prices are whole rupees; orders are placed in paise.
//! Unknown course ids resolve to the default entry instead of failing.

use serde::{Deserialize, Serialize};

/// A purchasable course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier (e.g., "live-workshops")
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in rupees
    pub price: i64,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }

    /// Price in the smallest currency unit (paise)
    pub fn amount_minor(&self) -> i64 {
        self.price * 100
    }
}

fn builtin_default() -> Course {
    Course::new("business-foundation", "Business Foundation Course", 299)
}

/// Course catalog, optionally loaded from `config/courses.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCatalog {
    #[serde(default)]
    pub courses: Vec<Course>,

    /// Entry used for any id not in `courses`
    #[serde(default = "builtin_default")]
    pub default: Course,
}

impl CourseCatalog {
    /// The catalog the storefront ships with
    pub fn builtin() -> Self {
        Self {
            courses: vec![
                Course::new("workshop-registration", "Online Workshop Registration", 299),
                Course::new("live-workshops", "Sunday Live Workshops", 299),
                Course::new("startup-mastery", "Startup Business Mastery Course", 25000),
                Course::new("digital-growth", "Digital Business Growth Course", 4999),
                Course::new("premium-combo", "Premium Combo Course", 25000),
            ],
            default: builtin_default(),
        }
    }

    /// Find a course by id, without falling back
    pub fn get(&self, id: &str) -> Option<&Course> {
        if self.default.id == id {
            return Some(&self.default);
        }
        self.courses.iter().find(|c| c.id == id)
    }

    /// Find a course by id, falling back to the default entry
    pub fn lookup(&self, id: &str) -> &Course {
        self.get(id).unwrap_or(&self.default)
    }

    /// Whether `id` names a catalog course (default entry included)
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All courses, default entry last
    pub fn all(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().chain(std::iter::once(&self.default))
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
