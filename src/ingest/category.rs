//! Upload categories and their extension allow-lists.

use serde::Serialize;

use crate::storage::models::SubCategory;

const DATASET_EXTENSIONS: &[&str] = &["csv", "npy"];
const RESULTS_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "pdf", "docx"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "mp4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dataset,
    Results,
    Audio,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Dataset, Category::Results, Category::Audio];

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Dataset => DATASET_EXTENSIONS,
            Category::Results => RESULTS_EXTENSIONS,
            Category::Audio => AUDIO_EXTENSIONS,
        }
    }

    /// Human-readable allow-list used in rejection messages.
    pub fn allowed_types(&self) -> &'static str {
        match self {
            Category::Dataset => "CSV or NPY",
            Category::Results => "JPG, PNG, GIF, PDF, or DOCX",
            Category::Audio => "MP3, WAV, M4A, OGG, or MP4",
        }
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        extension(filename).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    /// First category whose allow-list contains the filename's extension.
    pub fn classify(filename: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.is_allowed(filename))
    }
}

impl From<SubCategory> for Category {
    fn from(sub: SubCategory) -> Self {
        match sub {
            SubCategory::Dataset => Category::Dataset,
            SubCategory::Results => Category::Results,
        }
    }
}

/// Lowercased text after the last `.`, or `None` when there is no `.`.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_allowed(filename: &str, category: Category) -> bool {
    category.is_allowed(filename)
}
