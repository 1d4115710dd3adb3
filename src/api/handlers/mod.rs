mod admin;
mod clips;
mod files;
mod materials;
mod query;
mod tables;

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::api::response::ApiError;

pub use admin::{health, overview};
pub use clips::{add_drive_clip, delete_clip, list_clips, upload_clip};
pub use files::{result_info, serve_file};
pub use materials::{
    delete_material, list_materials, list_properties, search, update_material, upload_material,
};
pub use query::{list_query_tables, run_query};
pub use tables::{export_table, get_table, import_view, preview_view};

/// A parsed multipart form: the `file` part plus any text fields.
struct UploadForm {
    file: Option<(String, Bytes)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

async fn read_upload_form(mut multipart: Multipart, max_size: u64) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        file: None,
        fields: HashMap::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

            if data.len() as u64 > max_size {
                return Err(ApiError::payload_too_large(format!(
                    "File exceeds maximum upload size of {max_size} bytes"
                )));
            }
            form.file = Some((file_name, data));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid {field_name}: {e}")))?;
            form.fields.insert(field_name, text);
        }
    }

    Ok(form)
}
