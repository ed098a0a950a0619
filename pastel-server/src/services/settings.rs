//! Settings singleton and PIX QR upload

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{AppSettings, SettingsUpdate, UploadedAsset};
use shared::util::now_millis;
use shared::validation::{MAX_PATH_LEN, MAX_PIX_KEY_LEN, validate_optional_text};

use crate::error::{ServiceResult, step};
use crate::live::CatalogEvent;
use crate::state::AppState;

/// Maximum accepted QR image size
pub const MAX_QR_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Blob store prefix of uploaded QR images
const QR_PREFIX: &str = "qr-codes";

/// Settings as served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub settings: AppSettings,
    pub pix_qr_url: Option<String>,
}

/// File received by the upload endpoint
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

fn view(state: &AppState, settings: AppSettings) -> SettingsView {
    let pix_qr_url = settings
        .pix_qr_image_path
        .as_deref()
        .map(|path| state.blobs.public_url(path));
    SettingsView { settings, pix_qr_url }
}

pub async fn get(state: &AppState) -> ServiceResult<SettingsView> {
    let store = state.store.as_ref();
    let settings = state
        .retry
        .read(move || store.get_settings())
        .await
        .map_err(step(ErrorCode::FetchError))?
        .ok_or_else(|| AppError::new(ErrorCode::SettingsError))?;
    Ok(view(state, settings))
}

/// Trim an optional text patch; `""` clears like `null` does
fn clean_text(
    value: &Option<Option<String>>,
    field: &str,
    max_len: usize,
) -> Result<Option<Option<String>>, AppError> {
    let Some(inner) = value else {
        return Ok(None);
    };
    let cleaned = inner
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    validate_optional_text(cleaned.as_deref(), field, max_len)?;
    Ok(Some(cleaned))
}

pub async fn update(state: &AppState, data: &SettingsUpdate) -> ServiceResult<SettingsView> {
    if data.pastel_price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::validation("Preço não pode ser negativo")
            .with_detail("field", "pastel_price_cents")
            .into());
    }
    let patch = SettingsUpdate {
        pastel_price_cents: data.pastel_price_cents,
        pix_qr_image_path: clean_text(&data.pix_qr_image_path, "pix_qr_image_path", MAX_PATH_LEN)?,
        pix_key_text: clean_text(&data.pix_key_text, "pix_key_text", MAX_PIX_KEY_LEN)?,
    };

    let settings = state
        .retry
        .write(state.store.update_settings(&patch))
        .await
        .map_err(step(ErrorCode::UpdateError))?
        .ok_or_else(|| AppError::new(ErrorCode::SettingsError))?;

    tracing::info!(
        pastel_price_cents = settings.pastel_price_cents,
        has_qr = settings.pix_qr_image_path.is_some(),
        "Settings updated"
    );
    state.hub.publish(CatalogEvent::SettingsChanged);
    Ok(view(state, settings))
}

/// File extension for the stored image: the uploaded name's, else one for the MIME type
fn extension_for(file: &UploadedFile, content_type: &str) -> String {
    let from_name = file
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    from_name
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .unwrap_or_else(|| "png".to_string())
}

/// Store a PIX QR image and return its path and public URL.
///
/// The settings row is not touched; the client saves the path with a
/// settings update.
pub async fn upload_qr(state: &AppState, file: UploadedFile) -> ServiceResult<UploadedAsset> {
    if file.bytes.is_empty() {
        return Err(AppError::validation("Nenhum arquivo enviado")
            .with_detail("field", "file")
            .into());
    }
    let content_type = file.content_type.as_deref().unwrap_or("").to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        return Err(AppError::validation("Arquivo deve ser uma imagem")
            .with_detail("field", "file")
            .into());
    }
    if file.bytes.len() > MAX_QR_IMAGE_BYTES {
        return Err(AppError::validation("Arquivo deve ter menos de 2MB")
            .with_detail("field", "file")
            .into());
    }

    let path = format!(
        "{QR_PREFIX}/pix-qr-code-{}.{}",
        now_millis(),
        extension_for(&file, &content_type)
    );
    state.blobs.put(&path, &file.bytes).await.map_err(|e| {
        tracing::error!(path = %path, error = %e, "QR upload failed");
        AppError::new(ErrorCode::UploadError)
    })?;

    tracing::info!(path = %path, bytes = file.bytes.len(), "PIX QR image uploaded");
    Ok(UploadedAsset {
        url: state.blobs.public_url(&path),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: Option<&str>) -> UploadedFile {
        UploadedFile {
            file_name: name.map(str::to_string),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_extension_prefers_file_name() {
        assert_eq!(extension_for(&file(Some("QR.JPG")), "image/png"), "jpg");
        assert_eq!(extension_for(&file(Some("qr")), "image/png"), "png");
        assert_eq!(extension_for(&file(None), "image/gif"), "gif");
        assert_eq!(extension_for(&file(Some("a.x/../y")), "image/png"), "png");
    }

    #[test]
    fn test_clean_text_clears_blank() {
        assert_eq!(clean_text(&None, "f", 10).unwrap(), None);
        assert_eq!(clean_text(&Some(None), "f", 10).unwrap(), Some(None));
        assert_eq!(clean_text(&Some(Some("  ".into())), "f", 10).unwrap(), Some(None));
        assert_eq!(
            clean_text(&Some(Some(" key ".into())), "f", 10).unwrap(),
            Some(Some("key".into()))
        );
        assert!(clean_text(&Some(Some("x".repeat(11))), "f", 10).is_err());
    }
}
