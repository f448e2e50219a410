//! Profile picture upload stub.

use axum::{Json, extract::Multipart};

use school_portal_core::wire::{Envelope, UploadReceipt, fields};

use crate::error::{AppError, Result};

/// `POST /` - accept a multipart `profileImage` and report what arrived.
///
/// Other parts are read and ignored. The file itself is discarded.
pub async fn profile_picture(mut multipart: Multipart) -> Result<Json<Envelope<UploadReceipt>>> {
    let mut receipt = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(fields::PROFILE_IMAGE) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await?;
        receipt = Some(UploadReceipt {
            file_name,
            content_type,
            size: bytes.len(),
        });
    }

    let receipt =
        receipt.ok_or_else(|| AppError::BadRequest("No profileImage file uploaded".to_string()))?;

    tracing::info!(
        file_name = ?receipt.file_name,
        size = receipt.size,
        "Profile picture received"
    );

    Ok(Json(Envelope::ok("Profile picture uploaded", receipt)))
}
