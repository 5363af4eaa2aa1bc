use axum::extract::Multipart;

use lifeline_domain::photo::PhotoUpload;

use crate::error::TimelineServiceError;
use crate::usecase::event::EventInput;

/// Read the create/edit form: `title`, `event_date`, `description`, `photo`.
///
/// Unknown fields are skipped. A `photo` part with no content (a file input left
/// empty) counts as no photo. An oversized or non-image photo is rejected here,
/// before any upstream call. A body cut off by the request limit also reports
/// `PHOTO_TOO_LARGE`.
pub async fn read_event_form(mut multipart: Multipart) -> Result<EventInput, TimelineServiceError> {
    let mut input = EventInput::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "title" => input.title = field.text().await?,
            "event_date" => input.event_date = Some(field.text().await?),
            "description" => input.description = Some(field.text().await?),
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    input.photo = Some(PhotoUpload::new(file_name, content_type, bytes)?);
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(input)
}
