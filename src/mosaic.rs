//! Boundary to the remote mosaic service.
//!
//! The core never performs the HTTP call itself. It builds the request body,
//! hands out a [`MosaicTicket`], and later validates whatever response the
//! host obtained. A ticket is invalidated by a newer request or by a reset,
//! so a slow response cannot overwrite a newer state.

use serde::Serialize;
use tracing::{info, warn};

use crate::codec::{self, EncodedImage};
use crate::error::MosaicError;
use crate::state::ParameterState;

/// JSON body posted to the mosaic endpoint: `{"image": "<data URI>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MosaicRequest {
    pub image: String,
}

impl MosaicRequest {
    pub fn for_image(image: &EncodedImage) -> Self {
        Self {
            image: image.to_data_uri(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// What the transport got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl MosaicResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicTicket {
    generation: u32,
    pub request: MosaicRequest,
}

impl MosaicTicket {
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Transport for mosaic requests.
pub trait MosaicService {
    fn create_mosaic(&self, request: &MosaicRequest) -> Result<MosaicResponse, MosaicError>;
}

/// `image/jpeg; charset=binary` -> `image/jpeg`
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check status, content type and decodability of a response.
pub fn validate_response(response: MosaicResponse, accepted: &[String]) -> Result<EncodedImage, MosaicError> {
    if !response.is_success() {
        return Err(MosaicError::Status(response.status));
    }

    let content_type = normalize_content_type(&response.content_type);
    if !accepted.iter().any(|a| a.eq_ignore_ascii_case(&content_type)) {
        warn!(content_type = %response.content_type, "unexpected mosaic response type");
        return Err(MosaicError::UnexpectedContentType(response.content_type));
    }

    codec::decode(&response.body).map_err(|e| MosaicError::Decode(e.to_string()))?;
    Ok(EncodedImage::new(content_type, response.body))
}

impl ParameterState {
    /// Start a request for the active image. Earlier tickets become stale.
    pub fn begin_mosaic(&mut self) -> MosaicTicket {
        let generation = self.next_generation();
        MosaicTicket {
            generation,
            request: MosaicRequest::for_image(self.current_image()),
        }
    }

    /// Apply the outcome of the request whose ticket carried `generation`.
    ///
    /// On any error the active image and parameters are left as they were.
    pub fn complete_mosaic(
        &mut self,
        generation: u32,
        result: Result<MosaicResponse, MosaicError>,
        accepted: &[String],
    ) -> Result<(), MosaicError> {
        if generation != self.generation() {
            info!(ticket = generation, current = self.generation(), "dropping superseded mosaic response");
            return Err(MosaicError::Superseded);
        }

        let image = result
            .and_then(|response| validate_response(response, accepted))
            .inspect_err(|e| warn!(error = %e, "mosaic request failed"))?;

        info!(bytes = image.len(), "mosaic applied");
        self.replace_image(image);
        Ok(())
    }
}

/// Run one mosaic round trip through `service` synchronously.
pub fn handle_create_mosaic(
    state: &mut ParameterState,
    service: &dyn MosaicService,
    accepted: &[String],
) -> Result<(), MosaicError> {
    let ticket = state.begin_mosaic();
    let result = service.create_mosaic(&ticket.request);
    state.complete_mosaic(ticket.generation(), result, accepted)
}
