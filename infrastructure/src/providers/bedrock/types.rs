//! Conversions between conversation turns and the Bedrock Converse API

use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types as bedrock;
use aws_smithy_types::Blob;
use imgchat_application::ports::chat_provider::ProviderError;
use imgchat_domain::{Part, Turn, TurnRole};

// ─── Domain → Bedrock ────────────────────────────────────────────

/// Map an image MIME type to a Converse image format.
pub fn image_format(mime_type: &str) -> Option<bedrock::ImageFormat> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some(bedrock::ImageFormat::Jpeg),
        "image/png" => Some(bedrock::ImageFormat::Png),
        "image/gif" => Some(bedrock::ImageFormat::Gif),
        "image/webp" => Some(bedrock::ImageFormat::Webp),
        _ => None,
    }
}

fn convert_part(part: &Part) -> Result<bedrock::ContentBlock, ProviderError> {
    match part {
        Part::Text(text) => Ok(bedrock::ContentBlock::Text(text.clone())),
        Part::InlineImage { mime_type, data } => {
            let format = image_format(mime_type).ok_or_else(|| {
                ProviderError::Request(format!("Bedrock cannot accept images of type {}", mime_type))
            })?;
            let image = bedrock::ImageBlock::builder()
                .format(format)
                .source(bedrock::ImageSource::Bytes(Blob::new(data.clone())))
                .build()
                .map_err(|e| ProviderError::Request(e.to_string()))?;
            Ok(bedrock::ContentBlock::Image(image))
        }
    }
}

/// Convert a turn into a Converse message.
pub fn convert_turn(turn: &Turn) -> Result<bedrock::Message, ProviderError> {
    let role = match turn.role {
        TurnRole::User => bedrock::ConversationRole::User,
        TurnRole::Model => bedrock::ConversationRole::Assistant,
    };
    let content = turn
        .parts
        .iter()
        .map(convert_part)
        .collect::<Result<Vec<_>, _>>()?;

    bedrock::Message::builder()
        .role(role)
        .set_content(Some(content))
        .build()
        .map_err(|e| ProviderError::Request(e.to_string()))
}

// ─── Bedrock → Domain ────────────────────────────────────────────

/// Concatenate the text blocks of a Converse output.
pub fn output_text(output: &bedrock::ConverseOutput) -> String {
    match output {
        bedrock::ConverseOutput::Message(message) => message
            .content()
            .iter()
            .filter_map(|block| match block {
                bedrock::ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}

/// Convert a Bedrock SDK error to a ProviderError.
pub fn convert_converse_error(err: &SdkError<ConverseError>) -> ProviderError {
    match err {
        SdkError::ServiceError(service_err) => match service_err.err() {
            ConverseError::ThrottlingException(e) => {
                ProviderError::RateLimited(format!("Bedrock throttled: {}", e))
            }
            other if other.code() == Some("ServiceQuotaExceededException") => {
                ProviderError::RateLimited(format!(
                    "Bedrock quota exceeded: {}",
                    other.message().unwrap_or("no details")
                ))
            }
            ConverseError::ModelTimeoutException(_) => ProviderError::Timeout,
            ConverseError::ValidationException(e) => {
                ProviderError::Request(format!("Bedrock validation error: {}", e))
            }
            other => ProviderError::Request(format!("Bedrock error: {:?}", other)),
        },
        SdkError::TimeoutError(_) => ProviderError::Timeout,
        other => ProviderError::Connection(format!("Bedrock SDK error: {}", other)),
    }
}
