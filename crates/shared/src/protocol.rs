use serde::{Deserialize, Serialize};

use crate::domain::InteractionMode;

/// Multipart field names used by the `/upload` endpoint.
pub const UPLOAD_FILE_FIELD: &str = "file";
pub const UPLOAD_QUERY_FIELD: &str = "query";

/// JSON body accepted by `/chat`, `/grammar` and `/translate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarResponse {
    pub corrected_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub fn endpoint_path(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Chat => "chat",
        InteractionMode::DocumentQa => "upload",
        InteractionMode::GrammarCheck => "grammar",
        InteractionMode::Translation => "translate",
    }
}

/// Name of the success-body field holding the answer text.
pub fn answer_field(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Chat | InteractionMode::DocumentQa => "answer",
        InteractionMode::GrammarCheck => "corrected_text",
        InteractionMode::Translation => "translated_text",
    }
}

/// Decodes a 2xx body into the answer text for `mode`.
pub fn decode_answer(mode: InteractionMode, body: &[u8]) -> Result<String, serde_json::Error> {
    match mode {
        InteractionMode::Chat | InteractionMode::DocumentQa => {
            serde_json::from_slice::<AnswerResponse>(body).map(|r| r.answer)
        }
        InteractionMode::GrammarCheck => {
            serde_json::from_slice::<GrammarResponse>(body).map(|r| r.corrected_text)
        }
        InteractionMode::Translation => {
            serde_json::from_slice::<TranslateResponse>(body).map(|r| r.translated_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_answer_comes_from_corrected_text() {
        let body = br#"{"status":"success","corrected_text":"He goes home"}"#;
        let answer = decode_answer(InteractionMode::GrammarCheck, body).expect("decode");
        assert_eq!(answer, "He goes home");
    }

    #[test]
    fn translation_rejects_chat_shaped_body() {
        let body = br#"{"answer":"hello"}"#;
        let err = decode_answer(InteractionMode::Translation, body).expect_err("missing field");
        assert!(err.to_string().contains("translated_text"));
    }

    #[test]
    fn document_answers_share_the_chat_field() {
        let body = br#"{"answer":"120"}"#;
        assert_eq!(
            decode_answer(InteractionMode::DocumentQa, body).expect("decode"),
            "120"
        );
        assert_eq!(answer_field(InteractionMode::DocumentQa), "answer");
        assert_eq!(endpoint_path(InteractionMode::DocumentQa), "upload");
    }
}
