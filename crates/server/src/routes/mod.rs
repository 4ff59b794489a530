use actix_web::web;

pub mod audio;
pub mod export;
pub mod health;
pub mod summaries;

/// Register all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(summaries::summaries)
        .service(audio::audio)
        .service(export::export);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, FixedTranscriber};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use crisisbrief_report::SectionKey;
    use crisisbrief_stt::UnavailableTranscriber;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const REPORT: &str = "A cyclone made landfall overnight. Winds reached 180 km/h and 40 people were injured.";
    const BOUNDARY: &str = "crisisbrief-boundary";

    fn multipart_request(field: &str, filename: &str) -> test::TestRequest {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nRIFFDATA\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            filename = filename
        );
        test::TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(test_state(Arc::new(FixedTranscriber::new(REPORT))));
        let resp: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;

        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["transcriber"], "fixed");
    }

    #[actix_web::test]
    async fn test_summaries_plain() {
        let app = app!(test_state(Arc::new(FixedTranscriber::new(REPORT))));
        let req = test::TestRequest::post()
            .uri("/summaries")
            .set_json(json!({ "text": REPORT }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;

        assert!(resp["alert"].is_string());
        assert!(resp["strategic"].is_string());
        assert!(resp.get("structured_report").is_none());
    }

    #[actix_web::test]
    async fn test_summaries_structured_with_model_override() {
        let state = test_state(Arc::new(FixedTranscriber::new(REPORT)));
        let app = app!(state.clone());
        let req = test::TestRequest::post()
            .uri("/summaries")
            .set_json(json!({ "text": REPORT, "structured": true, "model": "mistral:7b" }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;

        let report = resp["structured_report"].as_str().unwrap();
        assert!(report.contains(SectionKey::Impact.header()));
        assert_eq!(state.engines.current_config().await.unwrap().model, "mistral:7b");
    }

    #[actix_web::test]
    async fn test_audio_upload() {
        let app = app!(test_state(Arc::new(FixedTranscriber::new(REPORT))));
        let req = multipart_request("file", "call.wav")
            .uri("/audio?language=en")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["transcript"], REPORT);
        assert!(body["strategic"].is_string());
    }

    #[actix_web::test]
    async fn test_audio_without_recognizer_reports_dependency() {
        let app = app!(test_state(Arc::new(UnavailableTranscriber::whisper_disabled())));
        let req = multipart_request("file", "call.mp3").uri("/audio").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FAILED_DEPENDENCY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["category"], "dependency_missing");
        assert!(body["remediation"].as_str().unwrap().contains("whisper"));
    }

    #[actix_web::test]
    async fn test_audio_rejects_bad_uploads() {
        let app = app!(test_state(Arc::new(FixedTranscriber::new(REPORT))));

        let missing = multipart_request("other", "call.wav").uri("/audio").to_request();
        assert_eq!(test::call_service(&app, missing).await.status(), StatusCode::BAD_REQUEST);

        let unsupported = multipart_request("file", "notes.txt").uri("/audio").to_request();
        assert_eq!(test::call_service(&app, unsupported).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_export() {
        let app = app!(test_state(Arc::new(FixedTranscriber::new(REPORT))));
        let req = test::TestRequest::post()
            .uri("/export")
            .set_json(json!({
                "alert": "Cyclone warning",
                "operational": "Deploy shelters",
                "strategic": "Fund recovery",
                "original_text": REPORT
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("disaster_report_summaries.txt"));
        let body = test::read_body(resp).await;
        assert!(String::from_utf8(body.to_vec()).unwrap().starts_with("DISASTER REPORT SUMMARIES"));
    }
}
