use actix_web::http::header;
use actix_web::{post, web, HttpResponse};
use crisisbrief_report::ExportBundle;

/// Render outputs as a downloadable text file
#[post("/export")]
pub async fn export(bundle: web::Json<ExportBundle>) -> actix_web::Result<HttpResponse> {
    let bundle = bundle.into_inner();

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", bundle.file_name()),
        ))
        .body(bundle.render_plain_text()))
}
