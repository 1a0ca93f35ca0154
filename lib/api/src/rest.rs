use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Result as ActixResult};
use fabrix_core::{
    find_template, graph_issues, render_artifact, ArtifactKind, Compilation, Error, NetworkConfig,
    NetworkPatch, PeerCommand, Topology, TEMPLATES,
};
use fabrix_storage::{DeploymentPatch, NetworkRepository};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub type SharedRepository = Arc<dyn NetworkRepository>;
type Repo = web::Data<SharedRepository>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeploymentRequest {
    network_id: String,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(repository: SharedRepository, host: &str, port: u16) -> std::io::Result<()> {
        info!("REST API listening on {}:{}", host, port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(repository.clone()))
                .configure(configure)
        })
        .bind((host, port))?
        .run()
        .await
    }
}

/// Register every route on `cfg`. Expects a `web::Data<SharedRepository>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/networks", web::get().to(list_networks))
        .route("/api/networks", web::post().to(create_network))
        .route("/api/networks/{id}", web::get().to(get_network))
        .route("/api/networks/{id}", web::patch().to(update_network))
        .route("/api/networks/{id}", web::delete().to(delete_network))
        .route("/api/networks/{id}/export/{artifact}", web::get().to(export_artifact))
        .route("/api/networks/{id}/validate", web::post().to(validate_network))
        .route("/api/networks/{id}/cli", web::get().to(cli_commands))
        .route("/api/networks/{id}/cli/{command}", web::get().to(cli_command))
        .route("/api/compile", web::post().to(compile))
        .route("/api/templates", web::get().to(list_templates))
        .route("/api/templates/{id}/instantiate", web::post().to(instantiate_template))
        .route("/api/deployments", web::get().to(list_deployments))
        .route("/api/deployments", web::post().to(create_deployment))
        .route("/api/deployments/{id}", web::get().to(get_deployment))
        .route("/api/deployments/{id}", web::patch().to(update_deployment))
        .route("/api/deployments/{id}", web::delete().to(delete_deployment));
}

fn error_response(err: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        Error::NetworkNotFound(_) | Error::DeploymentNotFound(_) | Error::TemplateNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        Error::InvalidTransition { .. } | Error::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        Error::Io(_) | Error::Serialization(_) => HttpResponse::InternalServerError().json(body),
    }
}

fn network_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Network not found"
    }))
}

fn deployment_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Deployment not found"
    }))
}

async fn list_networks(repo: Repo) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_networks()))
}

async fn get_network(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    match repo.get_network(&path.into_inner()) {
        Some(network) => Ok(HttpResponse::Ok().json(network)),
        None => Ok(network_not_found()),
    }
}

async fn create_network(repo: Repo, req: web::Json<NetworkConfig>) -> ActixResult<HttpResponse> {
    let network = repo.create_network(req.into_inner());
    Ok(HttpResponse::Created().json(network))
}

async fn update_network(
    repo: Repo,
    path: web::Path<String>,
    req: web::Json<NetworkPatch>,
) -> ActixResult<HttpResponse> {
    match repo.update_network(&path.into_inner(), req.into_inner()) {
        Some(network) => Ok(HttpResponse::Ok().json(network)),
        None => Ok(network_not_found()),
    }
}

async fn delete_network(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    if repo.delete_network(&path.into_inner()) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(network_not_found())
    }
}

async fn export_artifact(repo: Repo, path: web::Path<(String, String)>) -> ActixResult<HttpResponse> {
    let (id, artifact) = path.into_inner();
    let kind: ArtifactKind = match artifact.parse() {
        Ok(kind) => kind,
        Err(e) => return Ok(HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))),
    };
    let Some(network) = repo.get_network(&id) else {
        return Ok(network_not_found());
    };

    let body = render_artifact(&Topology::from_network(&network), kind);
    Ok(HttpResponse::Ok()
        .content_type("text/yaml")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.file_name()),
        ))
        .body(body))
}

async fn validate_network(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    let Some(network) = repo.get_network(&path.into_inner()) else {
        return Ok(network_not_found());
    };
    let report = fabrix_core::validate_network(Some(&network));
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "tests": report.tests,
        "issues": report.issues,
        "graphIssues": graph_issues(&network),
    })))
}

async fn cli_command(repo: Repo, path: web::Path<(String, String)>) -> ActixResult<HttpResponse> {
    let (id, command) = path.into_inner();
    let command: PeerCommand = match command.parse() {
        Ok(command) => command,
        Err(e) => return Ok(error_response(&e)),
    };
    let Some(network) = repo.get_network(&id) else {
        return Ok(network_not_found());
    };
    let text = fabrix_core::peer_command(&Topology::from_network(&network), command);
    Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text))
}

async fn cli_commands(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    let Some(network) = repo.get_network(&path.into_inner()) else {
        return Ok(network_not_found());
    };
    Ok(HttpResponse::Ok().json(fabrix_core::peer_commands(&Topology::from_network(&network))))
}

async fn compile(req: web::Json<NetworkConfig>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(Compilation::run(&req.into_inner())))
}

async fn list_templates() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(TEMPLATES))
}

async fn instantiate_template(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    match find_template(&path.into_inner()) {
        Ok(template) => {
            let network = repo.create_network(template.instantiate());
            Ok(HttpResponse::Created().json(network))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn list_deployments(repo: Repo) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_deployments()))
}

async fn get_deployment(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    match repo.get_deployment(&path.into_inner()) {
        Some(deployment) => Ok(HttpResponse::Ok().json(deployment)),
        None => Ok(deployment_not_found()),
    }
}

async fn create_deployment(repo: Repo, req: web::Json<CreateDeploymentRequest>) -> ActixResult<HttpResponse> {
    match repo.create_deployment(&req.network_id) {
        Ok(deployment) => Ok(HttpResponse::Created().json(deployment)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn update_deployment(
    repo: Repo,
    path: web::Path<String>,
    req: web::Json<DeploymentPatch>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match repo.update_deployment(&id, req.into_inner()) {
        Ok(deployment) => Ok(HttpResponse::Ok().json(deployment)),
        Err(e) => {
            warn!(deployment = %id, error = %e, "Rejected deployment update");
            Ok(error_response(&e))
        }
    }
}

async fn delete_deployment(repo: Repo, path: web::Path<String>) -> ActixResult<HttpResponse> {
    if repo.delete_deployment(&path.into_inner()) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(deployment_not_found())
    }
}
