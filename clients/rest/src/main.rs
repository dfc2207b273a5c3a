use actix_cors::Cors;
use actix_web::{
    delete, get,
    middleware::{self, Condition},
    post, put, web, App, HttpResponse, HttpServer, Responder,
};
use clap::Parser;
use database::database::{database::Database, options::DatabaseOptions};
use std::io;

use crate::{
    dto::{CountDto, GreetingDto, PersonDto},
    facade::{FacadeError, PersonFacade},
};

mod dto;
mod facade;

/// Liveness / greeting endpoint
#[get("/person")]
async fn greeting() -> impl Responder {
    HttpResponse::Ok().json(GreetingDto {
        msg: "Hello World".to_string(),
    })
}

#[get("/person/count")]
async fn get_count(facade: web::Data<PersonFacade>) -> Result<HttpResponse, FacadeError> {
    let count = facade.get_person_count()?;

    Ok(HttpResponse::Ok().json(CountDto { count }))
}

#[get("/person/all")]
async fn get_all_persons(facade: web::Data<PersonFacade>) -> Result<HttpResponse, FacadeError> {
    let persons = facade.get_all_persons()?;

    Ok(HttpResponse::Ok().json(persons))
}

#[get("/person/{id}")]
async fn get_person(
    facade: web::Data<PersonFacade>,
    id: web::Path<u64>,
) -> Result<HttpResponse, FacadeError> {
    let person = facade.get_person(id.into_inner())?;

    Ok(HttpResponse::Ok().json(person))
}

#[post("/person")]
async fn add_person(
    facade: web::Data<PersonFacade>,
    person: web::Json<PersonDto>,
) -> Result<HttpResponse, FacadeError> {
    let created = facade.add_person(&person.f_name, &person.l_name, &person.phone)?;

    Ok(HttpResponse::Ok().json(created))
}

#[put("/person/{id}")]
async fn edit_person(
    facade: web::Data<PersonFacade>,
    id: web::Path<u64>,
    person: web::Json<PersonDto>,
) -> Result<HttpResponse, FacadeError> {
    // The id always comes from the url, a conflicting id in the body is ignored
    let mut person = person.into_inner();
    person.id = Some(id.into_inner());

    let updated = facade.edit_person(person)?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/person/{id}")]
async fn delete_person(
    facade: web::Data<PersonFacade>,
    id: web::Path<u64>,
) -> Result<HttpResponse, FacadeError> {
    let deleted = facade.delete_person(id.into_inner())?;

    Ok(HttpResponse::Ok().json(deleted))
}

/// /person/count and /person/all must be registered before /person/{id},
/// actix matches services in registration order
fn configure_person_services(cfg: &mut web::ServiceConfig) {
    cfg.service(greeting)
        .service(get_count)
        .service(get_all_persons)
        .service(add_person)
        .service(edit_person)
        .service(delete_person)
        .service(get_person);
}

/// 📇 Person REST server, a CRUD interface over the person database
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the database. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, default_value = "data")]
    data: std::path::PathBuf,

    /// Port the REST server will run on
    #[clap(short, long, default_value = "9000")]
    port: u16,

    /// Address the REST server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Log each HTTP request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let database_options = DatabaseOptions::default().set_data_directory(args.data);

    let request_manager = Database::start(database_options);

    // Set up Ctrl-C handler
    let set_handler_request_manager = request_manager.clone();

    ctrlc::set_handler(move || {
        let shutdown_response = set_handler_request_manager
            .send_shutdown_request()
            .expect("Should not timeout");

        log::info!("Shutting down server: {}", shutdown_response);

        std::process::exit(0);
    })
    .expect("Error setting Ctrl-C handler");

    let facade = web::Data::new(PersonFacade::new(request_manager));

    log::info!("starting HTTP server on port {}.", args.port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(facade.clone())
            .configure(configure_person_services)
            .wrap(Cors::permissive())
            .wrap(Condition::new(args.log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await
}
