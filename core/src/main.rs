mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // resume reminder workflows left over from previous runs and keep
    // polling for due wake times
    reminder::scheduler::spawn(pool.clone(), config.reminder_poll_seconds);

    HttpServer::new(move || {
        let guard_config = config_data.guard_config.clone();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .wrap(cors::middleware(&origin)) // 3rd
            .wrap(logger::middleware()) // 2nd
            .wrap(guard::middleware(guard_config)) // 1st
            .service(
                web::scope("/api/v1")
                    .service(api_auth::mount_auth())
                    .service(reminder::mount_workflow())
                    .service(
                        web::scope("")
                            .wrap(api_auth::auth_middleware())
                            .service(api_auth::mount_user())
                            .service(api_subs::mount_subs()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
