use crate::{
    api::{attendance, employee, leave_request, payroll},
    auth::middleware::auth_middleware,
    config::Config,
    error::{json_error_handler, query_error_handler},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst are both non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    // Every API route needs a bearer access token
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::list_payrolls))
                            .route(web::post().to(payroll::create_payroll)),
                    )
                    // /payroll/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(payroll::get_employee_payroll))
                            .route(web::post().to(payroll::create_employee_payroll))
                            .route(web::put().to(payroll::update_employee_payroll))
                            .route(web::patch().to(payroll::update_employee_payroll))
                            .route(web::delete().to(payroll::delete_employee_payroll)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::patch().to(payroll::update_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    ),
            )
            .service(
                web::scope("/employee")
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::attendance_history)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            ),
    );
}
