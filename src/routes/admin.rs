use actix_web::{http::header, middleware::from_fn, web, HttpResponse, Result};
use askama::Template;
use serde::Deserialize;

use crate::auth::{admin_guard, AdminUser};
use crate::models::{find_service, format_price, Booking, BookingStatus};
use crate::repo;
use crate::settings::{parse_admin_ids, Settings, ROOT_ADMIN_IDS};
use crate::state::AppState;
use crate::templates::render;

#[derive(Clone, Debug)]
struct StatCard {
    label: String,
    value: String,
}

#[derive(Clone, Debug)]
struct BookingRow {
    id: String,
    service_name: String,
    date: String,
    time_slot: String,
    client_phone: String,
    plate: String,
    status_label: String,
    status_class: String,
    is_free: bool,
    is_pending: bool,
}

#[derive(Clone, Debug)]
struct ClientRow {
    name: String,
    phone: String,
    plate: String,
    visits: u32,
    is_vip: bool,
}

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
struct AdminDashboardTemplate {
    admin_name: String,
    stats: Vec<StatCard>,
    recent: Vec<BookingRow>,
    has_recent: bool,
}

#[derive(Template)]
#[template(path = "admin_bookings.html")]
struct AdminBookingsTemplate {
    bookings: Vec<BookingRow>,
    status_filter: String,
    has_rows: bool,
}

#[derive(Template)]
#[template(path = "admin_clients.html")]
struct AdminClientsTemplate {
    clients: Vec<ClientRow>,
    has_rows: bool,
}

#[derive(Template)]
#[template(path = "admin_settings.html")]
struct AdminSettingsTemplate {
    start_hour: u32,
    end_hour: u32,
    slot_duration: u32,
    posts_count: u32,
    admin_ids: String,
    bot_token: String,
    channel_id: String,
    root_admins: String,
    saved: bool,
}

#[derive(Deserialize)]
struct BookingFilter {
    status: Option<String>,
}

#[derive(Deserialize)]
struct StatusForm {
    status: String,
}

#[derive(Deserialize)]
struct SettingsForm {
    start_hour: String,
    end_hour: String,
    slot_duration: String,
    posts_count: String,
    admin_ids: String,
    bot_token: String,
    channel_id: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(from_fn(admin_guard))
            .service(web::resource("").route(web::get().to(index)))
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard)))
            .service(web::resource("/bookings").route(web::get().to(list_bookings)))
            .service(
                web::resource("/bookings/{id}/status").route(web::post().to(update_status)),
            )
            .service(web::resource("/clients").route(web::get().to(list_clients)))
            .service(
                web::resource("/settings")
                    .route(web::get().to(show_settings))
                    .route(web::post().to(save_settings)),
            ),
    );
}

async fn index() -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, "/admin/dashboard"))
        .finish()
}

fn booking_row(booking: &Booking) -> BookingRow {
    let service_name = find_service(&booking.service_id)
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| "Unknown service".to_string());
    BookingRow {
        id: booking.id.clone(),
        service_name,
        date: booking.date.to_string(),
        time_slot: booking.time_slot.clone(),
        client_phone: booking.client_phone.clone(),
        plate: booking.plate_number.clone(),
        status_label: booking.status.label().to_string(),
        status_class: booking.status.css_class().to_string(),
        is_free: booking.is_free_wash,
        is_pending: booking.status == BookingStatus::Pending,
    }
}

async fn dashboard(
    state: web::Data<AppState>,
    auth: web::ReqData<AdminUser>,
) -> Result<HttpResponse> {
    let bookings = repo::get_bookings(&state.db).await.unwrap_or_default();
    let clients = repo::get_clients(&state.db).await.unwrap_or_default();

    let revenue: u32 = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed && !b.is_free_wash)
        .filter_map(|b| find_service(&b.service_id))
        .map(|s| s.price)
        .sum();
    let count_with = |status: BookingStatus| -> usize {
        bookings.iter().filter(|b| b.status == status).count()
    };

    let stats = vec![
        StatCard {
            label: "Revenue".to_string(),
            value: format_price(revenue),
        },
        StatCard {
            label: "Pending".to_string(),
            value: count_with(BookingStatus::Pending).to_string(),
        },
        StatCard {
            label: "Completed".to_string(),
            value: count_with(BookingStatus::Completed).to_string(),
        },
        StatCard {
            label: "Cancelled".to_string(),
            value: count_with(BookingStatus::Cancelled).to_string(),
        },
        StatCard {
            label: "Clients".to_string(),
            value: clients.len().to_string(),
        },
    ];

    let mut recent: Vec<&Booking> = bookings.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent: Vec<BookingRow> = recent.into_iter().take(6).map(booking_row).collect();

    Ok(render(AdminDashboardTemplate {
        admin_name: auth.name.clone(),
        stats,
        has_recent: !recent.is_empty(),
        recent,
    }))
}

async fn list_bookings(
    state: web::Data<AppState>,
    query: web::Query<BookingFilter>,
) -> Result<HttpResponse> {
    let status_filter = query.status.clone().unwrap_or_default();
    let filter = BookingStatus::parse(&status_filter);

    let mut bookings = repo::get_bookings(&state.db).await.unwrap_or_default();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let rows: Vec<BookingRow> = bookings
        .iter()
        .filter(|b| filter.map_or(true, |status| b.status == status))
        .map(booking_row)
        .collect();

    Ok(render(AdminBookingsTemplate {
        has_rows: !rows.is_empty(),
        bookings: rows,
        status_filter,
    }))
}

async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<StatusForm>,
    auth: web::ReqData<AdminUser>,
) -> Result<HttpResponse> {
    let booking_id = path.into_inner();
    if let Some(status) = BookingStatus::parse(&form.status) {
        repo::update_booking_status(&state.db, &booking_id, status)
            .await
            .map_err(actix_web::error::ErrorInternalServerError)?;
        log::info!(
            "{} set booking {booking_id} to {}",
            auth.name,
            status.label()
        );
    } else {
        log::warn!("Ignoring unknown status {:?}", form.status);
    }

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/admin/bookings"))
        .finish())
}

async fn list_clients(state: web::Data<AppState>) -> Result<HttpResponse> {
    let clients = repo::get_clients(&state.db).await.unwrap_or_default();
    let rows: Vec<ClientRow> = clients
        .iter()
        .map(|client| ClientRow {
            name: client.name.clone(),
            phone: client.phone.clone(),
            plate: client.plate_number.clone(),
            visits: client.visits,
            is_vip: client.is_vip,
        })
        .collect();

    Ok(render(AdminClientsTemplate {
        has_rows: !rows.is_empty(),
        clients: rows,
    }))
}

fn settings_page(settings: &Settings, saved: bool) -> AdminSettingsTemplate {
    let admin_ids = settings
        .additional_admin_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let root_admins = ROOT_ADMIN_IDS
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    AdminSettingsTemplate {
        start_hour: settings.start_hour,
        end_hour: settings.end_hour,
        slot_duration: settings.slot_duration,
        posts_count: settings.posts_count,
        admin_ids,
        bot_token: settings.bot_token.clone(),
        channel_id: settings.channel_id.clone(),
        root_admins,
        saved,
    }
}

async fn show_settings(state: web::Data<AppState>) -> Result<HttpResponse> {
    let settings = repo::get_settings(&state.db)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(render(settings_page(&settings, false)))
}

async fn save_settings(
    state: web::Data<AppState>,
    form: web::Form<SettingsForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let settings = Settings::from_form(
        &form.start_hour,
        &form.end_hour,
        &form.slot_duration,
        &form.posts_count,
        parse_admin_ids(&form.admin_ids),
        form.bot_token.trim().to_string(),
        form.channel_id.trim().to_string(),
    );

    repo::save_settings(&state.db, &settings)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
    log::info!("Settings saved");

    Ok(render(settings_page(&settings, true)))
}
